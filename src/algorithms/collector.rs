// Multimap with tolerant keys: an item joins the first bucket whose key the
// comparer accepts, otherwise it opens a new bucket. Buckets keep insertion
// order, so bucket indices are stable handles.

use crate::geometry::math::is_point_equal;
use crate::model::Point;

#[derive(Clone, Debug)]
pub struct Collection<K, V> {
    pub key: K,
    pub items: Vec<V>,
}

pub struct Collector<K, V> {
    collections: Vec<Collection<K, V>>,
    comparer: Box<dyn Fn(&K, &K) -> bool>,
}

impl<K, V> Collector<K, V> {
    pub fn new(comparer: impl Fn(&K, &K) -> bool + 'static) -> Self {
        Collector { collections: Vec::new(), comparer: Box::new(comparer) }
    }

    /// Returns the index of the bucket the item went into.
    pub fn add_item_to_collection(&mut self, key: K, item: V) -> usize {
        match self.find_collection(&key) {
            Some(i) => {
                self.collections[i].items.push(item);
                i
            }
            None => {
                self.collections.push(Collection { key, items: vec![item] });
                self.collections.len() - 1
            }
        }
    }

    pub fn find_collection(&self, key: &K) -> Option<usize> {
        self.collections.iter().position(|c| (self.comparer)(key, &c.key))
    }

    pub fn collection(&self, index: usize) -> Option<&Collection<K, V>> {
        self.collections.get(index)
    }

    pub fn find_collection_mut(&mut self, key: &K) -> Option<&mut Collection<K, V>> {
        let i = self.find_collection(key)?;
        self.collections.get_mut(i)
    }

    /// Remove the first item in bucket `index` matching `pred`.
    pub fn remove_item_from_collection(&mut self, index: usize, pred: impl Fn(&V) -> bool) -> Option<V> {
        let items = &mut self.collections.get_mut(index)?.items;
        let at = items.iter().position(pred)?;
        Some(items.remove(at))
    }

    pub fn collections(&self) -> &[Collection<K, V>] {
        &self.collections
    }

    pub fn collections_of_multiple(&self) -> impl Iterator<Item = &Collection<K, V>> {
        self.collections.iter().filter(|c| c.items.len() > 1)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Collector keyed by points within `distance` of each other.
pub fn point_collector<V>(distance: f64) -> Collector<Point, V> {
    Collector::new(move |a: &Point, b: &Point| is_point_equal(*a, *b, Some(distance)))
}

// Dead-end pruning: repeatedly drop paths with an end point that meets no
// other path, until a full pass removes nothing.

use serde::{Deserialize, Serialize};

use super::collector::{point_collector, Collector};
use super::walk::{walk_paths, WalkedPath};
use crate::error::{check_tolerance, KernelError};
use crate::geometry::path::end_points;
use crate::geometry::tolerance::POINT_MATCHING_DISTANCE;
use crate::model::{Model, Path, Point, Route};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadEndOptions {
    pub point_matching_distance: f64,
}

impl Default for DeadEndOptions {
    fn default() -> Self {
        DeadEndOptions { point_matching_distance: POINT_MATCHING_DISTANCE }
    }
}

impl DeadEndOptions {
    pub fn validate(&self) -> Result<(), KernelError> {
        check_tolerance("point_matching_distance", self.point_matching_distance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadEndReason {
    /// An end point connects to nothing.
    Unconnected,
    /// Dropped by the keep predicate at a junction with an odd number of paths.
    OddJunction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeadEnd {
    pub route: Route,
    /// As stored in its model; add `offset` for absolute coordinates.
    pub path: Path,
    pub offset: Point,
    pub reason: DeadEndReason,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeadEndReport {
    pub removed: Vec<DeadEnd>,
}

impl DeadEndReport {
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

struct PathRef {
    route: Route,
    offset: Point,
    keep: bool,
    removed: Option<DeadEndReason>,
}

/// Remove dead ends from `model`. `keep` is only asked about paths meeting
/// at a junction of three, five, ... paths; returning false drops the path.
pub fn remove_dead_ends(
    model: &mut Model,
    options: &DeadEndOptions,
    keep: Option<&dyn Fn(&WalkedPath<'_>) -> bool>,
) -> Result<DeadEndReport, KernelError> {
    options.validate()?;

    // Collect while the tree is borrowed read-only.
    let mut refs: Vec<PathRef> = Vec::new();
    let mut buckets = point_collector::<usize>(options.point_matching_distance);
    let mut path_buckets: Vec<[usize; 2]> = Vec::new();
    walk_paths(model, |walked| {
        let Some(ends) = end_points(walked.path, walked.offset) else { return };
        let i = refs.len();
        let b0 = buckets.add_item_to_collection(ends[0], i);
        let b1 = buckets.add_item_to_collection(ends[1], i);
        path_buckets.push([b0, b1]);
        refs.push(PathRef {
            keep: keep.map_or(true, |k| k(&walked)),
            offset: walked.offset,
            route: walked.route,
            removed: None,
        });
    });

    loop {
        let mut removed_any = false;
        for b in 0..buckets.len() {
            let items = match buckets.collection(b) {
                Some(c) => c.items.clone(),
                None => continue,
            };
            if items.len() == 1 {
                drop_path(&mut buckets, &mut refs[items[0]], path_buckets[items[0]], items[0], DeadEndReason::Unconnected);
                removed_any = true;
            } else if keep.is_some() && items.len() % 2 == 1 {
                let unwanted: Vec<usize> = items.into_iter().filter(|&i| !refs[i].keep).collect();
                for i in unwanted {
                    drop_path(&mut buckets, &mut refs[i], path_buckets[i], i, DeadEndReason::OddJunction);
                    removed_any = true;
                }
            }
        }
        if !removed_any {
            break;
        }
    }

    let mut report = DeadEndReport::default();
    for r in refs {
        if let Some(reason) = r.removed {
            let path = model.remove_path_at(&r.route)?;
            report.removed.push(DeadEnd { route: r.route, path, offset: r.offset, reason });
        }
    }
    log::debug!("remove_dead_ends: {} paths removed", report.len());
    Ok(report)
}

fn drop_path(buckets: &mut Collector<Point, usize>, r: &mut PathRef, ends: [usize; 2], i: usize, reason: DeadEndReason) {
    r.removed = Some(reason);
    for b in ends {
        buckets.remove_item_from_collection(b, |&x| x == i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Model {
        Model::from_paths([
            ("a", Path::line((0.0, 0.0), (10.0, 0.0))),
            ("b", Path::line((10.0, 0.0), (5.0, 8.0))),
            ("c", Path::line((5.0, 8.0), (0.0, 0.0))),
        ])
    }

    #[test]
    fn closed_shape_untouched() {
        let mut m = triangle();
        m.paths.insert("circle".into(), Path::circle((50.0, 50.0), 2.0));
        let report = remove_dead_ends(&mut m, &DeadEndOptions::default(), None).unwrap();
        assert!(report.is_empty());
        assert_eq!(m.path_count(), 4);
    }

    #[test]
    fn dangling_tail_removed_iteratively() {
        let mut m = triangle();
        m.paths.insert("tail1".into(), Path::line((10.0, 0.0), (20.0, 0.0)));
        m.paths.insert("tail2".into(), Path::line((20.0, 0.0), (30.0, 5.0)));
        let report = remove_dead_ends(&mut m, &DeadEndOptions::default(), None).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.removed.iter().all(|d| d.reason == DeadEndReason::Unconnected));
        assert_eq!(m.paths.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn keep_predicate_drops_at_odd_junction() {
        // triangle plus a chord from (0,0) to (5,8) duplicating side c
        let mut m = triangle();
        m.paths.insert("dup".into(), Path::line((0.0, 0.0), (5.0, 8.0)));
        let keep = |w: &WalkedPath<'_>| w.path_id != "dup";
        let before = remove_dead_ends(&mut m.clone(), &DeadEndOptions::default(), None).unwrap();
        assert!(before.is_empty());
        m.paths.insert("spur".into(), Path::line((5.0, 8.0), (5.0, 20.0)));
        m.paths.insert("spur2".into(), Path::line((5.0, 20.0), (5.0, 8.0)));
        let report = remove_dead_ends(&mut m, &DeadEndOptions::default(), Some(&keep)).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.removed[0].route.path.as_deref(), Some("dup"));
        assert_eq!(report.removed[0].reason, DeadEndReason::OddJunction);
    }
}

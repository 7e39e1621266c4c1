//! Axis-aligned bounding boxes for paths and models, cached by route key.
//!
//! The atlas is a derived cache. Code that changes the tree is responsible for
//! calling [`Atlas::invalidate`] (or registering new boxes with
//! [`Atlas::set_path_measurement`]) and then [`Atlas::ensure_measured`] before
//! the cache is trusted again. A stale atlas only leads to poor pruning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::walk::{walk, Visitor, WalkedModel, WalkedPath};
use crate::geometry::angle::is_between_arc_angles;
use crate::geometry::path::arc_end_points;
use crate::geometry::tolerance::round_default;
use crate::model::{Model, Path, Point, Route, RouteKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub low: Point,
    pub high: Point,
}

impl Measurement {
    pub fn from_point(p: Point) -> Self {
        Measurement { low: p, high: p }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        Measurement {
            low: Point::new(a.x.min(b.x), a.y.min(b.y)),
            high: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Grow to cover `other`.
    pub fn increase(&mut self, other: &Measurement) {
        self.low = Point::new(self.low.x.min(other.low.x), self.low.y.min(other.low.y));
        self.high = Point::new(self.high.x.max(other.high.x), self.high.y.max(other.high.y));
    }

    /// Touching boxes count as overlapping.
    pub fn is_overlapping(&self, other: &Measurement) -> bool {
        round_default(self.low.x - other.high.x) <= 0.0
            && round_default(self.high.x - other.low.x) >= 0.0
            && round_default(self.low.y - other.high.y) <= 0.0
            && round_default(self.high.y - other.low.y) >= 0.0
    }

    pub fn contains_point(&self, p: Point) -> bool {
        round_default(p.x - self.low.x) >= 0.0
            && round_default(self.high.x - p.x) >= 0.0
            && round_default(p.y - self.low.y) >= 0.0
            && round_default(self.high.y - p.y) >= 0.0
    }

    pub fn center(&self) -> Point {
        Point::new((self.low.x + self.high.x) / 2.0, (self.low.y + self.high.y) / 2.0)
    }

    pub fn width(&self) -> f64 { self.high.x - self.low.x }
    pub fn height(&self) -> f64 { self.high.y - self.low.y }
}

/// Exact box of one path placed at `offset`. Arcs include the compass points
/// their sweep covers.
pub fn path_extents(path: &Path, offset: Point) -> Measurement {
    let m = match path {
        Path::Line(l) => Measurement::from_points(l.origin, l.end),
        Path::Circle(c) => {
            let r = Point::new(c.radius, c.radius);
            Measurement { low: c.origin - r, high: c.origin + r }
        }
        Path::Arc(a) => {
            let [s, e] = arc_end_points(a);
            let mut m = Measurement::from_points(s, e);
            let r = a.radius;
            if is_between_arc_angles(0.0, a, false) { m.high.x = a.origin.x + r; }
            if is_between_arc_angles(90.0, a, false) { m.high.y = a.origin.y + r; }
            if is_between_arc_angles(180.0, a, false) { m.low.x = a.origin.x - r; }
            if is_between_arc_angles(270.0, a, false) { m.low.y = a.origin.y - r; }
            m
        }
    };
    Measurement { low: m.low + offset, high: m.high + offset }
}

/// Box of every path in the tree, or `None` when it has no paths.
pub fn model_extents(model: &Model) -> Option<Measurement> {
    let mut atlas = Atlas::new();
    atlas.measure_models(model);
    atlas.root_extents().copied()
}

#[derive(Clone, Debug, Default)]
pub struct Atlas {
    path_map: HashMap<RouteKey, Measurement>,
    model_map: HashMap<RouteKey, Measurement>,
    measured: bool,
}

impl Atlas {
    pub fn new() -> Self {
        Atlas::default()
    }

    /// Measure with one walk; a model's box is the union of its children's.
    pub fn measure_models(&mut self, model: &Model) {
        self.path_map.clear();
        self.model_map.clear();
        walk(model, &mut Measurer { atlas: self });
        self.measured = true;
        log::trace!("atlas measured {} paths, {} models", self.path_map.len(), self.model_map.len());
    }

    pub fn ensure_measured(&mut self, model: &Model) {
        if !self.measured {
            self.measure_models(model);
        }
    }

    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Drop the entry at `route` and every ancestor model's box.
    pub fn invalidate(&mut self, route: &Route) {
        if route.is_path() {
            self.path_map.remove(&route.key());
        } else {
            self.model_map.remove(&route.key());
        }
        let mut parent = route.parent();
        while let Some(r) = parent {
            self.model_map.remove(&r.key());
            parent = r.parent();
        }
        self.measured = false;
    }

    pub fn set_path_measurement(&mut self, key: RouteKey, m: Measurement) {
        self.path_map.insert(key, m);
        self.measured = false;
    }

    pub fn remove_path(&mut self, key: &RouteKey) -> Option<Measurement> {
        self.measured = false;
        self.path_map.remove(key)
    }

    pub fn path_measurement(&self, key: &RouteKey) -> Option<&Measurement> {
        self.path_map.get(key)
    }

    pub fn model_measurement(&self, key: &RouteKey) -> Option<&Measurement> {
        self.model_map.get(key)
    }

    pub fn root_extents(&self) -> Option<&Measurement> {
        self.model_map.get(&RouteKey::default())
    }

    fn increase_parent(&mut self, route: &Route, m: Measurement) {
        let Some(parent) = route.parent() else { return };
        self.model_map
            .entry(parent.key())
            .and_modify(|p| p.increase(&m))
            .or_insert(m);
    }
}

struct Measurer<'m> {
    atlas: &'m mut Atlas,
}

impl<'a, 'm> Visitor<'a> for Measurer<'m> {
    fn on_path(&mut self, walked: WalkedPath<'a>) {
        let m = path_extents(walked.path, walked.offset);
        self.atlas.path_map.insert(walked.route_key, m);
        self.atlas.increase_parent(&walked.route, m);
    }

    fn after_child_walk(&mut self, walked: &WalkedModel<'a>) {
        if let Some(m) = self.atlas.model_map.get(&walked.route_key).copied() {
            self.atlas.increase_parent(&walked.route, m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_extents_cover_compass_points() {
        let m = path_extents(&Path::arc((0.0, 0.0), 2.0, 45.0, 135.0), Point::ZERO);
        assert_eq!(m.high.y, 2.0);
        assert!((m.low.x + 2f64.sqrt()).abs() < 1e-6);
        assert!((m.low.y - 2f64.sqrt()).abs() < 1e-6);
        let wrap = path_extents(&Path::arc((1.0, 0.0), 1.0, 270.0, 90.0), Point::new(0.0, 1.0));
        assert_eq!(wrap.high.x, 2.0);
        assert_eq!(wrap.low, Point::new(1.0, 0.0));
        assert_eq!(wrap.high.y, 2.0);
    }

    #[test]
    fn model_boxes_include_children() {
        let mut child = Model::from_paths([("c", Path::circle((0.0, 0.0), 1.0))]).with_origin((10.0, 10.0));
        child.models.insert("deep".into(), Model::from_paths([("l", Path::line((0.0, 0.0), (5.0, 0.0)))]));
        let mut root = Model::from_paths([("l", Path::line((0.0, 0.0), (1.0, 1.0)))]);
        root.models.insert("child".into(), child);
        let mut atlas = Atlas::new();
        atlas.measure_models(&root);
        let child_key = Route::root().child_model("child").key();
        let cm = atlas.model_measurement(&child_key).unwrap();
        assert_eq!(cm.low, Point::new(9.0, 9.0));
        assert_eq!(cm.high, Point::new(15.0, 11.0));
        let root_m = atlas.root_extents().unwrap();
        assert_eq!(root_m.low, Point::new(0.0, 0.0));
        assert_eq!(root_m.high, Point::new(15.0, 11.0));
        assert_eq!(model_extents(&Model::new()), None);
    }

    #[test]
    fn invalidate_marks_ancestors_stale() {
        let mut child = Model::from_paths([("c", Path::circle((0.0, 0.0), 1.0))]);
        child.origin = Point::new(3.0, 0.0);
        let mut root = Model::new();
        root.models.insert("child".into(), child);
        let mut atlas = Atlas::new();
        atlas.measure_models(&root);
        let route = Route::root().child_model("child").child_path("c");
        atlas.invalidate(&route);
        assert!(!atlas.is_measured());
        assert!(atlas.root_extents().is_none());
        assert!(atlas.path_measurement(&route.key()).is_none());
        atlas.ensure_measured(&root);
        assert_eq!(atlas.root_extents().map(|m| m.high), Some(Point::new(4.0, 1.0)));
    }

    #[test]
    fn registered_paths_wait_for_remeasure() {
        let mut root = Model::from_paths([("l", Path::line((0.0, 0.0), (2.0, 0.0)))]);
        let mut atlas = Atlas::new();
        atlas.measure_models(&root);
        let old = Route::root().child_path("l").key();
        let new = Route::root().child_path("l_1").key();

        let moved = Path::line((0.0, 0.0), (0.0, 5.0));
        root.paths.remove("l");
        root.paths.insert("l_1".into(), moved);
        assert!(atlas.remove_path(&old).is_some());
        atlas.set_path_measurement(new.clone(), path_extents(&moved, Point::ZERO));
        assert!(!atlas.is_measured());
        assert_eq!(atlas.path_measurement(&new).map(|m| m.high), Some(Point::new(0.0, 5.0)));
        assert!(atlas.path_measurement(&old).is_none());
        // model boxes are still the old ones until re-measured
        assert_eq!(atlas.root_extents().map(|m| m.high), Some(Point::new(2.0, 0.0)));

        atlas.ensure_measured(&root);
        assert_eq!(atlas.root_extents().map(|m| m.high), Some(Point::new(0.0, 5.0)));
    }

    #[test]
    fn overlap_and_containment() {
        let a = Measurement::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Measurement::from_points(Point::new(10.0, 5.0), Point::new(20.0, 6.0));
        let c = Measurement::from_points(Point::new(10.1, 5.0), Point::new(20.0, 6.0));
        assert!(a.is_overlapping(&b));
        assert!(!a.is_overlapping(&c));
        assert!(a.contains_point(Point::new(10.0, 0.0)));
        assert_eq!(a.center(), Point::new(5.0, 5.0));
        assert_eq!((a.width(), a.height()), (10.0, 10.0));
    }
}

// Point containment by ray parity: cast a segment from the point to a far
// point and count the distinct places it crosses the model's paths.

use super::atlas::{path_extents, Atlas, Measurement};
use super::walk::{walk, Visitor, WalkedModel, WalkedPath};
use crate::geometry::intersect::{intersection, IntersectionOptions};
use crate::geometry::math::is_point_distinct;
use crate::geometry::tolerance::UNIQUE_POINT_DISTANCE;
use crate::model::{Model, Path, Point};

pub const DEFAULT_FAR_POINT: Point = Point::new(7_654_321.0, 1_234_567.0);

#[derive(Clone, Copy, Debug, Default)]
pub struct InsideOptions<'a> {
    /// Ray target; must lie outside the model. Defaults to [`DEFAULT_FAR_POINT`].
    pub far_point: Option<Point>,
    /// Boxes of `model`, used to skip paths and subtrees the ray cannot reach.
    pub atlas: Option<&'a Atlas>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Containment {
    pub inside: bool,
    /// Distinct crossings found along the ray.
    pub crossings: Vec<Point>,
}

pub fn is_point_inside_model(p: Point, model: &Model, options: &InsideOptions) -> Containment {
    let ray = Path::line(p, options.far_point.unwrap_or(DEFAULT_FAR_POINT));
    let mut v = RayCaster {
        ray_box: path_extents(&ray, Point::ZERO),
        ray,
        atlas: options.atlas,
        out: Containment::default(),
    };
    walk(model, &mut v);
    v.out
}

struct RayCaster<'o> {
    ray: Path,
    ray_box: Measurement,
    atlas: Option<&'o Atlas>,
    out: Containment,
}

impl<'a, 'o> Visitor<'a> for RayCaster<'o> {
    fn on_path(&mut self, walked: WalkedPath<'a>) {
        if let Some(m) = self.atlas.and_then(|a| a.path_measurement(&walked.route_key)) {
            if !m.is_overlapping(&self.ray_box) {
                return;
            }
        }
        let opts = IntersectionOptions { path2_offset: walked.offset, ..Default::default() };
        let hit = intersection(&self.ray, walked.path, &opts);
        let mut added = 0;
        for q in hit.points() {
            if is_point_distinct(*q, &self.out.crossings, UNIQUE_POINT_DISTANCE) {
                self.out.crossings.push(*q);
                added += 1;
            }
        }
        if added % 2 == 1 {
            self.out.inside = !self.out.inside;
        }
    }

    fn before_child_walk(&mut self, walked: &WalkedModel<'a>) -> bool {
        match self.atlas {
            None => true,
            // No box means the subtree holds no paths.
            Some(a) => a
                .model_measurement(&walked.route_key)
                .is_some_and(|m| m.is_overlapping(&self.ray_box)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Model {
        Model::from_paths([
            ("b", Path::line((x, y), (x + size, y))),
            ("r", Path::line((x + size, y), (x + size, y + size))),
            ("t", Path::line((x + size, y + size), (x, y + size))),
            ("l", Path::line((x, y + size), (x, y))),
        ])
    }

    #[test]
    fn square_contains_center() {
        let m = square(0.0, 0.0, 10.0);
        let r = is_point_inside_model(Point::new(5.0, 5.0), &m, &InsideOptions::default());
        assert!(r.inside);
        assert_eq!(r.crossings.len(), 1);
        assert!(!is_point_inside_model(Point::new(15.0, 5.0), &m, &InsideOptions::default()).inside);
    }

    #[test]
    fn ring_of_circles() {
        let m = Model::from_paths([
            ("outer", Path::circle((0.0, 0.0), 10.0)),
            ("inner", Path::circle((0.0, 0.0), 5.0)),
        ]);
        let o = InsideOptions { far_point: Some(Point::new(20.0, 1.0)), atlas: None };
        assert!(is_point_inside_model(Point::new(7.0, 0.0), &m, &o).inside);
        assert!(!is_point_inside_model(Point::new(1.0, 0.0), &m, &o).inside);
    }

    #[test]
    fn atlas_pruning_agrees() {
        let mut root = Model::new();
        root.models.insert("sq".into(), square(0.0, 0.0, 10.0));
        root.models.insert("far".into(), square(100.0, -50.0, 10.0));
        let mut atlas = Atlas::new();
        atlas.measure_models(&root);
        let far = Some(Point::new(11.0, 11.0));
        let with = InsideOptions { far_point: far, atlas: Some(&atlas) };
        let without = InsideOptions { far_point: far, atlas: None };
        let p = Point::new(2.0, 3.0);
        assert_eq!(is_point_inside_model(p, &root, &with), is_point_inside_model(p, &root, &without));
        assert!(is_point_inside_model(p, &root, &with).inside);
    }
}

// Whole-tree transforms and measurements

use crate::geometry::path::path_length;
use crate::model::{Model, Point};

use super::walk::walk_paths;

/// Push every model origin down into its paths so coordinates become
/// absolute (relative to `origin`) and all model origins are zero.
pub fn originate(model: &mut Model, origin: Point) {
    originate_inner(model, -origin);
}

fn originate_inner(model: &mut Model, offset: Point) {
    let offset = offset + model.origin;
    for path in model.paths.values_mut() {
        if offset != Point::ZERO {
            path.move_relative(offset);
        }
    }
    for child in model.models.values_mut() {
        originate_inner(child, offset);
    }
    model.origin = Point::ZERO;
}

impl Model {
    pub fn move_relative(&mut self, delta: Point) {
        self.origin = self.origin + delta;
    }

    /// Rotate the whole tree about `about`, given in the frame this model's
    /// origin is expressed in. Origins stay where they are; paths turn about
    /// the point as seen from each model.
    pub fn rotate(&mut self, angle_deg: f64, about: Point) {
        let local = about - self.origin;
        for path in self.paths.values_mut() {
            path.rotate(angle_deg, local);
        }
        for child in self.models.values_mut() {
            child.rotate(angle_deg, local);
        }
    }

    /// Scale paths and child origins. The model's own origin only moves with
    /// `scale_origin`.
    pub fn scale(&mut self, factor: f64, scale_origin: bool) {
        if scale_origin {
            self.origin = self.origin * factor;
        }
        for path in self.paths.values_mut() {
            path.scale(factor);
        }
        for child in self.models.values_mut() {
            child.scale(factor, true);
        }
    }
}

pub fn model_path_length(model: &Model) -> f64 {
    let mut total = 0.0;
    walk_paths(model, |w| total += path_length(w.path));
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::walk::collect_paths;
    use crate::model::Path;

    fn nested() -> Model {
        let child = Model::from_paths([("l", Path::line((0.0, 0.0), (1.0, 0.0)))]).with_origin((2.0, 3.0));
        let mut root = Model::from_paths([("c", Path::circle((0.0, 0.0), 1.0))]).with_origin((1.0, 1.0));
        root.models.insert("child".into(), child);
        root
    }

    #[test]
    fn originate_makes_coordinates_absolute() {
        let mut m = nested();
        let before: Vec<Path> = collect_paths(&m).iter().map(|w| w.path.clone_offset(w.offset)).collect();
        originate(&mut m, Point::ZERO);
        assert_eq!(m.origin, Point::ZERO);
        assert_eq!(m.models["child"].origin, Point::ZERO);
        let after: Vec<Path> = collect_paths(&m).iter().map(|w| *w.path).collect();
        assert_eq!(before, after);
        assert_eq!(m.models["child"].paths["l"], Path::line((3.0, 4.0), (4.0, 4.0)));
    }

    #[test]
    fn rotate_and_scale_tree() {
        let mut m = nested();
        m.rotate(90.0, Point::ZERO);
        assert_eq!(m.origin, Point::new(1.0, 1.0));
        originate(&mut m, Point::ZERO);
        let Path::Circle(c) = m.paths["c"] else { panic!("circle expected") };
        assert!((c.origin.x + 1.0).abs() < 1e-9 && (c.origin.y - 1.0).abs() < 1e-9);
        let Path::Line(l) = m.models["child"].paths["l"] else { panic!("line expected") };
        assert!((l.origin.x + 4.0).abs() < 1e-9 && (l.origin.y - 3.0).abs() < 1e-9);

        let mut s = nested();
        s.scale(2.0, false);
        assert_eq!(s.origin, Point::new(1.0, 1.0));
        assert_eq!(s.models["child"].origin, Point::new(4.0, 6.0));
        assert_eq!(model_path_length(&s), 2.0 + 4.0 * std::f64::consts::PI);
    }
}

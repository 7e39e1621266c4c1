// JSON form of the model tree, with the ingestion caps applied on load.

use serde_json::Value;

use crate::error::KernelError;
use crate::geometry::limits;
use crate::model::{Model, Path, Point};

impl Model {
    /// Parse and validate a tree.
    pub fn from_json_str(s: &str) -> Result<Model, KernelError> {
        let model: Model = serde_json::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_json_value(v: Value) -> Result<Model, KernelError> {
        let model: Model = serde_json::from_value(v)?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json_value(&self) -> Result<Value, KernelError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Check tree depth, path count, coordinate range and every path's geometry.
    pub fn validate(&self) -> Result<(), KernelError> {
        let mut stack: Vec<(&Model, usize)> = vec![(self, 0)];
        let mut paths = 0usize;
        while let Some((model, depth)) = stack.pop() {
            if depth > limits::MAX_MODEL_DEPTH {
                return Err(KernelError::LimitExceeded { what: "model depth", limit: limits::MAX_MODEL_DEPTH });
            }
            check_point(model.origin, "model origin")?;
            paths += model.paths.len();
            if paths > limits::MAX_PATHS {
                return Err(KernelError::LimitExceeded { what: "path count", limit: limits::MAX_PATHS });
            }
            for path in model.paths.values() {
                path.validate()?;
                check_path_bounds(path)?;
            }
            stack.extend(model.models.values().map(|m| (m, depth + 1)));
        }
        Ok(())
    }
}

fn check_point(p: Point, what: &'static str) -> Result<(), KernelError> {
    if !p.is_finite() {
        return Err(KernelError::NonFinite(what));
    }
    if !limits::in_coord_bounds(p.x) || !limits::in_coord_bounds(p.y) {
        return Err(KernelError::LimitExceeded { what, limit: limits::COORD_MAX as usize });
    }
    Ok(())
}

fn check_path_bounds(path: &Path) -> Result<(), KernelError> {
    match path {
        Path::Line(l) => {
            check_point(l.origin, "line origin")?;
            check_point(l.end, "line end")
        }
        Path::Circle(c) => {
            check_point(c.origin, "circle origin")?;
            if !limits::in_coord_bounds(c.radius) {
                return Err(KernelError::LimitExceeded { what: "circle radius", limit: limits::COORD_MAX as usize });
            }
            Ok(())
        }
        Path::Arc(a) => {
            check_point(a.origin, "arc origin")?;
            if !limits::in_coord_bounds(a.radius) {
                return Err(KernelError::LimitExceeded { what: "arc radius", limit: limits::COORD_MAX as usize });
            }
            if !limits::is_valid_angle(a.start_angle) || !limits::is_valid_angle(a.end_angle) {
                return Err(KernelError::NonFinite("arc angle"));
            }
            Ok(())
        }
    }
}

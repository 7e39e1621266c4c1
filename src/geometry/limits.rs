// Ingestion limits applied to trees loaded from JSON

// Tree size caps
pub const MAX_MODEL_DEPTH: usize = 256;
pub const MAX_PATHS: usize = 500_000;

// Numeric bounds
pub const COORD_MIN: f64 = -1_000_000_000.0;
pub const COORD_MAX: f64 = 1_000_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

// Angles only need to be finite; they are normalized on use.
#[inline]
pub fn is_valid_angle(a: f64) -> bool { a.is_finite() }

// Centralized tolerances and rounding policy. Every comparison in the kernel
// goes through `round` or one of the helpers here, never raw float equality.

pub const ACCURACY: f64 = 1e-7;                  // default rounding step
pub const SLOPE_ACCURACY: f64 = 1e-5;            // slopes compared at this step
pub const COLLINEAR_DISTANCE: f64 = 1e-5;        // point-to-line distance for collinearity
pub const AXIS_SPAN_ACCURACY: f64 = 1e-6;        // a line axis narrower than this is ignored
pub const POINT_MATCHING_DISTANCE: f64 = 0.005;  // endpoints this close are connected
pub const FRAGMENT_LENGTH_ACCURACY: f64 = 1e-4;  // fragments rounding to zero length are rejected
pub const UNIQUE_POINT_DISTANCE: f64 = 1e-6;     // ray crossings closer than this count once
pub const PATH_EQUAL_DISTANCE: f64 = 1e-4;       // breaker's duplicate test

/// Round to the nearest multiple of `accuracy`. Integers pass through untouched.
#[inline]
pub fn round(n: f64, accuracy: f64) -> f64 {
    if n.fract() == 0.0 {
        return n;
    }
    let inv = 1.0 / accuracy;
    ((n + f64::EPSILON) * inv).round() / inv
}

#[inline] pub fn round_default(n: f64) -> f64 { round(n, ACCURACY) }
#[inline] pub fn is_zero(n: f64) -> bool { round_default(n) == 0.0 }

/// `value` within `[limit_a, limit_b]` (either order) after rounding; strict when `exclusive`.
pub fn is_between(value: f64, limit_a: f64, limit_b: f64, exclusive: bool) -> bool {
    let (lo, hi) = if limit_a <= limit_b { (limit_a, limit_b) } else { (limit_b, limit_a) };
    let v = round_default(value);
    let lo = round_default(lo);
    let hi = round_default(hi);
    if exclusive { lo < v && v < hi } else { lo <= v && v <= hi }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_snaps_to_grid() {
        assert_eq!(round(3.0, ACCURACY), 3.0);
        assert_eq!(round(0.30000000000000004, ACCURACY), 0.3);
        assert_eq!(round(1.23456789, 0.01), 1.23);
        assert!(is_zero(1e-9));
        assert!(!is_zero(1e-6));
    }

    #[test]
    fn between_inclusive_and_exclusive() {
        assert!(is_between(5.0, 0.0, 5.0, false));
        assert!(!is_between(5.0, 0.0, 5.0, true));
        assert!(is_between(2.5, 5.0, 0.0, true));
        assert!(is_between(5.00000001, 0.0, 5.0, false));
    }
}

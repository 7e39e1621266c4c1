use super::angle::{of_point_in_radians, to_radians};
use super::tolerance::{round, round_default, ACCURACY, SLOPE_ACCURACY};
use crate::model::{Line, Point};

#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn round_point(p: Point, accuracy: f64) -> Point {
    Point::new(round(p.x, accuracy), round(p.y, accuracy))
}

/// Point at `radius` along `angle_rad`, snapped to the default rounding grid.
/// Exact quarter turns produce exact zeros.
pub fn from_polar(angle_rad: f64, radius: f64) -> Point {
    use std::f64::consts::{FRAC_PI_2, PI};
    let x = if angle_rad == FRAC_PI_2 || angle_rad == 3.0 * FRAC_PI_2 {
        0.0
    } else {
        round(radius * angle_rad.cos(), ACCURACY)
    };
    let y = if angle_rad == PI || angle_rad == 2.0 * PI {
        0.0
    } else {
        round(radius * angle_rad.sin(), ACCURACY)
    };
    Point::new(x, y)
}

pub fn rotate(p: Point, angle_deg: f64, about: Point) -> Point {
    if angle_deg == 0.0 {
        return p;
    }
    let a = of_point_in_radians(about, p) + to_radians(angle_deg);
    about + from_polar(a, distance(about, p))
}

pub fn scale(p: Point, factor: f64) -> Point {
    p * factor
}

/// Either distance `<= within`, or, with no tolerance, equal after rounding.
pub fn is_point_equal(a: Point, b: Point, within: Option<f64>) -> bool {
    match within {
        Some(d) => distance(a, b) <= d,
        None => round_point(a, ACCURACY) == round_point(b, ACCURACY),
    }
}

/// Whether `p` is farther than `within` from every point of `existing`.
pub fn is_point_distinct(p: Point, existing: &[Point], within: f64) -> bool {
    existing.iter().all(|q| !is_point_equal(p, *q, Some(within)))
}

/// Angle opposite side `a` of a triangle with sides `a`, `b`, `c`, in radians.
pub fn solve_triangle_sss(a: f64, b: f64, c: f64) -> f64 {
    let cos = (b * b + c * c - a * a) / (2.0 * b * c);
    cos.clamp(-1.0, 1.0).acos()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slope {
    Vertical { x: f64 },
    Sloped { slope: f64, y_intercept: f64 },
}

pub fn slope_of(line: &Line) -> Slope {
    let dx = line.end.x - line.origin.x;
    if round_default(dx) == 0.0 {
        return Slope::Vertical { x: line.origin.x };
    }
    let slope = (line.end.y - line.origin.y) / dx;
    Slope::Sloped { slope, y_intercept: line.origin.y - slope * line.origin.x }
}

pub fn is_slope_parallel(a: &Slope, b: &Slope) -> bool {
    match (a, b) {
        (Slope::Vertical { .. }, Slope::Vertical { .. }) => true,
        (Slope::Sloped { slope: s1, .. }, Slope::Sloped { slope: s2, .. }) => {
            round(*s1, SLOPE_ACCURACY) == round(*s2, SLOPE_ACCURACY)
        }
        _ => false,
    }
}

/// Perpendicular distance from `p` to the infinite line through `line`.
pub fn distance_to_infinite_line(p: Point, line: &Line) -> f64 {
    let len = distance(line.origin, line.end);
    if len == 0.0 {
        return distance(p, line.origin);
    }
    let d = line.end - line.origin;
    let w = p - line.origin;
    (d.x * w.y - d.y * w.x).abs() / len
}

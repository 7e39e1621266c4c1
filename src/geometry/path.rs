// Per-path measurements, transforms, equality and splitting

use super::angle::{
    is_angle_equal, is_between_arc_angles, no_revolutions, of_arc_end, of_arc_middle, of_arc_span,
    of_point_in_degrees, to_radians,
};
use super::math::{distance, from_polar, is_point_equal, rotate};
use super::tolerance::{is_between, round, round_default, AXIS_SPAN_ACCURACY, FRAGMENT_LENGTH_ACCURACY};
use crate::error::KernelError;
use crate::model::{Arc, Circle, Line, Path, Point};

impl Path {
    pub fn move_relative(&mut self, delta: Point) {
        match self {
            Path::Line(l) => {
                l.origin = l.origin + delta;
                l.end = l.end + delta;
            }
            Path::Circle(c) => c.origin = c.origin + delta,
            Path::Arc(a) => a.origin = a.origin + delta,
        }
    }

    /// Move so the path's origin lands on `origin`; a line keeps its direction and length.
    pub fn move_to(&mut self, origin: Point) {
        let delta = origin - self.origin();
        self.move_relative(delta);
    }

    pub fn clone_offset(&self, offset: Point) -> Path {
        let mut p = *self;
        if offset != Point::ZERO {
            p.move_relative(offset);
        }
        p
    }

    pub fn rotate(&mut self, angle_deg: f64, about: Point) {
        if angle_deg == 0.0 {
            return;
        }
        match self {
            Path::Line(l) => {
                l.origin = rotate(l.origin, angle_deg, about);
                l.end = rotate(l.end, angle_deg, about);
            }
            Path::Circle(c) => c.origin = rotate(c.origin, angle_deg, about),
            Path::Arc(a) => {
                a.origin = rotate(a.origin, angle_deg, about);
                a.start_angle += angle_deg;
                a.end_angle += angle_deg;
            }
        }
    }

    pub fn scale(&mut self, factor: f64) {
        match self {
            Path::Line(l) => {
                l.origin = l.origin * factor;
                l.end = l.end * factor;
            }
            Path::Circle(c) => {
                c.origin = c.origin * factor;
                c.radius *= factor;
            }
            Path::Arc(a) => {
                a.origin = a.origin * factor;
                a.radius *= factor;
            }
        }
    }

    /// Report degenerate geometry: non-finite numbers, non-positive radius,
    /// or an arc whose start and end coincide.
    pub fn validate(&self) -> Result<(), KernelError> {
        match self {
            Path::Line(l) => {
                if !l.origin.is_finite() || !l.end.is_finite() {
                    return Err(KernelError::NonFinite("line"));
                }
            }
            Path::Circle(c) => {
                if !c.origin.is_finite() || !c.radius.is_finite() {
                    return Err(KernelError::NonFinite("circle"));
                }
                if c.radius <= 0.0 {
                    return Err(KernelError::DegenerateRadius { kind: "circle", radius: c.radius });
                }
            }
            Path::Arc(a) => {
                if !a.origin.is_finite() || !a.radius.is_finite()
                    || !a.start_angle.is_finite() || !a.end_angle.is_finite()
                {
                    return Err(KernelError::NonFinite("arc"));
                }
                if a.radius <= 0.0 {
                    return Err(KernelError::DegenerateRadius { kind: "arc", radius: a.radius });
                }
                if is_zero_span_arc(a) {
                    return Err(KernelError::ZeroLengthArc { angle: a.start_angle });
                }
            }
        }
        Ok(())
    }
}

pub fn is_zero_span_arc(arc: &Arc) -> bool {
    round_default(of_arc_span(arc)) == 0.0
}

/// Circles and arcs that cannot take part in intersection math.
pub fn is_degenerate(path: &Path) -> bool {
    match path {
        Path::Line(_) => false,
        Path::Circle(c) => c.radius <= 0.0,
        Path::Arc(a) => a.radius <= 0.0 || is_zero_span_arc(a),
    }
}

pub fn path_length(path: &Path) -> f64 {
    match path {
        Path::Line(l) => distance(l.origin, l.end),
        Path::Circle(c) => std::f64::consts::TAU * c.radius,
        Path::Arc(a) => to_radians(of_arc_span(a)) * a.radius,
    }
}

pub fn point_on_circle(origin: Point, radius: f64, angle_deg: f64) -> Point {
    origin + from_polar(to_radians(angle_deg), radius)
}

pub fn arc_end_points(arc: &Arc) -> [Point; 2] {
    [
        point_on_circle(arc.origin, arc.radius, arc.start_angle),
        point_on_circle(arc.origin, arc.radius, arc.end_angle),
    ]
}

/// Absolute end points; circles have none.
pub fn end_points(path: &Path, offset: Point) -> Option<[Point; 2]> {
    match path {
        Path::Line(l) => Some([l.origin + offset, l.end + offset]),
        Path::Circle(_) => None,
        Path::Arc(a) => {
            let [s, e] = arc_end_points(a);
            Some([s + offset, e + offset])
        }
    }
}

/// Point at `ratio` (0..=1) along the path.
pub fn middle(path: &Path, ratio: f64) -> Point {
    match path {
        Path::Line(l) => l.origin + (l.end - l.origin) * ratio,
        Path::Circle(c) => point_on_circle(c.origin, c.radius, 360.0 * ratio),
        Path::Arc(a) => point_on_circle(a.origin, a.radius, of_arc_middle(a, ratio)),
    }
}

/// Whether `p` lies within the axis ranges spanned by `line`. An axis along
/// which the line has no extent is skipped; a line with no extent at all
/// contains nothing.
pub fn is_between_points(p: Point, line: &Line, exclusive: bool) -> bool {
    let axes = [
        (p.x, line.origin.x, line.end.x),
        (p.y, line.origin.y, line.end.y),
    ];
    let mut one_dimension = false;
    for (v, o, e) in axes {
        if round(o - e, AXIS_SPAN_ACCURACY) == 0.0 {
            if one_dimension {
                return false;
            }
            one_dimension = true;
            continue;
        }
        if !is_between(round_default(v), round_default(o), round_default(e), exclusive) {
            return false;
        }
    }
    true
}

/// Collinear lines share a stretch: an end point of either lies on the other,
/// or they are the same line.
pub fn is_line_overlapping(a: &Line, b: &Line, exclude_tangents: bool) -> bool {
    let check = |x: &Line, y: &Line| {
        is_between_points(y.origin, x, exclude_tangents) || is_between_points(y.end, x, exclude_tangents)
    };
    check(a, b)
        || check(b, a)
        || (is_point_equal(a.origin, b.origin, None) && is_point_equal(a.end, b.end, None))
}

/// Arcs on the same circle share a stretch of their sweeps.
pub fn is_arc_overlapping(a: &Arc, b: &Arc, exclude_tangents: bool) -> bool {
    let check = |x: &Arc, y: &Arc| {
        is_between_arc_angles(y.start_angle, x, exclude_tangents)
            || is_between_arc_angles(y.end_angle, x, exclude_tangents)
    };
    check(a, b)
        || check(b, a)
        || (is_angle_equal(a.start_angle, b.start_angle) && is_angle_equal(a.end_angle, b.end_angle))
}

/// Tolerant geometric equality of two paths placed at their offsets.
/// Lines match in either direction.
pub fn is_path_equal(a: &Path, b: &Path, within: f64, offset_a: Point, offset_b: Point) -> bool {
    let a = a.clone_offset(offset_a);
    let b = b.clone_offset(offset_b);
    let eq = |p: Point, q: Point| is_point_equal(p, q, Some(within));
    let circle_eq = |o1: Point, r1: f64, o2: Point, r2: f64| eq(o1, o2) && (r1 - r2).abs() <= within;
    match (&a, &b) {
        (Path::Line(l1), Path::Line(l2)) => {
            (eq(l1.origin, l2.origin) && eq(l1.end, l2.end))
                || (eq(l1.origin, l2.end) && eq(l1.end, l2.origin))
        }
        (Path::Circle(c1), Path::Circle(c2)) => circle_eq(c1.origin, c1.radius, c2.origin, c2.radius),
        (Path::Arc(a1), Path::Arc(a2)) => {
            circle_eq(a1.origin, a1.radius, a2.origin, a2.radius)
                && is_angle_equal(a1.start_angle, a2.start_angle)
                && is_angle_equal(a1.end_angle, a2.end_angle)
        }
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreakOutcome {
    /// The point is not strictly inside the path.
    Unchanged,
    /// A circle became a full-turn arc starting at the point.
    Converted,
    /// The path now ends at the point; the returned piece carries on from it.
    Split(Path),
}

/// Break `path` at `p`, which is assumed to lie on it.
pub fn break_at_point(path: &mut Path, p: Point) -> BreakOutcome {
    match path {
        Path::Line(l) => {
            if !is_between_points(p, l, true) {
                return BreakOutcome::Unchanged;
            }
            let rest = Line { origin: p, end: l.end };
            l.end = p;
            BreakOutcome::Split(Path::Line(rest))
        }
        Path::Circle(c) => {
            let Circle { origin, radius } = *c;
            let start = of_point_in_degrees(origin, p);
            *path = Path::Arc(Arc { origin, radius, start_angle: start, end_angle: start + 360.0, source: None });
            BreakOutcome::Converted
        }
        Path::Arc(a) => match arc_break_angle(a, of_point_in_degrees(a.origin, p)) {
            Some(at) => {
                let mut rest = *a;
                rest.start_angle = no_revolutions(at);
                rest.end_angle = no_revolutions(a.end_angle);
                a.start_angle = no_revolutions(a.start_angle);
                a.end_angle = no_revolutions(at);
                BreakOutcome::Split(Path::Arc(rest))
            }
            None => BreakOutcome::Unchanged,
        },
    }
}

fn arc_break_angle(arc: &Arc, angle: f64) -> Option<f64> {
    if is_angle_equal(angle, arc.start_angle) || is_angle_equal(angle, arc.end_angle) {
        return None;
    }
    let start = no_revolutions(arc.start_angle);
    let end = start + of_arc_end(arc) - arc.start_angle;
    [0.0, 360.0, -360.0]
        .iter()
        .map(|add| angle + add)
        .find(|a| is_between(*a, start, end, true))
        .map(|a| arc.start_angle + a - start)
}

/// Break a copy of `path` at `p`, refusing pieces that round to zero length.
/// A circle yields only its converted arc.
pub fn non_zero_segments(path: &Path, p: Point) -> Option<(Path, Option<Path>)> {
    let mut first = *path;
    match break_at_point(&mut first, p) {
        BreakOutcome::Split(second) => {
            let zero = |s: &Path| round(path_length(s), FRAGMENT_LENGTH_ACCURACY) == 0.0;
            if zero(&first) || zero(&second) {
                None
            } else {
                Some((first, Some(second)))
            }
        }
        BreakOutcome::Converted => Some((first, None)),
        BreakOutcome::Unchanged => None,
    }
}

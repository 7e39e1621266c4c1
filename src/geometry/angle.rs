// Angle arithmetic. Angles are degrees unless the name says radians.

use super::tolerance::{is_between, round_default};
use crate::model::{Arc, Line, Point};

#[inline] pub fn to_radians(deg: f64) -> f64 { deg.to_radians() }
#[inline] pub fn to_degrees(rad: f64) -> f64 { rad.to_degrees() }

/// Map any angle into [0, 360).
pub fn no_revolutions(deg: f64) -> f64 {
    let r = deg % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

/// End angle shifted up by whole turns so it is not below the start angle.
pub fn of_arc_end(arc: &Arc) -> f64 {
    if arc.end_angle < arc.start_angle {
        let revolutions = ((arc.start_angle - arc.end_angle) / 360.0).ceil();
        arc.end_angle + revolutions * 360.0
    } else {
        arc.end_angle
    }
}

/// Swept angle of an arc, in (0, 360] for a well formed arc.
pub fn of_arc_span(arc: &Arc) -> f64 {
    let span = of_arc_end(arc) - arc.start_angle;
    if round_default(span) > 360.0 { no_revolutions(span) } else { span }
}

pub fn of_arc_middle(arc: &Arc, ratio: f64) -> f64 {
    arc.start_angle + of_arc_span(arc) * ratio
}

pub fn is_angle_equal(a1: f64, a2: f64) -> bool {
    let d = no_revolutions(round_default(no_revolutions(a2) - no_revolutions(a1)));
    round_default(d) == 0.0 || round_default(d - 360.0) == 0.0
}

/// Whether `angle` falls inside the sweep of `arc`. With `exclusive` the arc's
/// own end angles are not counted.
pub fn is_between_arc_angles(angle: f64, arc: &Arc, exclusive: bool) -> bool {
    let start = no_revolutions(arc.start_angle);
    let end = start + of_arc_span(arc);
    let a = no_revolutions(angle);
    [a, a + 360.0, a - 360.0]
        .iter()
        .any(|&candidate| is_between(candidate, start, end, exclusive))
}

/// Angle of the vector from `origin` to `p`, in [0, 360).
pub fn of_point_in_degrees(origin: Point, p: Point) -> f64 {
    no_revolutions(to_degrees(of_point_in_radians(origin, p)))
}

pub fn of_point_in_radians(origin: Point, p: Point) -> f64 {
    let d = p - origin;
    let a = d.y.atan2(d.x);
    if a < 0.0 { a + std::f64::consts::TAU } else { a }
}

pub fn of_line_in_degrees(line: &Line) -> f64 {
    of_point_in_degrees(line.origin, line.end)
}

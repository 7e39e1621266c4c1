// Exact pairwise intersection of lines, circles and arcs.
// Nine type pairs reduce to three solvers: line-line, line-circle and
// circle-circle. Arcs run the circle solver and then filter by their sweep.

use super::angle::{is_between_arc_angles, no_revolutions, of_line_in_degrees, of_point_in_degrees, to_degrees};
use super::math::{distance, distance_to_infinite_line, is_point_equal, is_slope_parallel, rotate, slope_of, solve_triangle_sss, Slope};
use super::path::{is_arc_overlapping, is_between_points, is_degenerate, is_line_overlapping, point_on_circle};
use super::tolerance::{is_between, round_default, COLLINEAR_DISTANCE, PATH_EQUAL_DISTANCE};
use crate::model::{Arc, Line, Path, Point};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntersectionOptions {
    /// Ignore touching contacts: tangent circles, line endpoints on the other path.
    pub exclude_tangents: bool,
    pub path1_offset: Point,
    pub path2_offset: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathIntersection {
    pub points: Vec<Point>,
    // Angles (degrees) on circular paths, index-aligned with `points`
    pub path1_angles: Option<Vec<f64>>,
    pub path2_angles: Option<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Intersection {
    None,
    // Coincident along a stretch rather than at isolated points
    Overlap,
    Points(PathIntersection),
}

impl Intersection {
    pub fn points(&self) -> &[Point] {
        match self {
            Intersection::Points(p) => &p.points,
            _ => &[],
        }
    }

    pub fn is_overlap(&self) -> bool { matches!(self, Intersection::Overlap) }
    pub fn is_none(&self) -> bool { matches!(self, Intersection::None) }
}

#[derive(Clone, Debug, PartialEq)]
enum CircleCircle {
    Disjoint,
    Coincident,
    // [angles on the first circle, angles on the second], index-aligned
    Angles([Vec<f64>; 2]),
}

pub fn intersection(path1: &Path, path2: &Path, options: &IntersectionOptions) -> Intersection {
    if is_degenerate(path1) || is_degenerate(path2) {
        return Intersection::None;
    }
    let p1 = path1.clone_offset(options.path1_offset);
    let p2 = path2.clone_offset(options.path2_offset);
    let excl = options.exclude_tangents;
    let result = match (&p1, &p2) {
        (Path::Line(a), Path::Line(b)) => line_line(a, b, excl),
        (Path::Line(l), _) => line_curve(l, &p2, excl, false),
        (_, Path::Line(l)) => line_curve(l, &p1, excl, true),
        _ => curve_curve(&p1, &p2, excl),
    };
    log::trace!("intersection {} x {}: {:?}", path1.kind_name(), path2.kind_name(), result);
    result
}

fn line_line(a: &Line, b: &Line, exclude_tangents: bool) -> Intersection {
    let s1 = slope_of(a);
    let s2 = slope_of(b);
    if is_slope_parallel(&s1, &s2) {
        let collinear = distance_to_infinite_line(b.origin, a) <= COLLINEAR_DISTANCE
            && distance_to_infinite_line(b.end, a) <= COLLINEAR_DISTANCE;
        if collinear && is_line_overlapping(a, b, exclude_tangents) {
            return Intersection::Overlap;
        }
        return Intersection::None;
    }
    let p = match (s1, s2) {
        (Slope::Vertical { x }, Slope::Sloped { slope, y_intercept })
        | (Slope::Sloped { slope, y_intercept }, Slope::Vertical { x }) => Point::new(x, slope * x + y_intercept),
        _ => {
            let d1 = a.end - a.origin;
            let d2 = b.end - b.origin;
            let denom = d1.x * d2.y - d1.y * d2.x;
            if round_default(denom) == 0.0 {
                return Intersection::None;
            }
            let w = b.origin - a.origin;
            let t = (w.x * d2.y - w.y * d2.x) / denom;
            a.origin + d1 * t
        }
    };
    if is_between_points(p, a, exclude_tangents) && is_between_points(p, b, exclude_tangents) {
        Intersection::Points(PathIntersection { points: vec![p], path1_angles: None, path2_angles: None })
    } else {
        Intersection::None
    }
}

/// Angles on the circle (origin, radius) where the line crosses it.
fn line_circle_angles(line: &Line, origin: Point, radius: f64, exclude_tangents: bool) -> Vec<f64> {
    let normal = of_line_in_degrees(line);
    let line_angle = if normal >= 180.0 { normal - 360.0 } else { normal };
    let o = rotate(line.origin - origin, -line_angle, Point::ZERO);
    let e = rotate(line.end - origin, -line_angle, Point::ZERO);
    let unrotate = |a: f64| round_default(no_revolutions(a + line_angle));
    let in_range = |x: f64| is_between(round_default(x), round_default(o.x), round_default(e.x), exclude_tangents);

    let y = round_default(o.y);
    let r = round_default(radius);
    if round_default(y.abs() - r) == 0.0 {
        if exclude_tangents || !in_range(0.0) {
            return Vec::new();
        }
        return vec![unrotate(if y > 0.0 { 90.0 } else { 270.0 })];
    }
    if y.abs() > r {
        return Vec::new();
    }
    let rad = (y / r).asin();
    let deg = to_degrees(rad);
    let x = rad.cos() * r;
    let mut out = Vec::with_capacity(2);
    if in_range(-x) {
        out.push(unrotate(180.0 - deg));
    }
    if in_range(x) {
        out.push(unrotate(deg));
    }
    out
}

fn circle_circle(o1: Point, r1: f64, o2: Point, r2: f64, exclude_tangents: bool) -> CircleCircle {
    if r1 <= 0.0 || r2 <= 0.0 {
        return CircleCircle::Disjoint;
    }
    if round_default(r1 - r2) == 0.0 && is_point_equal(o1, o2, Some(PATH_EQUAL_DISTANCE)) {
        return CircleCircle::Coincident;
    }
    // Second center on the +x axis at distance x
    let c2_angle = of_point_in_degrees(o1, o2);
    let x = distance(o1, o2);
    if round_default(x) == 0.0 {
        return CircleCircle::Disjoint;
    }
    let unrotate = |a: f64| round_default(no_revolutions(a + c2_angle));
    let tangent = |a1: f64, a2: f64| {
        if exclude_tangents {
            CircleCircle::Disjoint
        } else {
            CircleCircle::Angles([vec![unrotate(a1)], vec![unrotate(a2)]])
        }
    };
    if round_default(r2 - x - r1) == 0.0 {
        return tangent(180.0, 180.0);
    }
    if round_default(r1 - x - r2) == 0.0 {
        return tangent(0.0, 0.0);
    }
    if round_default(x - r1 - r2) == 0.0 {
        return tangent(0.0, 180.0);
    }
    if round_default(x - r2) > r1 || round_default(x + r2) < r1 || round_default(x - r2) < -r1 {
        return CircleCircle::Disjoint;
    }
    let alpha = to_degrees(solve_triangle_sss(r2, r1, x));
    let beta = to_degrees(solve_triangle_sss(r1, r2, x));
    CircleCircle::Angles([
        vec![unrotate(alpha), unrotate(-alpha)],
        vec![unrotate(180.0 - beta), unrotate(180.0 + beta)],
    ])
}

fn circle_of(p: &Path) -> Option<(Point, f64, Option<&Arc>)> {
    match p {
        Path::Circle(c) => Some((c.origin, c.radius, None)),
        Path::Arc(a) => Some((a.origin, a.radius, Some(a))),
        Path::Line(_) => None,
    }
}

fn admitted(angle: f64, arc: Option<&Arc>, exclude_tangents: bool) -> bool {
    arc.map_or(true, |a| is_between_arc_angles(angle, a, exclude_tangents))
}

/// `curve_is_first` says whether the circle or arc was passed as path1.
fn line_curve(line: &Line, curve: &Path, exclude_tangents: bool, curve_is_first: bool) -> Intersection {
    let Some((origin, radius, arc)) = circle_of(curve) else {
        return Intersection::None;
    };
    let angles: Vec<f64> = line_circle_angles(line, origin, radius, exclude_tangents)
        .into_iter()
        .filter(|a| admitted(*a, arc, exclude_tangents))
        .collect();
    if angles.is_empty() {
        return Intersection::None;
    }
    let points = angles.iter().map(|a| point_on_circle(origin, radius, *a)).collect();
    let (path1_angles, path2_angles) = if curve_is_first { (Some(angles), None) } else { (None, Some(angles)) };
    Intersection::Points(PathIntersection { points, path1_angles, path2_angles })
}

fn curve_curve(p1: &Path, p2: &Path, exclude_tangents: bool) -> Intersection {
    let (Some((o1, r1, arc1)), Some((o2, r2, arc2))) = (circle_of(p1), circle_of(p2)) else {
        return Intersection::None;
    };
    match circle_circle(o1, r1, o2, r2, exclude_tangents) {
        CircleCircle::Disjoint => Intersection::None,
        CircleCircle::Coincident => match (arc1, arc2) {
            (Some(a), Some(b)) if !is_arc_overlapping(a, b, exclude_tangents) => Intersection::None,
            _ => Intersection::Overlap,
        },
        CircleCircle::Angles([on1, on2]) => {
            let (a1, a2): (Vec<f64>, Vec<f64>) = on1
                .into_iter()
                .zip(on2)
                .filter(|(a, b)| admitted(*a, arc1, exclude_tangents) && admitted(*b, arc2, exclude_tangents))
                .unzip();
            if a1.is_empty() {
                return Intersection::None;
            }
            let points = a1.iter().map(|a| point_on_circle(o1, r1, *a)).collect();
            Intersection::Points(PathIntersection { points, path1_angles: Some(a1), path2_angles: Some(a2) })
        }
    }
}

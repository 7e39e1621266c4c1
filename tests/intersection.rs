//! Integration tests for pairwise path intersection.

use arcline::{path_intersection, Intersection, IntersectionOptions, Path, Point};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn near(p: Point, x: f64, y: f64) -> bool {
    (p.x - x).abs() < 1e-6 && (p.y - y).abs() < 1e-6
}

#[test]
fn crossing_diagonals_meet_in_the_middle() {
    init();
    let a = Path::line((0.0, 0.0), (10.0, 10.0));
    let b = Path::line((0.0, 10.0), (10.0, 0.0));
    let r = path_intersection(&a, &b, &IntersectionOptions::default());
    assert_eq!(r.points().len(), 1);
    assert!(near(r.points()[0], 5.0, 5.0));
}

#[test]
fn argument_order_does_not_change_points() {
    init();
    let pairs = [
        (Path::line((-5.0, 0.5), (5.0, 0.5)), Path::circle((0.0, 0.0), 2.0)),
        (Path::circle((0.0, 0.0), 1.0), Path::circle((1.0, 0.0), 1.0)),
        (Path::arc((0.0, 0.0), 1.0, 0.0, 180.0), Path::line((-2.0, 0.5), (2.0, 0.5))),
    ];
    let opts = IntersectionOptions::default();
    for (a, b) in pairs {
        let ab = path_intersection(&a, &b, &opts);
        let ba = path_intersection(&b, &a, &opts);
        assert_eq!(ab.points().len(), 2, "{:?} x {:?}", a, b);
        assert_eq!(ba.points().len(), 2);
        for p in ab.points() {
            assert!(ba.points().iter().any(|q| near(*q, p.x, p.y)), "{:?} missing from {:?}", p, ba);
        }
    }
}

#[test]
fn tangent_contact_is_optional() {
    init();
    let circle = Path::circle((0.0, 0.0), 1.0);
    let line = Path::line((-5.0, 1.0), (5.0, 1.0));
    let r = path_intersection(&line, &circle, &IntersectionOptions::default());
    assert_eq!(r.points().len(), 1);
    assert!(near(r.points()[0], 0.0, 1.0));
    let excl = IntersectionOptions { exclude_tangents: true, ..Default::default() };
    assert!(path_intersection(&line, &circle, &excl).is_none());
}

#[test]
fn arc_sweep_filters_circle_hits() {
    init();
    let quarter = Path::arc((0.0, 0.0), 1.0, 0.0, 90.0);
    let chord = Path::line((0.5, -2.0), (0.5, 2.0));
    let r = path_intersection(&quarter, &chord, &IntersectionOptions::default());
    assert_eq!(r.points().len(), 1);
    assert!(near(r.points()[0], 0.5, 0.866025));
    let Intersection::Points(detail) = r else { panic!("points expected") };
    let angles = detail.path1_angles.expect("arc angles");
    assert!((angles[0] - 60.0).abs() < 1e-6);
}

#[test]
fn overlap_and_offsets() {
    init();
    let a = Path::line((0.0, 0.0), (10.0, 0.0));
    let b = Path::line((5.0, 0.0), (15.0, 0.0));
    assert!(path_intersection(&a, &b, &IntersectionOptions::default()).is_overlap());
    let lifted = IntersectionOptions { path2_offset: Point::new(0.0, 1.0), ..Default::default() };
    assert!(path_intersection(&a, &b, &lifted).is_none());
}

//! Integration tests for boolean combination of two trees.

use std::f64::consts::PI;

use arcline::algorithms::atlas::model_extents;
use arcline::algorithms::boolean::{combine_op, DeleteReason};
use arcline::algorithms::transform::model_path_length;
use arcline::{find_loops, intersection, subtraction, union, BoolOp, CombineOptions, LoopOptions, Model, Path, Point};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn square(x: f64, y: f64, size: f64) -> Model {
    Model::from_paths([
        ("b", Path::line((x, y), (x + size, y))),
        ("r", Path::line((x + size, y), (x + size, y + size))),
        ("t", Path::line((x + size, y + size), (x, y + size))),
        ("l", Path::line((x, y + size), (x, y))),
    ])
}

fn joined(a: Model, b: Model) -> Model {
    let mut both = Model::new();
    both.models.insert("a".into(), a);
    both.models.insert("b".into(), b);
    both
}

#[test]
fn union_of_offset_squares_has_expected_bounds() {
    init();
    let mut a = square(0.0, 0.0, 10.0);
    let mut b = square(5.0, 5.0, 10.0);
    union(&mut a, &mut b, &CombineOptions::default()).unwrap();
    let ext = model_extents(&joined(a, b)).unwrap();
    assert_eq!(ext.low, Point::new(0.0, 0.0));
    assert_eq!(ext.high, Point::new(15.0, 15.0));
}

#[test]
fn union_with_identical_clone_is_idempotent() {
    init();
    let mut a = square(0.0, 0.0, 10.0);
    a.models.insert("hole".into(), Model::from_paths([("c", Path::circle((5.0, 5.0), 2.0))]));
    let original = model_extents(&a).unwrap();
    let mut b = a.clone();
    let result = union(&mut a, &mut b, &CombineOptions::default()).unwrap();
    assert_eq!(a.path_count(), 5);
    assert!(b.is_empty());
    assert_eq!(result.deleted_b.len(), 5);
    assert_eq!(model_extents(&joined(a, b)), Some(original));
}

#[test]
fn overlapping_circles() {
    init();
    let circle = |x: f64| Model::from_paths([("c", Path::circle((x, 0.0), 1.0))]);

    let (mut a, mut b) = (circle(0.0), circle(1.0));
    union(&mut a, &mut b, &CombineOptions::default()).unwrap();
    assert_eq!(a.path_count(), 1);
    assert_eq!(b.path_count(), 1);
    let total = model_path_length(&a) + model_path_length(&b);
    assert!((total - 8.0 * PI / 3.0).abs() < 1e-6, "{}", total);

    let (mut a, mut b) = (circle(0.0), circle(1.0));
    intersection(&mut a, &mut b, &CombineOptions::default()).unwrap();
    let total = model_path_length(&a) + model_path_length(&b);
    assert!((total - 4.0 * PI / 3.0).abs() < 1e-6, "{}", total);
}

#[test]
fn circle_bite_out_of_square() {
    init();
    let mut a = square(0.0, 0.0, 10.0);
    let mut b = Model::from_paths([("c", Path::circle((10.0, 5.0), 3.0))]);
    let result = subtraction(&mut a, &mut b, &CombineOptions::default()).unwrap();

    assert_eq!(result.deleted_a.len(), 1);
    assert!(matches!(result.deleted_a[0].reason, DeleteReason::Inside { .. }));
    assert_eq!(result.deleted_a[0].route.path.as_deref(), Some("r"));
    assert_eq!(result.deleted_b.len(), 1);
    assert!(matches!(result.deleted_b[0].reason, DeleteReason::Outside { .. }));

    let expected = 34.0 + 3.0 * PI;
    let both = joined(a, b);
    assert!((model_path_length(&both) - expected).abs() < 1e-6);
    let loops = find_loops(&both, &LoopOptions::default()).unwrap();
    assert_eq!(loops.len(), 1);
    assert!((loops.loops[0].path_length - expected).abs() < 1e-6);
}

#[test]
fn runtime_operation_choice_matches_named_function() {
    init();
    for op in [BoolOp::Union, BoolOp::Intersection, BoolOp::Subtraction] {
        let (mut a1, mut b1) = (square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0));
        let (mut a2, mut b2) = (a1.clone(), b1.clone());
        combine_op(&mut a1, &mut b1, op, &CombineOptions::default()).unwrap();
        match op {
            BoolOp::Union => union(&mut a2, &mut b2, &CombineOptions::default()),
            BoolOp::Intersection => intersection(&mut a2, &mut b2, &CombineOptions::default()),
            BoolOp::Subtraction => subtraction(&mut a2, &mut b2, &CombineOptions::default()),
        }
        .unwrap();
        assert_eq!((a1, b1), (a2, b2), "{:?}", op);
    }
}

#[test]
fn without_trimming_dangling_fragments_stay() {
    init();
    let mut a = square(0.0, 0.0, 10.0);
    let mut b = square(10.0, 0.0, 10.0);
    let opts = CombineOptions { trim_dead_ends: false, ..Default::default() };
    let result = union(&mut a, &mut b, &opts).unwrap();
    assert!(a.paths.contains_key("r"));
    assert!(!b.paths.contains_key("l"));
    assert!(result.deleted_a.is_empty());
    assert_eq!(result.deleted_b.len(), 1);
    assert_eq!(result.deleted_b[0].reason, DeleteReason::Duplicate);
}

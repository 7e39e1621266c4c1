//! Breaking one tree's paths wherever they cross the paths of another tree
//! (or of itself).
//!
//! Work happens in two phases. The read-only phase walks both trees and
//! produces a [`CrossedPath`] per path: the path's fragments in absolute
//! coordinates plus flags the boolean combine needs. The write phase (here,
//! or in [`super::boolean`]) replaces originals by their fragments through
//! the recorded routes.

use super::atlas::{path_extents, Atlas, Measurement};
use super::inside::{is_point_inside_model, InsideOptions};
use super::walk::{collect_paths, walk, Visitor, WalkedModel, WalkedPath};
use crate::error::KernelError;
use crate::geometry::intersect::{intersection, Intersection, IntersectionOptions};
use crate::geometry::path::{end_points, is_degenerate, is_path_equal, middle, non_zero_segments};
use crate::geometry::tolerance::PATH_EQUAL_DISTANCE;
use crate::model::{Model, Path, Point, Route, RouteKey};

/// A fragment of a crossed path, in absolute coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub absolute_path: Path,
    /// Coincides with a stretch of some foreign path.
    pub overlapped: bool,
    /// Geometrically equal to a fragment of the other tree.
    pub duplicate: bool,
    pub is_inside: bool,
    /// Ray crossings found while classifying the fragment.
    pub crossings: Vec<Point>,
}

impl Segment {
    fn new(absolute_path: Path) -> Self {
        Segment { absolute_path, overlapped: false, duplicate: false, is_inside: false, crossings: Vec::new() }
    }
}

#[derive(Clone, Debug)]
pub struct CrossedPath {
    pub route: Route,
    pub route_key: RouteKey,
    pub path_id: String,
    pub offset: Point,
    pub original: Path,
    /// Set only when a split or circle conversion actually happened.
    pub broken: bool,
    pub segments: Vec<Segment>,
}

impl CrossedPath {
    /// Fragment moved back into the frame of the model that owns the path.
    pub fn local_fragment(&self, segment: &Segment) -> Path {
        if self.broken {
            segment.absolute_path.clone_offset(-self.offset)
        } else {
            self.original
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentRef {
    pub path: usize,
    pub segment: usize,
}

#[derive(Clone, Debug, Default)]
pub struct BrokenPaths {
    pub crossed_paths: Vec<CrossedPath>,
    pub overlapped_segments: Vec<SegmentRef>,
}

impl BrokenPaths {
    pub fn segment(&self, r: SegmentRef) -> &Segment {
        &self.crossed_paths[r.path].segments[r.segment]
    }

    fn segment_mut(&mut self, r: SegmentRef) -> &mut Segment {
        &mut self.crossed_paths[r.path].segments[r.segment]
    }
}

/// Break every path of `model_to_break` against `model_to_intersect` without
/// touching either tree. With `same_tree` a path is never broken against
/// itself. When `classify_far_point` is given, each fragment is classified as
/// inside or outside `model_to_intersect` by casting a ray to that point.
pub fn break_all_paths_at_intersections(
    model_to_break: &Model,
    model_to_intersect: &Model,
    same_tree: bool,
    break_atlas: &Atlas,
    intersect_atlas: &Atlas,
    classify_far_point: Option<Point>,
) -> BrokenPaths {
    let mut out = BrokenPaths::default();
    for walked in collect_paths(model_to_break) {
        if is_degenerate(walked.path) {
            log::warn!("degenerate {} at {} is not broken", walked.path.kind_name(), walked.route_key);
        }
        let index = out.crossed_paths.len();
        let mut crossed = CrossedPath {
            route: walked.route.clone(),
            route_key: walked.route_key.clone(),
            path_id: walked.path_id.to_string(),
            offset: walked.offset,
            original: *walked.path,
            broken: false,
            segments: vec![Segment::new(walked.path.clone_offset(walked.offset))],
        };
        let this_box = break_atlas
            .path_measurement(&walked.route_key)
            .copied()
            .unwrap_or_else(|| path_extents(walked.path, walked.offset));
        let mut breaker = ForeignBreaker {
            crossed: &mut crossed,
            overlapped: &mut out.overlapped_segments,
            index,
            this_box,
            atlas: intersect_atlas,
            skip: same_tree.then_some(&walked.route_key),
        };
        walk(model_to_intersect, &mut breaker);

        if let Some(far_point) = classify_far_point {
            let opts = InsideOptions { far_point: Some(far_point), atlas: Some(intersect_atlas) };
            for seg in crossed.segments.iter_mut() {
                let mid = middle(&seg.absolute_path, 0.5);
                let c = is_point_inside_model(mid, model_to_intersect, &opts);
                seg.is_inside = c.inside;
                seg.crossings = c.crossings;
            }
        }
        if crossed.broken {
            log::trace!("{} broken into {} fragments", crossed.route_key, crossed.segments.len());
        }
        out.crossed_paths.push(crossed);
    }
    out
}

struct ForeignBreaker<'c, 'k> {
    crossed: &'c mut CrossedPath,
    overlapped: &'c mut Vec<SegmentRef>,
    index: usize,
    this_box: Measurement,
    atlas: &'c Atlas,
    skip: Option<&'k RouteKey>,
}

impl<'a, 'c, 'k> Visitor<'a> for ForeignBreaker<'c, 'k> {
    fn on_path(&mut self, foreign: WalkedPath<'a>) {
        if self.skip == Some(&foreign.route_key) {
            return;
        }
        if let Some(m) = self.atlas.path_measurement(&foreign.route_key) {
            if !m.is_overlapping(&self.this_box) {
                return;
            }
        }
        break_along_foreign_path(self.crossed, self.overlapped, self.index, &foreign);
    }

    fn before_child_walk(&mut self, walked: &WalkedModel<'a>) -> bool {
        self.atlas
            .model_measurement(&walked.route_key)
            .is_some_and(|m| m.is_overlapping(&self.this_box))
    }
}

fn mark_overlapped(crossed: &mut CrossedPath, overlapped: &mut Vec<SegmentRef>, path: usize, segment: usize) {
    let seg = &mut crossed.segments[segment];
    if !seg.overlapped {
        seg.overlapped = true;
        overlapped.push(SegmentRef { path, segment });
    }
}

fn break_along_foreign_path(
    crossed: &mut CrossedPath,
    overlapped: &mut Vec<SegmentRef>,
    index: usize,
    foreign: &WalkedPath<'_>,
) {
    if is_path_equal(&crossed.segments[0].absolute_path, foreign.path, PATH_EQUAL_DISTANCE, Point::ZERO, foreign.offset) {
        mark_overlapped(crossed, overlapped, index, 0);
        crossed.segments[0].duplicate = true;
        return;
    }
    let opts = IntersectionOptions { path2_offset: foreign.offset, ..Default::default() };
    let mut i = 0;
    while i < crossed.segments.len() {
        let candidates = match intersection(&crossed.segments[i].absolute_path, foreign.path, &opts) {
            Intersection::Points(r) => r.points,
            Intersection::Overlap => {
                mark_overlapped(crossed, overlapped, index, i);
                end_points(foreign.path, foreign.offset).map(|e| e.to_vec()).unwrap_or_default()
            }
            Intersection::None => Vec::new(),
        };
        let current = crossed.segments[i].absolute_path;
        match candidates.iter().find_map(|p| non_zero_segments(&current, *p)) {
            Some((first, second)) => {
                crossed.broken = true;
                crossed.segments[i].absolute_path = first;
                if let Some(second) = second {
                    let was_overlapped = crossed.segments[i].overlapped;
                    crossed.segments.push(Segment { overlapped: was_overlapped, ..Segment::new(second) });
                    if was_overlapped {
                        overlapped.push(SegmentRef { path: index, segment: crossed.segments.len() - 1 });
                    }
                }
                // same index again: the shortened fragment may cross the foreign path once more
            }
            None => i += 1,
        }
    }
}

/// Mark overlapped fragments of A and B that are the same curve as duplicates on both sides.
pub fn check_for_equal_overlaps(a: &mut BrokenPaths, b: &mut BrokenPaths, point_matching_distance: f64) {
    let mut pairs = Vec::new();
    for &ra in &a.overlapped_segments {
        for &rb in &b.overlapped_segments {
            if is_path_equal(
                &a.segment(ra).absolute_path,
                &b.segment(rb).absolute_path,
                point_matching_distance,
                Point::ZERO,
                Point::ZERO,
            ) {
                pairs.push((ra, rb));
            }
        }
    }
    for (ra, rb) in pairs {
        a.segment_mut(ra).duplicate = true;
        b.segment_mut(rb).duplicate = true;
    }
}

/// Break the paths of `model_to_break` at every crossing with
/// `model_to_intersect`, or with its own other paths when that is `None`.
/// Broken paths are replaced by their fragments under ids derived from the
/// original id. Returns how many paths were broken.
pub fn break_paths_at_intersections(
    model_to_break: &mut Model,
    model_to_intersect: Option<&Model>,
) -> Result<usize, KernelError> {
    let mut break_atlas = Atlas::new();
    break_atlas.measure_models(model_to_break);
    let broken = match model_to_intersect {
        Some(other) => {
            let mut other_atlas = Atlas::new();
            other_atlas.measure_models(other);
            break_all_paths_at_intersections(model_to_break, other, false, &break_atlas, &other_atlas, None)
        }
        None => break_all_paths_at_intersections(model_to_break, model_to_break, true, &break_atlas, &break_atlas, None),
    };

    let mut count = 0;
    for crossed in broken.crossed_paths.iter().filter(|c| c.broken) {
        let parent = model_to_break
            .model_at_mut(&crossed.route.models)
            .ok_or_else(|| KernelError::RouteNotFound(crossed.route_key.clone()))?;
        parent.paths.remove(&crossed.path_id);
        for seg in &crossed.segments {
            parent.add_path(&crossed.path_id, crossed.local_fragment(seg));
        }
        count += 1;
    }
    log::debug!("break_paths_at_intersections: {} of {} paths broken", count, broken.crossed_paths.len());
    Ok(count)
}

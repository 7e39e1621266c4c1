//! Boolean combination of two model trees.
//!
//! This module implements union, intersection and subtraction by:
//! 1. Breaking the paths of each tree wherever they cross the other tree
//! 2. Classifying each fragment as inside or outside the other tree
//! 3. Marking fragments that both trees share as duplicates
//! 4. Replacing every original path by the fragments its side keeps
//! 5. Optionally pruning the dead ends left behind
//!
//! Both trees are modified in place. Clone them first to keep the originals.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::atlas::{path_extents, Atlas, Measurement};
use super::breaking::{break_all_paths_at_intersections, check_for_equal_overlaps, BrokenPaths};
use super::dead_ends::{remove_dead_ends, DeadEndOptions};
use super::inside::DEFAULT_FAR_POINT;
use super::walk::WalkedPath;
use crate::error::{check_tolerance, KernelError};
use crate::geometry::tolerance::POINT_MATCHING_DISTANCE;
use crate::model::{Model, Path, Point, Route, RouteKey};

/// Boolean operation type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    /// Areas in A or B or both
    Union,
    /// Areas in both A and B
    Intersection,
    /// Areas in A but not in B
    Subtraction,
}

impl BoolOp {
    /// `(a_inside_b, a_outside_b, b_inside_a, b_outside_a)`
    pub fn keep_flags(self) -> (bool, bool, bool, bool) {
        match self {
            BoolOp::Union => (false, true, false, true),
            BoolOp::Intersection => (true, false, true, false),
            BoolOp::Subtraction => (false, true, true, false),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineOptions {
    pub point_matching_distance: f64,
    pub trim_dead_ends: bool,
    /// Ray target for inside/outside tests. Defaults to just beyond the
    /// combined extents of both trees.
    pub far_point: Option<Point>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        CombineOptions { point_matching_distance: POINT_MATCHING_DISTANCE, trim_dead_ends: true, far_point: None }
    }
}

impl CombineOptions {
    pub fn validate(&self) -> Result<(), KernelError> {
        check_tolerance("point_matching_distance", self.point_matching_distance)?;
        match self.far_point {
            Some(p) if !p.is_finite() => Err(KernelError::NonFinite("far_point")),
            _ => Ok(()),
        }
    }
}

/// Why a fragment was taken out of its tree.
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteReason {
    /// Inside the other tree; `crossings` are where its ray crossed that tree.
    Inside { crossings: Vec<Point> },
    Outside { crossings: Vec<Point> },
    /// Shared with tree A, which keeps the only copy.
    Duplicate,
    DeadEnd,
}

impl DeleteReason {
    pub fn label(&self) -> &'static str {
        match self {
            DeleteReason::Inside { .. } => "inside",
            DeleteReason::Outside { .. } => "outside",
            DeleteReason::Duplicate => "duplicate",
            DeleteReason::DeadEnd => "dead_end",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeletedFragment {
    /// Route of the path the fragment came from, relative to its own tree.
    pub route: Route,
    /// Absolute coordinates.
    pub path: Path,
    pub reason: DeleteReason,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombineResult {
    pub deleted_a: Vec<DeletedFragment>,
    pub deleted_b: Vec<DeletedFragment>,
    /// Boxes of both trees after the combine, `None` for an emptied tree.
    pub extents_a: Option<Measurement>,
    pub extents_b: Option<Measurement>,
}

impl CombineResult {
    /// Deleted fragments of one side as a model, one child per reason
    /// (`inside`, `outside`, `duplicate`, `dead_end`).
    pub fn deleted_model(deleted: &[DeletedFragment]) -> Model {
        let mut out = Model::new();
        for d in deleted {
            let group = out.models.entry(d.reason.label().to_string()).or_default();
            let id = d.route.path.as_deref().unwrap_or("path");
            group.add_path(id, d.path);
        }
        out
    }
}

pub fn union(a: &mut Model, b: &mut Model, options: &CombineOptions) -> Result<CombineResult, KernelError> {
    combine_op(a, b, BoolOp::Union, options)
}

pub fn intersection(a: &mut Model, b: &mut Model, options: &CombineOptions) -> Result<CombineResult, KernelError> {
    combine_op(a, b, BoolOp::Intersection, options)
}

/// A minus B.
pub fn subtraction(a: &mut Model, b: &mut Model, options: &CombineOptions) -> Result<CombineResult, KernelError> {
    combine_op(a, b, BoolOp::Subtraction, options)
}

pub fn combine_op(a: &mut Model, b: &mut Model, op: BoolOp, options: &CombineOptions) -> Result<CombineResult, KernelError> {
    let (a_inside_b, a_outside_b, b_inside_a, b_outside_a) = op.keep_flags();
    combine(a, b, a_inside_b, a_outside_b, b_inside_a, b_outside_a, options)
}

/// Break A and B against each other and keep, per side, the fragments the
/// four flags ask for. Fragments shared by both trees survive once, in A.
pub fn combine(
    a: &mut Model,
    b: &mut Model,
    a_inside_b: bool,
    a_outside_b: bool,
    b_inside_a: bool,
    b_outside_a: bool,
    options: &CombineOptions,
) -> Result<CombineResult, KernelError> {
    options.validate()?;

    let mut atlas_a = Atlas::new();
    atlas_a.measure_models(a);
    let mut atlas_b = Atlas::new();
    atlas_b.measure_models(b);
    let far_point = options.far_point.unwrap_or_else(|| default_far_point(&atlas_a, &atlas_b));

    let mut paths_a = break_all_paths_at_intersections(a, b, false, &atlas_a, &atlas_b, Some(far_point));
    let mut paths_b = break_all_paths_at_intersections(b, a, false, &atlas_b, &atlas_a, Some(far_point));
    check_for_equal_overlaps(&mut paths_a, &mut paths_b, options.point_matching_distance);

    let mut result = CombineResult::default();
    let kept_duplicates =
        add_or_delete_segments(a, &paths_a, a_inside_b, a_outside_b, true, &mut atlas_a, &mut result.deleted_a)?;
    add_or_delete_segments(b, &paths_b, b_inside_a, b_outside_a, false, &mut atlas_b, &mut result.deleted_b)?;
    log::debug!(
        "combine: A {} paths -> {} deleted, B {} paths -> {} deleted",
        paths_a.crossed_paths.len(),
        result.deleted_a.len(),
        paths_b.crossed_paths.len(),
        result.deleted_b.len()
    );

    if options.trim_dead_ends {
        // A shared boundary of a union runs between the two outlines: both
        // sides are outside, so A's copy of it must go at odd junctions.
        let is_union = !a_inside_b && !b_inside_a;
        let shared: BTreeSet<RouteKey> = kept_duplicates.iter().map(|r| r.prefixed("a").key()).collect();
        let keep_fn = |w: &WalkedPath<'_>| !shared.contains(&w.route_key);
        let keep: Option<&dyn Fn(&WalkedPath<'_>) -> bool> = if is_union { Some(&keep_fn) } else { None };

        let mut both = Model::new();
        both.models.insert("a".into(), std::mem::take(a));
        both.models.insert("b".into(), std::mem::take(b));
        let report = remove_dead_ends(&mut both, &DeadEndOptions { point_matching_distance: options.point_matching_distance }, keep);
        *a = both.models.remove("a").unwrap_or_default();
        *b = both.models.remove("b").unwrap_or_default();

        for dead in report?.removed {
            let Some((side, models)) = dead.route.models.split_first() else { continue };
            let fragment = DeletedFragment {
                route: Route { models: models.to_vec(), path: dead.route.path.clone() },
                path: dead.path.clone_offset(dead.offset),
                reason: DeleteReason::DeadEnd,
            };
            if side == "a" {
                atlas_a.invalidate(&fragment.route);
                result.deleted_a.push(fragment);
            } else {
                atlas_b.invalidate(&fragment.route);
                result.deleted_b.push(fragment);
            }
        }
    }

    atlas_a.ensure_measured(a);
    atlas_b.ensure_measured(b);
    result.extents_a = atlas_a.root_extents().copied();
    result.extents_b = atlas_b.root_extents().copied();
    Ok(result)
}

fn default_far_point(a: &Atlas, b: &Atlas) -> Point {
    let mut extents: Option<Measurement> = None;
    for m in [a.root_extents(), b.root_extents()].into_iter().flatten() {
        match extents.as_mut() {
            Some(e) => e.increase(m),
            None => extents = Some(*m),
        }
    }
    extents.map_or(DEFAULT_FAR_POINT, |e| e.high + Point::new(1.0, 1.0))
}

/// Swap each original path for the fragments its side keeps, registering the
/// new boxes in `atlas`. Returns the routes of the duplicate fragments that
/// were kept.
fn add_or_delete_segments(
    model: &mut Model,
    broken: &BrokenPaths,
    include_inside: bool,
    include_outside: bool,
    keep_duplicates: bool,
    atlas: &mut Atlas,
    deleted: &mut Vec<DeletedFragment>,
) -> Result<Vec<Route>, KernelError> {
    let mut kept_duplicates = Vec::new();
    for crossed in &broken.crossed_paths {
        let parent = model
            .model_at_mut(&crossed.route.models)
            .ok_or_else(|| KernelError::RouteNotFound(crossed.route_key.clone()))?;
        parent.paths.remove(&crossed.path_id);
        atlas.remove_path(&crossed.route_key);
        for seg in &crossed.segments {
            let keep = if seg.duplicate {
                keep_duplicates
            } else if seg.is_inside {
                include_inside
            } else {
                include_outside
            };
            if keep {
                let id = parent.add_path(&crossed.path_id, crossed.local_fragment(seg));
                let route = Route { models: crossed.route.models.clone(), path: Some(id) };
                atlas.set_path_measurement(route.key(), path_extents(&seg.absolute_path, Point::ZERO));
                if seg.duplicate {
                    kept_duplicates.push(route);
                }
                continue;
            }
            let reason = if seg.duplicate {
                DeleteReason::Duplicate
            } else if seg.is_inside {
                DeleteReason::Inside { crossings: seg.crossings.clone() }
            } else {
                DeleteReason::Outside { crossings: seg.crossings.clone() }
            };
            deleted.push(DeletedFragment { route: crossed.route.clone(), path: seg.absolute_path, reason });
        }
    }
    Ok(kept_duplicates)
}

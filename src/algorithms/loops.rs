//! Closed loops and their nesting.
//!
//! Loops are the endless chains of an originated copy of the input. Each loop
//! becomes a flat model of absolute paths, ranked by how many other loops
//! contain it: depth 0 is outermost.

use serde::{Deserialize, Serialize};

use super::atlas::{model_extents, Measurement};
use super::chains::{find_all_chains, ChainOptions};
use super::inside::{is_point_inside_model, InsideOptions};
use super::transform::originate;
use crate::error::{check_tolerance, KernelError};
use crate::geometry::path::middle;
use crate::model::{Model, Point, Route, RouteKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopOptions {
    pub point_matching_distance: f64,
}

impl Default for LoopOptions {
    fn default() -> Self {
        LoopOptions { point_matching_distance: crate::geometry::tolerance::POINT_MATCHING_DISTANCE }
    }
}

impl LoopOptions {
    pub fn validate(&self) -> Result<(), KernelError> {
        check_tolerance("point_matching_distance", self.point_matching_distance)
    }
}

#[derive(Clone, Debug)]
pub struct Loop {
    pub model: Model,
    /// Number of other loops containing this one.
    pub depth: usize,
    pub extents: Measurement,
    pub path_length: f64,
    /// Routes of the source paths, in loop order.
    pub routes: Vec<Route>,
}

#[derive(Clone, Debug, Default)]
pub struct Loops {
    pub loops: Vec<Loop>,
}

impl Loops {
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.loops.iter().map(|l| l.depth).max()
    }

    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = &Loop> {
        self.loops.iter().filter(move |l| l.depth == depth)
    }

    pub fn route_keys(&self) -> Vec<RouteKey> {
        self.loops.iter().flat_map(|l| l.routes.iter().map(Route::key)).collect()
    }

    /// Loops grouped by depth: `models["0"].models["loop_0"]`, ...
    pub fn to_model(&self) -> Model {
        let mut out = Model::new();
        for l in &self.loops {
            let group = out.models.entry(l.depth.to_string()).or_default();
            let id = format!("loop_{}", group.models.len());
            group.models.insert(id, l.model.clone());
        }
        out
    }
}

/// Find the closed loops of `model` without changing it.
pub fn find_loops(model: &Model, options: &LoopOptions) -> Result<Loops, KernelError> {
    options.validate()?;
    let mut flat = model.clone();
    originate(&mut flat, Point::ZERO);
    let chain_opts = ChainOptions { point_matching_distance: options.point_matching_distance, by_layers: false };
    let found = find_all_chains(&flat, &chain_opts)?;

    let mut loops = Vec::new();
    for chain in found.chains.iter().filter(|c| c.endless) {
        let loop_model = chain.to_model();
        let Some(extents) = model_extents(&loop_model) else { continue };
        loops.push(Loop {
            model: loop_model,
            depth: 0,
            extents,
            path_length: chain.path_length,
            routes: chain.links.iter().map(|l| l.walked_path.route.clone()).collect(),
        });
    }
    let open = found.chains.iter().filter(|c| !c.endless).count();
    if open > 0 || !found.loose.is_empty() {
        log::debug!("find_loops: ignoring {} open chains and {} loose links", open, found.loose.len());
    }

    // Depth: how many other loops contain a point on this loop.
    let probes: Vec<Point> = loops
        .iter()
        .map(|l| l.model.paths.values().next().map_or(l.extents.center(), |p| middle(p, 0.5)))
        .collect();
    for i in 0..loops.len() {
        let mut depth = 0;
        for j in 0..loops.len() {
            if i == j || !loops[j].extents.contains_point(probes[i]) {
                continue;
            }
            let far = loops[j].extents.high + Point::new(1.0, 1.0);
            let opts = InsideOptions { far_point: Some(far), atlas: None };
            if is_point_inside_model(probes[i], &loops[j].model, &opts).inside {
                depth += 1;
            }
        }
        loops[i].depth = depth;
    }
    log::debug!("find_loops: {} loops", loops.len());
    Ok(Loops { loops })
}

/// Like [`find_loops`], then delete the paths used by the loops from `model`.
pub fn extract_loops(model: &mut Model, options: &LoopOptions) -> Result<Loops, KernelError> {
    let loops = find_loops(model, options)?;
    for l in &loops.loops {
        for route in &l.routes {
            model.remove_path_at(route)?;
        }
    }
    Ok(loops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Path;

    fn square(x: f64, y: f64, size: f64) -> Model {
        Model::from_paths([
            ("b", Path::line((x, y), (x + size, y))),
            ("r", Path::line((x + size, y), (x + size, y + size))),
            ("t", Path::line((x + size, y + size), (x, y + size))),
            ("l", Path::line((x, y + size), (x, y))),
        ])
    }

    #[test]
    fn nested_squares_rank_by_depth() {
        let mut root = Model::new();
        root.models.insert("outer".into(), square(0.0, 0.0, 30.0));
        root.models.insert("mid".into(), square(5.0, 5.0, 20.0));
        root.models.insert("inner".into(), square(2.0, 2.0, 6.0).with_origin((8.0, 8.0)));
        root.models.insert("beside".into(), square(50.0, 0.0, 5.0));
        let loops = find_loops(&root, &LoopOptions::default()).unwrap();
        assert_eq!(loops.len(), 4);
        let mut depths: Vec<usize> = loops.loops.iter().map(|l| l.depth).collect();
        depths.sort();
        assert_eq!(depths, [0, 0, 1, 2]);
        assert_eq!(loops.max_depth(), Some(2));
        let grouped = loops.to_model();
        assert_eq!(grouped.models["0"].models.len(), 2);
        assert!(grouped.models["2"].models.contains_key("loop_0"));
        let inner = loops.at_depth(2).next().unwrap();
        assert_eq!(inner.extents.low, Point::new(10.0, 10.0));
    }

    #[test]
    fn circle_is_a_loop_and_dangling_line_is_not() {
        let m = Model::from_paths([
            ("c", Path::circle((0.0, 0.0), 3.0)),
            ("dangling", Path::line((10.0, 0.0), (20.0, 0.0))),
        ]);
        let loops = find_loops(&m, &LoopOptions::default()).unwrap();
        assert_eq!(loops.len(), 1);
        assert!((loops.loops[0].path_length - 6.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn extract_removes_loop_paths() {
        let mut m = square(0.0, 0.0, 1.0);
        m.paths.insert("extra".into(), Path::line((5.0, 5.0), (6.0, 6.0)));
        let loops = extract_loops(&mut m, &LoopOptions::default()).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(m.paths.keys().collect::<Vec<_>>(), ["extra"]);
        assert_eq!(loops.route_keys().len(), 4);
    }
}

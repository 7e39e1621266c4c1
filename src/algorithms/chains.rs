// Chain finding: join paths whose end points meet (within tolerance) into
// ordered sequences, closed or open.
//
// Every non-circular path k contributes two links: 2k sits at its first end
// point and walks forward, 2k+1 sits at its second end point and walks
// backward. Following a link consumes it and its twin, and lands in the
// twin's bucket.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::collector::{point_collector, Collector};
use super::walk::{walk_paths, WalkedPath};
use crate::error::{check_tolerance, KernelError};
use crate::geometry::angle::of_arc_span;
use crate::geometry::path::{end_points, is_degenerate, middle, path_length, point_on_circle};
use crate::geometry::tolerance::{round_default, POINT_MATCHING_DISTANCE};
use crate::model::{Model, Path, Point, RouteKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainOptions {
    pub point_matching_distance: f64,
    /// Build separate chains per effective layer.
    pub by_layers: bool,
}

impl Default for ChainOptions {
    fn default() -> Self {
        ChainOptions { point_matching_distance: POINT_MATCHING_DISTANCE, by_layers: false }
    }
}

impl ChainOptions {
    pub fn validate(&self) -> Result<(), KernelError> {
        check_tolerance("point_matching_distance", self.point_matching_distance)
    }
}

#[derive(Clone, Debug)]
pub struct Link<'a> {
    pub walked_path: WalkedPath<'a>,
    /// Traversed from `end_points[1]` to `end_points[0]`.
    pub reversed: bool,
    /// Absolute end points; both are the same point for circles.
    pub end_points: [Point; 2],
    pub path_length: f64,
}

impl<'a> Link<'a> {
    pub fn leading_point(&self) -> Point {
        self.end_points[self.reversed as usize]
    }

    pub fn trailing_point(&self) -> Point {
        self.end_points[!self.reversed as usize]
    }
}

#[derive(Clone, Debug)]
pub struct Chain<'a> {
    pub links: Vec<Link<'a>>,
    pub endless: bool,
    pub path_length: f64,
}

impl<'a> Chain<'a> {
    fn from_links(links: Vec<Link<'a>>, endless: bool) -> Self {
        let path_length = links.iter().map(|l| l.path_length).sum();
        Chain { links, endless, path_length }
    }

    /// Walk the chain the other way round.
    pub fn reverse(&mut self) {
        self.links.reverse();
        for l in self.links.iter_mut() {
            l.reversed = !l.reversed;
        }
    }

    /// Rotate an endless chain so it starts with the path at `key`.
    /// Returns false for open chains or unknown keys.
    pub fn start_at(&mut self, key: &RouteKey) -> bool {
        if !self.endless {
            return false;
        }
        match self.links.iter().position(|l| &l.walked_path.route_key == key) {
            Some(i) => {
                self.links.rotate_left(i);
                true
            }
            None => false,
        }
    }

    pub fn route_keys(&self) -> Vec<&RouteKey> {
        self.links.iter().map(|l| &l.walked_path.route_key).collect()
    }

    /// Vertices in walking order. Curves are subdivided so no chord spans
    /// more than `max_arc_facet`. Open chains end with their last point.
    pub fn to_key_points(&self, max_arc_facet: f64) -> Vec<Point> {
        let mut pts = Vec::new();
        for link in &self.links {
            let p = link.walked_path.path.clone_offset(link.walked_path.offset);
            pts.push(link.leading_point());
            if matches!(p, Path::Line(_)) || max_arc_facet <= 0.0 {
                continue;
            }
            let steps = (link.path_length / max_arc_facet).ceil().max(1.0) as usize;
            for s in 1..steps {
                let t = s as f64 / steps as f64;
                pts.push(middle(&p, if link.reversed { 1.0 - t } else { t }));
            }
        }
        if !self.endless {
            if let Some(last) = self.links.last() {
                pts.push(last.trailing_point());
            }
        }
        pts
    }

    /// The chain's paths as a flat model in absolute coordinates, keyed by position.
    pub fn to_model(&self) -> Model {
        Model::from_paths(
            self.links
                .iter()
                .enumerate()
                .map(|(i, l)| (i.to_string(), l.walked_path.path.clone_offset(l.walked_path.offset))),
        )
    }
}

/// Chains of one layer, plus links that joined nothing.
#[derive(Clone, Debug, Default)]
pub struct LayerChains<'a> {
    pub chains: Vec<Chain<'a>>,
    pub loose: Vec<Link<'a>>,
}

#[derive(Default)]
struct Graph<'a> {
    links: Vec<Link<'a>>,
    bucket_of: Vec<usize>,
    out: LayerChains<'a>,
}

fn is_full_turn(path: &Path) -> bool {
    match path {
        Path::Circle(_) => true,
        Path::Arc(a) => round_default(of_arc_span(a) - 360.0) == 0.0,
        Path::Line(_) => false,
    }
}

/// Find chains in `model`. Without `by_layers` everything lands under the
/// empty layer name.
pub fn find_chains<'a>(
    model: &'a Model,
    options: &ChainOptions,
) -> Result<BTreeMap<String, LayerChains<'a>>, KernelError> {
    options.validate()?;
    let pmd = options.point_matching_distance;
    let mut graphs: BTreeMap<String, Graph<'a>> = BTreeMap::new();

    walk_paths(model, |walked| {
        if is_degenerate(walked.path) {
            log::warn!("skipping degenerate {} at {}", walked.path.kind_name(), walked.route_key);
            return;
        }
        let len = path_length(walked.path);
        if len < pmd / 5.0 {
            return;
        }
        let layer = if options.by_layers { walked.layer.unwrap_or_default().to_string() } else { String::new() };
        let g = graphs.entry(layer).or_default();
        if is_full_turn(walked.path) {
            let p = match walked.path {
                Path::Circle(c) => point_on_circle(c.origin, c.radius, 0.0),
                Path::Arc(a) => point_on_circle(a.origin, a.radius, a.start_angle),
                Path::Line(l) => l.origin,
            } + walked.offset;
            let link = Link { walked_path: walked, reversed: false, end_points: [p, p], path_length: len };
            g.out.chains.push(Chain::from_links(vec![link], true));
            return;
        }
        let Some(ends) = end_points(walked.path, walked.offset) else { return };
        for reversed in [false, true] {
            g.links.push(Link { walked_path: walked.clone(), reversed, end_points: ends, path_length: len });
        }
    });

    let mut result = BTreeMap::new();
    for (layer, g) in graphs {
        let found = follow_links(g, pmd);
        log::debug!(
            "find_chains layer '{}': {} chains, {} loose links",
            layer,
            found.chains.len(),
            found.loose.len()
        );
        result.insert(layer, found);
    }
    Ok(result)
}

fn follow_links<'a>(mut g: Graph<'a>, pmd: f64) -> LayerChains<'a> {
    let mut buckets = point_collector::<usize>(pmd);
    for (i, link) in g.links.iter().enumerate() {
        // link 2k sits at end point 0, link 2k+1 at end point 1
        let b = buckets.add_item_to_collection(link.end_points[i % 2], i);
        g.bucket_of.push(b);
    }

    let consume = |buckets: &mut Collector<Point, usize>, l: usize| {
        buckets.remove_item_from_collection(g.bucket_of[l], |&x| x == l);
        buckets.remove_item_from_collection(g.bucket_of[l ^ 1], |&x| x == (l ^ 1));
    };
    let first_at = |buckets: &Collector<Point, usize>, b: usize| {
        buckets.collection(b).and_then(|c| c.items.first().copied())
    };

    let mut chains = Vec::new();
    let mut loose = Vec::new();
    for b0 in 0..buckets.len() {
        while let Some(start) = first_at(&buckets, b0) {
            // forward from b0
            let mut forward = Vec::new();
            let mut endless = false;
            let mut cur = Some(start);
            while let Some(l) = cur {
                consume(&mut buckets, l);
                forward.push(l);
                let arrive = g.bucket_of[l ^ 1];
                if arrive == b0 {
                    endless = true;
                    break;
                }
                cur = first_at(&buckets, arrive);
            }
            // open: extend backward from b0
            let mut backward = Vec::new();
            if !endless {
                let mut cur = first_at(&buckets, b0);
                while let Some(l) = cur {
                    consume(&mut buckets, l);
                    backward.push(l);
                    let arrive = g.bucket_of[l ^ 1];
                    if arrive == b0 {
                        break;
                    }
                    cur = first_at(&buckets, arrive);
                }
            }
            let ordered: Vec<usize> = backward.iter().rev().map(|&l| l ^ 1).chain(forward).collect();
            chains.push((ordered, endless));
        }
    }

    let mut out = std::mem::take(&mut g.out);
    for (ordered, endless) in chains {
        let links: Vec<Link<'a>> = ordered.into_iter().map(|l| g.links[l].clone()).collect();
        if links.len() > 1 || endless {
            out.chains.push(Chain::from_links(links, endless));
        } else {
            loose.extend(links);
        }
    }
    out.loose = loose;
    out
}

/// All chains ignoring layers.
pub fn find_all_chains<'a>(model: &'a Model, options: &ChainOptions) -> Result<LayerChains<'a>, KernelError> {
    let opts = ChainOptions { by_layers: false, ..*options };
    Ok(find_chains(model, &opts)?.into_values().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_l() -> Model {
        Model::from_paths([
            ("1", Path::line((10.0, 0.0), (10.0, 10.0))),
            ("0", Path::line((0.0, 0.0), (10.0, 0.0))),
        ])
    }

    #[test]
    fn open_chain_is_extended_backward() {
        let m = open_l();
        let found = find_all_chains(&m, &ChainOptions::default()).unwrap();
        assert_eq!(found.chains.len(), 1);
        let c = &found.chains[0];
        assert!(!c.endless);
        assert_eq!(c.path_length, 20.0);
        assert_eq!(
            c.to_key_points(0.0),
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }

    #[test]
    fn triangle_closes() {
        let m = Model::from_paths([
            ("a", Path::line((0.0, 0.0), (10.0, 0.0))),
            ("b", Path::line((0.0, 0.0), (5.0, 8.0))),
            ("c", Path::line((10.001, 0.0), (5.0, 8.0))),
        ]);
        let found = find_all_chains(&m, &ChainOptions::default()).unwrap();
        assert_eq!(found.chains.len(), 1);
        let mut c = found.chains[0].clone();
        assert!(c.endless);
        assert_eq!(c.links.len(), 3);
        assert!(c.start_at(&crate::model::Route::root().child_path("c").key()));
        assert_eq!(c.route_keys()[0].as_str(), "/p:c");
        let pts = c.to_key_points(0.0);
        assert_eq!(pts.len(), 3);
        c.reverse();
        assert_eq!(c.to_model().path_count(), 3);
    }

    #[test]
    fn circles_are_endless_single_links() {
        let m = Model::from_paths([
            ("c", Path::circle((0.0, 0.0), 1.0)),
            ("full", Path::arc((5.0, 0.0), 1.0, 30.0, 390.0)),
        ]);
        let found = find_all_chains(&m, &ChainOptions::default()).unwrap();
        assert_eq!(found.chains.len(), 2);
        assert!(found.chains.iter().all(|c| c.endless && c.links.len() == 1));
        let pts = found.chains[0].to_key_points(1.0);
        assert_eq!(pts.len(), 7);
    }

    #[test]
    fn lone_segment_is_loose_and_tiny_paths_ignored() {
        let m = Model::from_paths([
            ("lone", Path::line((0.0, 0.0), (1.0, 0.0))),
            ("tiny", Path::line((5.0, 5.0), (5.0005, 5.0))),
        ]);
        let found = find_all_chains(&m, &ChainOptions::default()).unwrap();
        assert!(found.chains.is_empty());
        assert_eq!(found.loose.len(), 1);
        assert_eq!(found.loose[0].walked_path.path_id, "lone");
    }

    #[test]
    fn layers_are_separated() {
        let mut red = open_l();
        red.layer = Some("red".into());
        let mut root = open_l();
        root.models.insert("r".into(), red);
        let opts = ChainOptions { by_layers: true, ..Default::default() };
        let by_layer = find_chains(&root, &opts).unwrap();
        assert_eq!(by_layer.len(), 2);
        assert_eq!(by_layer[""].chains.len(), 1);
        assert_eq!(by_layer["red"].chains.len(), 1);
        let merged = find_all_chains(&root, &opts).unwrap();
        assert_eq!(merged.chains.iter().map(|c| c.links.len()).sum::<usize>(), 4);
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        let opts = ChainOptions { point_matching_distance: -1.0, ..Default::default() };
        assert!(matches!(find_chains(&open_l(), &opts), Err(KernelError::InvalidTolerance { .. })));
    }
}

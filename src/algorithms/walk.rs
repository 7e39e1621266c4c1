// Read-only traversal of a model tree. This is the single place where
// absolute offsets, routes and inherited layers are computed.

use crate::model::{Model, Path, Point, Route, RouteKey};

/// A path as seen from the root: its absolute offset, where it lives, and the
/// layer it inherits.
#[derive(Clone, Debug)]
pub struct WalkedPath<'a> {
    pub path: &'a Path,
    pub path_id: &'a str,
    pub offset: Point,
    pub route: Route,
    pub route_key: RouteKey,
    pub layer: Option<&'a str>,
}

/// A child model about to be (or just) walked. `offset` is the parent's
/// frame; the child's own origin is not yet applied.
#[derive(Clone, Debug)]
pub struct WalkedModel<'a> {
    pub model: &'a Model,
    pub child_id: &'a str,
    pub offset: Point,
    pub route: Route,
    pub route_key: RouteKey,
    pub layer: Option<&'a str>,
}

pub trait Visitor<'a> {
    fn on_path(&mut self, _walked: WalkedPath<'a>) {}

    /// Return false to skip the child and everything under it.
    fn before_child_walk(&mut self, _walked: &WalkedModel<'a>) -> bool {
        true
    }

    fn after_child_walk(&mut self, _walked: &WalkedModel<'a>) {}
}

/// Visit every path once, children in id order.
pub fn walk<'a, V: Visitor<'a>>(model: &'a Model, visitor: &mut V) {
    walk_inner(model, model.layer.as_deref(), Point::ZERO, Route::root(), visitor);
}

fn walk_inner<'a, V: Visitor<'a>>(
    model: &'a Model,
    layer: Option<&'a str>,
    offset: Point,
    route: Route,
    visitor: &mut V,
) {
    let offset = offset + model.origin;
    for (id, path) in &model.paths {
        let route = route.child_path(id);
        let route_key = route.key();
        visitor.on_path(WalkedPath { path, path_id: id, offset, route, route_key, layer });
    }
    for (id, child) in &model.models {
        let child_route = route.child_model(id);
        let walked = WalkedModel {
            model: child,
            child_id: id,
            offset,
            route_key: child_route.key(),
            route: child_route,
            layer: child.layer.as_deref().or(layer),
        };
        if !visitor.before_child_walk(&walked) {
            continue;
        }
        walk_inner(child, walked.layer, offset, walked.route.clone(), visitor);
        visitor.after_child_walk(&walked);
    }
}

struct PathFn<F>(F);

impl<'a, F: FnMut(WalkedPath<'a>)> Visitor<'a> for PathFn<F> {
    fn on_path(&mut self, walked: WalkedPath<'a>) {
        (self.0)(walked)
    }
}

/// `walk` with only a path callback.
pub fn walk_paths<'a>(model: &'a Model, on_path: impl FnMut(WalkedPath<'a>)) {
    walk(model, &mut PathFn(on_path));
}

/// Every path of the tree, in walk order.
pub fn collect_paths(model: &Model) -> Vec<WalkedPath<'_>> {
    let mut out = Vec::with_capacity(model.path_count());
    walk_paths(model, |w| out.push(w));
    out
}

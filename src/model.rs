use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::KernelError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub origin: Point,
    pub end: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub origin: Point,
    pub radius: f64,
}

/// Parameter range of the curve an arc was approximated from. Carried along
/// through clones and breaks, never interpreted by the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSpan {
    pub start_t: f64,
    pub end_t: f64,
}

/// Angles are in degrees. Sweeping runs from `start_angle` towards increasing
/// angles; when `end_angle` is numerically below `start_angle` the sweep wraps
/// past 360.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub origin: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CurveSpan>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Path {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
}

impl Path {
    pub fn line(origin: impl Into<Point>, end: impl Into<Point>) -> Path {
        Path::Line(Line {
            origin: origin.into(),
            end: end.into(),
        })
    }

    pub fn circle(origin: impl Into<Point>, radius: f64) -> Path {
        Path::Circle(Circle {
            origin: origin.into(),
            radius,
        })
    }

    pub fn arc(origin: impl Into<Point>, radius: f64, start_angle: f64, end_angle: f64) -> Path {
        Path::Arc(Arc {
            origin: origin.into(),
            radius,
            start_angle,
            end_angle,
            source: None,
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Path::Line(_) => "line",
            Path::Circle(_) => "circle",
            Path::Arc(_) => "arc",
        }
    }

    pub fn origin(&self) -> Point {
        match self {
            Path::Line(l) => l.origin,
            Path::Circle(c) => c.origin,
            Path::Arc(a) => a.origin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Foot,
}

/// A node of the drawing tree. Child maps are ordered by id so every walk
/// visits children in the same order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub origin: Point,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, Path>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, Model>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Unit>,
}

impl Model {
    pub fn new() -> Self {
        Model::default()
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = (S, Path)>,
        S: Into<String>,
    {
        Model {
            paths: paths.into_iter().map(|(id, p)| (id.into(), p)).collect(),
            ..Model::default()
        }
    }

    pub fn with_origin(mut self, origin: impl Into<Point>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.models.values().all(Model::is_empty)
    }

    /// Number of paths in this model and all descendants.
    pub fn path_count(&self) -> usize {
        self.paths.len() + self.models.values().map(Model::path_count).sum::<usize>()
    }

    /// First free id among `id`, `id_1`, `id_2`, ...
    pub fn similar_path_id(&self, id: &str) -> String {
        similar_id(&self.paths, id)
    }

    pub fn similar_model_id(&self, id: &str) -> String {
        similar_id(&self.models, id)
    }

    /// Insert under `id`, or under a similar free id when taken. Returns the id used.
    pub fn add_path(&mut self, id: &str, path: Path) -> String {
        let id = self.similar_path_id(id);
        self.paths.insert(id.clone(), path);
        id
    }

    pub fn add_model(&mut self, id: &str, model: Model) -> String {
        let id = self.similar_model_id(id);
        self.models.insert(id.clone(), model);
        id
    }

    pub fn model_at(&self, models: &[String]) -> Option<&Model> {
        let mut cur = self;
        for id in models {
            cur = cur.models.get(id)?;
        }
        Some(cur)
    }

    pub fn model_at_mut(&mut self, models: &[String]) -> Option<&mut Model> {
        let mut cur = self;
        for id in models {
            cur = cur.models.get_mut(id)?;
        }
        Some(cur)
    }

    pub fn path_at(&self, route: &Route) -> Option<&Path> {
        let id = route.path.as_ref()?;
        self.model_at(&route.models)?.paths.get(id)
    }

    pub fn remove_path_at(&mut self, route: &Route) -> Result<Path, KernelError> {
        let removed = match &route.path {
            Some(id) => self
                .model_at_mut(&route.models)
                .and_then(|m| m.paths.remove(id)),
            None => None,
        };
        removed.ok_or_else(|| KernelError::RouteNotFound(route.key()))
    }
}

fn similar_id<T>(map: &BTreeMap<String, T>, id: &str) -> String {
    if !map.contains_key(id) {
        return id.to_string();
    }
    let mut i = 1usize;
    loop {
        let candidate = format!("{}_{}", id, i);
        if !map.contains_key(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

/// Position of a model or path in a tree: the chain of child model ids from
/// the root, plus the path id when the route names a path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Route {
    pub models: Vec<String>,
    pub path: Option<String>,
}

impl Route {
    pub fn root() -> Self {
        Route::default()
    }

    pub fn child_model(&self, id: &str) -> Route {
        let mut models = self.models.clone();
        models.push(id.to_string());
        Route { models, path: None }
    }

    pub fn child_path(&self, id: &str) -> Route {
        Route {
            models: self.models.clone(),
            path: Some(id.to_string()),
        }
    }

    pub fn is_path(&self) -> bool {
        self.path.is_some()
    }

    /// Route of the model directly containing this node; `None` for the root.
    pub fn parent(&self) -> Option<Route> {
        if self.path.is_some() {
            return Some(Route {
                models: self.models.clone(),
                path: None,
            });
        }
        let (_, rest) = self.models.split_last()?;
        Some(Route {
            models: rest.to_vec(),
            path: None,
        })
    }

    /// Same route re-rooted under an extra leading model id.
    pub fn prefixed(&self, id: &str) -> Route {
        let mut models = Vec::with_capacity(self.models.len() + 1);
        models.push(id.to_string());
        models.extend(self.models.iter().cloned());
        Route {
            models,
            path: self.path.clone(),
        }
    }

    pub fn key(&self) -> RouteKey {
        let mut key = String::new();
        for m in &self.models {
            key.push_str("/m:");
            key.push_str(m);
        }
        if let Some(p) = &self.path {
            key.push_str("/p:");
            key.push_str(p);
        }
        RouteKey(key)
    }
}

/// Flat string form of a [`Route`], used to key cached measurements.
/// The root model's key is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

//! 2D line/circle/arc geometry kernel.
//!
//! A drawing is a tree of [`Model`]s holding [`Path`]s. The algorithms find
//! where paths cross, break them there, classify fragments against another
//! tree, assemble chains and loops, prune dead ends and combine two trees
//! with union, intersection or subtraction.

pub mod model;
pub mod error;
pub mod config;
pub mod geometry {
    pub mod angle;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod path;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod atlas;
    pub mod boolean;
    pub mod breaking;
    pub mod chains;
    pub mod collector;
    pub mod dead_ends;
    pub mod inside;
    pub mod loops;
    pub mod transform;
    pub mod walk;
}
mod json;

pub use algorithms::boolean::{combine, intersection, subtraction, union, BoolOp, CombineOptions, CombineResult};
pub use algorithms::breaking::break_paths_at_intersections;
pub use algorithms::chains::{find_chains, ChainOptions};
pub use algorithms::dead_ends::{remove_dead_ends, DeadEndOptions};
pub use algorithms::loops::{extract_loops, find_loops, LoopOptions};
pub use config::KernelConfig;
pub use error::KernelError;
pub use geometry::intersect::{intersection as path_intersection, Intersection, IntersectionOptions};
pub use model::{Arc, Circle, Line, Model, Path, Point, Route, RouteKey};

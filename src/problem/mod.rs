mod index;
mod problem;

pub(crate) use problem::Grid;
pub use problem::{
    Courier, Graph, GraphEdge, LoadError, Package, PackageKind, Permission, Point, Problem,
    Vehicle,
};

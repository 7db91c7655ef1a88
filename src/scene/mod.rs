//! Rendering-backend boundary: scene graph, mesh primitives, materials, and ray casting.

mod geometry;
mod graph;

pub use geometry::{Geometry, Material, TextureId, TextureSource};
pub use graph::{
    GeometryId, Hit, MaterialId, Node, NodeId, ResourceStats, SceneGraph, Transform,
};

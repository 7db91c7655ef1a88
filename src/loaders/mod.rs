//! Asset loading boundary. Loading is the only suspension point in the subsystem.

pub mod gltf;

use futures::future::LocalBoxFuture;
use glam::Mat4;

use crate::error::Result;
use crate::math::Aabb;

pub use self::gltf::GltfLoader;

/// One mesh from a loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    /// Model-space transform of the mesh node
    pub transform: Mat4,
    /// Bounds of the vertices in the mesh's own space
    pub bounds: Aabb,
    pub triangle_count: usize,
    pub color: [f32; 3],
}

/// Renderable node tree flattened to its meshes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub trait AssetLoader {
    /// Load a named 3D model
    fn load_model<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ModelData>>;

    /// Load an image by URL or path
    fn load_image<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<ImageData>>;
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use glam::{Mat4, Vec3};
use log::{debug, info};

use super::{AssetLoader, ImageData, MeshData, ModelData};
use crate::error::{Result, StoreError};
use crate::math::Aabb;

/// Loads models from glTF files and images from local files, relative to a base directory
#[derive(Debug, Clone)]
pub struct GltfLoader {
    base_dir: PathBuf,
}

impl GltfLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let name = name.strip_prefix("file://").unwrap_or(name);
        self.base_dir.join(name)
    }
}

impl AssetLoader for GltfLoader {
    fn load_model<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ModelData>> {
        let path = self.resolve(name);
        async move { load_gltf_model(&path).map_err(|e| StoreError::asset_load(name, format!("{e:#}"))) }
            .boxed_local()
    }

    fn load_image<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<ImageData>> {
        let path = self.resolve(url);
        async move { load_image_file(url, &path).map_err(|e| StoreError::asset_load(url, format!("{e:#}"))) }
            .boxed_local()
    }
}

fn load_image_file(url: &str, path: &Path) -> anyhow::Result<ImageData> {
    if url.starts_with("http://") || url.starts_with("https://") {
        bail!("remote images are not fetched by the file loader");
    }
    let image = image::open(path)
        .with_context(|| format!("failed to decode image {path:?}"))?
        .to_rgba8();
    Ok(ImageData {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Import a glTF file and flatten its default scene (or every scene) into meshes
pub fn load_gltf_model(path: &Path) -> anyhow::Result<ModelData> {
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("failed to load glTF file {path:?}"))?;

    let mut meshes = Vec::new();
    let scenes: Vec<gltf::Scene> = match document.default_scene() {
        Some(scene) => vec![scene],
        None => document.scenes().collect(),
    };
    for scene in scenes {
        for node in scene.nodes() {
            process_node(&node, &buffers, Mat4::IDENTITY, &mut meshes)?;
        }
    }

    if meshes.is_empty() {
        bail!("glTF file {path:?} contains no mesh geometry");
    }

    info!(
        "loaded {:?}: {} meshes, {} triangles",
        path,
        meshes.len(),
        meshes.iter().map(|m| m.triangle_count).sum::<usize>()
    );

    Ok(ModelData {
        name: path.display().to_string(),
        meshes,
    })
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: Mat4,
    meshes: &mut Vec<MeshData>,
) -> anyhow::Result<()> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = parent_transform * local;

    if let Some(mesh) = node.mesh() {
        if let Some(data) = process_mesh(&mesh, buffers, global)? {
            meshes.push(data);
        }
    }

    for child in node.children() {
        process_node(&child, buffers, global, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
) -> anyhow::Result<Option<MeshData>> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut triangle_count = 0;
    let mut color = [0.7, 0.7, 0.7];

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions = reader
            .read_positions()
            .context("mesh primitive has no positions")?;

        let start = vertices.len();
        vertices.extend(positions.map(Vec3::from_array));
        let added = vertices.len() - start;

        triangle_count += match reader.read_indices() {
            Some(indices) => indices.into_u32().count() / 3,
            None => added / 3,
        };

        let base = primitive.material().pbr_metallic_roughness().base_color_factor();
        color = [base[0], base[1], base[2]];
    }

    let Some(bounds) = Aabb::from_points(&vertices) else {
        debug!("skipping empty mesh {:?}", mesh.name());
        return Ok(None);
    };

    Ok(Some(MeshData {
        name: mesh.name().unwrap_or("mesh").to_string(),
        transform,
        bounds,
        triangle_count,
        color,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_asset_load_error() {
        let loader = GltfLoader::new("/nonexistent");
        let err = pollster::block_on(loader.load_model("store.gltf")).unwrap_err();
        match err {
            StoreError::AssetLoad { name, .. } => assert_eq!(name, "store.gltf"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn remote_images_are_refused() {
        let loader = GltfLoader::new(".");
        let result = pollster::block_on(loader.load_image("https://cdn.example/a.png"));
        assert!(matches!(result, Err(StoreError::AssetLoad { .. })));
    }

    #[test]
    fn file_prefix_is_stripped() {
        let loader = GltfLoader::new("/assets");
        assert_eq!(loader.resolve("file://img/a.png"), PathBuf::from("/assets/img/a.png"));
    }
}

use glam::Vec3;

use crate::math::{Aabb, Ray};

/// Mesh primitive descriptor; the backend tessellates it
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { size: Vec3 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, segments: u32 },
    Sphere { radius: f32, segments: u32 },
    Plane { width: f32, height: f32 },
    /// Pre-built mesh from a loaded asset, already in node-local coordinates
    Mesh { bounds: Aabb, triangle_count: usize },
}

impl Geometry {
    pub fn local_bounds(&self) -> Aabb {
        match *self {
            Geometry::Box { size } => Aabb::from_size(size),
            Geometry::Cylinder { radius_top, radius_bottom, height, .. } => {
                let r = radius_top.max(radius_bottom);
                Aabb::from_size(Vec3::new(2.0 * r, height, 2.0 * r))
            }
            Geometry::Sphere { radius, .. } => Aabb::from_size(Vec3::splat(2.0 * radius)),
            // Planes lie in local XY, facing +Z
            Geometry::Plane { width, height } => Aabb::from_size(Vec3::new(width, height, 0.0)),
            Geometry::Mesh { bounds, .. } => bounds,
        }
    }

    /// Ray hit in the geometry's local space. Spheres are exact, everything else uses its bounds.
    pub fn intersect_local(&self, ray: &Ray) -> Option<f32> {
        match *self {
            Geometry::Sphere { radius, .. } => ray.intersect_sphere(Vec3::ZERO, radius),
            _ => ray.intersect_aabb(&self.local_bounds()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Cylinder { .. } => "cylinder",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Plane { .. } => "plane",
            Geometry::Mesh { .. } => "mesh",
        }
    }
}

/// Pixel source for a texture
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// Text the backend rasterises onto a canvas of the given size
    Text {
        text: String,
        width: u32,
        height: u32,
        font_px: u32,
        foreground: [f32; 3],
        background: [f32; 3],
    },
    /// Decoded RGBA8 image
    Image { url: String, width: u32, height: u32, rgba: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

/// Standard lit material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub map: Option<TextureId>,
    pub double_sided: bool,
}

impl Material {
    pub fn solid(color: [f32; 3]) -> Self {
        Self {
            color,
            roughness: 0.6,
            metalness: 0.1,
            opacity: 1.0,
            map: None,
            double_sided: false,
        }
    }

    pub fn with_map(mut self, map: TextureId) -> Self {
        self.map = Some(map);
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

use glam::{Mat4, Vec2, Vec3};

use crate::math::Ray;

/// Camera uniform block for renderer backends
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad1: f32,
    pub forward: [f32; 3],
    pub _pad2: f32,
}

/// Perspective camera looking from `position` at `look_at`, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            fov_y,
            aspect,
            near,
            far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Ray through a point given in normalised device coordinates (`[-1, 1]`, +Y up)
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect;
        let direction = self.forward()
            + self.right() * (ndc.x * half_width)
            + self.up() * (ndc.y * half_height);
        Ray::new(self.position, direction.normalize())
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: (self.projection_matrix() * self.view_matrix()).to_cols_array_2d(),
            position: self.position.to_array(),
            _pad1: 0.0,
            forward: self.forward().to_array(),
            _pad2: 0.0,
        }
    }
}

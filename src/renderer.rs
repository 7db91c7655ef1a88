use glam::Vec2;
use log::trace;

use crate::camera::PerspectiveCamera;
use crate::scene::SceneGraph;

/// Render-surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Screen pixel (origin top-left, +Y down) to normalised device coordinates (+Y up)
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        let size = Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32);
        Vec2::new(screen.x / size.x * 2.0 - 1.0, 1.0 - screen.y / size.y * 2.0)
    }
}

/// Rendering backend: draws the scene from the camera and owns the render surface
pub trait Renderer {
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()>;

    fn resize(&mut self, viewport: Viewport);

    /// Detach the render surface from its host container
    fn detach(&mut self);
}

/// Backend that draws nothing and traces what it would draw
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    viewport: Option<Viewport>,
    attached: bool,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last size the host reported
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        self.frames += 1;
        let visible = scene.renderables().filter(|&n| scene.is_visible(n)).count();
        trace!(
            "frame {}: {} meshes, camera {:?} -> {:?}",
            self.frames,
            visible,
            camera.position,
            camera.look_at
        );
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

//! Screen-space picking of displayed entities.

use glam::Vec2;

use crate::camera::PerspectiveCamera;
use crate::catalog::CatalogEntity;
use crate::renderer::Viewport;
use crate::scene::{NodeId, SceneGraph};

/// A node that may be hit, and the entity it stands for
#[derive(Debug, Clone, Copy)]
pub struct PickTarget<'a> {
    pub node: NodeId,
    pub entity: &'a CatalogEntity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickResult<'a> {
    Hit { entity: &'a CatalogEntity, distance: f32 },
    None,
}

impl<'a> PickResult<'a> {
    pub fn entity(&self) -> Option<&'a CatalogEntity> {
        match *self {
            PickResult::Hit { entity, .. } => Some(entity),
            PickResult::None => None,
        }
    }
}

/// Stateless picker; one query per click
pub struct InteractionPicker;

impl InteractionPicker {
    /// Cast a ray from the camera through `screen` and return the nearest target hit
    pub fn pick<'a>(
        screen: Vec2,
        viewport: Viewport,
        camera: &PerspectiveCamera,
        scene: &SceneGraph,
        targets: &[PickTarget<'a>],
    ) -> PickResult<'a> {
        if targets.is_empty() {
            return PickResult::None;
        }

        let ray = camera.ray_from_ndc(viewport.to_ndc(screen));
        let nodes: Vec<NodeId> = targets.iter().map(|t| t.node).collect();

        scene
            .raycast(&ray, &nodes)
            .first()
            .and_then(|hit| {
                targets
                    .iter()
                    .find(|t| t.node == hit.node)
                    .map(|t| PickResult::Hit { entity: t.entity, distance: hit.distance })
            })
            .unwrap_or(PickResult::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material};
    use glam::Vec3;

    fn entity(id: &str) -> CatalogEntity {
        CatalogEntity {
            id: id.into(),
            name: id.into(),
            category: "Dairy".into(),
            price: 1.0,
            image_url: String::new(),
            stock_quantity: 1,
        }
    }

    fn cube_at(scene: &mut SceneGraph, at: Vec3) -> NodeId {
        let g = scene.create_geometry(Geometry::Box { size: Vec3::ONE }).unwrap();
        let m = scene.create_material(Material::solid([1.0; 3])).unwrap();
        let root = scene.root();
        let node = scene.add_mesh(root, "cube", g, m);
        scene.node_mut(node).unwrap().transform.translation = at;
        node
    }

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60f32.to_radians(), 1.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at = Vec3::ZERO;
        camera
    }

    #[test]
    fn centre_click_hits_nearest() {
        let mut scene = SceneGraph::new();
        let (near_e, far_e) = (entity("near"), entity("far"));
        let far = cube_at(&mut scene, Vec3::new(0.0, 0.0, -3.0));
        let near = cube_at(&mut scene, Vec3::ZERO);
        let targets = [
            PickTarget { node: far, entity: &far_e },
            PickTarget { node: near, entity: &near_e },
        ];

        let result = InteractionPicker::pick(
            Vec2::new(50.0, 50.0),
            Viewport::new(100, 100),
            &camera(),
            &scene,
            &targets,
        );
        assert_eq!(result.entity().map(|e| e.id.as_str()), Some("near"));
    }

    #[test]
    fn corner_click_misses() {
        let mut scene = SceneGraph::new();
        let e = entity("only");
        let node = cube_at(&mut scene, Vec3::ZERO);
        let targets = [PickTarget { node, entity: &e }];

        let result = InteractionPicker::pick(
            Vec2::new(2.0, 2.0),
            Viewport::new(100, 100),
            &camera(),
            &scene,
            &targets,
        );
        assert_eq!(result, PickResult::None);
    }

    #[test]
    fn no_targets_is_none() {
        let scene = SceneGraph::new();
        let result =
            InteractionPicker::pick(Vec2::ZERO, Viewport::new(10, 10), &camera(), &scene, &[]);
        assert!(result.entity().is_none());
    }
}

//! Visual stand-in for one catalog entity: pedestal, procedural product mesh, and a label.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntity;
use crate::error::Result;
use crate::loaders::AssetLoader;
use crate::scene::{
    Geometry, GeometryId, Material, MaterialId, NodeId, SceneGraph, TextureId, TextureSource,
};
use crate::shapes::{classify, ShapeRule};

const PEDESTAL_RADIUS: f32 = 0.55;
const PEDESTAL_HEIGHT: f32 = 0.8;
const PRODUCT_CLEARANCE: f32 = 0.15;
const LABEL_SIZE: (f32, f32) = (1.2, 0.4);
const LABEL_OFFSET: f32 = 0.75;
const LABEL_HEIGHT: f32 = 1.9;

/// Radians per second
const SPIN_SPEED: f32 = 0.5;
const BOB_AMPLITUDE: f32 = 0.05;
/// Radians per second
const BOB_FREQUENCY: f32 = 2.0;

/// Which side of the aisle a slot is on; labels face the aisle centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub position: Vec3,
    pub side: SlotSide,
}

impl Slot {
    pub fn new(position: Vec3, side: SlotSide) -> Self {
        Self { position, side }
    }
}

/// Fixed table of display positions. Entities are placed in order; any beyond capacity are
/// not displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotTable {
    slots: Vec<Slot>,
}

/// Result of pairing entities with slots
#[derive(Debug)]
pub struct SlotAssignment<'a> {
    pub placed: Vec<(Slot, &'a CatalogEntity)>,
    pub truncated: usize,
}

impl SlotTable {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn assign<'a>(&self, entities: &'a [CatalogEntity]) -> SlotAssignment<'a> {
        let placed: Vec<_> = self.slots.iter().copied().zip(entities).collect();
        SlotAssignment {
            truncated: entities.len() - placed.len(),
            placed,
        }
    }
}

pub struct EntityDisplay {
    entity: CatalogEntity,
    slot: Slot,
    group: Option<NodeId>,
    product: Option<NodeId>,
    label: Option<NodeId>,
    geometries: Vec<GeometryId>,
    materials: Vec<MaterialId>,
    textures: Vec<TextureId>,
    product_base_y: f32,
    phase: f32,
    elapsed: f32,
    created: bool,
    disposed: bool,
}

impl EntityDisplay {
    pub fn new(entity: CatalogEntity, slot: Slot) -> Self {
        // Derived from the slot so neighbouring displays do not bob in lockstep
        let phase = slot.position.x * 0.7 + slot.position.z * 0.45;
        Self {
            entity,
            slot,
            group: None,
            product: None,
            label: None,
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            product_base_y: 0.0,
            phase,
            elapsed: 0.0,
            created: false,
            disposed: false,
        }
    }

    pub fn entity(&self) -> &CatalogEntity {
        &self.entity
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn rule(&self) -> &'static ShapeRule {
        classify(&self.entity.category)
    }

    pub fn label(&self) -> Option<NodeId> {
        self.label
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Only the product mesh is pickable, never the pedestal or label
    pub fn pickable_nodes(&self) -> &[NodeId] {
        if self.disposed {
            return &[];
        }
        self.product.as_slice()
    }

    /// Build the display under `parent`. A second call after success does nothing; a call after
    /// a failed attempt first releases whatever the failed attempt created.
    pub async fn create(
        &mut self,
        scene: &mut SceneGraph,
        parent: NodeId,
        loader: &dyn AssetLoader,
    ) -> Result<()> {
        if self.created || self.disposed {
            return Ok(());
        }
        self.release(scene);

        let image = if self.entity.image_url.is_empty() {
            None
        } else {
            match loader.load_image(&self.entity.image_url).await {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!("{}: using flat colour, {err}", self.entity.id);
                    None
                }
            }
        };

        let map = match image {
            Some(image) => Some(self.track_texture(scene.create_texture(TextureSource::Image {
                url: self.entity.image_url.clone(),
                width: image.width,
                height: image.height,
                rgba: image.rgba,
            }))?),
            None => None,
        };

        self.build(scene, parent, map)?;
        self.created = true;
        debug!(
            "display for {} ({}) created at {:?}",
            self.entity.id,
            self.rule().group,
            self.slot.position
        );
        Ok(())
    }

    fn build(&mut self, scene: &mut SceneGraph, parent: NodeId, map: Option<TextureId>) -> Result<()> {
        let rule = self.rule();

        let group = scene.add_node(parent, format!("display:{}", self.entity.id));
        self.group = Some(group);
        if let Some(node) = scene.node_mut(group) {
            node.transform.translation = self.slot.position;
        }

        // Pedestal
        let geometry = self.track_geometry(scene.create_geometry(Geometry::Cylinder {
            radius_top: PEDESTAL_RADIUS,
            radius_bottom: PEDESTAL_RADIUS,
            height: PEDESTAL_HEIGHT,
            segments: 32,
        }))?;
        let material = self.track_material(scene.create_material(Material::solid([0.82, 0.82, 0.85])))?;
        let pedestal = scene.add_mesh(group, "pedestal", geometry, material);
        if let Some(node) = scene.node_mut(pedestal) {
            node.transform.translation.y = PEDESTAL_HEIGHT * 0.5;
        }

        // Product
        let (shape, scale) = rule.shape.geometry();
        let geometry = self.track_geometry(scene.create_geometry(shape))?;
        let mut product_material = Material::solid(self.product_color(rule));
        if let Some(map) = map {
            product_material = product_material.with_map(map);
        }
        let material = self.track_material(scene.create_material(product_material))?;
        let product = scene.add_mesh(group, "product", geometry, material);
        self.product_base_y = PEDESTAL_HEIGHT + PRODUCT_CLEARANCE + rule.shape.height() * 0.5;
        if let Some(node) = scene.node_mut(product) {
            node.transform.translation.y = self.product_base_y;
            node.transform.scale = scale;
        }
        self.product = Some(product);

        // Label on the edge facing the aisle centre
        let texture = self.track_texture(scene.create_texture(TextureSource::Text {
            text: rule.group.to_string(),
            width: 512,
            height: 170,
            font_px: 64,
            foreground: [0.1, 0.1, 0.12],
            background: [1.0, 1.0, 1.0],
        }))?;
        let geometry = self.track_geometry(scene.create_geometry(Geometry::Plane {
            width: LABEL_SIZE.0,
            height: LABEL_SIZE.1,
        }))?;
        let material = self.track_material(
            scene.create_material(Material::solid([1.0, 1.0, 1.0]).with_map(texture).double_sided()),
        )?;
        let label = scene.add_mesh(group, "label", geometry, material);
        let (offset, yaw) = match self.slot.side {
            SlotSide::Left => (LABEL_OFFSET, FRAC_PI_2),
            SlotSide::Right => (-LABEL_OFFSET, -FRAC_PI_2),
        };
        if let Some(node) = scene.node_mut(label) {
            node.transform.translation = Vec3::new(offset, LABEL_HEIGHT, 0.0);
            node.transform.rotation = Quat::from_rotation_y(yaw);
        }
        self.label = Some(label);

        Ok(())
    }

    fn product_color(&self, rule: &ShapeRule) -> [f32; 3] {
        if self.entity.is_in_stock() {
            return rule.color;
        }
        // Desaturate towards grey
        let grey = rule.color.iter().sum::<f32>() / 3.0;
        rule.color.map(|c| grey + (c - grey) * 0.25)
    }

    fn track_geometry(&mut self, id: Result<GeometryId>) -> Result<GeometryId> {
        let id = id?;
        self.geometries.push(id);
        Ok(id)
    }

    fn track_material(&mut self, id: Result<MaterialId>) -> Result<MaterialId> {
        let id = id?;
        self.materials.push(id);
        Ok(id)
    }

    fn track_texture(&mut self, id: Result<TextureId>) -> Result<TextureId> {
        let id = id?;
        self.textures.push(id);
        Ok(id)
    }

    /// Continuous slow spin and a small vertical bob of the product mesh
    pub fn update(&mut self, scene: &mut SceneGraph, delta: f32) {
        if !self.created || self.disposed {
            return;
        }
        self.elapsed += delta;
        let Some(node) = self.product.and_then(|p| scene.node_mut(p)) else {
            return;
        };
        node.transform.rotation = Quat::from_rotation_y(self.elapsed * SPIN_SPEED);
        node.transform.translation.y = self.product_base_y
            + BOB_AMPLITUDE * (self.elapsed * BOB_FREQUENCY + self.phase).sin();
    }

    /// World-space facing direction of the label plane
    pub fn label_normal(&self, scene: &SceneGraph) -> Option<Vec3> {
        let label = self.label.filter(|&l| scene.contains(l))?;
        Some(scene.world_matrix(label).transform_vector3(Vec3::Z).normalize())
    }

    fn release(&mut self, scene: &mut SceneGraph) {
        if let Some(group) = self.group.take() {
            scene.remove_node(group);
        }
        self.product = None;
        self.label = None;
        for id in self.geometries.drain(..) {
            scene.release_geometry(id);
        }
        for id in self.materials.drain(..) {
            scene.release_material(id);
        }
        for id in self.textures.drain(..) {
            scene.release_texture(id);
        }
    }

    /// Release every owned resource. Safe after a partial `create`; later calls do nothing.
    pub fn dispose(&mut self, scene: &mut SceneGraph) -> bool {
        if self.disposed {
            return false;
        }
        self.release(scene);
        self.disposed = true;
        self.created = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{ImageData, ModelData};
    use crate::error::StoreError;
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;

    struct NoAssets;

    impl AssetLoader for NoAssets {
        fn load_model<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ModelData>> {
            async move { Err(StoreError::asset_load(name, "none")) }.boxed_local()
        }

        fn load_image<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<ImageData>> {
            async move { Err(StoreError::asset_load(url, "none")) }.boxed_local()
        }
    }

    fn entity(category: &str, stock: u32) -> CatalogEntity {
        CatalogEntity {
            id: format!("{category}-1"),
            name: "Sample".into(),
            category: category.into(),
            price: 3.5,
            image_url: "img/sample.png".into(),
            stock_quantity: stock,
        }
    }

    fn created(category: &str, slot: Slot) -> (SceneGraph, EntityDisplay) {
        let mut scene = SceneGraph::new();
        let mut display = EntityDisplay::new(entity(category, 3), slot);
        let root = scene.root();
        pollster::block_on(display.create(&mut scene, root, &NoAssets)).unwrap();
        (scene, display)
    }

    #[test]
    fn slot_table_truncates_extras() {
        let table = SlotTable::new(vec![Slot::new(Vec3::ZERO, SlotSide::Left); 2]);
        let entities = vec![entity("Meat", 1), entity("Dairy", 1), entity("Bakery", 1)];
        let assignment = table.assign(&entities);
        assert_eq!(assignment.placed.len(), 2);
        assert_eq!(assignment.truncated, 1);
        assert_eq!(assignment.placed[1].1.category, "Dairy");
    }

    #[test]
    fn missing_image_is_not_an_error() {
        let (scene, display) = created("Meat", Slot::new(Vec3::new(-3.0, 0.0, 0.0), SlotSide::Left));
        assert!(display.is_created());
        // pedestal, product, label planes plus one text texture; no image texture
        assert_eq!(scene.resource_stats().textures, 1);
        assert_eq!(scene.resource_stats().geometries, 3);
    }

    #[test]
    fn only_product_is_pickable() {
        let (scene, display) = created("Dairy", Slot::new(Vec3::ZERO, SlotSide::Right));
        let pickable = display.pickable_nodes();
        assert_eq!(pickable.len(), 1);
        assert_eq!(scene.node(pickable[0]).unwrap().name, "product");
    }

    #[test]
    fn create_twice_builds_once() {
        let (mut scene, mut display) = created("Bakery", Slot::new(Vec3::ZERO, SlotSide::Left));
        let before = scene.resource_stats();
        let root = scene.root();
        pollster::block_on(display.create(&mut scene, root, &NoAssets)).unwrap();
        assert_eq!(scene.resource_stats(), before);
    }

    #[test]
    fn out_of_stock_is_desaturated() {
        let rule = classify("Meat");
        let display = EntityDisplay::new(entity("Meat", 0), Slot::new(Vec3::ZERO, SlotSide::Left));
        let color = display.product_color(rule);
        let spread = |c: [f32; 3]| c.iter().cloned().fold(f32::MIN, f32::max) - c.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread(color) < spread(rule.color));
    }

    #[test]
    fn update_spins_and_bobs_product_only() {
        let (mut scene, mut display) = created("Meat", Slot::new(Vec3::new(-3.0, 0.0, -2.0), SlotSide::Left));
        let label = display.label().unwrap();
        let label_before = scene.node(label).unwrap().transform;

        display.update(&mut scene, 0.5);

        let product = scene.node(display.pickable_nodes()[0]).unwrap().transform;
        assert_ne!(product.rotation, Quat::IDENTITY);
        assert!((product.translation.y - display.product_base_y).abs() <= BOB_AMPLITUDE + 1e-6);
        assert_eq!(scene.node(label).unwrap().transform, label_before);
    }
}

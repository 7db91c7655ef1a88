use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use log::warn;

use super::geometry::{Geometry, Material, TextureId, TextureSource};
use crate::error::{Result, StoreError};
use crate::math::Ray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            geometry: None,
            material: None,
            visible: true,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Ray-cast result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub distance: f32,
}

/// Live-resource counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl ResourceStats {
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

/// Arena scene graph with owned graphics resources.
///
/// Nodes reference geometries and materials by handle. Removing a node never releases the
/// resources it points at; whoever created a resource releases it, exactly once.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    geometries: HashMap<GeometryId, Geometry>,
    materials: HashMap<MaterialId, Material>,
    textures: HashMap<TextureId, TextureSource>,
    next_resource: u32,
    budget: Option<usize>,
    double_releases: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new("scene", None))],
            geometries: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            next_resource: 0,
            budget: None,
            double_releases: 0,
        }
    }

    /// Cap on simultaneously live resources; creation beyond it fails
    pub fn with_resource_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // --- nodes ---

    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = if self.contains(parent) { parent } else { self.root() };
        self.nodes.push(Some(Node::new(name, Some(parent))));
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Add a renderable node carrying a geometry and material
    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        geometry: GeometryId,
        material: MaterialId,
    ) -> NodeId {
        let id = self.add_node(parent, name);
        if let Some(node) = self.node_mut(id) {
            node.geometry = Some(geometry);
            node.material = Some(material);
        }
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Detach and drop a node with its whole subtree. The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if id == self.root() || !self.contains(id) {
            return false;
        }

        let parent = self.node(id).and_then(Node::parent);
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find_map(|(i, n)| n.as_ref().filter(|n| n.name == name).map(|_| NodeId(i)))
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// A node renders only if it and all its ancestors are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.node(c) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Nodes carrying geometry, in arena order
    pub fn renderables(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            n.as_ref()
                .filter(|n| n.geometry.is_some())
                .map(|_| NodeId(i))
        })
    }

    // --- ray casting ---

    /// Intersect a world-space ray with the given nodes' geometry, nearest first.
    /// Hidden, removed, or geometry-less nodes are skipped.
    pub fn raycast(&self, ray: &Ray, targets: &[NodeId]) -> Vec<Hit> {
        let mut hits: Vec<Hit> = targets
            .iter()
            .filter(|&&id| self.is_visible(id))
            .filter_map(|&id| {
                let geometry = self.node(id)?.geometry.and_then(|g| self.geometries.get(&g))?;
                let local = ray.transformed(&self.world_matrix(id).inverse());
                geometry
                    .intersect_local(&local)
                    .map(|distance| Hit { node: id, distance })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    // --- resources ---

    fn allocate(&mut self, kind: &'static str) -> Result<u32> {
        if let Some(budget) = self.budget {
            if self.resource_stats().total() >= budget {
                return Err(StoreError::ResourceExhausted { kind });
            }
        }
        let id = self.next_resource;
        self.next_resource += 1;
        Ok(id)
    }

    pub fn create_geometry(&mut self, geometry: Geometry) -> Result<GeometryId> {
        let id = GeometryId(self.allocate("geometry")?);
        self.geometries.insert(id, geometry);
        Ok(id)
    }

    pub fn create_material(&mut self, material: Material) -> Result<MaterialId> {
        let id = MaterialId(self.allocate("material")?);
        self.materials.insert(id, material);
        Ok(id)
    }

    pub fn create_texture(&mut self, source: TextureSource) -> Result<TextureId> {
        let id = TextureId(self.allocate("texture")?);
        self.textures.insert(id, source);
        Ok(id)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureSource> {
        self.textures.get(&id)
    }

    pub fn release_geometry(&mut self, id: GeometryId) -> bool {
        let released = self.geometries.remove(&id).is_some();
        self.note_release(released, "geometry", id.0)
    }

    pub fn release_material(&mut self, id: MaterialId) -> bool {
        let released = self.materials.remove(&id).is_some();
        self.note_release(released, "material", id.0)
    }

    pub fn release_texture(&mut self, id: TextureId) -> bool {
        let released = self.textures.remove(&id).is_some();
        self.note_release(released, "texture", id.0)
    }

    fn note_release(&mut self, released: bool, kind: &str, raw: u32) -> bool {
        if !released {
            self.double_releases += 1;
            warn!("{kind} #{raw} released twice");
        }
        released
    }

    pub fn resource_stats(&self) -> ResourceStats {
        ResourceStats {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        }
    }

    /// Number of releases that targeted an already-released handle
    pub fn double_releases(&self) -> usize {
        self.double_releases
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

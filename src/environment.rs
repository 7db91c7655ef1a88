//! Static store environment: built from the configured model, or procedurally when that fails
//! and the configuration allows it.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use log::{info, warn};

use crate::config::{LoadFailurePolicy, StoreConfig};
use crate::error::Result;
use crate::loaders::{AssetLoader, ModelData};
use crate::scene::{Geometry, GeometryId, Material, MaterialId, NodeId, SceneGraph, Transform};

const AISLE_WIDTH: f32 = 10.0;
const AISLE_LENGTH: f32 = 28.0;
const AISLE_CENTER_Z: f32 = -8.0;
const WALL_HEIGHT: f32 = 4.0;

pub struct Environment {
    root: Option<NodeId>,
    geometries: Vec<GeometryId>,
    materials: Vec<MaterialId>,
    fallback: bool,
}

impl Environment {
    fn empty(fallback: bool) -> Self {
        Self {
            root: None,
            geometries: Vec::new(),
            materials: Vec::new(),
            fallback,
        }
    }

    /// Load `config.environment_asset`. On failure either return the error or build the
    /// procedural environment, per `config.on_load_failure`.
    pub async fn load(
        scene: &mut SceneGraph,
        loader: &dyn AssetLoader,
        config: &StoreConfig,
    ) -> Result<Environment> {
        match loader.load_model(&config.environment_asset).await {
            Ok(model) => Self::from_model(scene, &model),
            Err(err) => match config.on_load_failure {
                LoadFailurePolicy::Throw => Err(err),
                LoadFailurePolicy::Fallback => {
                    warn!("environment asset unavailable, building fallback: {err}");
                    Self::procedural(scene)
                }
            },
        }
    }

    pub fn from_model(scene: &mut SceneGraph, model: &ModelData) -> Result<Environment> {
        let mut env = Self::empty(false);
        let root = env.add_root(scene);

        let result = model.meshes.iter().try_for_each(|mesh| -> Result<()> {
            let geometry = env.track_geometry(scene.create_geometry(Geometry::Mesh {
                bounds: mesh.bounds,
                triangle_count: mesh.triangle_count,
            }))?;
            let material = env.track_material(scene.create_material(Material::solid(mesh.color)))?;
            let node = scene.add_mesh(root, mesh.name.clone(), geometry, material);
            if let Some(node) = scene.node_mut(node) {
                let (scale, rotation, translation) = mesh.transform.to_scale_rotation_translation();
                node.transform = Transform { translation, rotation, scale };
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                info!("environment built from {} ({} meshes)", model.name, model.meshes.len());
                Ok(env)
            }
            Err(err) => {
                env.dispose(scene);
                Err(err)
            }
        }
    }

    /// Floor, ceiling, and walls of a single aisle, with an entrance frame
    pub fn procedural(scene: &mut SceneGraph) -> Result<Environment> {
        let mut env = Self::empty(true);
        match env.build_procedural(scene) {
            Ok(()) => {
                info!("procedural environment built");
                Ok(env)
            }
            Err(err) => {
                env.dispose(scene);
                Err(err)
            }
        }
    }

    fn build_procedural(&mut self, scene: &mut SceneGraph) -> Result<()> {
        let root = self.add_root(scene);

        let floor_mat = self.track_material(scene.create_material(Material::solid([0.78, 0.76, 0.72])))?;
        let wall_mat = self.track_material(scene.create_material(Material::solid([0.93, 0.93, 0.9])))?;
        let trim_mat = self.track_material(scene.create_material(Material::solid([0.2, 0.45, 0.3])))?;

        let plane = self.track_geometry(scene.create_geometry(Geometry::Plane {
            width: AISLE_WIDTH,
            height: AISLE_LENGTH,
        }))?;
        let side_wall = self.track_geometry(scene.create_geometry(Geometry::Box {
            size: Vec3::new(0.2, WALL_HEIGHT, AISLE_LENGTH),
        }))?;
        let end_wall = self.track_geometry(scene.create_geometry(Geometry::Box {
            size: Vec3::new(AISLE_WIDTH, WALL_HEIGHT, 0.2),
        }))?;
        let post = self.track_geometry(scene.create_geometry(Geometry::Box {
            size: Vec3::new(0.4, WALL_HEIGHT, 0.4),
        }))?;
        let lintel = self.track_geometry(scene.create_geometry(Geometry::Box {
            size: Vec3::new(AISLE_WIDTH, 0.5, 0.4),
        }))?;

        let half_width = AISLE_WIDTH * 0.5;
        let front_z = AISLE_CENTER_Z + AISLE_LENGTH * 0.5;
        let back_z = AISLE_CENTER_Z - AISLE_LENGTH * 0.5;
        let parts = [
            ("floor", plane, floor_mat, Vec3::new(0.0, 0.0, AISLE_CENTER_Z), Quat::from_rotation_x(-FRAC_PI_2)),
            ("ceiling", plane, wall_mat, Vec3::new(0.0, WALL_HEIGHT, AISLE_CENTER_Z), Quat::from_rotation_x(FRAC_PI_2)),
            ("wall:left", side_wall, wall_mat, Vec3::new(-half_width, WALL_HEIGHT * 0.5, AISLE_CENTER_Z), Quat::IDENTITY),
            ("wall:right", side_wall, wall_mat, Vec3::new(half_width, WALL_HEIGHT * 0.5, AISLE_CENTER_Z), Quat::IDENTITY),
            ("wall:back", end_wall, wall_mat, Vec3::new(0.0, WALL_HEIGHT * 0.5, back_z), Quat::IDENTITY),
            ("entrance:left", post, trim_mat, Vec3::new(-half_width, WALL_HEIGHT * 0.5, front_z), Quat::IDENTITY),
            ("entrance:right", post, trim_mat, Vec3::new(half_width, WALL_HEIGHT * 0.5, front_z), Quat::IDENTITY),
            ("entrance:lintel", lintel, trim_mat, Vec3::new(0.0, WALL_HEIGHT, front_z), Quat::IDENTITY),
        ];

        for (name, geometry, material, translation, rotation) in parts {
            let node = scene.add_mesh(root, name, geometry, material);
            if let Some(node) = scene.node_mut(node) {
                node.transform = Transform { translation, rotation, scale: Vec3::ONE };
            }
        }
        Ok(())
    }

    fn add_root(&mut self, scene: &mut SceneGraph) -> NodeId {
        let parent = scene.root();
        let root = scene.add_node(parent, "environment");
        self.root = Some(root);
        root
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

    /// True when the configured asset failed and the procedural stand-in is in use
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Remove the node tree and release owned resources; later calls do nothing
    pub fn dispose(&mut self, scene: &mut SceneGraph) -> bool {
        let Some(root) = self.root.take() else {
            return false;
        };
        scene.remove_node(root);
        for id in self.geometries.drain(..) {
            scene.release_geometry(id);
        }
        for id in self.materials.drain(..) {
            scene.release_material(id);
        }
        true
    }
}

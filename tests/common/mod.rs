#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use glam::{Mat4, Vec2, Vec3};
use storewalk::loaders::{AssetLoader, ImageData, MeshData, ModelData};
use storewalk::math::Aabb;
use storewalk::scene::NodeId;
use storewalk::{
    CatalogEntity, EventKind, LogRenderer, SceneOrchestrator, StoreConfig, StoreError, StoreEvent,
};

pub const DT: f32 = 1.0 / 60.0;

/// In-memory asset source; names not registered fail to load
#[derive(Default, Clone)]
pub struct MemoryLoader {
    pub models: HashMap<String, ModelData>,
    pub images: HashMap<String, ImageData>,
}

impl MemoryLoader {
    pub fn with_store_model() -> Self {
        let mut loader = Self::default();
        loader.models.insert(
            StoreConfig::default().environment_asset,
            ModelData {
                name: "store".into(),
                meshes: vec![MeshData {
                    name: "floor".into(),
                    transform: Mat4::IDENTITY,
                    bounds: Aabb::new(Vec3::new(-5.0, -0.1, -22.0), Vec3::new(5.0, 0.0, 6.0)),
                    triangle_count: 2,
                    color: [0.8, 0.8, 0.8],
                }],
            },
        );
        loader
    }
}

impl AssetLoader for MemoryLoader {
    fn load_model<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, storewalk::Result<ModelData>> {
        let result = self
            .models
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::asset_load(name, "not found"));
        async move { result }.boxed_local()
    }

    fn load_image<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, storewalk::Result<ImageData>> {
        let result = self
            .images
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::asset_load(url, "not found"));
        async move { result }.boxed_local()
    }
}

pub fn entity(id: &str, category: &str) -> CatalogEntity {
    CatalogEntity {
        id: id.into(),
        name: format!("Product {id}"),
        category: category.into(),
        price: 2.5,
        image_url: String::new(),
        stock_quantity: 3,
    }
}

/// Six entities, one per default slot
pub fn six_entities() -> Vec<CatalogEntity> {
    [
        ("1", "Meat & Seafood"),
        ("2", "Dairy"),
        ("3", "Bakery"),
        ("4", "Produce"),
        ("5", "Beverages"),
        ("6", "Household"),
    ]
    .iter()
    .map(|(id, category)| entity(id, category))
    .collect()
}

pub type Store = SceneOrchestrator<LogRenderer>;

pub fn store_with(config: StoreConfig, entities: Vec<CatalogEntity>, loader: MemoryLoader) -> Store {
    SceneOrchestrator::new(config, entities, LogRenderer::new(), Box::new(loader)).unwrap()
}

pub fn ready_store(entities: Vec<CatalogEntity>) -> Store {
    let mut store = store_with(StoreConfig::default(), entities, MemoryLoader::with_store_model());
    pollster::block_on(store.init()).unwrap();
    store
}

pub fn run(store: &mut Store, seconds: f32) {
    let frames = (seconds / DT).ceil() as u32;
    for _ in 0..frames {
        store.tick(DT);
    }
}

/// Records every published event, in order
pub fn record_all(store: &mut Store) -> Rc<RefCell<Vec<StoreEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        EventKind::LoadingComplete,
        EventKind::StoreEntered,
        EventKind::ExitStore,
        EventKind::SectionChange,
        EventKind::EntityClick,
    ] {
        let seen = seen.clone();
        store.subscribe(kind, move |event| {
            seen.borrow_mut().push(event.clone());
            Ok(())
        });
    }
    seen
}

/// Screen position of a node's origin as seen by the store camera
pub fn screen_position(store: &Store, node: NodeId) -> Vec2 {
    let camera = store.controller().camera();
    let world = store.scene().world_matrix(node).transform_point3(Vec3::ZERO);
    let ndc = (camera.projection_matrix() * camera.view_matrix()).project_point3(world);
    let viewport = store.viewport();
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width as f32,
        (1.0 - ndc.y) * 0.5 * viewport.height as f32,
    )
}

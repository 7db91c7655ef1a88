pub mod camera;
pub mod camera_controller;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod entity_display;
pub mod environment;
pub mod error;
pub mod events;
pub mod input;
pub mod loaders;
pub mod math;
pub mod orchestrator;
pub mod picker;
pub mod renderer;
pub mod scene;
pub mod shapes;
pub mod timing;
pub mod viewport;

pub use camera_controller::{CameraController, CameraPose, NavigationState};
pub use catalog::CatalogEntity;
pub use config::{LoadFailurePolicy, StoreConfig};
pub use error::{Result, StoreError};
pub use events::{EventChannel, EventKind, StoreEvent, SubscriptionId};
pub use input::{InputEvent, NavKey};
pub use orchestrator::{SceneOrchestrator, SceneState};
pub use renderer::{LogRenderer, Renderer, Viewport};

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use storewalk::catalog::load_catalog;
use storewalk::cli::Cli;
use storewalk::input::{InputEvent, WinitInput};
use storewalk::loaders::GltfLoader;
use storewalk::timing::Clock;
use storewalk::{EventKind, LogRenderer, SceneOrchestrator, StoreConfig, StoreEvent, Viewport};

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
const HEADLESS_DT: f32 = 1.0 / 60.0;

type Store = SceneOrchestrator<LogRenderer>;

// === Windowed host ===

struct App {
    window: Option<Arc<Window>>,
    store: Store,
    input: WinitInput,
    clock: Clock,
}

impl App {
    fn new(store: Store) -> Self {
        let threshold = store.config().click_drag_threshold_px;
        Self {
            window: None,
            store,
            input: WinitInput::new(threshold),
            clock: Clock::new(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Storewalk")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.store.handle_input(InputEvent::Resize {
            width: size.width,
            height: size.height,
        });
        self.clock.reset();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.store.dispose();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let delta = self.clock.tick();
                if !self.store.tick(delta) {
                    event_loop.exit();
                }
            }
            other => {
                for input in self.input.process_event(&other) {
                    self.store.handle_input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

// === Setup ===

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {path:?}"))?,
        None => StoreConfig::default(),
    };
    if let Some(asset) = &cli.environment {
        config.environment_asset = asset.clone();
    }
    if let Some(policy) = cli.on_load_failure {
        config.on_load_failure = policy;
    }
    Ok(config)
}

fn build_store(cli: &Cli) -> anyhow::Result<Store> {
    let config = load_config(cli)?;
    let entities = load_catalog(&cli.catalog)
        .with_context(|| format!("failed to read catalog {:?}", cli.catalog))?;
    let base_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut store = SceneOrchestrator::new(config, entities, LogRenderer::new(), Box::new(GltfLoader::new(base_dir)))?
        .with_viewport(Viewport::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT));

    for kind in [
        EventKind::LoadingComplete,
        EventKind::StoreEntered,
        EventKind::ExitStore,
        EventKind::SectionChange,
        EventKind::EntityClick,
    ] {
        store.subscribe(kind, log_event);
    }

    pollster::block_on(store.init()).context("store initialisation failed")?;
    if store.is_degraded() {
        info!("running with the procedural environment");
    }
    Ok(store)
}

fn log_event(event: &StoreEvent) -> anyhow::Result<()> {
    match event {
        StoreEvent::SectionChange { index } => info!("event: sectionChange {index}"),
        StoreEvent::EntityClick { entity } => {
            info!("event: entityClick {} \"{}\" {:.2}", entity.id, entity.name, entity.price)
        }
        other => info!("event: {:?}", other.kind()),
    }
    Ok(())
}

// === Headless walk-through ===

fn run_frames(store: &mut Store, frames: u32) {
    for _ in 0..frames {
        store.tick(HEADLESS_DT);
    }
}

fn run_headless(mut store: Store, frames: u32) {
    let center = {
        let viewport = store.viewport();
        Vec2::new(viewport.width as f32 * 0.5, viewport.height as f32 * 0.5)
    };

    run_frames(&mut store, frames);
    store.handle_input(InputEvent::Click { position: center });
    run_frames(&mut store, frames);

    for section in 1..store.controller().section_count() {
        store.navigate_to_section(section);
        run_frames(&mut store, frames);
        store.handle_input(InputEvent::Click { position: center });
    }

    store.exit_store();
    run_frames(&mut store, frames);
    info!("headless walk-through finished after {} frames", store.frames());
    store.dispose();
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = build_store(&cli)?;

    if cli.headless {
        run_headless(store, cli.frames);
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(store);

    info!("Storewalk - click to enter, drag to look around, scroll or W/S to move, Escape to leave");
    event_loop.run_app(&mut app)?;

    Ok(())
}

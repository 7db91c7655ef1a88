//! Composes environment, entity displays, camera controller, picker, and event channel into
//! the navigable store, driven one frame at a time by the host.

use glam::Vec2;
use log::{debug, info, warn};

use crate::camera_controller::CameraController;
use crate::catalog::CatalogEntity;
use crate::config::StoreConfig;
use crate::entity_display::{EntityDisplay, SlotTable};
use crate::environment::Environment;
use crate::error::Result;
use crate::events::{EventChannel, EventKind, StoreEvent, SubscriptionId};
use crate::input::{InputEvent, NavKey};
use crate::loaders::AssetLoader;
use crate::picker::{InteractionPicker, PickTarget};
use crate::renderer::{Renderer, Viewport};
use crate::scene::{NodeId, SceneGraph};
use crate::timing::Countdown;
use crate::viewport::{NoopViewportLock, ScopedViewportLock, ViewportLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Uninitialized,
    Loading,
    Ready { has_entered: bool },
    Disposed,
}

/// Event published once its settle timer runs out
struct DelayedEvent {
    timer: Countdown,
    event: StoreEvent,
}

pub struct SceneOrchestrator<R: Renderer> {
    config: StoreConfig,
    entities: Vec<CatalogEntity>,
    scene: SceneGraph,
    renderer: R,
    loader: Box<dyn AssetLoader>,
    events: EventChannel,
    viewport_lock: ScopedViewportLock,
    viewport: Viewport,
    controller: CameraController,
    environment: Option<Environment>,
    displays: Vec<EntityDisplay>,
    display_root: Option<NodeId>,
    delayed: Vec<DelayedEvent>,
    state: SceneState,
    running: bool,
    frames: u64,
}

impl<R: Renderer> SceneOrchestrator<R> {
    pub fn new(
        config: StoreConfig,
        entities: Vec<CatalogEntity>,
        renderer: R,
        loader: Box<dyn AssetLoader>,
    ) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(1280, 720);
        let controller = CameraController::new(&config, viewport.aspect());
        let mut renderer = renderer;
        renderer.resize(viewport);

        Ok(Self {
            config,
            entities,
            scene: SceneGraph::new(),
            renderer,
            loader,
            events: EventChannel::new(),
            viewport_lock: ScopedViewportLock::new(Box::new(NoopViewportLock)),
            viewport,
            controller,
            environment: None,
            displays: Vec::new(),
            display_root: None,
            delayed: Vec::new(),
            state: SceneState::Uninitialized,
            running: false,
            frames: 0,
        })
    }

    pub fn with_viewport_lock(mut self, lock: Box<dyn ViewportLock>) -> Self {
        self.viewport_lock = ScopedViewportLock::new(lock);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.resize(viewport.width, viewport.height);
        self
    }

    /// Replace the scene graph before `init`, e.g. one with a resource budget
    pub fn with_scene(mut self, scene: SceneGraph) -> Self {
        if self.state == SceneState::Uninitialized {
            self.scene = scene;
        }
        self
    }

    // --- accessors ---

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn has_entered(&self) -> bool {
        matches!(self.state, SceneState::Ready { has_entered: true })
    }

    /// True when the environment asset failed and the procedural fallback is shown
    pub fn is_degraded(&self) -> bool {
        self.environment.as_ref().is_some_and(Environment::is_fallback)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames executed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn displays(&self) -> &[EntityDisplay] {
        &self.displays
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    // --- lifecycle ---

    /// Build the environment and displays and start the frame loop. `loadingComplete` follows
    /// after the configured delay. With the `throw` load policy an asset failure is returned and
    /// the orchestrator goes back to `Uninitialized`, so `init` may be called again.
    pub async fn init(&mut self) -> Result<()> {
        match self.state {
            SceneState::Uninitialized => {}
            // Only reachable when an earlier `init` future was dropped before completing
            SceneState::Loading => {
                warn!("previous initialisation was abandoned, starting over");
                self.release_scene_content();
            }
            state => {
                debug!("init ignored in state {state:?}");
                return Ok(());
            }
        }
        self.state = SceneState::Loading;
        info!("initialising store with {} catalog entities", self.entities.len());

        let environment =
            match Environment::load(&mut self.scene, self.loader.as_ref(), &self.config).await {
                Ok(environment) => environment,
                Err(err) => {
                    warn!("store initialisation aborted: {err}");
                    self.state = SceneState::Uninitialized;
                    return Err(err);
                }
            };
        self.environment = Some(environment);

        let parent = self.scene.root();
        let display_root = self.scene.add_node(parent, "displays");
        self.display_root = Some(display_root);

        let table = SlotTable::new(self.config.slots.clone());
        let assignment = table.assign(&self.entities);
        if assignment.truncated > 0 {
            warn!(
                "{} entities exceed the {} display slots and are not shown",
                assignment.truncated,
                table.capacity()
            );
        }
        let placed: Vec<_> = assignment
            .placed
            .into_iter()
            .map(|(slot, entity)| EntityDisplay::new(entity.clone(), slot))
            .collect();

        // Each display is owned by `self` before its first await so an abandoned init can
        // release it
        for display in placed {
            self.displays.push(display);
            let Some(display) = self.displays.last_mut() else {
                continue;
            };
            if let Err(err) = display
                .create(&mut self.scene, display_root, self.loader.as_ref())
                .await
            {
                warn!("display for {} skipped: {err}", display.entity().id);
                display.dispose(&mut self.scene);
                self.displays.pop();
            }
        }

        self.running = true;
        self.schedule(self.config.loading_complete_delay_secs, StoreEvent::LoadingComplete);
        self.state = SceneState::Ready { has_entered: false };
        info!(
            "store ready: {} displays, {} environment",
            self.displays.len(),
            if self.is_degraded() { "fallback" } else { "loaded" }
        );
        Ok(())
    }

    /// One frame: camera, then displays, then settle timers, then a single render call.
    /// Returns false, doing nothing, when the loop is not running.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.running {
            return false;
        }
        self.frames += 1;

        self.controller.update(delta);
        for display in &mut self.displays {
            display.update(&mut self.scene, delta);
        }
        self.advance_timers(delta);

        if let Err(err) = self.renderer.render(&self.scene, self.controller.camera()) {
            warn!("render error: {err:#}");
        }
        true
    }

    /// Stop the loop and release everything. Later calls return false.
    pub fn dispose(&mut self) -> bool {
        if self.state == SceneState::Disposed {
            return false;
        }
        self.running = false;
        self.delayed.clear();
        self.release_scene_content();

        self.controller.dispose();
        self.viewport_lock.release();
        self.events.clear(None);
        self.renderer.detach();
        self.state = SceneState::Disposed;
        info!("store disposed after {} frames", self.frames);
        true
    }

    fn release_scene_content(&mut self) {
        for display in &mut self.displays {
            display.dispose(&mut self.scene);
        }
        self.displays.clear();
        if let Some(root) = self.display_root.take() {
            self.scene.remove_node(root);
        }
        if let Some(mut environment) = self.environment.take() {
            environment.dispose(&mut self.scene);
        }
    }

    // --- state transitions ---

    /// Fly into the store. `storeEntered` is published after the settle delay.
    pub fn enter_store(&mut self) -> bool {
        if self.state != (SceneState::Ready { has_entered: false }) {
            return false;
        }
        self.controller.enter();
        self.state = SceneState::Ready { has_entered: true };
        self.viewport_lock.acquire();
        self.cancel_scheduled(EventKind::ExitStore);
        self.schedule(self.config.settle_delay_secs, StoreEvent::StoreEntered);
        info!("entering store");
        true
    }

    /// Fly back outside. `exitStore` is published after the settle delay.
    pub fn exit_store(&mut self) -> bool {
        if self.state != (SceneState::Ready { has_entered: true }) {
            return false;
        }
        self.controller.exit();
        self.state = SceneState::Ready { has_entered: false };
        self.viewport_lock.release();
        self.cancel_scheduled(EventKind::StoreEntered);
        self.schedule(self.config.settle_delay_secs, StoreEvent::ExitStore);
        info!("exiting store");
        true
    }

    /// Ask the camera to fly to a section (clamped). `sectionChange` is published when the request
    /// is accepted: a flight started, or the camera already rests at that section. A request
    /// dropped because another flight is running publishes nothing. Returns whether a flight
    /// started.
    pub fn navigate_to_section(&mut self, index: usize) -> bool {
        if !self.has_entered() {
            return false;
        }
        let index = self.controller.clamp_section(index);
        let state = self.controller.state();
        let settled_here = !state.is_animating && state.current_section == index;

        let started = self.controller.navigate_to_section(index);
        if started || settled_here {
            self.events.publish(&StoreEvent::SectionChange { index });
        } else {
            debug!("section {index} request dropped during a flight");
        }
        started
    }

    // --- input ---

    pub fn handle_input(&mut self, event: InputEvent) {
        if self.state == SceneState::Disposed {
            return;
        }
        let entered = self.has_entered();

        match event {
            InputEvent::Resize { width, height } => self.resize(width, height),
            InputEvent::PointerDown { position } if entered => self.controller.pointer_down(position),
            InputEvent::PointerMove { position } if entered => self.controller.pointer_move(position),
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => self.controller.pointer_up(),
            InputEvent::Click { position } => match self.state {
                SceneState::Ready { has_entered: false } => {
                    self.enter_store();
                }
                SceneState::Ready { has_entered: true } => self.click(position),
                _ => {}
            },
            InputEvent::Wheel { delta_y } if entered => {
                if let Some(index) = self.controller.handle_scroll(delta_y) {
                    self.events.publish(&StoreEvent::SectionChange { index });
                }
            }
            InputEvent::Key(NavKey::Forward) if entered => self.step_section(1),
            InputEvent::Key(NavKey::Back) if entered => self.step_section(-1),
            InputEvent::Key(NavKey::Exit) if entered => {
                self.exit_store();
            }
            _ => {}
        }
    }

    fn step_section(&mut self, direction: i32) {
        if let Some(index) = self.controller.step_section(direction) {
            self.events.publish(&StoreEvent::SectionChange { index });
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.controller.set_viewport(width, height);
        self.renderer.resize(self.viewport);
    }

    /// Entity under a screen position, without publishing anything
    pub fn pick(&self, position: Vec2) -> Option<&CatalogEntity> {
        let targets: Vec<PickTarget> = self
            .displays
            .iter()
            .flat_map(|display| {
                display
                    .pickable_nodes()
                    .iter()
                    .map(move |&node| PickTarget { node, entity: display.entity() })
            })
            .collect();

        InteractionPicker::pick(
            position,
            self.viewport,
            self.controller.camera(),
            &self.scene,
            &targets,
        )
        .entity()
    }

    fn click(&mut self, position: Vec2) {
        let Some(entity) = self.pick(position).cloned() else {
            debug!("click at {position} hit nothing");
            return;
        };
        info!("entity clicked: {} ({})", entity.name, entity.id);
        self.events.publish(&StoreEvent::EntityClick { entity });
    }

    // --- settle timers ---

    fn schedule(&mut self, delay: f32, event: StoreEvent) {
        if delay <= 0.0 {
            self.events.publish(&event);
            return;
        }
        self.delayed.push(DelayedEvent {
            timer: Countdown::started(delay),
            event,
        });
    }

    fn cancel_scheduled(&mut self, kind: EventKind) {
        self.delayed.retain(|d| d.event.kind() != kind);
    }

    fn advance_timers(&mut self, delta: f32) {
        let mut due = Vec::new();
        self.delayed.retain_mut(|d| {
            if d.timer.tick(delta) {
                due.push(d.event.clone());
                false
            } else {
                true
            }
        });
        for event in due {
            debug!("publishing {:?}", event.kind());
            self.events.publish(&event);
        }
    }
}

impl<R: Renderer> Drop for SceneOrchestrator<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

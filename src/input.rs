use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels per wheel line, for line-based scroll deltas
const LINE_HEIGHT_PX: f32 = 40.0;

/// Keyboard navigation intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    Forward,
    Back,
    Exit,
}

/// Host-independent input for the orchestrator. Screen positions are physical pixels with the
/// origin at the top-left of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2 },
    PointerLeave,
    Click { position: Vec2 },
    /// Positive scrolls forward (down the page)
    Wheel { delta_y: f32 },
    Resize { width: u32, height: u32 },
    Key(NavKey),
}

/// Adapter that turns winit window events into `InputEvent`s. A left press and release that
/// travel less than the drag threshold also produce a `Click`.
#[derive(Debug, Clone)]
pub struct WinitInput {
    cursor: Option<Vec2>,
    press_origin: Option<Vec2>,
    drag_threshold: f32,
}

impl WinitInput {
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            cursor: None,
            press_origin: None,
            drag_threshold,
        }
    }

    pub fn process_event(&mut self, event: &WindowEvent) -> Vec<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.left_button(*state == ElementState::Pressed)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports positive y for scrolling up
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.wheel(delta_y)
            }
            WindowEvent::Resized(size) => vec![InputEvent::Resize {
                width: size.width,
                height: size.height,
            }],
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                match event.physical_key {
                    PhysicalKey::Code(code) => Self::keycode_to_nav(code)
                        .map(InputEvent::Key)
                        .into_iter()
                        .collect(),
                    PhysicalKey::Unidentified(_) => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> Vec<InputEvent> {
        self.cursor = Some(position);
        vec![InputEvent::PointerMove { position }]
    }

    pub fn cursor_left(&mut self) -> Vec<InputEvent> {
        self.cursor = None;
        self.press_origin = None;
        vec![InputEvent::PointerLeave]
    }

    pub fn left_button(&mut self, pressed: bool) -> Vec<InputEvent> {
        let Some(position) = self.cursor else {
            return Vec::new();
        };

        if pressed {
            self.press_origin = Some(position);
            return vec![InputEvent::PointerDown { position }];
        }

        let mut events = vec![InputEvent::PointerUp { position }];
        if let Some(origin) = self.press_origin.take() {
            if origin.distance(position) < self.drag_threshold {
                events.push(InputEvent::Click { position });
            }
        }
        events
    }

    pub fn wheel(&mut self, delta_y: f32) -> Vec<InputEvent> {
        if delta_y == 0.0 {
            return Vec::new();
        }
        vec![InputEvent::Wheel { delta_y }]
    }

    fn keycode_to_nav(code: KeyCode) -> Option<NavKey> {
        match code {
            KeyCode::ArrowUp | KeyCode::KeyW | KeyCode::PageDown => Some(NavKey::Forward),
            KeyCode::ArrowDown | KeyCode::KeyS | KeyCode::PageUp => Some(NavKey::Back),
            KeyCode::Escape => Some(NavKey::Exit),
            _ => None,
        }
    }
}

//! Camera pose ownership: free orbit by pointer drag and eased section-to-section flights.
//!
//! Both interaction surfaces write only to the *target* pose. `update` is the single place the
//! smoothed *current* pose moves, by a fixed damping step towards the target each frame.

use glam::{Vec2, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::config::StoreConfig;
use crate::math::{ease_in_out_cubic, Spherical};
use crate::timing::Tween;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            look_at: self.look_at.lerp(other.look_at, t),
        }
    }

    /// Largest of the position and look-at separations
    pub fn distance(&self, other: &CameraPose) -> f32 {
        self.position
            .distance(other.position)
            .max(self.look_at.distance(other.look_at))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current_section: usize,
    pub is_animating: bool,
    pub has_entered: bool,
}

/// What a finished flight commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flight {
    Section(usize),
    Enter,
    Exit,
}

/// Which interaction last wrote the target; picks the damping factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetWriter {
    Orbit,
    Navigation,
}

pub struct CameraController {
    camera: PerspectiveCamera,
    current: CameraPose,
    target: CameraPose,
    waypoints: Vec<CameraPose>,
    exterior: CameraPose,
    state: NavigationState,
    flight: Option<(Flight, Tween<CameraPose>)>,
    /// Orbit (theta, phi) applied during the current flight, layered over the tweened pose
    flight_orbit: Vec2,
    drag_anchor: Option<Vec2>,
    last_writer: TargetWriter,
    sensitivity: f32,
    pole_epsilon: f32,
    orbit_damping: f32,
    navigation_damping: f32,
    flight_duration: f32,
    attached: bool,
}

impl CameraController {
    /// Starts outside the store at the exterior pose, section 0, not entered
    pub fn new(config: &StoreConfig, aspect: f32) -> Self {
        let mut camera = PerspectiveCamera::new(
            config.fov_y_degrees.to_radians(),
            aspect,
            config.near,
            config.far,
        );
        let start = config.exterior_pose;
        camera.position = start.position;
        camera.look_at = start.look_at;

        Self {
            camera,
            current: start,
            target: start,
            waypoints: config.waypoints.clone(),
            exterior: start,
            state: NavigationState {
                current_section: 0,
                is_animating: false,
                has_entered: false,
            },
            flight: None,
            flight_orbit: Vec2::ZERO,
            drag_anchor: None,
            last_writer: TargetWriter::Navigation,
            sensitivity: config.orbit_sensitivity,
            pole_epsilon: config.pole_epsilon,
            orbit_damping: config.orbit_damping,
            navigation_damping: config.navigation_damping,
            flight_duration: config.navigation_duration_secs,
            attached: true,
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_pose(&self) -> CameraPose {
        self.current
    }

    pub fn target_pose(&self) -> CameraPose {
        self.target
    }

    pub fn section_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoint(&self, index: usize) -> Option<CameraPose> {
        self.waypoints.get(index).copied()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Spherical coordinates of the target position around the target look-at
    pub fn orbit_angles(&self) -> Spherical {
        Spherical::from_offset(self.target.position - self.target.look_at)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    // --- free orbit ---

    pub fn pointer_down(&mut self, position: Vec2) {
        if self.attached {
            self.drag_anchor = Some(position);
        }
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        let Some(last) = self.drag_anchor else {
            return;
        };
        let delta = position - last;
        self.drag_anchor = Some(position);
        self.orbit_by(delta);
    }

    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
    }

    /// Rotate the target position around the target look-at by a pixel delta. During a flight
    /// the rotation is kept and re-applied on top of the tweened pose every frame.
    pub fn orbit_by(&mut self, delta: Vec2) {
        if !self.attached {
            return;
        }
        let angles = Vec2::new(-delta.x, delta.y) * self.sensitivity;
        if self.flight.is_some() {
            self.flight_orbit += angles;
        }
        self.target = self.orbited(self.target, angles);
        self.last_writer = TargetWriter::Orbit;
    }

    /// `pose` with its position rotated about its look-at by (theta, phi), clear of the poles
    fn orbited(&self, pose: CameraPose, angles: Vec2) -> CameraPose {
        let mut spherical = Spherical::from_offset(pose.position - pose.look_at);
        if spherical.radius == 0.0 || angles == Vec2::ZERO {
            return pose;
        }
        spherical.theta += angles.x;
        spherical.phi += angles.y;
        let spherical = spherical.clamp_phi(self.pole_epsilon);
        CameraPose::new(pose.look_at + spherical.to_offset(), pose.look_at)
    }

    // --- section navigation ---

    /// Wheel input: the sign of `delta_y` steps one section. Returns the newly targeted section.
    pub fn handle_scroll(&mut self, delta_y: f32) -> Option<usize> {
        if delta_y == 0.0 || delta_y.is_nan() {
            return None;
        }
        self.step_section(if delta_y > 0.0 { 1 } else { -1 })
    }

    /// Move one section forwards (`+1`) or backwards (`-1`), clamped to the waypoint table
    pub fn step_section(&mut self, direction: i32) -> Option<usize> {
        if !self.attached || self.state.is_animating {
            return None;
        }
        let last = self.section_count().saturating_sub(1) as i64;
        let next = (self.state.current_section as i64 + direction.signum() as i64).clamp(0, last);
        let next = next as usize;
        (next != self.state.current_section && self.navigate_to_section(next)).then_some(next)
    }

    /// Start an eased flight to the waypoint at `index` (clamped). Dropped, returning false, when
    /// `index` is already the current section or another flight is in progress.
    pub fn navigate_to_section(&mut self, index: usize) -> bool {
        if !self.attached || self.waypoints.is_empty() {
            return false;
        }
        let index = self.clamp_section(index);
        if index == self.state.current_section || self.state.is_animating {
            return false;
        }

        let end = self.waypoints[index];
        debug!(
            "navigating from section {} to {index}",
            self.state.current_section
        );
        self.start_flight(Flight::Section(index), end);
        true
    }

    pub fn clamp_section(&self, index: usize) -> usize {
        index.min(self.section_count().saturating_sub(1))
    }

    // --- enter / exit ---

    /// Fly from outside to the current section's waypoint. False if already entered.
    pub fn enter(&mut self) -> bool {
        if !self.attached || self.state.has_entered {
            return false;
        }
        self.state.has_entered = true;
        if let Some(end) = self.waypoint(self.state.current_section) {
            self.start_flight(Flight::Enter, end);
        }
        true
    }

    /// Cancel any flight and return to the exterior pose, resetting to section 0.
    /// False if not entered.
    pub fn exit(&mut self) -> bool {
        if !self.attached || !self.state.has_entered {
            return false;
        }
        self.state.has_entered = false;
        self.state.current_section = 0;
        self.drag_anchor = None;
        self.flight = None;
        self.flight_orbit = Vec2::ZERO;
        self.start_flight(Flight::Exit, self.exterior);
        true
    }

    fn start_flight(&mut self, flight: Flight, end: CameraPose) {
        self.state.is_animating = true;
        self.last_writer = TargetWriter::Navigation;
        self.flight_orbit = Vec2::ZERO;
        self.flight = Some((flight, Tween::new(self.target, end, self.flight_duration)));
    }

    // --- per frame ---

    /// Advance any flight, then move the current pose one damping step towards the target and
    /// apply it to the camera. Safe to call every frame regardless of interaction mode.
    pub fn update(&mut self, delta: f32) {
        if let Some((flight, mut tween)) = self.flight.take() {
            let (progress, done) = tween.advance(delta);
            self.last_writer = TargetWriter::Navigation;

            if done {
                self.target = self.orbited(tween.to, self.flight_orbit);
                self.flight_orbit = Vec2::ZERO;
                self.state.is_animating = false;
                if let Flight::Section(index) = flight {
                    self.state.current_section = index;
                }
                debug!("flight {flight:?} finished");
            } else {
                let base = tween.from.lerp(&tween.to, ease_in_out_cubic(progress));
                self.target = self.orbited(base, self.flight_orbit);
                self.flight = Some((flight, tween));
            }
        }

        let k = match self.last_writer {
            TargetWriter::Orbit => self.orbit_damping,
            TargetWriter::Navigation => self.navigation_damping,
        };
        self.current = self.current.lerp(&self.target, k);
        self.camera.position = self.current.position;
        self.camera.look_at = self.current.look_at;
    }

    /// Stop responding to input. Returns true only on the first call.
    pub fn dispose(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        self.drag_anchor = None;
        self.flight = None;
        self.flight_orbit = Vec2::ZERO;
        self.state.is_animating = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(&StoreConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn starts_outside_at_section_zero() {
        let c = controller();
        let state = c.state();
        assert_eq!(state.current_section, 0);
        assert!(!state.is_animating);
        assert!(!state.has_entered);
        assert_eq!(c.current_pose(), StoreConfig::default().exterior_pose);
    }

    #[test]
    fn enter_is_one_shot_until_exit() {
        let mut c = controller();
        assert!(c.enter());
        assert!(!c.enter());
        assert!(c.exit());
        assert!(!c.exit());
        assert!(c.enter());
    }

    #[test]
    fn exit_cancels_section_flight_and_resets_section() {
        let mut c = controller();
        c.enter();
        c.update(10.0);
        assert!(c.navigate_to_section(2));
        c.update(0.1);
        assert!(c.exit());
        c.update(10.0);
        let state = c.state();
        assert_eq!(state.current_section, 0);
        assert!(!state.is_animating);
        assert!(c.target_pose().distance(&StoreConfig::default().exterior_pose) < 1e-4);
    }

    #[test]
    fn flight_eases_target_midway() {
        let mut c = controller();
        c.enter();
        c.update(10.0);
        let start = c.target_pose();
        let end = c.waypoint(1).unwrap();

        c.navigate_to_section(1);
        c.update(0.15); // 10% of 1.5 s
        let expected = start.lerp(&end, ease_in_out_cubic(0.1));
        assert!(c.target_pose().distance(&expected) < 1e-4);
    }

    #[test]
    fn orbit_keeps_look_at_and_radius() {
        let mut c = controller();
        let before = c.target_pose();
        let radius = c.orbit_angles().radius;

        c.pointer_down(Vec2::new(100.0, 100.0));
        c.pointer_move(Vec2::new(160.0, 80.0));
        c.pointer_up();

        let after = c.target_pose();
        assert_eq!(after.look_at, before.look_at);
        assert_ne!(after.position, before.position);
        assert!((c.orbit_angles().radius - radius).abs() < 1e-3);
        // current pose is untouched until update runs
        assert_eq!(c.current_pose(), before);
    }

    #[test]
    fn move_without_press_does_nothing() {
        let mut c = controller();
        let before = c.target_pose();
        c.pointer_move(Vec2::new(50.0, 50.0));
        assert_eq!(c.target_pose(), before);
    }

    #[test]
    fn disposed_controller_ignores_input() {
        let mut c = controller();
        assert!(c.dispose());
        assert!(!c.dispose());
        assert!(!c.enter());
        assert!(!c.navigate_to_section(1));
        c.pointer_down(Vec2::ZERO);
        assert!(!c.is_dragging());
    }

    #[test]
    fn scroll_zero_is_ignored() {
        let mut c = controller();
        assert_eq!(c.handle_scroll(0.0), None);
        assert_eq!(c.handle_scroll(120.0), Some(1));
    }
}

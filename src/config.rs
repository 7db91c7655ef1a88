use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera_controller::CameraPose;
use crate::entity_display::{Slot, SlotSide};
use crate::error::{Result, StoreError};

/// What `init()` does when the environment asset cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Abort `init()` with the load error
    Throw,
    /// Build the procedural environment and carry on in degraded mode
    #[default]
    Fallback,
}

impl std::str::FromStr for LoadFailurePolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "throw" => Ok(Self::Throw),
            "fallback" => Ok(Self::Fallback),
            other => Err(StoreError::Config(format!(
                "unknown load failure policy `{other}` (expected throw or fallback)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub environment_asset: String,
    pub on_load_failure: LoadFailurePolicy,

    pub loading_complete_delay_secs: f32,
    pub settle_delay_secs: f32,
    pub navigation_duration_secs: f32,

    /// Radians of orbit per pixel of drag
    pub orbit_sensitivity: f32,
    pub orbit_damping: f32,
    pub navigation_damping: f32,
    pub pole_epsilon: f32,
    pub click_drag_threshold_px: f32,

    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,

    pub exterior_pose: CameraPose,
    pub waypoints: Vec<CameraPose>,
    pub slots: Vec<Slot>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let aisle_z = [-2.0, -8.0, -14.0];

        let waypoints = aisle_z
            .iter()
            .map(|&z| CameraPose::new(Vec3::new(0.0, 1.7, z + 5.0), Vec3::new(0.0, 1.2, z)))
            .collect();

        let slots = aisle_z
            .iter()
            .flat_map(|&z| {
                [
                    Slot::new(Vec3::new(-3.0, 0.0, z), SlotSide::Left),
                    Slot::new(Vec3::new(3.0, 0.0, z), SlotSide::Right),
                ]
            })
            .collect();

        Self {
            environment_asset: "models/store.gltf".to_string(),
            on_load_failure: LoadFailurePolicy::Fallback,
            loading_complete_delay_secs: 0.5,
            settle_delay_secs: 1.5,
            navigation_duration_secs: 1.5,
            orbit_sensitivity: 0.005,
            orbit_damping: 0.1,
            navigation_damping: 0.05,
            pole_epsilon: 0.01,
            click_drag_threshold_px: 4.0,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 200.0,
            exterior_pose: CameraPose::new(Vec3::new(0.0, 6.0, 18.0), Vec3::new(0.0, 1.0, -6.0)),
            waypoints,
            slots,
        }
    }
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn section_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(StoreError::Config(msg));

        if self.waypoints.is_empty() {
            return fail("at least one waypoint is required".into());
        }
        if self.slots.is_empty() {
            return fail("at least one display slot is required".into());
        }
        for (name, value) in [
            ("navigation_duration_secs", self.navigation_duration_secs),
            ("fov_y_degrees", self.fov_y_degrees),
            ("near", self.near),
            ("orbit_sensitivity", self.orbit_sensitivity),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return fail(format!("{name} must be positive, got {value}"));
            }
        }
        for (name, value) in [
            ("loading_complete_delay_secs", self.loading_complete_delay_secs),
            ("settle_delay_secs", self.settle_delay_secs),
            ("click_drag_threshold_px", self.click_drag_threshold_px),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return fail(format!("{name} must not be negative, got {value}"));
            }
        }
        for (name, value) in [
            ("orbit_damping", self.orbit_damping),
            ("navigation_damping", self.navigation_damping),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return fail(format!("{name} must be in (0, 1], got {value}"));
            }
        }
        if !(self.pole_epsilon > 0.0 && self.pole_epsilon < std::f32::consts::FRAC_PI_2) {
            return fail(format!("pole_epsilon must be in (0, pi/2), got {}", self.pole_epsilon));
        }
        if self.far <= self.near {
            return fail(format!("far ({}) must exceed near ({})", self.far, self.near));
        }
        Ok(())
    }
}

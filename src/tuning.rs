//! Data-driven game balance
//!
//! Gameplay thresholds live here instead of being sprinkled through the
//! simulation. Defaults reproduce the shipped game; a JSON file can
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// RNG seed for vehicle/cloud layout and lose quips
    pub seed: u64,
    /// Downward acceleration (units/s²)
    pub gravity: f32,

    // === Dash mode ===
    /// Upward speed applied by a jump
    pub jump_velocity: f32,
    /// Falling speed, as a fraction of `jump_velocity`, above which a
    /// mid-air jump is still allowed
    pub jump_grace_ratio: f32,
    /// Minimum jump spacing (seconds)
    pub jump_throttle_secs: f32,
    /// Overlap depth (both axes) before a hazard counts as a hit
    pub hazard_penetration: f32,
    /// Couch speed when the run starts
    pub run_speed: f32,
    /// Couch speed after the rules dialog
    pub resume_speed: f32,
    /// Vehicle speed range (inclusive)
    pub vehicle_speed: (i32, i32),
    /// Cloud speed range (inclusive)
    pub cloud_speed: (i32, i32),

    // === Golf mode ===
    /// Swing impulse per charge step
    pub swing_scale: f32,
    /// Charge cap
    pub max_charge: u32,
    /// Seconds between charge steps
    pub charge_interval_secs: f32,
    /// Minimum spacing between aim samples (seconds)
    pub aim_throttle_secs: f32,
    /// Horizontal speed above which the hole bounces the ball out
    pub too_hot_speed: f32,
    /// Vertical deflection per unit of horizontal speed for a too-hot ball
    pub too_hot_deflection: f32,
    /// Max horizontal center distance between ball and hole for a score
    pub hole_tolerance: f32,
    /// How far the ball must enter the sand trap before it counts
    pub sand_trap_inset: f32,
    /// Distance past the world's left/right edge that loses the ball
    pub out_of_bounds_margin: f32,
    /// The ball must be past this x before stopping counts as a loss
    pub stop_check_min_x: f32,
    /// Speed below which the ball counts as stopped
    pub stop_speed: f32,
    /// Ball restitution (x, y)
    pub ball_bounce: (f32, f32),
    /// Ball horizontal drag (units/s²)
    pub ball_drag: f32,
    /// Velocity component that earns applause
    pub applause_speed: f32,
    /// Delay after the impulse before the applause check (seconds)
    pub applause_delay_secs: f32,

    // === Camera ===
    /// Dash camera horizontal follow lerp
    pub dash_follow_lerp: f32,
    /// Dash parallax ratio (x, y)
    pub dash_parallax: (f32, f32),
    /// Golf parallax ratio (both axes)
    pub golf_parallax: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0xC0C4_601F,
            gravity: 600.0,

            jump_velocity: 200.0,
            jump_grace_ratio: 0.6,
            jump_throttle_secs: 0.1,
            hazard_penetration: 24.0,
            run_speed: 200.0,
            resume_speed: 250.0,
            vehicle_speed: (20, 190),
            cloud_speed: (-175, 0),

            swing_scale: 90.0,
            max_charge: 10,
            charge_interval_secs: 0.3,
            aim_throttle_secs: 0.05,
            too_hot_speed: 150.0,
            too_hot_deflection: 1.8,
            hole_tolerance: 4.0,
            sand_trap_inset: 10.0,
            out_of_bounds_margin: 50.0,
            stop_check_min_x: 100.0,
            stop_speed: 1.0,
            ball_bounce: (0.6, 0.5),
            ball_drag: 80.0,
            applause_speed: 300.0,
            applause_delay_secs: 0.5,

            dash_follow_lerp: 0.5,
            dash_parallax: (0.1, 0.025),
            golf_parallax: 0.2,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> TuningError {
            TuningError::Invalid { field, reason }
        }

        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(invalid("gravity", "must be finite and non-negative"));
        }
        if self.max_charge == 0 {
            return Err(invalid("max_charge", "must be at least 1"));
        }
        if self.charge_interval_secs <= 0.0 {
            return Err(invalid("charge_interval_secs", "must be positive"));
        }
        if self.aim_throttle_secs < 0.0 || self.jump_throttle_secs < 0.0 {
            return Err(invalid("throttle", "must not be negative"));
        }
        let (bx, by) = self.ball_bounce;
        if !(0.0..=1.0).contains(&bx) || !(0.0..=1.0).contains(&by) {
            return Err(invalid("ball_bounce", "restitution must be in [0, 1]"));
        }
        if self.vehicle_speed.0 > self.vehicle_speed.1 || self.cloud_speed.0 > self.cloud_speed.1 {
            return Err(invalid("speed range", "min must not exceed max"));
        }
        if !(0.0..1.0).contains(&self.golf_parallax)
            || !(0.0..1.0).contains(&self.dash_parallax.0)
            || !(0.0..1.0).contains(&self.dash_parallax.1)
        {
            return Err(invalid("parallax", "ratio must be in [0, 1)"));
        }
        Ok(())
    }

    /// Falling speed above which a mid-air jump is allowed
    pub fn jump_grace_speed(&self) -> f32 {
        self.jump_grace_ratio * self.jump_velocity
    }
}

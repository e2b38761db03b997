//! Couch Golf - a side-scrolling dash and golf mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, swing, game modes)
//! - `gateway`: Scene transition routing for the presentation layer
//! - `tuning`: Data-driven game balance

pub mod gateway;
pub mod sim;
pub mod tuning;

pub use gateway::{SceneGateway, SceneRouter, Screen};
pub use sim::{Game, ModeId, TickInput};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the arcade physics step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest frame delta the integrator is expected to handle in one step
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Viewport size in world units
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Height of the ground strip at the bottom of both worlds
    pub const GROUND_HEIGHT: f32 = 150.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Dash mode world
    pub const DASH_WORLD_WIDTH: f32 = 8000.0;
    /// Distance at which the rules dialog interrupts the run
    pub const RULES_TRIGGER_DISTANCE: f32 = 800.0;
    /// Distance at which the run hands over to golf mode
    pub const GOLF_TRIGGER_DISTANCE: f32 = 7200.0;
    /// Left edge of the couch at the start of a run
    pub const DASH_START_X: f32 = 180.0;

    /// Golf mode world
    pub const GOLF_WORLD_WIDTH: f32 = 4000.0;
    pub const GOLF_START_X: f32 = 40.0;
    pub const HOLE_CENTER_X: f32 = 1400.0;
    pub const SAND_TRAP_LEFT: f32 = 444.0;

    /// Sprite sizes (sheet frame size times the 3x display scale)
    pub const COUCH_SIZE: (f32, f32) = (144.0, 96.0);
    pub const GOLFER_SIZE: (f32, f32) = (72.0, 96.0);
    pub const VEHICLE_SIZE: (f32, f32) = (216.0, 78.0);
    pub const CLOUD_FRAME_SIZE: (f32, f32) = (64.0, 32.0);
    pub const BALL_SIZE: f32 = 6.0;
    pub const HOLE_SIZE: (f32, f32) = (20.0, 24.0);
    pub const SAND_TRAP_SIZE: (f32, f32) = (220.0, 44.0);

    /// Duration of the camera fade-in between intro dialogs (seconds)
    pub const FADE_IN_SECS: f32 = 1.0;
    /// Delay between the last intro dialog and the run starting (seconds)
    pub const RUN_START_DELAY_SECS: f32 = 0.5;
}

/// Velocity vector for a heading in degrees and a speed.
///
/// Screen convention: +y points down, so negative angles aim upward.
#[inline]
pub fn velocity_from_angle(angle_degrees: f32, speed: f32) -> Vec2 {
    let rad = angle_degrees.to_radians();
    Vec2::new(speed * rad.cos(), speed * rad.sin())
}

/// Aim angle in whole degrees for a pointer offset relative to the ball.
///
/// The angle is measured in math convention on the flipped y axis and then
/// negated, so a pointer above and right of the ball yields a negative angle.
#[inline]
pub fn aim_angle_degrees(relative: Vec2) -> f32 {
    let math_y = -relative.y;
    let deg = math_y.atan2(relative.x).to_degrees().round();
    -deg
}

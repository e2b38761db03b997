//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod anim;
pub mod body;
pub mod camera;
pub mod collision;
pub mod dash;
pub mod geom;
pub mod golf;
pub mod mode;
pub mod state;
pub mod swing;
pub mod tick;
pub mod timer;

pub use body::{Body, BodyKind, integrate};
pub use collision::{
    OverlapRule, can_jump, overlaps, resolve_ground_collision, resolve_static_collision,
};
pub use dash::DashMode;
pub use geom::{Rect, Shape};
pub use golf::GolfMode;
pub use mode::GameMode;
pub use state::{
    AudioCue, CameraView, ChargeMeter, DialogId, EntityTransform, FrameResult, GameEvent, ModeId,
    ModePhase, Outcome, OutcomeStatus, PointerEvent, TickInput,
};
pub use swing::{SwingController, SwingParams, SwingPhase};
pub use tick::Game;
pub use timer::{Throttle, TimerId, Timers};

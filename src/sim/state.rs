//! Shared simulation types
//!
//! Everything that crosses the boundary between the simulation and the
//! presentation layer: inputs, per-frame results and emitted events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind};

/// Which gameplay mode is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeId {
    /// Couch run through traffic
    Dash,
    /// Charge-and-swing golf hole
    Golf,
}

/// Current phase of a mode run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModePhase {
    /// Scripted dialogs and camera moves, simulation not running
    Intro,
    /// Simulation running
    Active,
    /// Interrupted by a dialog or a pending mode switch
    Paused,
    /// Outcome produced, simulation frozen
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Win,
    Lose,
}

/// Terminal result of a mode run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub message: String,
}

impl Outcome {
    pub fn win(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Win,
            message: message.into(),
        }
    }

    pub fn lose(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Lose,
            message: message.into(),
        }
    }
}

/// Token handed to the dialog presenter; passing it back resumes the mode.
///
/// `run` identifies the mode instance, so a token from a torn-down mode
/// never resumes its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogId {
    pub run: u32,
    pub seq: u32,
}

/// Sounds the presentation layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    BackgroundMusic,
    GolfHit,
    Applause,
    Lose,
}

/// Things that happened during a tick that collaborators react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Show these messages in order, then call `resolve_dialog(id)`
    DialogRequested {
        id: DialogId,
        messages: Vec<String>,
        /// Dim the scene behind the dialog box
        overlay: bool,
    },
    /// Fade the scene in from black
    FadeIn { secs: f32 },
    /// Mode run ended (emitted once per run)
    Outcome(Outcome),
    /// Hand over to another mode
    ModeSwitch(ModeId),
    Audio(AudioCue),
    /// The golf hole was sunk
    Celebrate,
}

/// Pointer input in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Move(Vec2),
    Down(Vec2),
    Up(Vec2),
}

/// Input snapshot for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held keys. Left/right are reported for completeness; both modes
    /// script horizontal motion themselves.
    pub left: bool,
    pub right: bool,
    /// Jump key held (jumps fire on the press edge)
    pub jump: bool,
    /// Reset key pressed this tick
    pub reset: bool,
    /// Pointer events since the last tick, oldest first
    pub pointer: Vec<PointerEvent>,
}

/// Render-relevant state of one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityTransform {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub half: Vec2,
    /// Sprite sheet frame
    pub frame: u32,
}

impl EntityTransform {
    pub fn of(body: &Body, frame: u32) -> Self {
        Self {
            id: body.id,
            kind: body.kind,
            pos: body.pos,
            half: body.half,
            frame,
        }
    }
}

/// Camera state after a tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraView {
    pub scroll: Vec2,
    pub zoom: f32,
    /// Black overlay opacity
    pub fade_alpha: f32,
    /// Background tile offset
    pub parallax: Vec2,
}

/// Golf charge meter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeMeter {
    /// Fill in [0, 1]
    pub fill: f32,
    pub angle_degrees: f32,
}

/// Everything the presentation layer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub mode: ModeId,
    pub phase: ModePhase,
    /// Sorted by id
    pub entities: Vec<EntityTransform>,
    pub camera: CameraView,
    pub charge_meter: Option<ChargeMeter>,
    pub outcome: Option<Outcome>,
    /// Events emitted since the previous frame, in emission order
    pub events: Vec<GameEvent>,
}

impl FrameResult {
    /// Dialog requests among this frame's events
    pub fn dialogs(&self) -> impl Iterator<Item = (DialogId, &[String])> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::DialogRequested { id, messages, .. } => Some((*id, messages.as_slice())),
            _ => None,
        })
    }

    pub fn entity(&self, kind: BodyKind) -> Option<&EntityTransform> {
        self.entities.iter().find(|e| e.kind == kind)
    }
}

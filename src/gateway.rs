//! Scene transitions for the presentation layer
//!
//! The simulation never talks to screens directly. It emits `GameEvent`s;
//! `SceneRouter` turns them into screen changes and forwards the rest to a
//! `SceneGateway` implemented by whatever draws the game.

use serde::{Deserialize, Serialize};

use crate::sim::{AudioCue, DialogId, FrameResult, GameEvent, ModeId, Outcome, OutcomeStatus};

/// What the presentation layer should be showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Title,
    Play(ModeId),
    /// Win or lose, with the mode a retry goes back to
    GameOver {
        status: OutcomeStatus,
        message: String,
        origin: ModeId,
    },
}

/// Presentation-side collaborator. Only `show` is required.
pub trait SceneGateway {
    fn show(&mut self, screen: &Screen);

    fn on_outcome(&mut self, _outcome: &Outcome, _origin: ModeId) {}

    /// Display the messages, then call `Game::resolve_dialog(id)`
    fn on_dialog_requested(&mut self, _id: DialogId, _messages: &[String], _overlay: bool) {}

    fn on_audio_cue(&mut self, _cue: AudioCue) {}

    fn on_fade_in(&mut self, _secs: f32) {}

    fn on_celebrate(&mut self) {}
}

/// Tracks the current screen and routes frame events to a gateway
#[derive(Debug, Clone)]
pub struct SceneRouter {
    current: Screen,
}

impl Default for SceneRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRouter {
    pub fn new() -> Self {
        Self {
            current: Screen::Title,
        }
    }

    pub fn current(&self) -> &Screen {
        &self.current
    }

    fn go(&mut self, screen: Screen, gateway: &mut dyn SceneGateway) {
        if self.current == screen {
            return;
        }
        log::info!("Screen {:?} -> {:?}", self.current, screen);
        gateway.show(&screen);
        self.current = screen;
    }

    /// Leave the title screen. Returns the mode to start.
    pub fn start(&mut self, gateway: &mut dyn SceneGateway) -> ModeId {
        if self.current != Screen::Title {
            log::warn!("Start requested from {:?}", self.current);
        }
        self.go(Screen::Play(ModeId::Dash), gateway);
        ModeId::Dash
    }

    /// Forward one frame's events, in order
    pub fn dispatch(&mut self, frame: &FrameResult, gateway: &mut dyn SceneGateway) {
        if self.current == Screen::Title {
            self.go(Screen::Play(frame.mode), gateway);
        }
        for event in &frame.events {
            match event {
                GameEvent::DialogRequested {
                    id,
                    messages,
                    overlay,
                } => gateway.on_dialog_requested(*id, messages, *overlay),
                GameEvent::FadeIn { secs } => gateway.on_fade_in(*secs),
                GameEvent::Audio(cue) => gateway.on_audio_cue(*cue),
                GameEvent::Celebrate => gateway.on_celebrate(),
                GameEvent::ModeSwitch(id) => self.go(Screen::Play(*id), gateway),
                GameEvent::Outcome(outcome) => {
                    gateway.on_outcome(outcome, frame.mode);
                    let screen = Screen::GameOver {
                        status: outcome.status,
                        message: outcome.message.clone(),
                        origin: frame.mode,
                    };
                    self.go(screen, gateway);
                }
            }
        }
    }

    /// Mode a "try again" from the game-over screen restarts
    pub fn restart_target(&self) -> Option<ModeId> {
        match &self.current {
            Screen::GameOver { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// Leave the game-over screen for a retry. Returns the mode to
    /// restart, or `None` when no game is over.
    pub fn acknowledge_restart(&mut self, gateway: &mut dyn SceneGateway) -> Option<ModeId> {
        let origin = self.restart_target()?;
        self.go(Screen::Play(origin), gateway);
        Some(origin)
    }
}

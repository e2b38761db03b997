//! Fixed timestep game driver
//!
//! Owns the running mode and advances it one tick at a time. Mode switches
//! requested by a mode (or by the caller) tear the old mode down before the
//! next one starts, so nothing scheduled by the old mode can fire later.

use super::dash::DashMode;
use super::golf::GolfMode;
use super::mode::GameMode;
use super::state::{DialogId, FrameResult, GameEvent, ModeId, ModePhase, Outcome, TickInput};
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// The game: one mode at a time, driven by fixed ticks
pub struct Game {
    tuning: Tuning,
    mode: Box<dyn GameMode>,
    /// Incremented for every mode instance, tags dialog ids
    run: u32,
}

fn build_mode(tuning: &Tuning, id: ModeId, run: u32) -> Box<dyn GameMode> {
    match id {
        ModeId::Dash => Box::new(DashMode::new(tuning, run)),
        ModeId::Golf => Box::new(GolfMode::new(tuning, run)),
    }
}

impl Game {
    /// Start from the beginning: dash mode with its intro
    pub fn new(tuning: Tuning) -> Self {
        Self::with_mode(tuning, ModeId::Dash, false)
    }

    /// Start directly in `id`. `restart` skips the intro sequence.
    ///
    /// Tuning that fails validation is replaced by the defaults.
    pub fn with_mode(tuning: Tuning, id: ModeId, restart: bool) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(err) => {
                log::error!("Rejected tuning ({}), using defaults", err);
                Tuning::default()
            }
        };
        let mode = build_mode(&tuning, id, 1);
        Self::from_mode(tuning, mode, 1, restart)
    }

    /// Like `with_mode`, but hands invalid tuning back as an error
    pub fn try_with_mode(tuning: Tuning, id: ModeId, restart: bool) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::with_mode(tuning, id, restart))
    }

    /// Drive an already constructed mode. `run` must match the run the
    /// mode tags its dialogs with. `tuning` is used as given, unvalidated.
    pub fn from_mode(tuning: Tuning, mut mode: Box<dyn GameMode>, run: u32, restart: bool) -> Self {
        log::info!("Game starting in {:?} (restart: {})", mode.id(), restart);
        mode.start(restart);
        Self { tuning, mode, run }
    }

    pub fn mode_id(&self) -> ModeId {
        self.mode.id()
    }

    pub fn phase(&self) -> ModePhase {
        self.mode.phase()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.mode.outcome()
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Advance the running mode by `dt` seconds.
    ///
    /// A `ModeSwitch` among the returned events has already been acted on:
    /// the next tick runs the new mode.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> FrameResult {
        if dt > MAX_DT {
            log::trace!("Clamping tick of {} s", dt);
        }
        let frame = self.mode.tick(dt.min(MAX_DT), input);
        let switch = frame.events.iter().find_map(|e| match e {
            GameEvent::ModeSwitch(id) => Some(*id),
            _ => None,
        });
        if let Some(id) = switch {
            self.enter(id, false);
        }
        frame
    }

    /// Hand a finished dialog back to the mode that requested it
    pub fn resolve_dialog(&mut self, id: DialogId) {
        if id.run != self.run {
            log::debug!("Dropping dialog {:?} from an earlier run (now {})", id, self.run);
            return;
        }
        self.mode.resolve_dialog(id);
    }

    /// Reset the running mode to its starting positions
    pub fn request_reset(&mut self) {
        self.mode.reset();
    }

    /// Switch to `id`, intro included
    pub fn request_mode_switch(&mut self, id: ModeId) {
        self.enter(id, false);
    }

    /// Start the current mode over without its intro
    pub fn restart(&mut self) {
        let id = self.mode.id();
        self.enter(id, true);
    }

    /// Start `id` over without its intro (game-over screen "try again")
    pub fn restart_in(&mut self, id: ModeId) {
        self.enter(id, true);
    }

    fn enter(&mut self, id: ModeId, restart: bool) {
        log::info!(
            "Switching {:?} -> {:?} (restart: {})",
            self.mode.id(),
            id,
            restart
        );
        self.mode.teardown();
        self.run += 1;
        let mut mode = build_mode(&self.tuning, id, self.run);
        mode.start(restart);
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CameraView;

    /// Mode that asks to switch to golf on its first tick
    #[derive(Default)]
    struct Handoff {
        ticks: u32,
        torn_down: bool,
    }

    impl GameMode for Handoff {
        fn id(&self) -> ModeId {
            ModeId::Dash
        }

        fn start(&mut self, _restart: bool) {}

        fn tick(&mut self, _dt: f32, _input: &TickInput) -> FrameResult {
            assert!(!self.torn_down, "ticked after teardown");
            self.ticks += 1;
            FrameResult {
                mode: ModeId::Dash,
                phase: ModePhase::Paused,
                entities: Vec::new(),
                camera: CameraView::default(),
                charge_meter: None,
                outcome: None,
                events: vec![GameEvent::ModeSwitch(ModeId::Golf)],
            }
        }

        fn resolve_dialog(&mut self, _id: DialogId) {}

        fn reset(&mut self) {}

        fn teardown(&mut self) {
            self.torn_down = true;
        }

        fn phase(&self) -> ModePhase {
            ModePhase::Paused
        }

        fn outcome(&self) -> Option<&Outcome> {
            None
        }

        fn take_events(&mut self) -> Vec<GameEvent> {
            Vec::new()
        }
    }

    fn first_dialog(frame: &FrameResult) -> Option<DialogId> {
        frame.dialogs().next().map(|(id, _)| id)
    }

    #[test]
    fn test_mode_switch_event_starts_golf() {
        let mut game = Game::from_mode(Tuning::default(), Box::new(Handoff::default()), 1, false);
        let frame = game.tick(SIM_DT, &TickInput::default());
        assert!(frame.events.contains(&GameEvent::ModeSwitch(ModeId::Golf)));
        assert_eq!(game.mode_id(), ModeId::Golf);
        assert_eq!(game.run(), 2);

        // The golf intro dialog arrives with golf's first frame
        let frame = game.tick(SIM_DT, &TickInput::default());
        assert_eq!(frame.mode, ModeId::Golf);
        let id = first_dialog(&frame).expect("golf intro dialog");
        assert_eq!(id.run, 2);
    }

    #[test]
    fn test_stale_dialog_is_dropped() {
        let mut game = Game::new(Tuning::default());
        let frame = game.tick(SIM_DT, &TickInput::default());
        let stale = first_dialog(&frame).expect("dash intro dialog");

        game.request_mode_switch(ModeId::Golf);
        let frame = game.tick(SIM_DT, &TickInput::default());
        let golf_intro = first_dialog(&frame).expect("golf intro dialog");

        // Same sequence number, older run: must not advance golf's intro
        game.resolve_dialog(stale);
        let frame = game.tick(SIM_DT, &TickInput::default());
        assert!(frame.events.is_empty());

        game.resolve_dialog(golf_intro);
        let frame = game.tick(SIM_DT, &TickInput::default());
        assert!(frame.events.contains(&GameEvent::FadeIn { secs: FADE_IN_SECS }));
    }

    #[test]
    fn test_restart_skips_intro() {
        let mut game = Game::with_mode(Tuning::default(), ModeId::Golf, false);
        game.restart();
        assert_eq!(game.mode_id(), ModeId::Golf);
        let frame = game.tick(SIM_DT, &TickInput::default());
        assert_eq!(frame.phase, ModePhase::Active);
        assert!(first_dialog(&frame).is_none());
        assert!(frame.charge_meter.is_some());
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let inverted = Tuning {
            vehicle_speed: (-50, -200),
            ..Tuning::default()
        };
        assert!(matches!(
            Game::try_with_mode(inverted.clone(), ModeId::Dash, true),
            Err(TuningError::Invalid { .. })
        ));

        // Falls back to defaults instead of panicking while laying out traffic
        let mut game = Game::with_mode(inverted, ModeId::Dash, true);
        assert_eq!(game.tuning(), &Tuning::default());
        game.tick(SIM_DT, &TickInput::default());
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut a = Game::with_mode(Tuning::default(), ModeId::Dash, true);
        let mut b = Game::with_mode(Tuning::default(), ModeId::Dash, true);
        for _ in 0..30 {
            a.tick(1.0, &TickInput::default());
            b.tick(MAX_DT, &TickInput::default());
        }
        assert_eq!(
            a.tick(SIM_DT, &TickInput::default()),
            b.tick(SIM_DT, &TickInput::default())
        );
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed produce identical frames
        let mut game1 = Game::with_mode(Tuning::default(), ModeId::Dash, true);
        let mut game2 = Game::with_mode(Tuning::default(), ModeId::Dash, true);

        let inputs = [
            TickInput::default(),
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..100 {
            for input in &inputs {
                let f1 = game1.tick(SIM_DT, input);
                let f2 = game2.tick(SIM_DT, input);
                assert_eq!(f1, f2);
            }
        }
    }
}

//! Couch Golf headless runner
//!
//! Plays the game without a window: dialogs are dismissed as soon as they
//! appear, a simple bot jumps traffic and takes golf swings, and everything
//! the presentation layer would react to is logged. Set `RUST_LOG=info` (or
//! `debug`) to watch a run. An optional first argument names a tuning JSON.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use couch_golf::consts::*;
    use couch_golf::sim::{
        AudioCue, BodyKind, DialogId, FrameResult, ModeId, ModePhase, Outcome, OutcomeStatus,
        PointerEvent,
    };
    use couch_golf::{Game, SceneGateway, SceneRouter, Screen, TickInput, Tuning, TuningError};
    use glam::Vec2;

    /// Simulated display refresh, deliberately off the sim rate
    const DISPLAY_DT: f32 = 1.0 / 50.0;
    /// Give up after this much wall time (seconds)
    const MAX_PLAY_SECS: f32 = 600.0;
    /// Retries from the game-over screen
    const MAX_RETRIES: u32 = 5;

    /// Logs screens and cues, collects dialogs to dismiss
    #[derive(Default)]
    struct LogGateway {
        dialogs: Vec<DialogId>,
    }

    impl SceneGateway for LogGateway {
        fn show(&mut self, screen: &Screen) {
            log::info!("Showing {:?}", screen);
        }

        fn on_outcome(&mut self, outcome: &Outcome, origin: ModeId) {
            log::info!("{:?} over: {:?} {:?}", origin, outcome.status, outcome.message);
        }

        fn on_dialog_requested(&mut self, id: DialogId, messages: &[String], _overlay: bool) {
            for message in messages {
                log::info!("Dialog: {}", message.replace('\n', " "));
            }
            self.dialogs.push(id);
        }

        fn on_audio_cue(&mut self, cue: AudioCue) {
            log::debug!("Audio cue {:?}", cue);
        }

        fn on_celebrate(&mut self) {
            log::info!("Celebration!");
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Swing {
        Ready,
        Charging(u32),
        Watching,
    }

    /// Autopilot for both modes
    struct Bot {
        jump_held: bool,
        swing: Swing,
        /// Ticks to hold the pointer down per swing
        charge_ticks: u32,
    }

    impl Bot {
        fn new() -> Self {
            Self {
                jump_held: false,
                swing: Swing::Ready,
                charge_ticks: (1.2 / SIM_DT) as u32,
            }
        }

        fn input(&mut self, last: Option<&FrameResult>) -> TickInput {
            let Some(frame) = last else {
                return TickInput::default();
            };
            if frame.phase != ModePhase::Active {
                return TickInput::default();
            }
            match frame.mode {
                ModeId::Dash => self.dash(frame),
                ModeId::Golf => self.golf(frame),
            }
        }

        fn dash(&mut self, frame: &FrameResult) -> TickInput {
            let Some(player) = frame.entity(BodyKind::Player) else {
                return TickInput::default();
            };
            let front = player.pos.x + player.half.x;
            let traffic_ahead = frame.entities.iter().any(|e| {
                e.kind == BodyKind::Obstacle && {
                    let gap = e.pos.x - e.half.x - front;
                    (0.0..60.0).contains(&gap)
                }
            });
            // Tap, never hold, so every jump is a fresh press
            let jump = traffic_ahead && !self.jump_held;
            self.jump_held = jump;
            TickInput {
                jump,
                ..Default::default()
            }
        }

        fn golf(&mut self, frame: &FrameResult) -> TickInput {
            let Some(ball) = frame.entity(BodyKind::Ball) else {
                return TickInput::default();
            };
            let screen = (ball.pos - frame.camera.scroll) * frame.camera.zoom;
            let aim = screen + Vec2::new(40.0, -12.0);
            let mut input = TickInput::default();
            self.swing = match self.swing {
                Swing::Ready => {
                    input.pointer.push(PointerEvent::Down(aim));
                    Swing::Charging(0)
                }
                Swing::Charging(ticks) if ticks >= self.charge_ticks => {
                    input.pointer.push(PointerEvent::Up(aim));
                    Swing::Watching
                }
                Swing::Charging(ticks) => {
                    input.pointer.push(PointerEvent::Move(aim));
                    Swing::Charging(ticks + 1)
                }
                Swing::Watching => Swing::Watching,
            };
            input
        }

        fn reset(&mut self) {
            self.jump_held = false;
            self.swing = Swing::Ready;
        }
    }

    pub fn run() -> Result<(), TuningError> {
        let tuning = match std::env::args().nth(1) {
            Some(path) => Tuning::load(path)?,
            None => {
                log::warn!("No tuning file given, using defaults");
                Tuning::default()
            }
        };

        let mut router = SceneRouter::new();
        let mut gateway = LogGateway::default();
        router.start(&mut gateway);
        let mut game = Game::new(tuning);
        let mut bot = Bot::new();
        let mut last: Option<FrameResult> = None;
        let mut retries = 0;

        let mut accumulator = 0.0;
        let mut elapsed = 0.0;
        while elapsed < MAX_PLAY_SECS {
            elapsed += DISPLAY_DT;
            accumulator += DISPLAY_DT.min(0.1);

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = bot.input(last.as_ref());
                let frame = game.tick(SIM_DT, &input);
                router.dispatch(&frame, &mut gateway);
                for id in gateway.dialogs.drain(..) {
                    game.resolve_dialog(id);
                }
                last = Some(frame);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            if let Some(origin) = router.restart_target() {
                if game.outcome().is_some_and(|o| o.status == OutcomeStatus::Win) {
                    log::info!("Won after {:.1} s and {} retries", elapsed, retries);
                    return Ok(());
                }
                if retries >= MAX_RETRIES {
                    log::info!("Out of retries after {:.1} s", elapsed);
                    return Ok(());
                }
                retries += 1;
                router.acknowledge_restart(&mut gateway);
                game.restart_in(origin);
                bot.reset();
                last = None;
                accumulator = 0.0;
            }
        }

        log::info!("Stopped after {:.0} s in {:?}", elapsed, game.mode_id());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), couch_golf::TuningError> {
    env_logger::init();
    log::info!("Couch Golf (headless) starting...");
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build drives `Game` from its own frame callback
}

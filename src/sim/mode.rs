//! Game mode capability and the machinery both modes share
//!
//! Each mode owns a `ModeCore`: its timers, camera, RNG, phase, sticky
//! outcome, pending events and the intro script cursor. Modes compose it
//! rather than inheriting behavior.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::{Camera, Cutscene};
use super::state::{
    AudioCue, CameraView, ChargeMeter, DialogId, EntityTransform, FrameResult, GameEvent, ModeId,
    ModePhase, Outcome, OutcomeStatus, TickInput,
};
use super::swing::SwingTimer;
use super::timer::{TimerId, Timers};

/// A playable mode driven one tick at a time
pub trait GameMode {
    fn id(&self) -> ModeId;

    /// Begin the run. A restart skips the intro script.
    fn start(&mut self, restart: bool);

    /// Advance one tick: timers, input, integration, collisions,
    /// triggers, camera
    fn tick(&mut self, dt: f32, input: &TickInput) -> FrameResult;

    /// The presenter finished showing a dialog
    fn resolve_dialog(&mut self, id: DialogId);

    /// Put every entity back where it started and clear run state
    fn reset(&mut self);

    /// Cancel all timers; the mode is inert afterwards
    fn teardown(&mut self);

    fn phase(&self) -> ModePhase;

    fn outcome(&self) -> Option<&Outcome>;

    /// Events produced outside of `tick` (by `start`, `reset`, ...)
    fn take_events(&mut self) -> Vec<GameEvent>;
}

/// Timer kinds shared by both modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTimer {
    /// Current intro script step finished
    Script,
    Swing(SwingTimer),
}

impl From<SwingTimer> for ModeTimer {
    fn from(t: SwingTimer) -> Self {
        ModeTimer::Swing(t)
    }
}

/// One step of a scripted sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    Dialog {
        messages: &'static [&'static str],
        overlay: bool,
    },
    FadeIn(f32),
    Cutscene(Cutscene),
    Wait(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptProgress {
    Waiting,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptWait {
    Dialog(DialogId),
    Timer(TimerId),
}

pub struct ModeCore {
    pub timers: Timers<ModeTimer>,
    pub camera: Camera,
    pub rng: Pcg32,
    run: u32,
    phase: ModePhase,
    outcome: Option<Outcome>,
    events: Vec<GameEvent>,
    script: VecDeque<ScriptStep>,
    script_wait: Option<ScriptWait>,
    next_dialog: u32,
    torn_down: bool,
}

impl ModeCore {
    pub fn new(seed: u64, run: u32, viewport: Vec2) -> Self {
        Self {
            timers: Timers::new(),
            camera: Camera::new(viewport),
            rng: Pcg32::seed_from_u64(seed),
            run,
            phase: ModePhase::Intro,
            outcome: None,
            events: Vec::new(),
            script: VecDeque::new(),
            script_wait: None,
            next_dialog: 1,
            torn_down: false,
        }
    }

    pub fn phase(&self) -> ModePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: ModePhase) {
        if self.phase != phase {
            log::debug!("Mode run {} phase {:?} -> {:?}", self.run, self.phase, phase);
        }
        self.phase = phase;
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn request_dialog(&mut self, messages: &[&str], overlay: bool) -> DialogId {
        let id = DialogId {
            run: self.run,
            seq: self.next_dialog,
        };
        self.next_dialog += 1;
        self.emit(GameEvent::DialogRequested {
            id,
            messages: messages.iter().map(|m| m.to_string()).collect(),
            overlay,
        });
        id
    }

    /// Record the run's outcome. Only the first one counts.
    pub fn finish(&mut self, outcome: Outcome) -> bool {
        if let Some(existing) = &self.outcome {
            log::warn!(
                "Ignoring second outcome {:?} (run {} already ended with {:?})",
                outcome.status,
                self.run,
                existing.status
            );
            return false;
        }
        log::info!("Run {} ended: {:?} {:?}", self.run, outcome.status, outcome.message);
        if outcome.status == OutcomeStatus::Lose {
            self.emit(GameEvent::Audio(AudioCue::Lose));
        }
        self.emit(GameEvent::Outcome(outcome.clone()));
        self.outcome = Some(outcome);
        self.set_phase(ModePhase::Terminal);
        true
    }

    pub fn clear_outcome(&mut self) {
        self.outcome = None;
    }

    /// Replace the running script and start its first step
    pub fn run_script(&mut self, steps: &[ScriptStep]) -> ScriptProgress {
        self.cancel_script();
        self.script = steps.iter().copied().collect();
        self.next_step()
    }

    fn next_step(&mut self) -> ScriptProgress {
        let Some(step) = self.script.pop_front() else {
            self.script_wait = None;
            return ScriptProgress::Finished;
        };
        let wait = match step {
            ScriptStep::Dialog { messages, overlay } => {
                ScriptWait::Dialog(self.request_dialog(messages, overlay))
            }
            ScriptStep::FadeIn(secs) => {
                self.camera.fade_in(secs);
                self.emit(GameEvent::FadeIn { secs });
                ScriptWait::Timer(self.timers.after(secs, ModeTimer::Script))
            }
            ScriptStep::Cutscene(cutscene) => {
                self.camera.start_cutscene(cutscene);
                ScriptWait::Timer(self.timers.after(cutscene.duration(), ModeTimer::Script))
            }
            ScriptStep::Wait(secs) => ScriptWait::Timer(self.timers.after(secs, ModeTimer::Script)),
        };
        self.script_wait = Some(wait);
        ScriptProgress::Waiting
    }

    /// A script timer fired. `None` if it was not the step being waited on.
    pub fn on_script_timer(&mut self, id: TimerId) -> Option<ScriptProgress> {
        if self.script_wait != Some(ScriptWait::Timer(id)) {
            return None;
        }
        // Sim time and tween time accumulate separately
        self.camera.end_cutscene();
        Some(self.next_step())
    }

    /// A dialog was resolved. `None` if it does not belong to the script.
    pub fn on_script_dialog(&mut self, id: DialogId) -> Option<ScriptProgress> {
        (self.script_wait == Some(ScriptWait::Dialog(id))).then(|| self.next_step())
    }

    pub fn cancel_script(&mut self) {
        if let Some(ScriptWait::Timer(id)) = self.script_wait.take() {
            self.timers.cancel(id);
        }
        self.script.clear();
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Refuse further work after teardown
    pub fn guard_torn_down(&self, what: &str) -> bool {
        if self.torn_down {
            log::error!("{} reached torn-down mode run {}", what, self.run);
        }
        self.torn_down
    }

    pub fn teardown(&mut self) {
        self.cancel_script();
        self.timers.close();
        self.events.clear();
        self.torn_down = true;
        log::debug!("Mode run {} torn down", self.run);
    }

    /// Package the tick's results, draining pending events
    pub fn frame(
        &mut self,
        mode: ModeId,
        entities: Vec<EntityTransform>,
        parallax: Vec2,
        charge_meter: Option<ChargeMeter>,
    ) -> FrameResult {
        let mut entities = entities;
        entities.sort_by_key(|e| e.id);
        FrameResult {
            mode,
            phase: self.phase,
            entities,
            camera: CameraView {
                scroll: self.camera.scroll,
                zoom: self.camera.zoom,
                fade_alpha: self.camera.fade_alpha(),
                parallax,
            },
            charge_meter,
            outcome: self.outcome.clone(),
            events: self.take_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> ModeCore {
        ModeCore::new(1, 7, Vec2::new(800.0, 600.0))
    }

    fn drain_script_timers(core: &mut ModeCore, secs: f32) -> Option<ScriptProgress> {
        core.timers.advance(secs);
        let mut last = None;
        while let Some((id, kind)) = core.timers.pop_due() {
            assert_eq!(kind, ModeTimer::Script);
            last = core.on_script_timer(id).or(last);
        }
        last
    }

    #[test]
    fn test_script_walks_steps_in_order() {
        let mut core = core();
        let steps = [
            ScriptStep::Dialog {
                messages: &["one", "two"],
                overlay: true,
            },
            ScriptStep::FadeIn(1.0),
            ScriptStep::Wait(0.5),
        ];
        assert_eq!(core.run_script(&steps), ScriptProgress::Waiting);
        let events = core.take_events();
        let GameEvent::DialogRequested { id, messages, overlay } = &events[0] else {
            panic!("expected a dialog, got {:?}", events);
        };
        assert_eq!(messages, &vec!["one".to_string(), "two".to_string()]);
        assert!(*overlay);
        assert_eq!(id.run, 7);

        // Wrong id is not the script's dialog
        assert_eq!(core.on_script_dialog(DialogId { run: 7, seq: 99 }), None);
        assert_eq!(core.on_script_dialog(*id), Some(ScriptProgress::Waiting));
        assert_eq!(core.take_events(), vec![GameEvent::FadeIn { secs: 1.0 }]);

        assert_eq!(drain_script_timers(&mut core, 1.0), Some(ScriptProgress::Waiting));
        assert_eq!(drain_script_timers(&mut core, 0.5), Some(ScriptProgress::Finished));
        assert_eq!(core.timers.pending(), 0);
    }

    #[test]
    fn test_first_outcome_sticks() {
        let mut core = core();
        assert!(core.finish(Outcome::lose("first")));
        assert!(!core.finish(Outcome::win("second")));
        assert_eq!(core.outcome().unwrap().message, "first");
        assert_eq!(core.phase(), ModePhase::Terminal);
        let outcomes = core
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Outcome(_)))
            .count();
        assert_eq!(outcomes, 1);
    }

    #[test]
    fn test_teardown_cancels_script() {
        let mut core = core();
        core.run_script(&[ScriptStep::Wait(0.5)]);
        core.teardown();
        assert!(core.is_torn_down());
        assert_eq!(core.timers.pending(), 0);
        assert_eq!(drain_script_timers(&mut core, 1.0), None);
    }
}

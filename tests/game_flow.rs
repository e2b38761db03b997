//! Whole-run tests driving `Game` the way a presentation layer would

use couch_golf::consts::*;
use couch_golf::sim::dash::GAME_RULES;
use couch_golf::sim::{
    AudioCue, BodyKind, DialogId, FrameResult, GameEvent, ModeId, ModePhase, Outcome,
    OutcomeStatus, PointerEvent,
};
use couch_golf::{Game, SceneGateway, SceneRouter, Screen, TickInput, Tuning};
use glam::Vec2;

#[derive(Default)]
struct Presenter {
    screens: Vec<Screen>,
    dialogs: Vec<(DialogId, Vec<String>)>,
    cues: Vec<AudioCue>,
    outcomes: Vec<Outcome>,
}

impl SceneGateway for Presenter {
    fn show(&mut self, screen: &Screen) {
        self.screens.push(screen.clone());
    }

    fn on_outcome(&mut self, outcome: &Outcome, _origin: ModeId) {
        self.outcomes.push(outcome.clone());
    }

    fn on_dialog_requested(&mut self, id: DialogId, messages: &[String], _overlay: bool) {
        self.dialogs.push((id, messages.to_vec()));
    }

    fn on_audio_cue(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

struct Harness {
    game: Game,
    router: SceneRouter,
    presenter: Presenter,
    /// Dismiss dialogs as soon as they appear
    auto_dismiss: bool,
    last: Option<FrameResult>,
}

impl Harness {
    fn new(game: Game) -> Self {
        let mut presenter = Presenter::default();
        let mut router = SceneRouter::new();
        router.start(&mut presenter);
        Self {
            game,
            router,
            presenter,
            auto_dismiss: true,
            last: None,
        }
    }

    fn tick(&mut self, input: &TickInput) -> &FrameResult {
        let seen = self.presenter.dialogs.len();
        let frame = self.game.tick(SIM_DT, input);
        self.router.dispatch(&frame, &mut self.presenter);
        if self.auto_dismiss {
            let ids: Vec<_> = self.presenter.dialogs[seen..].iter().map(|(id, _)| *id).collect();
            for id in ids {
                self.game.resolve_dialog(id);
            }
        }
        self.last.insert(frame)
    }

    /// Tick until `done` holds, at most `secs` of sim time
    fn run_until(&mut self, secs: f32, mut done: impl FnMut(&FrameResult) -> bool) -> bool {
        let steps = (secs / SIM_DT).round() as usize;
        for _ in 0..steps {
            if done(self.tick(&TickInput::default())) {
                return true;
            }
        }
        false
    }
}

#[test]
fn dash_intro_plays_through_to_the_run() {
    let mut h = Harness::new(Game::new(Tuning::default()));
    assert!(h.run_until(5.0, |f| f.phase == ModePhase::Active));

    // Intro, then game intro after the fade
    assert_eq!(h.presenter.dialogs.len(), 2);
    assert_eq!(h.presenter.dialogs[0].1.len(), 5);
    assert_eq!(h.presenter.cues, vec![AudioCue::BackgroundMusic]);
    assert_eq!(h.presenter.screens, vec![Screen::Play(ModeId::Dash)]);
}

#[test]
fn rules_dialog_pauses_the_run_until_dismissed() {
    let mut h = Harness::new(Game::new(Tuning::default()));
    assert!(h.run_until(5.0, |f| f.phase == ModePhase::Active));
    h.auto_dismiss = false;

    assert!(h.run_until(6.0, |f| f.phase == ModePhase::Paused));
    let (rules, messages) = h.presenter.dialogs.last().cloned().expect("rules dialog");
    assert_eq!(messages[0], GAME_RULES[0]);

    // Nothing moves while the dialog is up
    let before = h.last.as_ref().and_then(|f| f.entity(BodyKind::Player)).copied();
    h.run_until(1.0, |_| false);
    let after = h.last.as_ref().and_then(|f| f.entity(BodyKind::Player)).copied();
    assert_eq!(before.map(|p| p.pos), after.map(|p| p.pos));
    assert_eq!(h.game.phase(), ModePhase::Paused);

    h.game.resolve_dialog(rules);
    let frame = h.tick(&TickInput::default()).clone();
    assert_eq!(frame.phase, ModePhase::Active);
    let player = frame.entity(BodyKind::Player).expect("couch");
    assert!(player.pos.x > after.map(|p| p.pos.x).unwrap_or_default());
}

#[test]
fn golf_swing_ends_in_a_single_outcome_and_restarts() {
    let mut h = Harness::new(Game::with_mode(Tuning::default(), ModeId::Golf, true));
    let frame = h.tick(&TickInput::default()).clone();
    assert_eq!(frame.phase, ModePhase::Active);
    let ball = frame.entity(BodyKind::Ball).expect("ball").pos;

    let aim = ball + Vec2::new(40.0, -12.0);
    h.tick(&TickInput {
        pointer: vec![PointerEvent::Down(aim)],
        ..Default::default()
    });
    h.run_until(1.0, |_| false);
    h.tick(&TickInput {
        pointer: vec![PointerEvent::Up(aim)],
        ..Default::default()
    });

    assert!(h.run_until(30.0, |f| f.outcome.is_some()));
    assert!(h.presenter.cues.contains(&AudioCue::GolfHit));
    assert_eq!(h.presenter.outcomes.len(), 1);

    // Frozen afterwards: no second outcome
    h.run_until(2.0, |_| false);
    assert_eq!(h.presenter.outcomes.len(), 1);
    assert_eq!(h.router.restart_target(), Some(ModeId::Golf));

    let origin = h.router.acknowledge_restart(&mut h.presenter).expect("game over");
    h.game.restart_in(origin);
    let frame = h.tick(&TickInput::default()).clone();
    assert_eq!(frame.phase, ModePhase::Active);
    assert!(frame.outcome.is_none());
    assert_eq!(frame.entity(BodyKind::Ball).map(|b| b.pos), Some(ball));
    assert!(frame.dialogs().next().is_none());
}

#[test]
fn golf_intro_hands_control_over_after_the_flyover() {
    let mut h = Harness::new(Game::with_mode(Tuning::default(), ModeId::Golf, false));
    assert!(h.run_until(20.0, |f| f.phase == ModePhase::Active));
    assert_eq!(h.presenter.dialogs.len(), 3);
    let frame = h.last.clone().expect("frame");
    assert_eq!(frame.camera.zoom, 1.0);
    assert_eq!(frame.camera.scroll, Vec2::ZERO);
    assert!(frame.charge_meter.is_some());
}

#[test]
fn mode_switch_request_tears_down_dash() {
    let mut h = Harness::new(Game::new(Tuning::default()));
    h.auto_dismiss = false;
    h.tick(&TickInput::default());
    let (stale, _) = h.presenter.dialogs[0].clone();

    h.game.request_mode_switch(ModeId::Golf);
    assert_eq!(h.game.mode_id(), ModeId::Golf);
    h.game.resolve_dialog(stale);
    let frame = h.tick(&TickInput::default()).clone();
    assert_eq!(frame.mode, ModeId::Golf);
    assert_eq!(frame.phase, ModePhase::Intro);
    assert_eq!(frame.dialogs().count(), 1);
}

#[test]
fn same_seed_same_game() {
    let run = |tuning: Tuning| {
        let mut h = Harness::new(Game::new(tuning));
        h.run_until(12.0, |_| false);
        h.last.expect("frame")
    };
    assert_eq!(run(Tuning::default()), run(Tuning::default()));

    let other = Tuning {
        seed: 7,
        ..Tuning::default()
    };
    let a = run(Tuning::default());
    let b = run(other);
    let clouds = |f: &FrameResult| {
        f.entities
            .iter()
            .filter(|e| e.kind == BodyKind::Hazard)
            .map(|e| e.half)
            .collect::<Vec<_>>()
    };
    assert_ne!(clouds(&a), clouds(&b));
}

#[test]
fn tuning_overrides_flow_into_the_game() {
    let tuning = Tuning::from_json(r#"{ "run_speed": 100.0 }"#).expect("valid tuning");
    let mut h = Harness::new(Game::with_mode(tuning, ModeId::Dash, true));
    h.run_until(0.6, |_| false);
    let start = h.last.as_ref().and_then(|f| f.entity(BodyKind::Player)).map(|p| p.pos.x);
    h.run_until(1.0, |_| false);
    let end = h.last.as_ref().and_then(|f| f.entity(BodyKind::Player)).map(|p| p.pos.x);
    let moved = end.unwrap_or_default() - start.unwrap_or_default();
    assert!((moved - 100.0).abs() < 2.0, "moved {moved}");
    assert!(h.presenter.outcomes.iter().all(|o| o.status != OutcomeStatus::Win));
}

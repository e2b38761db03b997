//! Golf mode: one hole, one swing at a time
//!
//! Press to start charging, drag to aim, release to swing. The ball only
//! collides with the ground; the hole and the sand trap are overlap
//! triggers.

use glam::Vec2;
use rand::Rng;

use super::anim::{AnimationPlayer, GOLF_SWING};
use super::body::{Body, BodyKind, integrate};
use super::camera::{Cutscene, ParallaxLayer};
use super::collision::{OverlapRule, overlaps, resolve_ground_collision};
use super::geom::{Rect, Shape};
use super::mode::{GameMode, ModeCore, ModeTimer, ScriptProgress, ScriptStep};
use super::state::{
    AudioCue, ChargeMeter, DialogId, EntityTransform, FrameResult, GameEvent, ModeId, ModePhase,
    Outcome, PointerEvent, TickInput,
};
use super::swing::{SwingAction, SwingController};
use crate::consts::*;
use crate::tuning::Tuning;

pub const ARRIVAL: &[&str] = &["You made it!\nBut you've been here before..."];

pub const COURSE_INTRO: &[&str] = &[
    "You're back on the golf course.\nCareful with that back of yours!",
    "Get a hole-in-one to win\nand be completely healed!",
];

pub const CONTROLS: &[&str] =
    &["Click + hold to charge, release to take the shot. Press [r] to reset and try again."];

pub const WIN_MESSAGE: &str = "Hole in one!\nYou're completely healed!";

/// Game-over messages for a lost ball
pub const LOSE_QUIPS: &[&str] = &[
    "3/10",
    "Wow. That was really embarrassing.",
    "Come on Carter, you can do better.\nLittle rusty?",
    "I guess you won't figure out who got you that gift card",
    "So close!\n\nBut were you though?",
    "I thought someone said you played golf?",
    "Wow I guess you really do have a bad back.",
    "Caroline would be disappointed.\nYou should think about giving up.",
    "Geez we're going to be here all night",
    "Maybe you should just bury yourself in that sand trap",
    "You're kinda like Rapunzel except instead of letting down your hair, \
     you let down everyone in your life",
    "You are a pizza burn on the roof of the world's mouth.",
    "I thought of you today.\n\nIt reminded me to take out the trash.",
    "There are some remarkably bad golf players in this world. \
     Thanks for helping me understand that.",
    "I want you to be the pallbearer at my funeral so you can let me down \
     one last time.",
];

/// Overview tween shown before the first swing
pub const COURSE_FLYOVER: Cutscene = Cutscene {
    scroll: Vec2::new(400.0, -300.0),
    zoom: 0.5,
    leg_secs: 3.0,
};

const GOLFER_ID: u32 = 1;
const GROUND_ID: u32 = 2;
const BALL_ID: u32 = 3;
const HOLE_ID: u32 = 4;
const SAND_TRAP_ID: u32 = 5;

/// Ball offset from the golfer's bottom-center
const TEE_OFFSET: f32 = 10.0;

fn intro_script() -> [ScriptStep; 5] {
    [
        ScriptStep::Dialog {
            messages: ARRIVAL,
            overlay: true,
        },
        ScriptStep::FadeIn(FADE_IN_SECS),
        ScriptStep::Dialog {
            messages: COURSE_INTRO,
            overlay: false,
        },
        ScriptStep::Cutscene(COURSE_FLYOVER),
        ScriptStep::Dialog {
            messages: CONTROLS,
            overlay: false,
        },
    ]
}

pub struct GolfMode {
    core: ModeCore,
    tuning: Tuning,
    world: Rect,
    golfer: Body,
    ball: Body,
    hole: Body,
    sand_trap: Body,
    ground: Body,
    initial: (Body, Body),
    swing: SwingController,
    golfer_anim: AnimationPlayer,
    parallax: ParallaxLayer,
    input_enabled: bool,
}

impl GolfMode {
    pub fn new(tuning: &Tuning, run: u32) -> Self {
        let seed = tuning.seed.wrapping_add(run as u64);
        let viewport = Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let core = ModeCore::new(seed, run, viewport);
        let world = Rect::new(0.0, 0.0, GOLF_WORLD_WIDTH, WORLD_HEIGHT);
        let ground_top = world.bottom() - GROUND_HEIGHT;

        let ground = Body::fixed(
            GROUND_ID,
            BodyKind::Ground,
            Rect::new(world.left, ground_top, world.width, GROUND_HEIGHT),
        );

        let golfer_half = Vec2::new(GOLFER_SIZE.0, GOLFER_SIZE.1) / 2.0;
        let golfer = Body::dynamic(
            GOLFER_ID,
            BodyKind::Player,
            Vec2::new(world.left + GOLF_START_X + golfer_half.x, 0.0),
            golfer_half,
        )
        .with_bounce(0.3, 0.3)
        .resting_on(ground_top);

        let (bx, by) = tuning.ball_bounce;
        let ball = Body::dynamic(
            BALL_ID,
            BodyKind::Ball,
            Vec2::new(golfer.pos.x + TEE_OFFSET, 0.0),
            Vec2::splat(BALL_SIZE / 2.0),
        )
        .with_shape(Shape::Ellipse)
        .with_bounce(bx, by)
        .with_drag(tuning.ball_drag)
        .resting_on(ground_top);

        let hole = Body::fixed(
            HOLE_ID,
            BodyKind::Target,
            Rect::new(
                HOLE_CENTER_X - HOLE_SIZE.0 / 2.0,
                ground_top,
                HOLE_SIZE.0,
                HOLE_SIZE.1,
            ),
        );
        let sand_trap = Body::fixed(
            SAND_TRAP_ID,
            BodyKind::Hazard,
            Rect::new(SAND_TRAP_LEFT, ground_top, SAND_TRAP_SIZE.0, SAND_TRAP_SIZE.1),
        );

        Self {
            core,
            tuning: tuning.clone(),
            world,
            initial: (golfer.clone(), ball.clone()),
            golfer,
            ball,
            hole,
            sand_trap,
            ground,
            swing: SwingController::new(tuning),
            golfer_anim: AnimationPlayer::default(),
            parallax: ParallaxLayer::new(Vec2::splat(tuning.golf_parallax)),
            input_enabled: false,
        }
    }

    pub fn ball(&self) -> &Body {
        &self.ball
    }

    pub fn swing(&self) -> &SwingController {
        &self.swing
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    fn enable_input(&mut self) {
        self.input_enabled = true;
        self.core.set_phase(ModePhase::Active);
        log::info!("Golf input enabled");
    }

    fn run_timers(&mut self, dt: f32) {
        self.core.timers.advance(dt);
        while let Some((id, kind)) = self.core.timers.pop_due() {
            match kind {
                ModeTimer::Script => {
                    if self.core.on_script_timer(id) == Some(ScriptProgress::Finished) {
                        self.enable_input();
                    }
                }
                ModeTimer::Swing(which) => {
                    if let Some(action) = self.swing.on_timer(id, which, &mut self.core.timers) {
                        self.apply_swing_action(action);
                    }
                }
            }
        }
    }

    fn apply_swing_action(&mut self, action: SwingAction) {
        match action {
            SwingAction::Impulse(vel) => {
                log::debug!("Ball struck: {:?}", vel);
                self.ball.set_velocity(vel);
                self.core.emit(GameEvent::Audio(AudioCue::GolfHit));
            }
            SwingAction::CheckApplause => {
                let fast = self.tuning.applause_speed;
                if self.ball.vel.x > fast || self.ball.vel.y > fast {
                    self.core.emit(GameEvent::Audio(AudioCue::Applause));
                }
            }
            SwingAction::Complete => log::trace!("Swing complete"),
        }
    }

    fn handle_pointer(&mut self, events: &[PointerEvent]) {
        for event in events {
            match *event {
                PointerEvent::Down(screen) => {
                    let at = self.core.camera.to_world(screen);
                    self.swing.press(at, self.ball.pos, &mut self.core.timers);
                }
                PointerEvent::Move(screen) => {
                    let at = self.core.camera.to_world(screen);
                    let now = self.core.timers.now();
                    self.swing.aim(at, self.ball.pos, now);
                }
                PointerEvent::Up(_) => {
                    if self.swing.release(&mut self.core.timers).is_some() {
                        self.golfer_anim.play(GOLF_SWING);
                    }
                }
            }
        }
    }

    fn step_bodies(&mut self, dt: f32) {
        let gravity = self.tuning.gravity;
        integrate(&mut self.golfer, gravity, dt);
        resolve_ground_collision(&mut self.golfer, &self.ground);
        integrate(&mut self.ball, gravity, dt);
        resolve_ground_collision(&mut self.ball, &self.ground);
    }

    fn lose_quip(&mut self) -> &'static str {
        let idx = self.core.rng.random_range(0..LOSE_QUIPS.len());
        LOSE_QUIPS[idx]
    }

    fn lose(&mut self) {
        let quip = self.lose_quip();
        self.core.finish(Outcome::lose(quip));
    }

    fn evaluate_triggers(&mut self) {
        let margin = self.tuning.out_of_bounds_margin;
        let x = self.ball.pos.x;
        let past_edge = x > self.world.right() + margin || x < self.world.left - margin;
        if past_edge || self.ball.top() > self.world.bottom() {
            log::debug!("Ball out of bounds at {:?}", self.ball.pos);
            self.lose();
            return;
        }

        let stop = self.tuning.stop_speed;
        if x > self.tuning.stop_check_min_x
            && self.ball.touching_ground
            && self.ball.vel.x.abs() < stop
            && self.ball.vel.y.abs() < stop
        {
            log::debug!("Ball came to rest at x = {}", x);
            self.lose();
            return;
        }

        let inset = OverlapRule::LeftEdgeInset {
            inset: self.tuning.sand_trap_inset,
        };
        if overlaps(&self.ball, &self.sand_trap, inset) {
            log::debug!("Ball in the sand trap");
            self.lose();
            return;
        }

        let near = OverlapRule::CenterWithin {
            dx: self.tuning.hole_tolerance,
        };
        if overlaps(&self.ball, &self.hole, near) {
            if self.ball.vel.x > self.tuning.too_hot_speed {
                let deflect = -(self.ball.vel.x.round() * self.tuning.too_hot_deflection);
                log::debug!("Ball too hot for the hole, deflected to vy = {}", deflect);
                self.ball.vel.y = deflect;
                return;
            }
            if self.core.finish(Outcome::win(WIN_MESSAGE)) {
                self.core.emit(GameEvent::Celebrate);
            }
        }
    }

    fn frame(&mut self) -> FrameResult {
        let entities = vec![
            EntityTransform::of(&self.golfer, self.golfer_anim.frame()),
            EntityTransform::of(&self.ground, 0),
            EntityTransform::of(&self.ball, 0),
            EntityTransform::of(&self.hole, 0),
            EntityTransform::of(&self.sand_trap, 0),
        ];
        let meter = self.input_enabled.then(|| ChargeMeter {
            fill: self.swing.meter(),
            angle_degrees: self.swing.angle_degrees(),
        });
        self.core
            .frame(ModeId::Golf, entities, self.parallax.offset, meter)
    }
}

impl GameMode for GolfMode {
    fn id(&self) -> ModeId {
        ModeId::Golf
    }

    fn start(&mut self, restart: bool) {
        if self.core.guard_torn_down("start") {
            return;
        }
        log::info!("Golf mode starting (restart: {})", restart);
        self.core.set_phase(ModePhase::Intro);
        if restart || self.core.run_script(&intro_script()) == ScriptProgress::Finished {
            self.enable_input();
        }
    }

    fn tick(&mut self, dt: f32, input: &TickInput) -> FrameResult {
        if self.core.guard_torn_down("tick") || self.core.phase() == ModePhase::Terminal {
            return self.frame();
        }

        self.run_timers(dt);

        if self.input_enabled {
            if input.reset {
                self.reset();
                return self.frame();
            }
            self.handle_pointer(&input.pointer);
        }

        let mut delta = self.core.camera.advance(dt);
        if self.core.phase() == ModePhase::Active {
            self.step_bodies(dt);
            self.golfer_anim.advance(dt);
            self.evaluate_triggers();
            delta = self.core.camera.track_clamped(self.ball.pos, &self.world);
        }
        self.parallax.apply(delta);

        self.frame()
    }

    fn resolve_dialog(&mut self, id: DialogId) {
        if self.core.guard_torn_down("resolve_dialog") {
            return;
        }
        match self.core.on_script_dialog(id) {
            Some(ScriptProgress::Finished) => self.enable_input(),
            Some(ScriptProgress::Waiting) => {}
            None => log::debug!("Golf ignoring unknown dialog {:?}", id),
        }
    }

    fn reset(&mut self) {
        if self.core.guard_torn_down("reset") {
            return;
        }
        if !self.input_enabled {
            log::debug!("Golf reset ignored during the intro");
            return;
        }
        log::info!("Golf mode reset");
        self.swing.cancel(&mut self.core.timers);
        self.golfer_anim.stop_at(0);
        let (golfer, ball) = self.initial.clone();
        self.golfer = golfer;
        self.ball = ball;
        self.core.camera.reset(Vec2::ZERO);
        self.core.clear_outcome();
        self.core.set_phase(ModePhase::Active);
    }

    fn teardown(&mut self) {
        self.swing.cancel(&mut self.core.timers);
        self.core.teardown();
    }

    fn phase(&self) -> ModePhase {
        self.core.phase()
    }

    fn outcome(&self) -> Option<&Outcome> {
        self.core.outcome()
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        self.core.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::OutcomeStatus;

    fn ready() -> GolfMode {
        let mut golf = GolfMode::new(&Tuning::default(), 2);
        golf.start(true);
        golf
    }

    fn run_for(golf: &mut GolfMode, secs: f32, input: &TickInput) -> Vec<GameEvent> {
        let steps = (secs / SIM_DT).round() as usize;
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(golf.tick(SIM_DT, input).events);
        }
        events
    }

    fn pointer(events: Vec<PointerEvent>) -> TickInput {
        TickInput {
            pointer: events,
            ..Default::default()
        }
    }

    fn roll_toward_hole(golf: &mut GolfMode, vx: f32) {
        golf.ball.place(Vec2::new(HOLE_CENTER_X - 10.0, 447.0));
        golf.ball.vel = Vec2::new(vx, 0.0);
    }

    #[test]
    fn test_layout() {
        let golf = GolfMode::new(&Tuning::default(), 2);
        assert_eq!(golf.golfer.pos, Vec2::new(76.0, 402.0));
        assert_eq!(golf.ball.pos, Vec2::new(86.0, 447.0));
        assert_eq!(golf.hole.bounds(), Rect::new(1390.0, 450.0, 20.0, 24.0));
        assert_eq!(golf.sand_trap.bounds(), Rect::new(444.0, 450.0, 220.0, 44.0));
    }

    #[test]
    fn test_ball_at_tee_does_not_lose() {
        let mut golf = ready();
        run_for(&mut golf, 2.0, &TickInput::default());
        assert!(golf.outcome().is_none());
        assert_eq!(golf.ball.pos, Vec2::new(86.0, 447.0));
    }

    #[test]
    fn test_slow_ball_drops_in() {
        let mut golf = ready();
        roll_toward_hole(&mut golf, 100.0);
        let events = run_for(&mut golf, 0.2, &TickInput::default());
        let outcome = golf.outcome().expect("ball should drop");
        assert_eq!(outcome.status, OutcomeStatus::Win);
        assert!(events.contains(&GameEvent::Celebrate));
        assert_eq!(golf.phase(), ModePhase::Terminal);
    }

    #[test]
    fn test_hot_ball_deflects_upward() {
        let mut golf = ready();
        roll_toward_hole(&mut golf, 200.0);
        for _ in 0..10 {
            golf.tick(SIM_DT, &TickInput::default());
            if golf.ball.vel.y < 0.0 {
                break;
            }
        }
        assert!(golf.ball.vel.y < -300.0);
        assert!(golf.outcome().is_none());
    }

    #[test]
    fn test_out_of_bounds_loses_same_tick() {
        let mut golf = ready();
        golf.ball.place(Vec2::new(golf.world.right() + 51.0, 300.0));
        let frame = golf.tick(SIM_DT, &TickInput::default());
        let outcome = frame.outcome.expect("ball is out of bounds");
        assert_eq!(outcome.status, OutcomeStatus::Lose);
        assert!(LOSE_QUIPS.contains(&outcome.message.as_str()));
        assert!(frame.events.contains(&GameEvent::Audio(AudioCue::Lose)));
    }

    #[test]
    fn test_ball_rolling_off_the_end_loses() {
        let mut golf = ready();
        golf.ball.place(Vec2::new(3995.0, 447.0));
        golf.ball.vel = Vec2::new(60.0, 0.0);
        run_for(&mut golf, 5.0, &TickInput::default());
        let outcome = golf.outcome().expect("ball fell off the course");
        assert_eq!(outcome.status, OutcomeStatus::Lose);
        assert!(golf.ball.pos.x < golf.world.right() + golf.tuning.out_of_bounds_margin);
        assert_eq!(golf.phase(), ModePhase::Terminal);
    }

    #[test]
    fn test_quick_tap_hits_the_ball() {
        let mut golf = ready();
        let ball = golf.ball.pos;
        let aim = ball + Vec2::new(10.0, -10.0);
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Down(aim)]));
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Up(aim)]));
        let events = run_for(&mut golf, 0.75, &TickInput::default());
        assert!(events.contains(&GameEvent::Audio(AudioCue::GolfHit)));
        assert!(golf.ball.pos.x > ball.x);
    }

    #[test]
    fn test_sand_trap_needs_inset() {
        let mut golf = ready();
        // Left edge 447: short of the inset
        golf.ball.place(Vec2::new(450.0, 447.0));
        golf.ball.vel.x = 50.0;
        golf.tick(SIM_DT, &TickInput::default());
        assert!(golf.outcome().is_none());

        golf.ball.place(Vec2::new(470.0, 447.0));
        golf.tick(SIM_DT, &TickInput::default());
        assert_eq!(golf.outcome().unwrap().status, OutcomeStatus::Lose);
    }

    #[test]
    fn test_resting_ball_past_tee_loses() {
        let mut golf = ready();
        golf.ball.place(Vec2::new(900.0, 447.0));
        run_for(&mut golf, 0.1, &TickInput::default());
        assert_eq!(golf.outcome().unwrap().status, OutcomeStatus::Lose);
    }

    #[test]
    fn test_full_swing() {
        let mut golf = ready();
        let ball = golf.ball.pos;
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Down(ball + Vec2::new(10.0, -10.0))]));
        assert!(golf.swing.is_charging());
        run_for(&mut golf, 1.5, &TickInput::default());
        assert_eq!(golf.swing.charge(), 6);

        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Up(ball)]));
        assert!(golf.swing.is_resolving());
        assert_eq!(golf.ball.vel, Vec2::ZERO);

        let events = run_for(&mut golf, 0.75, &TickInput::default());
        assert!(events.contains(&GameEvent::Audio(AudioCue::GolfHit)));
        assert!(golf.ball.vel.x > 250.0);
        assert!(golf.ball.pos.y < 447.0);
    }

    #[test]
    fn test_reset_returns_ball_to_tee() {
        let mut golf = ready();
        golf.ball.place(Vec2::new(golf.world.right() + 51.0, 300.0));
        golf.tick(SIM_DT, &TickInput::default());
        assert_eq!(golf.phase(), ModePhase::Terminal);

        golf.reset();
        assert!(golf.outcome().is_none());
        assert_eq!(golf.phase(), ModePhase::Active);
        assert_eq!(golf.ball.pos, Vec2::new(86.0, 447.0));
        assert_eq!(golf.ball.vel, Vec2::ZERO);
        assert_eq!(golf.core.camera.scroll, Vec2::ZERO);
        assert_eq!(golf.core.timers.pending(), 0);
    }

    #[test]
    fn test_reset_key_cancels_swing() {
        let mut golf = ready();
        let ball = golf.ball.pos;
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Down(ball)]));
        run_for(&mut golf, 0.5, &TickInput::default());
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Up(ball)]));
        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        golf.tick(SIM_DT, &reset);
        assert!(!golf.swing.is_resolving());
        let events = run_for(&mut golf, 2.0, &TickInput::default());
        assert!(!events.contains(&GameEvent::Audio(AudioCue::GolfHit)));
    }

    #[test]
    fn test_intro_script_enables_input() {
        let mut golf = GolfMode::new(&Tuning::default(), 2);
        golf.start(false);
        let mut dialogs = 0;
        let mut events = golf.take_events();
        for _ in 0..1000 {
            for event in &events {
                if let GameEvent::DialogRequested { id, .. } = event {
                    dialogs += 1;
                    golf.resolve_dialog(*id);
                }
            }
            if golf.input_enabled() {
                break;
            }
            events = golf.take_events();
            events.extend(golf.tick(SIM_DT, &TickInput::default()).events);
        }
        assert_eq!(dialogs, 3);
        assert_eq!(golf.phase(), ModePhase::Active);
        assert_eq!(golf.core.camera.zoom, 1.0);
        assert_eq!(golf.core.camera.scroll, Vec2::ZERO);
    }

    #[test]
    fn test_pointer_ignored_during_intro() {
        let mut golf = GolfMode::new(&Tuning::default(), 2);
        golf.start(false);
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Down(Vec2::ZERO)]));
        assert!(!golf.swing.is_charging());
    }

    #[test]
    fn test_no_mutation_after_teardown() {
        let mut golf = ready();
        let ball = golf.ball.pos;
        golf.tick(SIM_DT, &pointer(vec![PointerEvent::Down(ball)]));
        golf.teardown();
        assert_eq!(golf.core.timers.pending(), 0);

        let before = golf.ball.clone();
        let frame = golf.tick(SIM_DT, &pointer(vec![PointerEvent::Up(ball)]));
        run_for(&mut golf, 2.0, &TickInput::default());
        golf.reset();
        assert_eq!(golf.ball, before);
        assert!(frame.events.is_empty());
        assert_eq!(golf.swing.charge(), 0);
    }
}

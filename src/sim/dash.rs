//! Dash mode: the couch runs right through traffic
//!
//! The run is scripted: an intro sequence, then constant horizontal speed.
//! The player only jumps. Two one-shot distance triggers interrupt the run:
//! the rules dialog, and the hand-over to golf.

use glam::Vec2;
use rand::Rng;

use super::anim::{AnimationPlayer, COUCH_JUMP};
use super::body::{Body, BodyKind, integrate};
use super::camera::ParallaxLayer;
use super::collision::{OverlapRule, can_jump, overlaps, resolve_ground_collision};
use super::geom::Rect;
use super::mode::{GameMode, ModeCore, ModeTimer, ScriptProgress, ScriptStep};
use super::state::{
    AudioCue, DialogId, EntityTransform, FrameResult, GameEvent, ModeId, ModePhase, Outcome,
    TickInput,
};
use super::timer::Throttle;
use crate::consts::*;
use crate::tuning::Tuning;

pub const INTRO: &[&str] = &[
    "Hey. You.\nYou're finally awake.",
    "Just kidding...\nHello, Carter.",
    "Do you want to play a game?",
    "Do you want to know who got you that gift card?",
    "Keep playing and you'll find out......",
];

pub const GAME_INTRO: &[&str] = &[
    "You wake up in a room filled with vaguely familiar things.",
    "Suddenly the thought hits you:\nBetter get moving!",
];

pub const GAME_RULES: &[&str] = &[
    "Traffic!\nGood thing this couch can jump!",
    "Press [space] repeatedly to jump vehicles\nand be careful to avoid clouds!",
];

pub const HIT_VEHICLE: &str = "You hit a vehicle!";
pub const HIT_CLOUD: &str = "You hit a cloud!";
pub const FELL_OUT: &str = "You fell out of the world!";

const PLAYER_ID: u32 = 1;
const GROUND_ID: u32 = 2;
const PARKED_ID: u32 = 3;
const FIRST_VEHICLE_ID: u32 = 100;
const FIRST_CLOUD_ID: u32 = 1000;

/// Parked car shown with the rules dialog; scenery, not a hazard
const PARKED_X: f32 = 1000.0;
/// Moving traffic starts here, clear of the couch until the rules dialog
const VEHICLE_COLUMN_X: f32 = 1200.0;
const VEHICLE_SPACING: f32 = 200.0;
const CLOUD_START_X: f32 = 1000.0;
const CLOUD_SPACING: f32 = 500.0;
/// Range of a cloud's bottom edge
const CLOUD_BOTTOM: (i32, i32) = (50, 150);
const CLOUD_SCALE: (u32, u32) = (2, 4);
const VEHICLE_SPRITES: u32 = 10;
const CLOUD_SPRITES: u32 = 5;

fn intro_script() -> [ScriptStep; 4] {
    [
        ScriptStep::Dialog {
            messages: INTRO,
            overlay: true,
        },
        ScriptStep::FadeIn(FADE_IN_SECS),
        ScriptStep::Dialog {
            messages: GAME_INTRO,
            overlay: false,
        },
        ScriptStep::Wait(RUN_START_DELAY_SECS),
    ]
}

/// A vehicle or cloud with its sprite sheet frame
#[derive(Debug, Clone, PartialEq)]
struct Obstacle {
    body: Body,
    sprite: u32,
}

pub struct DashMode {
    core: ModeCore,
    tuning: Tuning,
    world: Rect,
    player: Body,
    ground: Body,
    parked: Obstacle,
    vehicles: Vec<Obstacle>,
    clouds: Vec<Obstacle>,
    /// Entity state at the start of the run, restored by `reset`
    initial: (Body, Vec<Obstacle>, Vec<Obstacle>),
    /// Screen position the camera keeps the player at
    anchor: Vec2,
    parallax: ParallaxLayer,
    couch_anim: AnimationPlayer,
    jump_throttle: Throttle,
    jump_enabled: bool,
    jump_held: bool,
    restart: bool,
    rules_shown: bool,
    golf_triggered: bool,
    rules_dialog: Option<DialogId>,
}

impl DashMode {
    /// Build the level. `run` tags dialog ids and offsets the layout seed.
    pub fn new(tuning: &Tuning, run: u32) -> Self {
        let seed = tuning.seed.wrapping_add(run as u64);
        let viewport = Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let mut core = ModeCore::new(seed, run, viewport);
        let world = Rect::new(0.0, 0.0, DASH_WORLD_WIDTH, WORLD_HEIGHT);
        let ground_top = world.bottom() - GROUND_HEIGHT;

        let couch_half = Vec2::new(COUCH_SIZE.0, COUCH_SIZE.1) / 2.0;
        let player = Body::dynamic(
            PLAYER_ID,
            BodyKind::Player,
            Vec2::new(world.left + DASH_START_X + couch_half.x, 0.0),
            couch_half,
        )
        .with_bounce(0.3, 0.3)
        .resting_on(ground_top);

        let ground = Body::fixed(
            GROUND_ID,
            BodyKind::Ground,
            Rect::new(world.left, ground_top, world.width, GROUND_HEIGHT),
        );

        let vehicle_half = Vec2::new(VEHICLE_SIZE.0, VEHICLE_SIZE.1) / 2.0;
        let parked_at = Vec2::new(PARKED_X, 0.0);
        let parked = Obstacle {
            body: Body::dynamic(PARKED_ID, BodyKind::Obstacle, parked_at, vehicle_half)
                .resting_on(ground_top),
            sprite: core.rng.random_range(0..VEHICLE_SPRITES),
        };
        let mut vehicle_xs = Vec::new();
        let mut x = VEHICLE_COLUMN_X;
        while x <= world.right() {
            vehicle_xs.push(x);
            x += VEHICLE_SPACING;
        }
        let vehicles = vehicle_xs
            .into_iter()
            .zip(FIRST_VEHICLE_ID..)
            .map(|(x, id)| Obstacle {
                body: Body::dynamic(id, BodyKind::Obstacle, Vec2::new(x, 0.0), vehicle_half)
                    .resting_on(ground_top),
                sprite: core.rng.random_range(0..VEHICLE_SPRITES),
            })
            .collect::<Vec<_>>();

        let mut clouds = Vec::new();
        let mut x = world.left + CLOUD_START_X;
        let mut id = FIRST_CLOUD_ID;
        while x <= world.right() {
            let scale = core.rng.random_range(CLOUD_SCALE.0..=CLOUD_SCALE.1) as f32;
            let bottom = core.rng.random_range(CLOUD_BOTTOM.0..=CLOUD_BOTTOM.1) as f32;
            let half = Vec2::new(CLOUD_FRAME_SIZE.0, CLOUD_FRAME_SIZE.1) * scale / 2.0;
            clouds.push(Obstacle {
                body: Body::dynamic(id, BodyKind::Hazard, Vec2::new(x, 0.0), half)
                    .without_gravity()
                    .resting_on(world.top + bottom),
                sprite: core.rng.random_range(0..CLOUD_SPRITES),
            });
            x += CLOUD_SPACING;
            id += 1;
        }

        log::debug!(
            "Dash level built: {} vehicles, {} clouds",
            vehicles.len(),
            clouds.len()
        );

        let anchor = player.pos - core.camera.scroll;
        let (px, py) = tuning.dash_parallax;
        Self {
            core,
            tuning: tuning.clone(),
            world,
            initial: (player.clone(), vehicles.clone(), clouds.clone()),
            player,
            ground,
            parked,
            vehicles,
            clouds,
            anchor,
            parallax: ParallaxLayer::new(Vec2::new(px, py)),
            couch_anim: AnimationPlayer::default(),
            jump_throttle: Throttle::new(tuning.jump_throttle_secs),
            jump_enabled: false,
            jump_held: false,
            restart: false,
            rules_shown: false,
            golf_triggered: false,
            rules_dialog: None,
        }
    }

    /// Horizontal distance the couch has covered, whole units
    pub fn distance(&self) -> f32 {
        (self.player.left() - self.world.left - DASH_START_X).round()
    }

    pub fn player(&self) -> &Body {
        &self.player
    }

    pub fn jump_enabled(&self) -> bool {
        self.jump_enabled
    }

    fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        std::iter::once(&self.parked)
            .chain(self.vehicles.iter())
            .chain(self.clouds.iter())
    }

    fn obstacles_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.vehicles.iter_mut().chain(self.clouds.iter_mut())
    }

    fn begin(&mut self, restart: bool) {
        self.restart = restart;
        self.core.set_phase(ModePhase::Intro);
        let progress = if restart {
            self.jump_enabled = true;
            self.core.run_script(&[ScriptStep::Wait(RUN_START_DELAY_SECS)])
        } else {
            self.core.run_script(&intro_script())
        };
        if progress == ScriptProgress::Finished {
            self.start_run();
        }
    }

    fn randomize_obstacle_speeds(&mut self) {
        let (vmin, vmax) = self.tuning.vehicle_speed;
        let (cmin, cmax) = self.tuning.cloud_speed;
        for v in &mut self.vehicles {
            v.body.vel.x = self.core.rng.random_range(vmin..=vmax) as f32;
        }
        for c in &mut self.clouds {
            c.body.vel.x = self.core.rng.random_range(cmin..=cmax) as f32;
        }
    }

    fn start_run(&mut self) {
        self.core.set_phase(ModePhase::Active);
        self.player.vel.x = self.tuning.run_speed;
        self.randomize_obstacle_speeds();
        if !self.restart {
            self.core.emit(GameEvent::Audio(AudioCue::BackgroundMusic));
        }
        log::info!("Dash run started (restart: {})", self.restart);
    }

    /// Freeze everything in place
    fn pause(&mut self) {
        self.player.vel = Vec2::ZERO;
        for o in self.obstacles_mut() {
            o.body.vel = Vec2::ZERO;
        }
        self.core.set_phase(ModePhase::Paused);
    }

    fn resume(&mut self) {
        self.core.set_phase(ModePhase::Active);
        self.player.vel.x = self.tuning.resume_speed;
        self.randomize_obstacle_speeds();
        self.jump_enabled = true;
        log::info!("Dash run resumed at {}", self.tuning.resume_speed);
    }

    fn handle_jump(&mut self, held: bool) {
        let pressed = held && !self.jump_held;
        self.jump_held = held;
        if !pressed || !self.jump_enabled || self.core.phase() != ModePhase::Active {
            return;
        }
        if !can_jump(&self.player, self.tuning.jump_grace_speed()) {
            log::trace!("Jump rejected mid-air (vy = {})", self.player.vel.y);
            return;
        }
        if !self.jump_throttle.try_pass(self.core.timers.now()) {
            return;
        }
        self.player.vel.y = -self.tuning.jump_velocity;
        self.couch_anim.play(COUCH_JUMP);
    }

    fn step_bodies(&mut self, dt: f32) {
        let gravity = self.tuning.gravity;
        integrate(&mut self.player, gravity, dt);
        resolve_ground_collision(&mut self.player, &self.ground);
        integrate(&mut self.parked.body, gravity, dt);
        resolve_ground_collision(&mut self.parked.body, &self.ground);
        let ground = &self.ground;
        for o in self.vehicles.iter_mut().chain(self.clouds.iter_mut()) {
            integrate(&mut o.body, gravity, dt);
            if o.body.allows_gravity {
                resolve_ground_collision(&mut o.body, ground);
            }
        }
    }

    fn evaluate_triggers(&mut self) {
        if !self.world.contains(self.player.pos) {
            self.core.finish(Outcome::lose(FELL_OUT));
            return;
        }

        let p = self.tuning.hazard_penetration;
        let rule = OverlapRule::MinPenetration { x: p, y: p };
        let hit = self
            .vehicles
            .iter()
            .find(|v| overlaps(&self.player, &v.body, rule))
            .map(|v| (v.body.id, HIT_VEHICLE))
            .or_else(|| {
                self.clouds
                    .iter()
                    .find(|c| overlaps(&self.player, &c.body, rule))
                    .map(|c| (c.body.id, HIT_CLOUD))
            });
        if let Some((id, message)) = hit {
            log::debug!("Couch hit hazard {}", id);
            self.core.finish(Outcome::lose(message));
            return;
        }

        let distance = self.distance();
        if !self.rules_shown && distance > RULES_TRIGGER_DISTANCE {
            self.rules_shown = true;
            self.pause();
            self.rules_dialog = Some(self.core.request_dialog(GAME_RULES, false));
            return;
        }
        if !self.golf_triggered && distance > GOLF_TRIGGER_DISTANCE {
            self.golf_triggered = true;
            self.pause();
            log::info!("Dash run reached the golf course");
            self.core.emit(GameEvent::ModeSwitch(ModeId::Golf));
        }
    }

    fn frame(&mut self) -> FrameResult {
        let mut entities = vec![
            EntityTransform::of(&self.player, self.couch_anim.frame()),
            EntityTransform::of(&self.ground, 0),
        ];
        entities.extend(self.obstacles().map(|o| EntityTransform::of(&o.body, o.sprite)));
        self.core
            .frame(ModeId::Dash, entities, self.parallax.offset, None)
    }
}

impl GameMode for DashMode {
    fn id(&self) -> ModeId {
        ModeId::Dash
    }

    fn start(&mut self, restart: bool) {
        if self.core.guard_torn_down("start") {
            return;
        }
        log::info!("Dash mode starting (restart: {})", restart);
        self.begin(restart);
    }

    fn tick(&mut self, dt: f32, input: &TickInput) -> FrameResult {
        if self.core.guard_torn_down("tick") || self.core.phase() == ModePhase::Terminal {
            return self.frame();
        }

        self.core.timers.advance(dt);
        while let Some((id, kind)) = self.core.timers.pop_due() {
            match kind {
                ModeTimer::Script => {
                    if self.core.on_script_timer(id) == Some(ScriptProgress::Finished) {
                        self.start_run();
                    }
                }
                ModeTimer::Swing(which) => log::debug!("Dash ignoring swing timer {:?}", which),
            }
        }

        self.handle_jump(input.jump);

        if self.core.phase() == ModePhase::Active {
            self.step_bodies(dt);
            self.couch_anim.advance(dt);
            self.evaluate_triggers();
        }

        let lerp = Vec2::new(self.tuning.dash_follow_lerp, 0.0);
        let mut delta = self.core.camera.advance(dt);
        delta += self.core.camera.follow(self.player.pos, self.anchor, lerp);
        self.parallax.apply(delta);

        self.frame()
    }

    fn resolve_dialog(&mut self, id: DialogId) {
        if self.core.guard_torn_down("resolve_dialog") {
            return;
        }
        if let Some(progress) = self.core.on_script_dialog(id) {
            if progress == ScriptProgress::Finished {
                self.start_run();
            }
            return;
        }
        if self.rules_dialog == Some(id) {
            self.rules_dialog = None;
            if self.core.phase() == ModePhase::Paused {
                self.resume();
            }
            return;
        }
        log::debug!("Dash ignoring unknown dialog {:?}", id);
    }

    fn reset(&mut self) {
        if self.core.guard_torn_down("reset") {
            return;
        }
        log::info!("Dash mode reset");
        self.core.cancel_script();
        self.core.timers.cancel_all();
        let (player, vehicles, clouds) = self.initial.clone();
        self.player = player;
        self.vehicles = vehicles;
        self.clouds = clouds;
        self.rules_shown = false;
        self.golf_triggered = false;
        self.rules_dialog = None;
        self.jump_held = false;
        self.jump_throttle.reset();
        self.couch_anim.stop_at(0);
        self.core.camera.reset(Vec2::ZERO);
        self.core.clear_outcome();
        self.begin(true);
    }

    fn teardown(&mut self) {
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

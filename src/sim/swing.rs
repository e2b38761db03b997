//! Charge-and-release swing controller
//!
//! `Idle → Charging → Resolving → Idle`. Press starts charging, a repeating
//! timer adds one charge step per interval up to the cap, pointer moves
//! re-aim (throttled), release locks in the swing parameters and starts
//! the swing animation. The impulse lands on the animation's contact
//! keyframe, not on release.

use glam::Vec2;

use super::anim::{GOLF_SWING, GOLF_SWING_CONTACT_FRAME};
use super::timer::{Throttle, TimerId, Timers};
use crate::tuning::Tuning;
use crate::{aim_angle_degrees, velocity_from_angle};

/// Timers owned by the swing controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingTimer {
    /// One charge step
    Charge,
    /// Club meets ball
    Impulse,
    /// Swing animation finished
    Complete,
    /// Delayed speed check for the crowd cue
    Applause,
}

/// Swing parameters captured on release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingParams {
    pub charge: u32,
    pub angle_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwingPhase {
    Idle,
    Charging {
        timer: Option<TimerId>,
    },
    Resolving {
        params: SwingParams,
        impulse: Option<TimerId>,
        complete: TimerId,
    },
}

/// What the owning mode should do after a swing timer fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwingAction {
    /// Set the ball's velocity
    Impulse(Vec2),
    /// Check the ball's speed for the applause cue
    CheckApplause,
    /// Swing finished, input accepted again
    Complete,
}

/// Velocity produced by a swing
pub fn swing_velocity(params: SwingParams, scale: f32) -> Vec2 {
    velocity_from_angle(params.angle_degrees, scale * params.charge as f32)
}

#[derive(Debug, Clone)]
pub struct SwingController {
    phase: SwingPhase,
    charge: u32,
    angle_degrees: f32,
    aim_throttle: Throttle,
    applause: Option<TimerId>,
    max_charge: u32,
    charge_interval: f32,
    scale: f32,
    applause_delay: f32,
}

impl SwingController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: SwingPhase::Idle,
            charge: 0,
            angle_degrees: 0.0,
            aim_throttle: Throttle::new(tuning.aim_throttle_secs),
            applause: None,
            max_charge: tuning.max_charge,
            charge_interval: tuning.charge_interval_secs,
            scale: tuning.swing_scale,
            applause_delay: tuning.applause_delay_secs,
        }
    }

    pub fn phase(&self) -> SwingPhase {
        self.phase
    }

    pub fn charge(&self) -> u32 {
        self.charge
    }

    pub fn max_charge(&self) -> u32 {
        self.max_charge
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.phase, SwingPhase::Charging { .. })
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.phase, SwingPhase::Resolving { .. })
    }

    /// Charge meter fill in [0, 1]
    pub fn meter(&self) -> f32 {
        (self.charge as f32 / self.max_charge as f32).clamp(0.0, 1.0)
    }

    /// Start charging. Ignored unless idle.
    pub fn press<K>(&mut self, pointer: Vec2, ball: Vec2, timers: &mut Timers<K>) -> bool
    where
        K: From<SwingTimer> + Copy + std::fmt::Debug,
    {
        if self.phase != SwingPhase::Idle {
            log::debug!("Swing press ignored in {:?}", self.phase);
            return false;
        }
        // The first step lands on the press itself, so a tap still swings
        self.charge = 1.min(self.max_charge);
        self.angle_degrees = aim_angle_degrees(pointer - ball);
        self.aim_throttle.reset();
        let timer = (self.charge < self.max_charge)
            .then(|| timers.every(self.charge_interval, SwingTimer::Charge.into()));
        self.phase = SwingPhase::Charging { timer };
        true
    }

    /// Re-aim while charging, at most once per throttle interval
    pub fn aim(&mut self, pointer: Vec2, ball: Vec2, now: f64) -> bool {
        if !self.is_charging() || !self.aim_throttle.try_pass(now) {
            return false;
        }
        self.angle_degrees = aim_angle_degrees(pointer - ball);
        true
    }

    /// Release the swing. Returns the locked-in parameters, or `None`
    /// when there was nothing to release.
    pub fn release<K>(&mut self, timers: &mut Timers<K>) -> Option<SwingParams>
    where
        K: From<SwingTimer> + Copy + std::fmt::Debug,
    {
        let SwingPhase::Charging { timer } = self.phase else {
            log::debug!("Swing release ignored in {:?}", self.phase);
            return None;
        };
        if let Some(timer) = timer {
            timers.cancel(timer);
        }

        let params = SwingParams {
            charge: self.charge,
            angle_degrees: self.angle_degrees,
        };
        self.charge = 0;

        let contact = GOLF_SWING
            .keyframe_time(GOLF_SWING_CONTACT_FRAME)
            .unwrap_or(0.0);
        let impulse = timers.after(contact, SwingTimer::Impulse.into());
        let complete = timers.after(GOLF_SWING.duration(), SwingTimer::Complete.into());
        self.phase = SwingPhase::Resolving {
            params,
            impulse: Some(impulse),
            complete,
        };
        log::debug!("Swing released: charge={} angle={}", params.charge, params.angle_degrees);
        Some(params)
    }

    /// Handle one of this controller's timers
    pub fn on_timer<K>(
        &mut self,
        id: TimerId,
        which: SwingTimer,
        timers: &mut Timers<K>,
    ) -> Option<SwingAction>
    where
        K: From<SwingTimer> + Copy + std::fmt::Debug,
    {
        match (which, self.phase) {
            (SwingTimer::Charge, SwingPhase::Charging { timer: Some(t) }) if t == id => {
                if self.charge < self.max_charge {
                    self.charge += 1;
                }
                if self.charge >= self.max_charge {
                    timers.cancel(t);
                    self.phase = SwingPhase::Charging { timer: None };
                }
                None
            }
            (
                SwingTimer::Impulse,
                SwingPhase::Resolving {
                    params,
                    impulse: Some(t),
                    complete,
                },
            ) if t == id => {
                self.phase = SwingPhase::Resolving {
                    params,
                    impulse: None,
                    complete,
                };
                self.applause = Some(timers.after(self.applause_delay, SwingTimer::Applause.into()));
                Some(SwingAction::Impulse(swing_velocity(params, self.scale)))
            }
            (SwingTimer::Complete, SwingPhase::Resolving { complete, .. }) if complete == id => {
                self.phase = SwingPhase::Idle;
                Some(SwingAction::Complete)
            }
            (SwingTimer::Applause, _) if self.applause == Some(id) => {
                self.applause = None;
                Some(SwingAction::CheckApplause)
            }
            _ => {
                log::debug!("Stale swing timer {:?} ({:?}) in {:?}", id, which, self.phase);
                None
            }
        }
    }

    /// Drop everything in flight and go back to idle
    pub fn cancel<K>(&mut self, timers: &mut Timers<K>)
    where
        K: Copy + std::fmt::Debug,
    {
        match self.phase {
            SwingPhase::Charging { timer: Some(t) } => {
                timers.cancel(t);
            }
            SwingPhase::Resolving {
                impulse, complete, ..
            } => {
                if let Some(t) = impulse {
                    timers.cancel(t);
                }
                timers.cancel(complete);
            }
            _ => {}
        }
        if let Some(t) = self.applause.take() {
            timers.cancel(t);
        }
        self.phase = SwingPhase::Idle;
        self.charge = 0;
        self.aim_throttle.reset();
    }
}

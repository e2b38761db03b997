//! Kinematic bodies and per-tick integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, Shape};

/// What a body represents in its mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Obstacle,
    Ball,
    Target,
    Hazard,
    Ground,
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub shape: Shape,
    /// Center position (world units, +y down)
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    /// Static bodies are collided against but never integrated
    pub is_static: bool,
    pub allows_gravity: bool,
    /// Restitution per axis, in [0, 1]
    pub bounce: Vec2,
    /// Horizontal drag (units/s²)
    pub drag_x: f32,
    /// Resting on a ground body this tick
    #[serde(skip)]
    pub touching_ground: bool,
}

impl Body {
    /// A dynamic body affected by gravity
    pub fn dynamic(id: u32, kind: BodyKind, pos: Vec2, half: Vec2) -> Self {
        Self {
            id,
            kind,
            shape: Shape::Rectangle,
            pos,
            vel: Vec2::ZERO,
            half,
            is_static: false,
            allows_gravity: true,
            bounce: Vec2::ZERO,
            drag_x: 0.0,
            touching_ground: false,
        }
    }

    /// An immovable body (ground, hole, sand trap)
    pub fn fixed(id: u32, kind: BodyKind, bounds: Rect) -> Self {
        let pos = bounds.center();
        Self {
            is_static: true,
            allows_gravity: false,
            ..Self::dynamic(id, kind, pos, bounds.half_extents())
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_bounce(mut self, x: f32, y: f32) -> Self {
        self.bounce = Vec2::new(x, y);
        self
    }

    pub fn with_drag(mut self, drag_x: f32) -> Self {
        self.drag_x = drag_x;
        self
    }

    pub fn without_gravity(mut self) -> Self {
        self.allows_gravity = false;
        self
    }

    /// Place the body so its bottom edge sits at `y`
    pub fn resting_on(mut self, y: f32) -> Self {
        self.pos.y = y - self.half.y;
        self
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.half)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.half.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half.y
    }

    /// Set velocity, ignored for static bodies
    pub fn set_velocity(&mut self, vel: Vec2) {
        if self.is_static {
            log::debug!("Ignoring velocity on static body {}", self.id);
            return;
        }
        self.vel = vel;
    }

    /// Teleport, keeping velocity
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
    }
}

/// Advance a body by one step: gravity, horizontal drag, then position.
///
/// Static bodies are left untouched.
pub fn integrate(body: &mut Body, gravity: f32, dt: f32) {
    if body.is_static {
        log::trace!("Skipping integration of static body {}", body.id);
        return;
    }

    body.touching_ground = false;

    if body.allows_gravity {
        body.vel.y += gravity * dt;
    }

    if body.drag_x > 0.0 && body.vel.x != 0.0 {
        let slow = body.vel.x.abs().min(body.drag_x * dt);
        body.vel.x -= body.vel.x.signum() * slow;
    }

    body.pos += body.vel * dt;
}

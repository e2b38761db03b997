//! Collision detection and response for axis-aligned bodies
//!
//! Two concerns live here: separating dynamic bodies from static ones
//! (ground contact, bounce) and overlap queries used by trigger regions
//! (hazards, the hole). Overlap queries never move anything.

use glam::Vec2;

use super::body::Body;
use super::geom::{Rect, Shape};

/// Restitution below this snaps the bounced axis to zero
pub const BOUNCE_EPSILON: f32 = 0.05;

/// Rebound speeds below this are treated as coming to rest, otherwise
/// gravity and bounce trade a few units of speed forever
pub const REST_SPEED: f32 = 20.0;

/// Contact produced when a body is pushed out of a static one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Separation direction, pointing from the static body toward the
    /// dynamic one along a single axis
    pub normal: Vec2,
    /// Depth that was removed
    pub penetration: f32,
}

/// Refinement applied after the shapes are known to touch
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverlapRule {
    /// Any contact, touching edges included
    #[default]
    Any,
    /// Intersection must be at least this deep on each axis
    MinPenetration { x: f32, y: f32 },
    /// Horizontal center distance must not exceed `dx`
    CenterWithin { dx: f32 },
    /// `a`'s left edge must be at least `inset` inside `b`'s left edge
    LeftEdgeInset { inset: f32 },
}

/// Reflect a velocity component off a surface
#[inline]
fn rebound(v: f32, restitution: f32) -> f32 {
    if restitution < BOUNCE_EPSILON {
        return 0.0;
    }
    let r = -v * restitution;
    if r.abs() < REST_SPEED { 0.0 } else { r }
}

/// Push a dynamic body out of a static one along `normal` (a unit axis
/// vector pointing away from the static body), leaving the edges exactly
/// touching.
///
/// Velocity on that axis is reflected (scaled by the body's restitution)
/// only when the body is moving into the surface. Resting contact counts
/// as a contact with zero penetration.
pub fn resolve_static_collision(
    body: &mut Body,
    fixed: &Body,
    normal: Vec2,
) -> Option<Contact> {
    if body.is_static {
        return None;
    }
    let a = body.bounds();
    let b = fixed.bounds();
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }
    let overlap = a.intersection(&b)?;

    let penetration = if normal.x != 0.0 {
        body.pos.x = if normal.x > 0.0 {
            fixed.right() + body.half.x
        } else {
            fixed.left() - body.half.x
        };
        if body.vel.x * normal.x < 0.0 {
            body.vel.x = rebound(body.vel.x, body.bounce.x);
        }
        overlap.x
    } else {
        body.pos.y = if normal.y > 0.0 {
            fixed.bottom() + body.half.y
        } else {
            fixed.top() - body.half.y
        };
        if body.vel.y * normal.y < 0.0 {
            body.vel.y = rebound(body.vel.y, body.bounce.y);
        }
        overlap.y
    };

    Some(Contact {
        normal,
        penetration,
    })
}

/// Keep a body on top of the ground and record ground contact.
///
/// Bodies moving upward are left alone so a jump can leave the surface.
/// Idempotent for a body already resting on the ground.
pub fn resolve_ground_collision(body: &mut Body, ground: &Body) -> bool {
    if body.vel.y < 0.0 {
        return false;
    }
    if resolve_static_collision(body, ground, Vec2::NEG_Y).is_some() {
        body.touching_ground = true;
        true
    } else {
        false
    }
}

/// Whether two bodies touch, refined by `rule`.
///
/// Zero-area bodies never overlap.
pub fn overlaps(a: &Body, b: &Body, rule: OverlapRule) -> bool {
    let ra = a.bounds();
    let rb = b.bounds();
    if ra.is_degenerate() || rb.is_degenerate() {
        return false;
    }

    let touching = match (a.shape, b.shape) {
        (Shape::Rectangle, Shape::Rectangle) => ra.intersection(&rb).is_some(),
        (Shape::Ellipse, _) => ellipse_touches_rect(a.pos, a.half, &rb),
        (Shape::Rectangle, Shape::Ellipse) => ellipse_touches_rect(b.pos, b.half, &ra),
    };
    if !touching {
        return false;
    }

    match rule {
        OverlapRule::Any => true,
        OverlapRule::MinPenetration { x, y } => ra
            .intersection(&rb)
            .is_some_and(|depth| depth.x >= x && depth.y >= y),
        OverlapRule::CenterWithin { dx } => (a.pos.x - b.pos.x).abs() <= dx,
        OverlapRule::LeftEdgeInset { inset } => a.left() >= b.left() + inset,
    }
}

/// Ellipse vs rectangle: closest point of the rectangle, measured in the
/// ellipse's unit-circle space. A second ellipse is approximated by its box.
fn ellipse_touches_rect(center: Vec2, radii: Vec2, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.left, rect.right()),
        center.y.clamp(rect.top, rect.bottom()),
    );
    let d = (closest - center) / radii;
    d.length_squared() <= 1.0 + 1e-5
}

/// Jump permission: on the ground, or already falling faster than the
/// grace speed (a late double-tap still counts).
pub fn can_jump(body: &Body, grace_speed: f32) -> bool {
    body.touching_ground || body.vel.y > grace_speed
}

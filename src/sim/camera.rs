//! Camera follow, parallax and scripted camera moves

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// Background layer that scrolls slower than the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    /// Fraction of camera movement applied to the layer, per axis
    pub ratio: Vec2,
    /// Accumulated tile offset
    pub offset: Vec2,
    /// Per-axis deltas smaller than this are ignored
    pub threshold: f32,
}

impl ParallaxLayer {
    pub fn new(ratio: Vec2) -> Self {
        Self {
            ratio,
            offset: Vec2::ZERO,
            threshold: 0.1,
        }
    }

    /// Move by a scroll delta. Absolute scroll is never consulted, so a
    /// camera reset cannot make the layer jump.
    pub fn apply(&mut self, delta: Vec2) {
        if delta.x.abs() >= self.threshold {
            self.offset.x += delta.x * self.ratio.x;
        }
        if delta.y.abs() >= self.threshold {
            self.offset.y += delta.y * self.ratio.y;
        }
    }
}

/// Sine in-out easing on [0, 1]
#[inline]
pub fn ease_sine_in_out(t: f32) -> f32 {
    -((PI * t.clamp(0.0, 1.0)).cos() - 1.0) / 2.0
}

/// Yoyo camera tween: ease out to a target view, then back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutscene {
    pub scroll: Vec2,
    pub zoom: f32,
    /// Duration of each leg (seconds)
    pub leg_secs: f32,
}

impl Cutscene {
    /// Total play time, both legs
    pub fn duration(&self) -> f32 {
        self.leg_secs * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveCutscene {
    cutscene: Cutscene,
    from_scroll: Vec2,
    from_zoom: f32,
    elapsed: f32,
}

/// Viewport into the world
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub scroll: Vec2,
    pub viewport: Vec2,
    pub zoom: f32,
    fade: Option<(f32, f32)>,
    cutscene: Option<ActiveCutscene>,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport,
            zoom: 1.0,
            fade: None,
            cutscene: None,
        }
    }

    /// Jump to a scroll position without producing a delta
    pub fn reset(&mut self, scroll: Vec2) {
        self.scroll = scroll;
        self.zoom = 1.0;
        self.cutscene = None;
    }

    /// Screen point to world point
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + self.scroll
    }

    /// Ease toward keeping `target` at `anchor` (screen space). A lerp of
    /// 0 on an axis pins that axis. Returns the scroll delta.
    pub fn follow(&mut self, target: Vec2, anchor: Vec2, lerp: Vec2) -> Vec2 {
        let before = self.scroll;
        let wanted = target - anchor;
        self.scroll += (wanted - self.scroll) * lerp;
        self.scroll - before
    }

    /// Center `target` in the viewport, never scrolling left of or below
    /// the world's origin. Returns the scroll delta.
    pub fn track_clamped(&mut self, target: Vec2, world: &Rect) -> Vec2 {
        let before = self.scroll;
        let half = self.viewport / 2.0;
        self.scroll.x = (target.x - half.x).round().max(world.left);
        self.scroll.y = (target.y - half.y).round().min(world.top);
        self.scroll - before
    }

    /// Start a fade from black
    pub fn fade_in(&mut self, secs: f32) {
        self.fade = Some((0.0, secs.max(f32::EPSILON)));
    }

    /// Black overlay opacity: 1 fully black, 0 clear
    pub fn fade_alpha(&self) -> f32 {
        match self.fade {
            Some((elapsed, secs)) => 1.0 - (elapsed / secs).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    pub fn start_cutscene(&mut self, cutscene: Cutscene) {
        self.cutscene = Some(ActiveCutscene {
            cutscene,
            from_scroll: self.scroll,
            from_zoom: self.zoom,
            elapsed: 0.0,
        });
    }

    /// Snap a running cutscene to its end
    pub fn end_cutscene(&mut self) {
        if let Some(active) = self.cutscene.take() {
            self.scroll = active.from_scroll;
            self.zoom = active.from_zoom;
        }
    }

    pub fn in_cutscene(&self) -> bool {
        self.cutscene.is_some()
    }

    /// Advance fades and cutscenes. Returns the scroll delta they caused.
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        if let Some((elapsed, secs)) = self.fade {
            let elapsed = elapsed + dt;
            self.fade = if elapsed >= secs { None } else { Some((elapsed, secs)) };
        }

        let Some(mut active) = self.cutscene else {
            return Vec2::ZERO;
        };
        let before = self.scroll;
        active.elapsed += dt;
        let c = active.cutscene;
        let t = active.elapsed / c.leg_secs;
        let p = if t <= 1.0 {
            ease_sine_in_out(t)
        } else {
            ease_sine_in_out(2.0 - t)
        };
        self.scroll = active.from_scroll + (c.scroll - active.from_scroll) * p;
        self.zoom = active.from_zoom + (c.zoom - active.from_zoom) * p;

        if active.elapsed >= c.duration() {
            self.scroll = active.from_scroll;
            self.zoom = active.from_zoom;
            self.cutscene = None;
        } else {
            self.cutscene = Some(active);
        }
        self.scroll - before
    }
}

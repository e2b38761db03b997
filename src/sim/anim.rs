//! Sprite frame timelines
//!
//! Animations matter to the simulation only through their timing: the swing
//! impulse lands on a keyframe, and the swing resolves when the animation
//! ends. The frame index is also forwarded to the renderer.

/// A fixed sequence of sheet frames played at a constant rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub frames: &'static [u32],
    pub frame_rate: f32,
}

/// Golfer swing: wind-up, contact on frame 2, follow-through
pub const GOLF_SWING: Animation = Animation {
    frames: &[0, 0, 0, 1, 1, 1, 1, 2, 3, 4, 4, 4, 4, 4, 4],
    frame_rate: 10.0,
};

/// Sheet frame at which the club meets the ball
pub const GOLF_SWING_CONTACT_FRAME: u32 = 2;

/// Couch hop
pub const COUCH_JUMP: Animation = Animation {
    frames: &[0, 1, 2, 1, 0],
    frame_rate: 10.0,
};

impl Animation {
    /// Total play time (seconds)
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 / self.frame_rate
    }

    /// Sheet frame shown `elapsed` seconds in (holds the last frame)
    pub fn frame_at(&self, elapsed: f32) -> u32 {
        let idx = (elapsed.max(0.0) * self.frame_rate) as usize;
        let idx = idx.min(self.frames.len().saturating_sub(1));
        self.frames.get(idx).copied().unwrap_or(0)
    }

    /// Time at which `frame` first appears, if it appears at all
    pub fn keyframe_time(&self, frame: u32) -> Option<f32> {
        self.frames
            .iter()
            .position(|&f| f == frame)
            .map(|idx| idx as f32 / self.frame_rate)
    }
}

/// Playback state for one sprite
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
    current: Option<Animation>,
    elapsed: f32,
    /// Frame shown when nothing is playing
    frame: u32,
}

impl AnimationPlayer {
    pub fn play(&mut self, anim: Animation) {
        self.current = Some(anim);
        self.elapsed = 0.0;
        self.frame = anim.frame_at(0.0);
    }

    /// Stop and show `frame`
    pub fn stop_at(&mut self, frame: u32) {
        self.current = None;
        self.elapsed = 0.0;
        self.frame = frame;
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn advance(&mut self, dt: f32) {
        let Some(anim) = self.current else {
            return;
        };
        self.elapsed += dt;
        self.frame = anim.frame_at(self.elapsed);
        if self.elapsed >= anim.duration() {
            // Hold the last frame like the sprite does when an animation ends
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swing_timing() {
        assert!((GOLF_SWING.duration() - 1.5).abs() < 1e-6);
        let contact = GOLF_SWING.keyframe_time(GOLF_SWING_CONTACT_FRAME).unwrap();
        assert!((contact - 0.7).abs() < 1e-6);
        assert_eq!(GOLF_SWING.keyframe_time(9), None);
    }

    #[test]
    fn test_frame_at_holds_last() {
        assert_eq!(COUCH_JUMP.frame_at(0.0), 0);
        assert_eq!(COUCH_JUMP.frame_at(0.25), 2);
        assert_eq!(COUCH_JUMP.frame_at(10.0), 0);
        assert_eq!(GOLF_SWING.frame_at(10.0), 4);
    }

    #[test]
    fn test_player_runs_to_completion() {
        let mut player = AnimationPlayer::default();
        player.play(GOLF_SWING);
        assert!(player.is_playing());
        for _ in 0..100 {
            player.advance(1.0 / 60.0);
        }
        assert!(!player.is_playing());
        assert_eq!(player.frame(), 4);

        player.stop_at(0);
        assert_eq!(player.frame(), 0);
    }
}

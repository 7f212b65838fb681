//! Frame cycling for looping world sprites (water, for now).

use bevy::prelude::*;

use super::maps::WorldSetupError;

/// A looping frame counter. The fractional frame advances by `rate`
/// frames per second and wraps by modulo, so an arbitrarily large delta
/// lands on a valid frame instead of stepping out of range.
#[derive(Component, Debug, Clone)]
pub struct Animated {
    frame: f32,
    rate: f32,
    frames: usize,
}

impl Animated {
    pub fn new(frames: usize, rate: f32) -> Result<Self, WorldSetupError> {
        if frames == 0 {
            return Err(WorldSetupError::EmptyAnimation("animated sprite"));
        }
        Ok(Self { frame: 0.0, rate, frames })
    }

    pub fn advance(&mut self, dt: f32) {
        self.frame = (self.frame + self.rate * dt) % self.frames as f32;
    }

    pub fn current(&self) -> usize {
        self.frame as usize
    }
}

/// Advances every looping animation and pushes the frame into the atlas.
pub fn animate_sprites(time: Res<Time>, mut query: Query<(&mut Animated, &mut Sprite)>) {
    for (mut animated, mut sprite) in &mut query {
        animated.advance(time.delta_secs());
        if let Some(atlas) = &mut sprite.texture_atlas {
            atlas.index = animated.current();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frames_is_rejected() {
        assert!(Animated::new(0, 5.0).is_err());
        assert!(Animated::new(1, 5.0).is_ok());
    }

    #[test]
    fn frames_wrap_by_modulo() {
        let mut animated = Animated::new(4, 5.0).unwrap();
        // 0.9 s at 5 f/s is 4.5 frames: wraps to 0.5, displaying frame 0.
        animated.advance(0.9);
        assert_eq!(animated.current(), 0);
        // A huge delta still lands in range.
        animated.advance(1000.0);
        assert!(animated.current() < 4);
    }

    #[test]
    fn zero_delta_holds_the_frame() {
        let mut animated = Animated::new(4, 5.0).unwrap();
        animated.advance(0.3);
        let before = animated.current();
        animated.advance(0.0);
        assert_eq!(animated.current(), before);
    }

    #[test]
    fn steady_rate_steps_through_every_frame() {
        let mut animated = Animated::new(4, 5.0).unwrap();
        let mut seen = [false; 4];
        for _ in 0..40 {
            animated.advance(0.05);
            seen[animated.current()] = true;
        }
        assert_eq!(seen, [true; 4]);
    }
}

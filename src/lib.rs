//! Rewind Runner - a reverse-time arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, scoring, phases)
//! - `renderer`: Draws a `GameState` onto any 2D `Surface` (canvas on web)
//! - `platform`: Browser input mapping and storage access
//! - `highscores`: Persisted best score
//! - `settings`: Player preferences

pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (tab-away guard)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player glyph (arrow pointing left)
    pub const PLAYER_X: f32 = 60.0;
    pub const PLAYER_W: f32 = 28.0;
    pub const PLAYER_H: f32 = 36.0;
    /// Keyboard movement speed (px/s)
    pub const PLAYER_SPEED: f32 = 300.0;
    /// Touch-follow gain (fraction of remaining distance per second)
    pub const TOUCH_FOLLOW_GAIN: f32 = 9.0;
    /// Touch targets closer than this are considered reached
    pub const TOUCH_DEADZONE: f32 = 2.0;

    /// Dash impulse
    pub const DASH_SPEED: f32 = 900.0;
    pub const DASH_DURATION: f32 = 0.15;
    pub const DASH_COOLDOWN: f32 = 0.8;
    /// Seconds between dash afterimages
    pub const AFTERIMAGE_INTERVAL: f32 = 0.02;
    pub const AFTERIMAGE_LIFE: f32 = 0.25;

    /// Projectiles
    pub const PROJ_RADIUS: f32 = 6.0;
    /// Base projectile speed (px/s)
    pub const BASE_SPEED: f32 = 180.0;
    /// Extra projectile speed per difficulty point (px/s)
    pub const SPEED_PER_DIFFICULTY: f32 = 24.0;
    pub const TRAIL_LENGTH: usize = 8;
    pub const CATCH_DIST: f32 = 30.0;
    /// Projectiles left of this x are misses
    pub const MISS_X: f32 = -20.0;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 26.0;
    pub const ENEMY_SHARDS: usize = 6;
    /// Horizontal / vertical reach within which a projectile revives an enemy
    pub const REVIVE_REACH_X: f32 = 60.0;
    pub const REVIVE_REACH_Y: f32 = 40.0;
    /// Seconds for shards to converge
    pub const ASSEMBLY_DURATION: f32 = 0.4;
    pub const REVIVE_FLASH: f32 = 0.3;
    /// Enemy scroll speed relative to projectile speed
    pub const ENEMY_SCROLL_FACTOR: f32 = 0.3;

    /// Spawning (seconds)
    pub const SPAWN_INTERVAL_START: f32 = 1.2;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.4;
    pub const SPAWN_INTERVAL_PER_DIFFICULTY: f32 = 0.06;
    pub const SPAWN_MARGIN: f32 = 60.0;

    /// Session
    pub const LIVES_MAX: u8 = 3;
    /// Score needed per difficulty point
    pub const SCORE_PER_DIFFICULTY: f32 = 200.0;
    pub const CATCH_POINTS: u64 = 10;
    /// Catches per combo multiplier step
    pub const COMBO_STEP: u32 = 5;

    /// Fast forward
    pub const FAST_FORWARD_INTERVAL: u64 = 500;
    pub const FAST_FORWARD_DURATION: f32 = 2.0;
    pub const FAST_FORWARD_SPEED: f32 = 2.0;
    pub const FAST_FORWARD_SPAWN: f32 = 0.5;
    pub const FAST_FORWARD_STAR_SPEED: f32 = 3.0;

    /// Screen shake on miss
    pub const SHAKE_DURATION: f32 = 0.3;
    pub const SHAKE_INTENSITY: f32 = 6.0;

    /// Background
    pub const BG_STAR_COUNT: usize = 80;
    pub const GRID_SPACING: f32 = 60.0;
    /// Scanline scroll (px/s, wraps every 4 px)
    pub const SCANLINE_SPEED: f32 = 30.0;

    /// Donation button on the game-over screen
    pub const DONATION_BUTTON_W: f32 = 180.0;
    pub const DONATION_BUTTON_H: f32 = 34.0;
    pub const DONATION_URL: &str = "https://ko-fi.com/wolcen";
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out: fast start, gentle landing. `t` is clamped to [0, 1].
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        // Ease-out is ahead of linear in the middle
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
    }
}

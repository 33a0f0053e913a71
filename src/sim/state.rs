//! Game state and core simulation types
//!
//! Everything the update step mutates lives in `GameState`; rendering only
//! ever borrows it immutably.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::highscores::HighScore;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, waiting for a start input
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended, showing results and the donation button
    GameOver,
}

/// Semantic colors used by simulation entities; the renderer maps them to a palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Accent,
    AccentAlt,
    Purple,
    Green,
    Dead,
}

/// Something that happened during a tick, drained by the platform layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    SessionStarted,
    Caught { points: u64, combo: u32 },
    Missed { lives_left: u8 },
    FastForwardStarted,
    DashStarted,
    EnemyRevived,
    GameOver { score: u64, new_high_score: bool },
    ReturnedToMenu,
    OpenDonationLink,
}

/// The player's arrow
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Vertical velocity, only non-zero while dashing
    pub vy: f32,
    /// Remaining dash time (dash is active while positive)
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    pub dash_dir: f32,
    /// Last vertical movement direction (-1 up, +1 down)
    pub facing: f32,
    /// Time since the last afterimage was dropped
    pub afterimage_timer: f32,
}

impl Player {
    pub fn new(height: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, height / 2.0),
            vy: 0.0,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_dir: 0.0,
            facing: -1.0,
            afterimage_timer: 0.0,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Dash cooldown progress in [0, 1], 1 meaning ready
    pub fn dash_readiness(&self) -> f32 {
        1.0 - (self.dash_cooldown / DASH_COOLDOWN).clamp(0.0, 1.0)
    }

    /// Keep the glyph fully on screen
    pub fn clamp_to(&mut self, height: f32) {
        let min = PLAYER_H / 2.0;
        let max = (height - PLAYER_H / 2.0).max(min);
        self.pos.y = self.pos.y.clamp(min, max);
    }
}

/// A returning projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    /// Horizontal velocity (px/s, negative = leftward)
    pub vel_x: f32,
    pub radius: f32,
    /// Recent positions, oldest first
    pub trail: Vec<Vec2>,
    pub caught: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel_x: -speed,
            radius: PROJ_RADIUS,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
            caught: false,
        }
    }

    /// Record current position to the trail, dropping the oldest point
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    /// Slumped, waiting for a projectile to pass
    Dead,
    /// Shards converging; `progress` runs 0 → 1
    Assembling { progress: f32 },
    Alive,
}

/// One fragment of an assembling enemy
#[derive(Debug, Clone)]
pub struct Shard {
    /// Scattered offset the shard starts from
    pub scatter: Vec2,
    /// Resting offset inside the assembled body
    pub home: Vec2,
    /// Initial rotation (radians), unwinds to zero
    pub rotation: f32,
    pub size: f32,
    pub tint: Tint,
}

impl Shard {
    /// Offset and rotation at eased assembly fraction `t`
    pub fn at(&self, t: f32) -> (Vec2, f32) {
        (
            self.scatter.lerp(self.home, t),
            crate::lerp(self.rotation, 0.0, t),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub state: EnemyState,
    pub flash_timer: f32,
    pub size: f32,
    pub shards: Vec<Shard>,
}

impl Enemy {
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases by `decay` per second
    pub life: f32,
    pub decay: f32,
    pub tint: Tint,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Ghost image left behind while dashing
#[derive(Debug, Clone, Copy)]
pub struct Afterimage {
    pub pos: Vec2,
    /// 0-1
    pub life: f32,
}

/// Decorative parallax star
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    /// px/s
    pub speed: f32,
    pub size: f32,
    pub brightness: f32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    /// Viewport size in CSS pixels
    pub width: f32,
    pub height: f32,

    pub score: u64,
    pub high_score: HighScore,
    /// Set when the last session beat the stored best
    pub new_high_score: bool,
    pub lives: u8,
    pub combo: u32,
    pub max_combo: u32,
    pub difficulty: f32,

    /// Time since the last wave spawned
    pub spawn_timer: f32,
    pub fast_forward_timer: f32,
    pub last_ff_threshold: u64,

    pub shake_timer: f32,
    pub shake_intensity: f32,
    /// Offset sampled each tick while shaking
    pub shake_offset: Vec2,
    pub scanline_offset: f32,
    /// Wall clock (seconds), advances in every phase
    pub clock: f32,
    /// Simulation tick counter
    pub time_ticks: u64,

    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub afterimages: Vec<Afterimage>,
    pub stars: Vec<Star>,
    pub particle_cap: usize,

    /// Events produced since the last drain
    pub events: Vec<GameEvent>,

    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game state with the given seed and viewport
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut state = Self {
            phase: GamePhase::Menu,
            width,
            height,
            score: 0,
            high_score: HighScore::default(),
            new_high_score: false,
            lives: LIVES_MAX,
            combo: 0,
            max_combo: 0,
            difficulty: 1.0,
            spawn_timer: 0.0,
            fast_forward_timer: 0.0,
            last_ff_threshold: 0,
            shake_timer: 0.0,
            shake_intensity: 0.0,
            shake_offset: Vec2::ZERO,
            scanline_offset: 0.0,
            clock: 0.0,
            time_ticks: 0,
            player: Player::new(height),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            afterimages: Vec::new(),
            stars: Vec::new(),
            particle_cap: MAX_PARTICLES,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.seed_stars(BG_STAR_COUNT);
        state
    }

    /// Start from a previously stored best score
    pub fn with_high_score(mut self, high_score: HighScore) -> Self {
        self.high_score = high_score;
        self
    }

    pub fn is_fast_forward(&self) -> bool {
        self.fast_forward_timer > 0.0
    }

    /// Current projectile speed (px/s), fast forward included
    pub fn projectile_speed(&self) -> f32 {
        let speed = BASE_SPEED + self.difficulty * SPEED_PER_DIFFICULTY;
        if self.is_fast_forward() {
            speed * FAST_FORWARD_SPEED
        } else {
            speed
        }
    }

    /// Current spawn interval (seconds), fast forward included
    pub fn spawn_interval(&self) -> f32 {
        let interval = (SPAWN_INTERVAL_START - self.difficulty * SPAWN_INTERVAL_PER_DIFFICULTY)
            .max(SPAWN_INTERVAL_MIN);
        if self.is_fast_forward() {
            interval * FAST_FORWARD_SPAWN
        } else {
            interval
        }
    }

    /// Viewport changed: re-centre the idle player and reseed the starfield
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.player.pos.x = PLAYER_X;
        if self.phase == GamePhase::Menu {
            self.player.pos.y = height / 2.0;
        } else {
            self.player.clamp_to(height);
        }
        let count = self.stars.len().max(1);
        self.seed_stars(count);
    }

    /// Replace the starfield with `count` fresh stars
    pub fn seed_stars(&mut self, count: usize) {
        let (w, h) = (self.width, self.height);
        self.stars = (0..count)
            .map(|_| Star {
                pos: Vec2::new(self.rng.random::<f32>() * w, self.rng.random::<f32>() * h),
                speed: (0.2 + self.rng.random::<f32>() * 0.8) * 60.0,
                size: 0.5 + self.rng.random::<f32>() * 1.5,
                brightness: 0.2 + self.rng.random::<f32>() * 0.5,
            })
            .collect();
    }

    /// Clear all per-session state for a fresh run
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.lives = LIVES_MAX;
        self.combo = 0;
        self.max_combo = 0;
        self.difficulty = 1.0;
        self.spawn_timer = 0.0;
        self.fast_forward_timer = 0.0;
        self.last_ff_threshold = 0;
        self.shake_timer = 0.0;
        self.shake_offset = Vec2::ZERO;
        self.new_high_score = false;
        self.player = Player::new(self.height);
        self.projectiles.clear();
        self.enemies.clear();
        self.particles.clear();
        self.afterimages.clear();
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Append particles, dropping the oldest beyond the cap
    pub(crate) fn push_particles(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles.extend(particles);
        if self.particles.len() > self.particle_cap {
            let excess = self.particles.len() - self.particle_cap;
            self.particles.drain(..excess);
        }
    }
}

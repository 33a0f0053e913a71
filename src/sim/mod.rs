//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, donation_button_rect, in_revive_reach, is_miss, within_catch};
pub use spawn::{WaveKind, generate_wave, spawn_projectile};
pub use state::{
    Afterimage, Enemy, EnemyState, GameEvent, GamePhase, GameState, MAX_PARTICLES, Particle,
    Player, Projectile, Shard, Star, Tint,
};
pub use tick::{TickInput, assembly_fraction, tick};

//! Wave spawning: projectile/enemy pairs and their visual shards

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EnemyState, GameState, Particle, Projectile, Shard, Tint};
use crate::consts::*;

/// Shape of a spawned wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveKind {
    Single,
    Double,
    Triple,
}

impl WaveKind {
    /// Selection weights at a given difficulty (single, double, triple)
    pub fn weights(difficulty: f32) -> [f32; 3] {
        [
            5.0,
            if difficulty > 2.0 { 3.0 } else { 0.0 },
            if difficulty > 4.0 { 2.0 } else { 0.0 },
        ]
    }

    /// Pick a kind from a uniform roll in [0, 1)
    pub fn choose(difficulty: f32, roll: f32) -> Self {
        let weights = Self::weights(difficulty);
        let total: f32 = weights.iter().sum();
        let r = roll * total;
        let mut cumulative = 0.0;
        for (kind, weight) in [WaveKind::Single, WaveKind::Double, WaveKind::Triple]
            .into_iter()
            .zip(weights)
        {
            cumulative += weight;
            if r < cumulative {
                return kind;
            }
        }
        WaveKind::Single
    }
}

/// Spawn one wave of projectiles (each paired with a dead enemy)
pub fn generate_wave(state: &mut GameState) {
    let roll = state.rng.random::<f32>();
    let kind = WaveKind::choose(state.difficulty, roll);
    let h = state.height;
    let margin = SPAWN_MARGIN;
    // Keep the usable band non-empty on tiny viewports
    let band = (h - margin * 2.0).max(0.0);

    match kind {
        WaveKind::Single => {
            let y = margin + state.rng.random::<f32>() * band;
            spawn_projectile(state, y);
        }
        WaveKind::Double => {
            let base = margin + state.rng.random::<f32>() * (band - 60.0).max(0.0);
            let gap = 40.0 + state.rng.random::<f32>() * 20.0;
            spawn_projectile(state, base);
            spawn_projectile(state, base + gap);
        }
        WaveKind::Triple => {
            let spread = (h - margin * 4.0).max(0.0);
            let center = h / 2.0 + (state.rng.random::<f32>() - 0.5) * spread;
            spawn_projectile(state, (center - 50.0).max(margin));
            spawn_projectile(state, center);
            spawn_projectile(state, (center + 50.0).min(h - margin));
        }
    }
    log::trace!("spawned {:?} wave at difficulty {:.2}", kind, state.difficulty);
}

/// Spawn a projectile entering from the right edge at `y`, plus its enemy
pub fn spawn_projectile(state: &mut GameState, y: f32) {
    let speed = state.projectile_speed();
    state
        .projectiles
        .push(Projectile::new(Vec2::new(state.width + PROJ_RADIUS, y), speed));

    let enemy_pos = Vec2::new(
        state.width - 30.0 - state.rng.random::<f32>() * 40.0,
        y + (state.rng.random::<f32>() - 0.5) * 20.0,
    );
    let shards = scatter_shards(state, ENEMY_SIZE);
    state.enemies.push(Enemy {
        pos: enemy_pos,
        state: EnemyState::Dead,
        flash_timer: 0.0,
        size: ENEMY_SIZE,
        shards,
    });
}

/// Six shards on a 3x2 grid, each flung to a random scatter offset
fn scatter_shards(state: &mut GameState, size: f32) -> Vec<Shard> {
    let shard_size = size / 2.0;
    (0..ENEMY_SHARDS)
        .map(|i| {
            let col = (i % 3) as f32 - 1.0;
            let row = (i / 3) as f32 - 0.5;
            let home = Vec2::new(col * size / 3.0, row * size / 2.0);
            let angle = state.rng.random::<f32>() * PI * 2.0;
            let dist = 20.0 + state.rng.random::<f32>() * 25.0;
            Shard {
                scatter: home + Vec2::new(angle.cos(), angle.sin()) * dist,
                home,
                rotation: (state.rng.random::<f32>() - 0.5) * PI * 2.0,
                size: shard_size * (0.7 + state.rng.random::<f32>() * 0.3),
                tint: if i % 2 == 0 { Tint::Green } else { Tint::Dead },
            }
        })
        .collect()
}

/// Burst emitted when the player catches a projectile
pub fn emit_catch(state: &mut GameState, at: Vec2) {
    let burst: Vec<Particle> = (0..12)
        .map(|_| {
            let angle = state.rng.random::<f32>() * PI * 2.0;
            let speed = (1.0 + state.rng.random::<f32>() * 3.0) * 60.0;
            Particle {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                decay: (0.02 + state.rng.random::<f32>() * 0.02) * 60.0,
                tint: if state.rng.random_bool(0.5) {
                    Tint::Accent
                } else {
                    Tint::AccentAlt
                },
                size: 2.0 + state.rng.random::<f32>() * 3.0,
            }
        })
        .collect();
    state.push_particles(burst);
}

/// Smaller purple burst at the left edge on a miss
pub fn emit_miss(state: &mut GameState, at: Vec2) {
    let burst: Vec<Particle> = (0..8)
        .map(|_| {
            let angle = state.rng.random::<f32>() * PI * 2.0;
            let speed = (0.5 + state.rng.random::<f32>() * 2.0) * 60.0;
            Particle {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                decay: (0.03 + state.rng.random::<f32>() * 0.02) * 60.0,
                tint: Tint::Purple,
                size: 2.0 + state.rng.random::<f32>() * 2.0,
            }
        })
        .collect();
    state.push_particles(burst);
}

//! Fixed timestep simulation tick
//!
//! Advances the session one step: phase transitions, player movement and
//! dash, spawning, catches and misses, enemy assembly and effects.

use glam::Vec2;
use rand::Rng;

use super::collision::{donation_button_rect, in_revive_reach, is_miss, within_catch};
use super::spawn::{emit_catch, emit_miss, generate_wave};
use super::state::{Afterimage, EnemyState, GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::ease_out_cubic;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub up: bool,
    pub down: bool,
    /// Touch/drag target y (takes precedence over keys)
    pub touch_target: Option<f32>,
    /// Dash request (one-shot)
    pub dash: bool,
    /// Space/Enter (one-shot)
    pub confirm: bool,
    /// Pointer press position (one-shot)
    pub tap: Option<Vec2>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.clock += dt;
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Menu => {
            if input.confirm || input.tap.is_some() {
                start_session(state);
            }
        }
        GamePhase::GameOver => {
            if let Some(tap) = input.tap {
                if donation_button_rect(state.width, state.height).contains(tap) {
                    state.events.push(GameEvent::OpenDonationLink);
                } else {
                    return_to_menu(state);
                }
            } else if input.confirm {
                return_to_menu(state);
            }
        }
        GamePhase::Playing => update_playing(state, input, dt),
    }
}

/// Menu -> Playing with a fresh session
fn start_session(state: &mut GameState) {
    state.reset_session();
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::SessionStarted);
    log::info!("Session started");
}

fn return_to_menu(state: &mut GameState) {
    state.phase = GamePhase::Menu;
    state.events.push(GameEvent::ReturnedToMenu);
}

/// Playing -> GameOver, settling the best score
fn end_session(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    // Effects stop updating outside Playing, so settle the shake here
    state.shake_timer = 0.0;
    state.shake_offset = Vec2::ZERO;
    state.new_high_score = state.high_score.submit(state.score);
    state.events.push(GameEvent::GameOver {
        score: state.score,
        new_high_score: state.new_high_score,
    });
    log::info!(
        "Session over: score {} (max combo {}){}",
        state.score,
        state.max_combo,
        if state.new_high_score { ", new best" } else { "" }
    );
}

fn update_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    state.difficulty = 1.0 + state.score as f32 / SCORE_PER_DIFFICULTY;

    update_fast_forward(state, dt);
    update_player(state, input, dt);
    update_spawning(state, dt);

    if update_projectiles(state, dt) {
        return;
    }

    update_enemies(state, dt);
    update_effects(state, dt);
}

fn update_fast_forward(state: &mut GameState, dt: f32) {
    state.fast_forward_timer = (state.fast_forward_timer - dt).max(0.0);

    if state.score > 0 && state.score >= state.last_ff_threshold + FAST_FORWARD_INTERVAL {
        state.last_ff_threshold = (state.score / FAST_FORWARD_INTERVAL) * FAST_FORWARD_INTERVAL;
        state.fast_forward_timer = FAST_FORWARD_DURATION;
        state.events.push(GameEvent::FastForwardStarted);
        log::debug!("Fast forward at {}", state.last_ff_threshold);
    }
}

/// Vertical intent from held keys or touch target (-1, 0, +1)
fn movement_intent(input: &TickInput, player_y: f32) -> f32 {
    if let Some(target) = input.touch_target {
        let diff = target - player_y;
        if diff.abs() > TOUCH_DEADZONE {
            return diff.signum();
        }
        return 0.0;
    }
    match (input.up, input.down) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let player = &mut state.player;
    player.dash_cooldown = (player.dash_cooldown - dt).max(0.0);

    let intent = movement_intent(input, player.pos.y);
    if intent != 0.0 {
        player.facing = intent;
    }

    if input.dash && !player.is_dashing() && player.dash_cooldown <= 0.0 {
        let dir = if intent != 0.0 { intent } else { player.facing };
        player.dash_dir = dir;
        player.vy = dir * DASH_SPEED;
        player.dash_timer = DASH_DURATION;
        player.dash_cooldown = DASH_COOLDOWN;
        // Drop the first afterimage right away
        player.afterimage_timer = AFTERIMAGE_INTERVAL;
        state.events.push(GameEvent::DashStarted);
    }

    if player.is_dashing() {
        player.afterimage_timer += dt;
        if player.afterimage_timer >= AFTERIMAGE_INTERVAL {
            player.afterimage_timer = 0.0;
            state.afterimages.push(Afterimage {
                pos: player.pos,
                life: 1.0,
            });
        }
        player.pos.y += player.vy * dt;
        player.dash_timer -= dt;
        if player.dash_timer <= 0.0 {
            player.dash_timer = 0.0;
            player.vy = 0.0;
        }
    } else if let Some(target) = input.touch_target {
        let diff = target - player.pos.y;
        if diff.abs() > TOUCH_DEADZONE {
            let step = (diff.abs() * TOUCH_FOLLOW_GAIN * dt).min(PLAYER_SPEED * dt);
            player.pos.y += diff.signum() * step;
        }
    } else {
        if input.up {
            player.pos.y -= PLAYER_SPEED * dt;
        }
        if input.down {
            player.pos.y += PLAYER_SPEED * dt;
        }
    }

    player.clamp_to(state.height);
}

fn update_spawning(state: &mut GameState, dt: f32) {
    state.spawn_timer += dt;
    if state.spawn_timer > state.spawn_interval() {
        generate_wave(state);
        state.spawn_timer = 0.0;
    }
}

/// Move projectiles and resolve catches and misses.
/// Returns true when the session ended during this step.
fn update_projectiles(state: &mut GameState, dt: f32) -> bool {
    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;

        let pos = {
            let p = &mut state.projectiles[i];
            p.record_trail();
            p.pos.x += p.vel_x * dt;
            p.pos
        };

        for enemy in state.enemies.iter_mut() {
            if enemy.is_dead() && in_revive_reach(pos, enemy.pos) {
                enemy.state = EnemyState::Assembling { progress: 0.0 };
            }
        }

        if !state.projectiles[i].caught && within_catch(pos, state.player.pos) {
            state.projectiles[i].caught = true;
            state.projectiles.remove(i);

            state.combo += 1;
            state.max_combo = state.max_combo.max(state.combo);
            let points = CATCH_POINTS * (1 + (state.combo / COMBO_STEP) as u64);
            state.score += points;
            emit_catch(state, pos);
            state.events.push(GameEvent::Caught {
                points,
                combo: state.combo,
            });
            continue;
        }

        if is_miss(pos) {
            state.projectiles.remove(i);

            state.combo = 0;
            state.lives = state.lives.saturating_sub(1);
            emit_miss(state, Vec2::new(0.0, pos.y));
            state.shake_timer = SHAKE_DURATION;
            state.shake_intensity = SHAKE_INTENSITY;
            state.events.push(GameEvent::Missed {
                lives_left: state.lives,
            });

            if state.lives == 0 {
                end_session(state);
                return true;
            }
        }
    }
    false
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let scroll = state.projectile_speed() * ENEMY_SCROLL_FACTOR;
    let mut revived = 0;

    for enemy in state.enemies.iter_mut() {
        enemy.pos.x -= scroll * dt;

        if enemy.flash_timer > 0.0 {
            enemy.flash_timer = (enemy.flash_timer - dt).max(0.0);
        }

        if let EnemyState::Assembling { progress } = enemy.state {
            let progress = progress + dt / ASSEMBLY_DURATION;
            if progress >= 1.0 {
                enemy.state = EnemyState::Alive;
                enemy.flash_timer = REVIVE_FLASH;
                revived += 1;
            } else {
                enemy.state = EnemyState::Assembling { progress };
            }
        }
    }

    state.enemies.retain(|e| e.pos.x >= -e.size);
    for _ in 0..revived {
        state.events.push(GameEvent::EnemyRevived);
    }
}

/// Eased assembly fraction for an enemy state (0 when dead, 1 when alive)
pub fn assembly_fraction(enemy_state: EnemyState) -> f32 {
    match enemy_state {
        EnemyState::Dead => 0.0,
        EnemyState::Assembling { progress } => ease_out_cubic(progress),
        EnemyState::Alive => 1.0,
    }
}

fn update_effects(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.life -= particle.decay * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for ghost in state.afterimages.iter_mut() {
        ghost.life -= dt / AFTERIMAGE_LIFE;
    }
    state.afterimages.retain(|a| a.life > 0.0);

    let star_factor = if state.is_fast_forward() {
        FAST_FORWARD_STAR_SPEED
    } else {
        1.0
    };
    let (w, h) = (state.width, state.height);
    for star in state.stars.iter_mut() {
        star.pos.x -= star.speed * star_factor * dt;
        if star.pos.x < 0.0 {
            star.pos.x = w;
            star.pos.y = state.rng.random::<f32>() * h;
        }
    }

    if state.shake_timer > 0.0 {
        state.shake_timer -= dt;
        let i = state.shake_intensity;
        state.shake_offset = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * i * 2.0,
            (state.rng.random::<f32>() - 0.5) * i * 2.0,
        );
    }
    if state.shake_timer <= 0.0 {
        state.shake_timer = 0.0;
        state.shake_offset = Vec2::ZERO;
    }

    state.scanline_offset = (state.scanline_offset + SCANLINE_SPEED * dt) % 4.0;
}

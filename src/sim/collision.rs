//! Proximity tests between entities and screen regions

use glam::Vec2;

use crate::consts::*;

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive on all edges
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Where the donation button sits on the game-over screen for a viewport
pub fn donation_button_rect(width: f32, height: f32) -> Rect {
    Rect::new(
        width / 2.0 - DONATION_BUTTON_W / 2.0,
        height / 2.0 + 142.0,
        DONATION_BUTTON_W,
        DONATION_BUTTON_H,
    )
}

/// Projectile is close enough to the player to be caught
pub fn within_catch(projectile: Vec2, player: Vec2) -> bool {
    projectile.distance(player) < CATCH_DIST
}

/// Projectile has slipped past the left edge
pub fn is_miss(projectile: Vec2) -> bool {
    projectile.x < MISS_X
}

/// Projectile passes near enough to start an enemy's assembly
pub fn in_revive_reach(projectile: Vec2, enemy: Vec2) -> bool {
    (projectile.x - enemy.x).abs() < REVIVE_REACH_X && (projectile.y - enemy.y).abs() < REVIVE_REACH_Y
}

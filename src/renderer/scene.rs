//! Frame composition
//!
//! `render` only reads the game state. Everything inside the world layer is
//! offset by screen shake; the menu and game-over overlays are not.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::palette::{self, Color, tint_color};
use super::{Font, Surface, TextAlign};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{
    Enemy, EnemyState, GamePhase, GameState, Rect, assembly_fraction, donation_button_rect,
};

/// Draw one frame
pub fn render(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    surface.save();
    if settings.effective_screen_shake() && state.shake_offset != Vec2::ZERO {
        surface.translate(state.shake_offset);
    }

    draw_background(state, surface);
    draw_enemies(state, surface);
    draw_projectiles(state, surface, settings);
    draw_afterimages(state, surface);
    draw_player(state, surface, settings);
    draw_particles(state, surface);
    if settings.scanlines {
        draw_scanlines(state, surface);
    }
    if state.phase == GamePhase::Playing && state.is_fast_forward() {
        draw_fast_forward(state, surface, settings);
    }
    if state.phase != GamePhase::Menu {
        draw_hud(state, surface);
    }

    surface.restore();

    match state.phase {
        GamePhase::Menu => draw_menu(state, surface, settings),
        GamePhase::GameOver => draw_game_over(state, surface, settings),
        GamePhase::Playing => {}
    }
}

/// Blinking prompts are visible half of every ~2.5 s cycle
fn prompt_visible(state: &GameState, settings: &Settings) -> bool {
    !settings.blinking_prompts() || (state.clock * 1000.0 / 400.0).sin() > 0.0
}

fn draw_background(state: &GameState, surface: &mut impl Surface) {
    let (w, h) = (state.width, state.height);
    // Oversized so shake never reveals the page behind
    surface.fill_rect(Rect::new(-10.0, -10.0, w + 20.0, h + 20.0), palette::BG);

    let mut grid = Vec::new();
    let mut x = 0.0;
    while x < w {
        grid.push((Vec2::new(x, 0.0), Vec2::new(x, h)));
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < h {
        grid.push((Vec2::new(0.0, y), Vec2::new(w, y)));
        y += GRID_SPACING;
    }
    surface.stroke_lines(&grid, 1.0, palette::ACCENT.with_alpha(0.03));

    for star in &state.stars {
        surface.fill_rect(
            Rect::new(star.pos.x, star.pos.y, star.size, star.size),
            palette::TEXT.with_alpha(star.brightness),
        );
    }
}

fn draw_enemies(state: &GameState, surface: &mut impl Surface) {
    for enemy in &state.enemies {
        surface.save();
        surface.translate(enemy.pos);
        match enemy.state {
            EnemyState::Dead => draw_dead_enemy(enemy, surface),
            EnemyState::Assembling { .. } => draw_assembling_enemy(enemy, surface),
            EnemyState::Alive => draw_alive_enemy(enemy, surface),
        }
        surface.restore();
    }
}

fn centered_square(size: f32) -> Rect {
    Rect::new(-size / 2.0, -size / 2.0, size, size)
}

fn draw_dead_enemy(enemy: &Enemy, surface: &mut impl Surface) {
    surface.set_alpha(0.6);
    surface.translate(Vec2::new(0.0, 4.0));
    surface.rotate(0.2);
    surface.fill_rect(centered_square(enemy.size), palette::ENEMY_DEAD);

    // X eyes
    let eyes = [
        (Vec2::new(-7.0, -6.0), Vec2::new(-3.0, -2.0)),
        (Vec2::new(-3.0, -6.0), Vec2::new(-7.0, -2.0)),
        (Vec2::new(3.0, -6.0), Vec2::new(7.0, -2.0)),
        (Vec2::new(7.0, -6.0), Vec2::new(3.0, -2.0)),
    ];
    surface.stroke_lines(&eyes, 1.5, palette::DIM);
    surface.set_alpha(1.0);
}

fn draw_assembling_enemy(enemy: &Enemy, surface: &mut impl Surface) {
    let t = assembly_fraction(enemy.state);
    surface.set_alpha(0.4 + 0.6 * t);
    for shard in &enemy.shards {
        let (offset, rotation) = shard.at(t);
        surface.save();
        surface.translate(offset);
        surface.rotate(rotation);
        surface.fill_rect(centered_square(shard.size), tint_color(shard.tint));
        surface.restore();
    }
    surface.set_alpha(1.0);
}

fn draw_alive_enemy(enemy: &Enemy, surface: &mut impl Surface) {
    let body = if enemy.flash_timer > 0.0 {
        palette::WHITE
    } else {
        palette::GREEN
    };
    surface.fill_rect(centered_square(enemy.size), body);
    surface.fill_rect(Rect::new(-6.0, -4.0, 4.0, 4.0), palette::BG);
    surface.fill_rect(Rect::new(3.0, -4.0, 4.0, 4.0), palette::BG);
}

fn draw_projectiles(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    let glow = settings.quality.glow_enabled();
    for p in &state.projectiles {
        let len = p.trail.len();
        let shown = settings.trail_points(len).min(len);
        for (t, point) in p.trail.iter().enumerate().skip(len - shown) {
            let f = t as f32 / len as f32;
            let radius = p.radius * f * 0.8;
            if radius > 0.0 {
                surface.fill_circle(*point, radius, palette::ACCENT.with_alpha(f * 0.5));
            }
        }
        if glow {
            surface.fill_glow(p.pos, p.radius * 2.5, palette::ACCENT.with_alpha(0.3));
        }
        surface.fill_circle(p.pos, p.radius, palette::ACCENT);
        surface.fill_circle(p.pos, p.radius * 0.5, palette::WHITE);
    }
}

fn arrow(half_w: f32, half_h: f32) -> [Vec2; 3] {
    [
        Vec2::new(-half_w, 0.0),
        Vec2::new(half_w, -half_h),
        Vec2::new(half_w, half_h),
    ]
}

fn draw_afterimages(state: &GameState, surface: &mut impl Surface) {
    let shape = arrow(PLAYER_W / 2.0, PLAYER_H / 2.0);
    for ghost in &state.afterimages {
        let points = shape.map(|p| p + ghost.pos);
        surface.fill_polygon(&points, palette::PURPLE.with_alpha(ghost.life * 0.35));
    }
}

fn draw_player(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    let player = &state.player;
    surface.save();
    surface.translate(player.pos);

    if settings.quality.glow_enabled() {
        surface.fill_glow(Vec2::ZERO, 25.0, palette::PURPLE.with_alpha(0.2));
    }
    surface.fill_polygon(&arrow(PLAYER_W / 2.0, PLAYER_H / 2.0), palette::PURPLE);
    surface.fill_polygon(
        &[
            Vec2::new(-PLAYER_W / 2.0, 0.0),
            Vec2::new(PLAYER_W / 2.0, -PLAYER_H / 2.0),
            Vec2::new(PLAYER_W / 4.0, 0.0),
        ],
        palette::WHITE.with_alpha(0.15),
    );

    // Cooldown ring fills clockwise from the top while recharging
    if state.phase == GamePhase::Playing {
        let readiness = player.dash_readiness();
        if readiness < 1.0 {
            let start = -PI / 2.0;
            surface.stroke_arc(
                Vec2::ZERO,
                PLAYER_H * 0.75,
                start,
                start + TAU * readiness,
                2.0,
                palette::PURPLE.with_alpha(0.5),
            );
        }
    }

    surface.restore();
}

fn draw_particles(state: &GameState, surface: &mut impl Surface) {
    for pt in &state.particles {
        surface.set_alpha(pt.life.clamp(0.0, 1.0));
        surface.fill_rect(
            Rect::new(pt.pos.x - pt.size / 2.0, pt.pos.y - pt.size / 2.0, pt.size, pt.size),
            tint_color(pt.tint),
        );
    }
    surface.set_alpha(1.0);
}

fn draw_scanlines(state: &GameState, surface: &mut impl Surface) {
    let shade = palette::BLACK.with_alpha(0.03);
    let mut y = state.scanline_offset;
    while y < state.height {
        surface.fill_rect(Rect::new(0.0, y, state.width, 2.0), shade);
        y += 4.0;
    }
}

fn draw_fast_forward(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    if !settings.reduced_motion {
        surface.fill_rect(
            Rect::new(0.0, 0.0, state.width, state.height),
            palette::ACCENT.with_alpha(0.08),
        );
    }
    surface.fill_text(
        ">> FAST FORWARD >>",
        Vec2::new(state.width / 2.0, 30.0),
        Font::mono(14.0).bold(),
        TextAlign::Center,
        palette::ACCENT,
    );
}

fn draw_hud(state: &GameState, surface: &mut impl Surface) {
    let w = state.width;
    surface.fill_text(
        &state.score.to_string(),
        Vec2::new(16.0, 32.0),
        Font::mono(20.0).bold(),
        TextAlign::Left,
        palette::TEXT,
    );

    if state.combo > 1 {
        surface.fill_text(
            &format!("x{} combo", state.combo),
            Vec2::new(16.0, 52.0),
            Font::mono(14.0).bold(),
            TextAlign::Left,
            palette::ACCENT,
        );
    }

    for i in 0..LIVES_MAX {
        let lx = w - 16.0 - (LIVES_MAX - 1 - i) as f32 * 22.0;
        let color = if i < state.lives {
            palette::ACCENT
        } else {
            palette::ENEMY_DEAD
        };
        surface.fill_polygon(
            &[
                Vec2::new(lx - 6.0, 28.0),
                Vec2::new(lx + 6.0, 20.0),
                Vec2::new(lx + 6.0, 36.0),
            ],
            color,
        );
    }

    surface.fill_text(
        &format!("HI: {}", state.high_score.best),
        Vec2::new(w - 16.0, 56.0),
        Font::mono(11.0),
        TextAlign::Right,
        palette::DIM,
    );
}

fn centered(surface: &mut impl Surface, state: &GameState, text: &str, dy: f32, font: Font, color: Color) {
    surface.fill_text(
        text,
        Vec2::new(state.width / 2.0, state.height / 2.0 + dy),
        font,
        TextAlign::Center,
        color,
    );
}

fn draw_menu(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, state.width, state.height),
        palette::BG.with_alpha(0.85),
    );

    centered(surface, state, "REWIND RUNNER", -60.0, Font::mono(32.0).bold(), palette::ACCENT);
    centered(surface, state, "Catch the returning projectiles", -20.0, Font::mono(14.0), palette::TEXT);
    centered(surface, state, "to un-kill your enemies", 0.0, Font::mono(14.0), palette::TEXT);
    centered(surface, state, "Arrow keys / WASD to move, Shift to dash", 40.0, Font::mono(13.0), palette::DIM);
    centered(surface, state, "Touch to move, double-tap to dash", 60.0, Font::mono(13.0), palette::DIM);

    if prompt_visible(state, settings) {
        centered(
            surface,
            state,
            "[ PRESS SPACE OR TAP TO START ]",
            110.0,
            Font::mono(16.0).bold(),
            palette::PURPLE,
        );
    }

    if state.high_score.best > 0 {
        centered(
            surface,
            state,
            &format!("Best: {}", state.high_score.best),
            140.0,
            Font::mono(12.0),
            palette::DIM,
        );
    }
}

fn draw_game_over(state: &GameState, surface: &mut impl Surface, settings: &Settings) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, state.width, state.height),
        palette::BG.with_alpha(0.88),
    );

    centered(surface, state, "TIMELINE FRACTURED", -80.0, Font::mono(28.0).bold(), palette::ACCENT);
    centered(surface, state, &state.score.to_string(), -25.0, Font::mono(48.0).bold(), palette::TEXT);
    centered(surface, state, "points", -5.0, Font::mono(13.0), palette::DIM);

    if state.new_high_score {
        centered(surface, state, "NEW HIGH SCORE!", 25.0, Font::mono(14.0).bold(), palette::GREEN);
    }

    centered(
        surface,
        state,
        &format!("Max combo: {}", state.max_combo),
        50.0,
        Font::mono(12.0),
        palette::DIM,
    );

    if prompt_visible(state, settings) {
        centered(
            surface,
            state,
            "[ SPACE OR TAP TO REWIND ]",
            90.0,
            Font::mono(14.0).bold(),
            palette::PURPLE,
        );
    }

    centered(
        surface,
        state,
        "Enjoyed this? Tip the cloud that built it.",
        130.0,
        Font::mono(12.0),
        palette::ACCENT,
    );

    let button = donation_button_rect(state.width, state.height);
    surface.fill_round_rect(button, 8.0, palette::ACCENT);
    surface.fill_text(
        "Support on Ko-fi",
        Vec2::new(state.width / 2.0, button.y + 22.0),
        Font::sans(13.0).bold(),
        TextAlign::Center,
        palette::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScore;
    use crate::renderer::recording::{DrawCall, RecordingSurface};
    use crate::sim::spawn_projectile;

    fn frame(state: &GameState, settings: &Settings) -> RecordingSurface {
        let mut surface = RecordingSurface::default();
        render(state, &mut surface, settings);
        assert!(surface.balanced());
        surface
    }

    fn playing() -> GameState {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_menu_overlay() {
        let state = GameState::new(3, 800.0, 600.0).with_high_score(HighScore::new(420));
        let surface = frame(&state, &Settings::default());
        assert!(surface.has_text("REWIND RUNNER"));
        assert!(surface.has_text("Best: 420"));
        // No HUD on the title screen
        assert!(!surface.has_text("HI: 420"));
    }

    #[test]
    fn test_menu_hides_best_when_zero() {
        let state = GameState::new(3, 800.0, 600.0);
        let surface = frame(&state, &Settings::default());
        assert!(!surface.texts().iter().any(|t| t.starts_with("Best")));
    }

    #[test]
    fn test_prompt_blinks_unless_reduced_motion() {
        let mut state = GameState::new(3, 800.0, 600.0);
        // sin(clock * 2.5) < 0 at clock = 2.0
        state.clock = 2.0;
        let prompt = "[ PRESS SPACE OR TAP TO START ]";
        assert!(!frame(&state, &Settings::default()).has_text(prompt));

        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(frame(&state, &settings).has_text(prompt));
    }

    #[test]
    fn test_hud_shows_score_combo_and_best() {
        let mut state = playing();
        state.score = 130;
        state.combo = 4;
        state.high_score = HighScore::new(900);
        let surface = frame(&state, &Settings::default());
        assert!(surface.has_text("130"));
        assert!(surface.has_text("x4 combo"));
        assert!(surface.has_text("HI: 900"));

        state.combo = 1;
        let surface = frame(&state, &Settings::default());
        assert!(!surface.texts().iter().any(|t| t.ends_with("combo")));
    }

    #[test]
    fn test_lives_triangles() {
        let mut state = playing();
        state.lives = 1;
        let surface = frame(&state, &Settings::default());
        let lives: Vec<Color> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Polygon(points, color) if points[0].y == 28.0 => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(lives, vec![palette::ACCENT, palette::ENEMY_DEAD, palette::ENEMY_DEAD]);
    }

    #[test]
    fn test_fast_forward_banner() {
        let mut state = playing();
        assert!(!frame(&state, &Settings::default()).has_text(">> FAST FORWARD >>"));
        state.fast_forward_timer = 1.0;
        assert!(frame(&state, &Settings::default()).has_text(">> FAST FORWARD >>"));
    }

    #[test]
    fn test_game_over_screen() {
        let mut state = playing();
        state.phase = GamePhase::GameOver;
        state.score = 250;
        state.max_combo = 9;
        state.new_high_score = true;
        let surface = frame(&state, &Settings::default());
        assert!(surface.has_text("TIMELINE FRACTURED"));
        assert!(surface.has_text("250"));
        assert!(surface.has_text("NEW HIGH SCORE!"));
        assert!(surface.has_text("Max combo: 9"));
        assert!(surface.has_text("Support on Ko-fi"));

        let button = donation_button_rect(800.0, 600.0);
        assert!(
            surface
                .calls
                .contains(&DrawCall::RoundRect(button, palette::ACCENT))
        );

        state.new_high_score = false;
        assert!(!frame(&state, &Settings::default()).has_text("NEW HIGH SCORE!"));
    }

    #[test]
    fn test_shake_respects_reduced_motion() {
        let mut state = playing();
        state.shake_offset = Vec2::new(3.0, -2.0);
        let shaken = frame(&state, &Settings::default());
        assert_eq!(shaken.calls[1], DrawCall::Translate(Vec2::new(3.0, -2.0)));

        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let steady = frame(&state, &settings);
        assert!(!steady.calls.contains(&DrawCall::Translate(Vec2::new(3.0, -2.0))));
    }

    #[test]
    fn test_enemy_forms() {
        let mut state = playing();
        spawn_projectile(&mut state, 200.0);
        spawn_projectile(&mut state, 300.0);
        spawn_projectile(&mut state, 400.0);
        state.enemies[1].state = EnemyState::Assembling { progress: 0.5 };
        state.enemies[2].state = EnemyState::Alive;
        state.enemies[2].flash_timer = 0.1;

        let surface = frame(&state, &Settings::default());
        let rects = |color: Color| {
            surface
                .calls
                .iter()
                .filter(|call| matches!(call, DrawCall::Rect(_, fill) if *fill == color))
                .count()
        };
        // Dead body plus one dead-tinted shard per odd index
        assert_eq!(rects(palette::ENEMY_DEAD), 1 + ENEMY_SHARDS / 2);
        // Flashing alive body
        assert!(rects(palette::WHITE) >= 1);
        assert!(surface.calls.contains(&DrawCall::Rotate(0.2)));
    }

    #[test]
    fn test_low_quality_drops_glow_and_scanlines() {
        let mut state = playing();
        spawn_projectile(&mut state, 200.0);
        let count_glows = |s: &RecordingSurface| {
            s.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Glow(..)))
                .count()
        };
        assert_eq!(count_glows(&frame(&state, &Settings::default())), 2);

        let low = Settings::from_preset(crate::settings::QualityPreset::Low);
        assert_eq!(count_glows(&frame(&state, &low)), 0);
    }

    #[test]
    fn test_cooldown_ring_only_while_recharging() {
        let mut state = playing();
        let has_arc = |s: &RecordingSurface| s.calls.iter().any(|c| matches!(c, DrawCall::Arc(..)));
        assert!(!has_arc(&frame(&state, &Settings::default())));
        state.player.dash_cooldown = DASH_COOLDOWN / 2.0;
        assert!(has_arc(&frame(&state, &Settings::default())));
    }
}

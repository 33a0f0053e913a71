//! Color palette

use crate::sim::Tint;

/// RGBA color, channels in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` string
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a.clamp(0.0, 1.0)
        )
    }
}

pub const BG: Color = Color::rgb(0x08, 0x08, 0x0f);
pub const ACCENT: Color = Color::rgb(0xf9, 0x73, 0x16);
pub const ACCENT_ALT: Color = Color::rgb(0xfb, 0x92, 0x3c);
pub const PURPLE: Color = Color::rgb(0x8b, 0x5c, 0xf6);
pub const GREEN: Color = Color::rgb(0x22, 0xc5, 0x5e);
pub const TEXT: Color = Color::rgb(0xea, 0xea, 0xf0);
pub const DIM: Color = Color::rgb(0x6b, 0x6b, 0x80);
pub const ENEMY_DEAD: Color = Color::rgb(0x33, 0x33, 0x45);
pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const BLACK: Color = Color::rgb(0, 0, 0);

/// Palette entry for a simulation tint
pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Accent => ACCENT,
        Tint::AccentAlt => ACCENT_ALT,
        Tint::Purple => PURPLE,
        Tint::Green => GREEN,
        Tint::Dead => ENEMY_DEAD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_output() {
        assert_eq!(ACCENT.to_css(), "rgba(249,115,22,1)");
        assert_eq!(BG.with_alpha(0.85).to_css(), "rgba(8,8,15,0.85)");
    }
}

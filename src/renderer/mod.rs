//! 2D rendering module
//!
//! The scene is drawn through the `Surface` trait so the same code paints the
//! browser canvas and the recording surface used in tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod palette;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use palette::Color;
pub use scene::render;

use glam::Vec2;

use crate::sim::Rect;

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Font description, rendered as a CSS font shorthand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
    pub monospace: bool,
}

impl Font {
    pub const fn mono(size: f32) -> Self {
        Self {
            size,
            bold: false,
            monospace: true,
        }
    }

    pub const fn sans(size: f32) -> Self {
        Self {
            size,
            bold: false,
            monospace: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn to_css(&self) -> String {
        format!(
            "{}{}px {}",
            if self.bold { "bold " } else { "" },
            self.size,
            if self.monospace { "monospace" } else { "sans-serif" }
        )
    }
}

/// Immediate-mode 2D drawing target
///
/// Transform and alpha follow canvas semantics: `save`/`restore` push and pop
/// both, `translate`/`rotate` compose onto the current transform.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    /// Global alpha multiplier for subsequent fills
    fn set_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Radial gradient from `color` at the centre to transparent at `radius`
    fn fill_glow(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    fn stroke_lines(&mut self, segments: &[(Vec2, Vec2)], width: f32, color: Color);
    /// Arc from `start` to `end` radians, clockwise in screen space
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Color);
    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Color);
    fn fill_text(&mut self, text: &str, pos: Vec2, font: Font, align: TextAlign, color: Color);
}

#[cfg(test)]
pub(crate) mod recording {
    //! Surface that records draw calls for assertions

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Save,
        Restore,
        Translate(Vec2),
        Rotate(f32),
        Alpha(f32),
        Rect(Rect, Color),
        Circle(Vec2, f32, Color),
        Glow(Vec2, f32, Color),
        Polygon(Vec<Vec2>, Color),
        Lines(usize, Color),
        Arc(Vec2, f32, f32, f32),
        RoundRect(Rect, Color),
        Text(String, Vec2, Color),
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<DrawCall>,
        depth: i32,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Text(t, _, _) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn has_text(&self, needle: &str) -> bool {
            self.texts().iter().any(|t| *t == needle)
        }

        /// save/restore stayed balanced for the whole frame
        pub fn balanced(&self) -> bool {
            self.depth == 0
        }
    }

    impl Surface for RecordingSurface {
        fn save(&mut self) {
            self.depth += 1;
            self.calls.push(DrawCall::Save);
        }
        fn restore(&mut self) {
            self.depth -= 1;
            self.calls.push(DrawCall::Restore);
        }
        fn translate(&mut self, offset: Vec2) {
            self.calls.push(DrawCall::Translate(offset));
        }
        fn rotate(&mut self, radians: f32) {
            self.calls.push(DrawCall::Rotate(radians));
        }
        fn set_alpha(&mut self, alpha: f32) {
            self.calls.push(DrawCall::Alpha(alpha));
        }
        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::Rect(rect, color));
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.calls.push(DrawCall::Circle(center, radius, color));
        }
        fn fill_glow(&mut self, center: Vec2, radius: f32, color: Color) {
            self.calls.push(DrawCall::Glow(center, radius, color));
        }
        fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
            self.calls.push(DrawCall::Polygon(points.to_vec(), color));
        }
        fn stroke_lines(&mut self, segments: &[(Vec2, Vec2)], _width: f32, color: Color) {
            self.calls.push(DrawCall::Lines(segments.len(), color));
        }
        fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, _width: f32, _color: Color) {
            self.calls.push(DrawCall::Arc(center, radius, start, end));
        }
        fn fill_round_rect(&mut self, rect: Rect, _radius: f32, color: Color) {
            self.calls.push(DrawCall::RoundRect(rect, color));
        }
        fn fill_text(&mut self, text: &str, pos: Vec2, _font: Font, _align: TextAlign, color: Color) {
            self.calls.push(DrawCall::Text(text.to_string(), pos, color));
        }
    }
}

//! Raw input tracking
//!
//! DOM event handlers feed key and touch events into an `InputState`; the
//! frame loop turns it into a `TickInput` per substep.

use glam::Vec2;

use crate::sim::TickInput;

/// Two touch starts closer than this (seconds) request a dash
pub const DOUBLE_TAP_WINDOW: f64 = 0.3;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Dash,
    Confirm,
    CycleQuality,
    ToggleReducedMotion,
}

/// Map a `KeyboardEvent.key` value to an action
pub fn map_key(key: &str) -> Option<KeyAction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(KeyAction::Up),
        "ArrowDown" | "s" | "S" => Some(KeyAction::Down),
        "Shift" => Some(KeyAction::Dash),
        " " | "Enter" => Some(KeyAction::Confirm),
        "q" | "Q" => Some(KeyAction::CycleQuality),
        "m" | "M" => Some(KeyAction::ToggleReducedMotion),
        _ => None,
    }
}

/// Accumulated input between simulation substeps
#[derive(Debug, Clone, Default)]
pub struct InputState {
    up_held: bool,
    down_held: bool,
    /// Finger y while a touch is down
    touch_target: Option<f32>,
    /// Time (seconds) of the previous touch start
    last_touch_start: Option<f64>,

    // One-shots
    dash: bool,
    confirm: bool,
    tap: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. Returns the mapped action so the caller can handle the
    /// settings toggles, which never reach the simulation.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> Option<KeyAction> {
        let action = map_key(key)?;
        match action {
            KeyAction::Up => self.up_held = true,
            KeyAction::Down => self.down_held = true,
            KeyAction::Dash if !repeat => self.dash = true,
            KeyAction::Confirm if !repeat => self.confirm = true,
            _ => {}
        }
        if repeat && !matches!(action, KeyAction::Up | KeyAction::Down) {
            return None;
        }
        Some(action)
    }

    pub fn key_up(&mut self, key: &str) {
        match map_key(key) {
            Some(KeyAction::Up) => self.up_held = false,
            Some(KeyAction::Down) => self.down_held = false,
            _ => {}
        }
    }

    /// Finger down at `pos` (canvas CSS pixels) at time `now` (seconds)
    pub fn touch_start(&mut self, pos: Vec2, now: f64) {
        if let Some(last) = self.last_touch_start {
            if now - last < DOUBLE_TAP_WINDOW {
                self.dash = true;
            }
        }
        self.last_touch_start = Some(now);
        self.touch_target = Some(pos.y);
        self.tap = Some(pos);
    }

    pub fn touch_move(&mut self, pos: Vec2) {
        if self.touch_target.is_some() {
            self.touch_target = Some(pos.y);
        }
    }

    pub fn touch_end(&mut self) {
        self.touch_target = None;
    }

    /// Mouse click at `pos`
    pub fn pointer_press(&mut self, pos: Vec2) {
        self.tap = Some(pos);
    }

    /// Drop held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.up_held = false;
        self.down_held = false;
        self.touch_target = None;
    }

    /// Snapshot for one simulation substep
    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            up: self.up_held,
            down: self.down_held,
            touch_target: self.touch_target,
            dash: self.dash,
            confirm: self.confirm,
            tap: self.tap,
        }
    }

    /// Clear one-shot inputs after a substep consumed them
    pub fn clear_one_shots(&mut self) {
        self.dash = false;
        self.confirm = false;
        self.tap = None;
    }
}

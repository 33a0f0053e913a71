//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, touch, pointer) folded into a `TickInput`
//! - Storage (LocalStorage on web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use input::{DOUBLE_TAP_WINDOW, InputState, KeyAction, map_key};

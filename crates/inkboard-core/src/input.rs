//! Pointer and keyboard input types.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    /// Get the action modifier (Ctrl, or Cmd on macOS hosts).
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
/// Positions are in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
}

impl PointerEvent {
    /// Position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => position,
        }
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
    Character(String),
    /// Any other key, by its host name.
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            k if k.chars().count() == 1 => Key::Character(k.to_string()),
            k => Key::Other(k.to_string()),
        }
    }

    /// Whether this is the given character, ignoring case.
    pub fn is_char(&self, c: char) -> bool {
        matches!(
            self,
            Key::Character(s) if s.chars().eq(c.to_lowercase()) || s.chars().eq(c.to_uppercase())
        )
    }
}

/// Double-click detector.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    max_delay: Duration,
    max_distance: f64,
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new(max_delay: Duration, max_distance: f64) -> Self {
        Self {
            max_delay,
            max_distance,
            last_click: None,
        }
    }

    /// Record a click. Returns true if it completes a double-click.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed <= self.max_delay && last_pos.distance(position) < self.max_distance {
                // Reset so a triple click is not a second double-click.
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, position));
        false
    }

    /// Forget the previous click.
    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

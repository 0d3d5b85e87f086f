//! Tool modes and their parameters.

use crate::shapes::{SerializableColor, ShapeStyle};
use serde::{Deserialize, Serialize};

/// Available tool modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolMode {
    #[default]
    Brush,
    Eraser,
    Line,
    Circle,
    Rectangle,
    Text,
    Select,
}

impl ToolMode {
    /// All modes, in toolbar order.
    pub fn all() -> &'static [ToolMode] {
        &[
            ToolMode::Brush,
            ToolMode::Eraser,
            ToolMode::Line,
            ToolMode::Circle,
            ToolMode::Rectangle,
            ToolMode::Text,
            ToolMode::Select,
        ]
    }

    /// Whether a pointer drag in this mode builds a new shape.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            ToolMode::Brush
                | ToolMode::Eraser
                | ToolMode::Line
                | ToolMode::Circle
                | ToolMode::Rectangle
        )
    }

    /// Display name for the toolbar.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Brush => "Brush",
            ToolMode::Eraser => "Eraser",
            ToolMode::Line => "Line",
            ToolMode::Circle => "Circle",
            ToolMode::Rectangle => "Rectangle",
            ToolMode::Text => "Text",
            ToolMode::Select => "Select",
        }
    }
}

/// Cursor affordance token for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorStyle {
    /// Ink cursor, shown while brush or eraser is active.
    Pointer,
    /// Platform default arrow.
    Default,
}

impl CursorStyle {
    /// CSS class name used by the toolbar shell.
    pub fn class_name(&self) -> &'static str {
        match self {
            CursorStyle::Pointer => "pointer_cursor",
            CursorStyle::Default => "default",
        }
    }
}

/// Tool parameters that persist across mode switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolParams {
    /// Brush stroke width in pixels.
    pub brush_size: f64,
    /// Brush opacity (0.0..=1.0).
    pub opacity: f64,
    /// Ink color for brush strokes and shapes.
    pub ink_color: SerializableColor,
}

impl Default for ToolParams {
    fn default() -> Self {
        Self {
            brush_size: 3.0,
            opacity: 1.0,
            ink_color: SerializableColor::black(),
        }
    }
}

/// Manages the active mode and its parameters.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    mode: ToolMode,
    params: ToolParams,
}

impl ToolManager {
    /// Create a tool manager with the given starting parameters.
    pub fn new(params: ToolParams) -> Self {
        Self {
            mode: ToolMode::default(),
            params,
        }
    }

    /// Currently active mode.
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Current parameters.
    pub fn params(&self) -> ToolParams {
        self.params
    }

    /// Switch mode, optionally replacing the parameters.
    pub fn set_mode(&mut self, mode: ToolMode, params: Option<ToolParams>) {
        self.mode = mode;
        if let Some(params) = params {
            self.params = params;
        }
    }

    /// Replace the parameters without changing mode.
    pub fn set_params(&mut self, params: ToolParams) {
        self.params = params;
    }

    /// Cursor token for the active mode.
    pub fn cursor_style(&self) -> CursorStyle {
        match self.mode {
            ToolMode::Brush | ToolMode::Eraser => CursorStyle::Pointer,
            _ => CursorStyle::Default,
        }
    }

    /// Style applied to a shape drawn in `mode`.
    pub fn style_for(&self, mode: ToolMode, eraser_width: f64) -> ShapeStyle {
        match mode {
            ToolMode::Eraser => ShapeStyle::eraser(eraser_width),
            _ => ShapeStyle::ink(
                self.params.ink_color,
                self.params.brush_size,
                self.params.opacity,
            ),
        }
    }
}

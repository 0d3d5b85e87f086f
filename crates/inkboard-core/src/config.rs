//! Engine configuration.
//!
//! Every knob has a default matching the stock whiteboard; hosts may
//! override any subset from JSON.

use crate::shapes::{SerializableColor, ShapeKind, Text, TextAlign};
use crate::tools::ToolParams;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Minimum-extent rule for committing a gesture of one kind.
///
/// The extent is the diagonal of the gesture's bounding box. Gestures whose
/// extent is strictly below `min_extent` produce no shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicy {
    pub min_extent: f64,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self { min_extent: 0.0 }
    }
}

/// Per-kind gesture policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicies {
    pub stroke: GesturePolicy,
    pub erase_stroke: GesturePolicy,
    pub line: GesturePolicy,
    pub circle: GesturePolicy,
    pub rectangle: GesturePolicy,
}

impl GesturePolicies {
    /// Policy for a builder-produced shape kind.
    pub fn for_kind(&self, kind: ShapeKind) -> GesturePolicy {
        match kind {
            ShapeKind::Stroke => self.stroke,
            ShapeKind::EraseStroke => self.erase_stroke,
            ShapeKind::Line => self.line,
            ShapeKind::Circle => self.circle,
            ShapeKind::Rectangle => self.rectangle,
            ShapeKind::Text => GesturePolicy::default(),
        }
    }
}

/// Defaults for newly inserted text boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub placeholder: String,
    pub font_size: f64,
    pub font_family: String,
    pub width: f64,
    /// Resizing never shrinks a text box below this width.
    pub min_width: f64,
    pub line_height: f64,
    pub padding: f64,
    pub align: TextAlign,
    /// Where a text box lands when the host gives no position.
    pub position: Point,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            placeholder: "type here".to_string(),
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            width: Text::DEFAULT_WIDTH,
            min_width: 30.0,
            line_height: 1.0,
            padding: 0.0,
            align: TextAlign::Left,
            position: Point::new(50.0, 80.0),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial tool parameters.
    pub tool: ToolParams,
    /// Stroke width of the eraser.
    pub eraser_width: f64,
    /// Pick tolerance for shapes, in canvas pixels.
    pub hit_tolerance: f64,
    /// Pick tolerance for transform handle anchors, in canvas pixels.
    pub handle_tolerance: f64,
    /// Maximum delay between the two clicks of a double-click.
    pub double_click_ms: u64,
    /// Maximum travel between the two clicks of a double-click.
    pub double_click_distance: f64,
    pub gestures: GesturePolicies,
    pub text: TextDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tool: ToolParams::default(),
            eraser_width: 30.0,
            hit_tolerance: 4.0,
            handle_tolerance: 8.0,
            double_click_ms: 500,
            double_click_distance: 5.0,
            gestures: GesturePolicies::default(),
            text: TextDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        };
        positive("tool.brush_size", self.tool.brush_size)?;
        positive("eraser_width", self.eraser_width)?;
        positive("text.font_size", self.text.font_size)?;
        positive("text.width", self.text.width)?;
        positive("text.min_width", self.text.min_width)?;
        positive("text.line_height", self.text.line_height)?;
        if !(0.0..=1.0).contains(&self.tool.opacity) {
            return Err(ConfigError::Invalid {
                field: "tool.opacity",
                reason: format!("must be within 0..=1, got {}", self.tool.opacity),
            });
        }
        if self.hit_tolerance < 0.0 || self.handle_tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "hit_tolerance",
                reason: "tolerances must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Ink color helper for hosts that configure colors as hex strings.
    pub fn with_ink_hex(mut self, hex: &str) -> Result<Self, ConfigError> {
        self.tool.ink_color = SerializableColor::from_hex(hex).map_err(|e| ConfigError::Invalid {
            field: "tool.ink_color",
            reason: e.to_string(),
        })?;
        Ok(self)
    }
}

//! Shape definitions for the whiteboard.

mod circle;
mod line;
mod rectangle;
mod stroke;
mod text;

pub use circle::Circle;
pub use line::Line;
pub use rectangle::Rectangle;
pub use stroke::Stroke;
pub use text::{Text, TextAlign};

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(color: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(color.to_string());
        let hex = color.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match hex.len() {
            3 => Ok(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// Format as a CSS hex string (`#rrggbb`, or `#rrggbbaa` when translucent).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// How a shape's pixels combine with existing canvas content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeMode {
    /// Paint over existing content (source-over).
    #[default]
    Over,
    /// Clear existing content under the stroke (destination-out).
    Erase,
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color (also the fill color for text).
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Compositing mode.
    #[serde(default)]
    pub composite: CompositeMode,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Style for an ink stroke.
    pub fn ink(color: SerializableColor, width: f64, opacity: f64) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            opacity: opacity.clamp(0.0, 1.0),
            composite: CompositeMode::Over,
        }
    }

    /// Style for an eraser stroke.
    pub fn eraser(width: f64) -> Self {
        Self {
            stroke_color: SerializableColor::white(),
            stroke_width: width,
            opacity: 1.0,
            composite: CompositeMode::Erase,
        }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        let alpha = (f64::from(self.stroke_color.a) * self.opacity) as u8;
        let c = self.stroke_color;
        Color::from_rgba8(c.r, c.g, c.b, alpha)
    }

    /// Whether this style clears pixels instead of painting them.
    pub fn is_erase(&self) -> bool {
        self.composite == CompositeMode::Erase
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::ink(SerializableColor::black(), 3.0, 1.0)
    }
}

/// The kind of a shape, as seen by the toolbar and the undo log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Stroke,
    EraseStroke,
    Line,
    Circle,
    Rectangle,
    Text,
}

/// Distance from a point to a line segment (a->b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Bounding box of a point sequence.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in canvas coordinates (before rotation).
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Stroke(Stroke),
    Line(Line),
    Circle(Circle),
    Rectangle(Rectangle),
    Text(Text),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        self.as_trait().id()
    }

    /// The shape's kind. Strokes drawn with the erase composite report `EraseStroke`.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Stroke(s) if s.style.is_erase() => ShapeKind::EraseStroke,
            Shape::Stroke(_) => ShapeKind::Stroke,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_trait().to_path()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Stroke(s) => s.style_mut(),
            Shape::Line(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            Shape::Stroke(s) => s.transform(affine),
            Shape::Line(s) => s.transform(affine),
            Shape::Circle(s) => s.transform(affine),
            Shape::Rectangle(s) => s.transform(affine),
            Shape::Text(s) => s.transform(affine),
        }
    }

    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Stroke(s) => s,
            Shape::Line(s) => s,
            Shape::Circle(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Text(s) => s,
        }
    }

    /// Point sequence for strokes and lines.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Shape::Stroke(s) => Some(&s.points),
            Shape::Line(l) => Some(&l.points),
            _ => None,
        }
    }

    /// Get the text if this shape is a text box.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get the mutable text if this shape is a text box.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this shape is a text box.
    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Get the rotation angle in radians (0 for shapes that don't carry one).
    pub fn rotation(&self) -> f64 {
        match self {
            Shape::Rectangle(r) => r.rotation,
            Shape::Text(t) => t.rotation,
            _ => 0.0,
        }
    }

    /// Check if this shape stores its rotation as an angle.
    /// Point-based shapes are rotated by transforming their geometry instead.
    pub fn supports_rotation(&self) -> bool {
        matches!(self, Shape::Rectangle(_) | Shape::Text(_))
    }

    /// Set the rotation angle in radians.
    pub fn set_rotation(&mut self, rotation: f64) {
        match self {
            Shape::Rectangle(r) => r.rotation = rotation,
            Shape::Text(t) => t.rotation = rotation,
            _ => {}
        }
    }
}

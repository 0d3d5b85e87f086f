//! Text box shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Horizontal text alignment inside the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// CSS `text-align` keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A wrapping text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Box width; text wraps inside it.
    pub width: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Font family name as understood by the host.
    pub font_family: String,
    /// Horizontal alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Inner padding on every side.
    #[serde(default)]
    pub padding: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties (the stroke color is the text fill).
    pub style: ShapeStyle,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    /// Default box width.
    pub const DEFAULT_WIDTH: f64 = 200.0;
    /// Default font family.
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    /// Average glyph advance as a fraction of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            width: Self::DEFAULT_WIDTH,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            align: TextAlign::default(),
            line_height: 1.0,
            padding: 0.0,
            rotation: 0.0,
            style,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the box width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the text content. A rotated box keeps its painted top-left corner
    /// while its height follows the new content.
    pub fn set_content(&mut self, content: String) {
        let origin = self.painted_origin();
        self.content = content;
        self.set_painted_origin(origin);
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Fold a horizontal scale into the box width, so only the width changes.
    pub fn apply_horizontal_scale(&mut self, scale_x: f64, min_width: f64) {
        self.width = (self.width * scale_x).max(min_width);
    }

    /// Top-left corner as painted, after rotation about the box center.
    pub fn painted_origin(&self) -> Point {
        if self.rotation == 0.0 {
            return self.position;
        }
        Affine::rotate_about(self.rotation, self.bounds().center()) * self.position
    }

    /// Move the box so its painted top-left corner lands on `origin`.
    pub fn set_painted_origin(&mut self, origin: Point) {
        if self.rotation == 0.0 {
            self.position = origin;
            return;
        }
        let half = Vec2::new(self.width, self.height()) / 2.0;
        let corner = Affine::rotate(self.rotation) * (-half).to_point();
        self.position = origin - corner.to_vec2() - half;
    }

    /// Unit vector along the box's top edge.
    pub fn x_axis(&self) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(cos, sin)
    }

    /// Number of rendered lines after wrapping (approximate glyph metrics).
    pub fn line_count(&self) -> usize {
        let inner = (self.width - self.padding * 2.0).max(1.0);
        let char_width = self.font_size * Self::CHAR_WIDTH_FACTOR;
        self.content
            .split('\n')
            .map(|line| {
                let w = line.chars().count() as f64 * char_width;
                ((w / inner).ceil() as usize).max(1)
            })
            .sum()
    }

    /// Box height implied by the content.
    pub fn height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * self.line_height + self.padding * 2.0
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds();
        let local = Affine::rotate_about(-self.rotation, bounds.center()) * point;
        bounds.inflate(tolerance, tolerance).contains(local)
    }

    fn to_path(&self) -> BezPath {
        // Selection outline only; glyphs are laid out by the renderer.
        let bounds = self.bounds();
        let mut path = bounds.to_path(0.1);
        if self.rotation != 0.0 {
            path.apply_affine(Affine::rotate_about(self.rotation, bounds.center()));
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        self.width *= coeffs[0].hypot(coeffs[1]);
        let scale_y = coeffs[2].hypot(coeffs[3]);
        if (scale_y - 1.0).abs() > 0.01 {
            self.font_size *= scale_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Text {
        Text::new(Point::new(100.0, 100.0), content, ShapeStyle::default())
    }

    #[test]
    fn test_text_creation() {
        let t = text("type here");
        assert_eq!(t.content(), "type here");
        assert!((t.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
        assert!((t.width - Text::DEFAULT_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_count_wraps() {
        assert_eq!(text("").line_count(), 1);
        assert_eq!(text("a\nb").line_count(), 2);
        assert_eq!(text("a\n").line_count(), 2);
        // 40 chars * 11px = 440px in a 200px box -> 3 lines
        assert_eq!(text(&"x".repeat(40)).line_count(), 3);
    }

    #[test]
    fn test_height_follows_lines() {
        let t = text("one\ntwo").with_font_size(10.0);
        assert!((t.height() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let t = text("Hello World");
        let center = t.bounds().center();
        assert!(t.hit_test(center, 0.0));
        assert!(!t.hit_test(Point::new(0.0, 0.0), 0.0));
    }

    #[test]
    fn test_painted_origin_follows_rotation() {
        let mut t = text("tilted");
        assert_eq!(t.painted_origin(), t.position);

        t.rotation = std::f64::consts::FRAC_PI_2;
        let center = t.bounds().center();
        let expected = Affine::rotate_about(t.rotation, center) * t.position;
        let origin = t.painted_origin();
        assert!(origin.distance(expected) < 1e-9);

        t.set_painted_origin(Point::new(10.0, 20.0));
        assert!(t.painted_origin().distance(Point::new(10.0, 20.0)) < 1e-9);
    }

    #[test]
    fn test_rotated_content_change_keeps_painted_origin() {
        let mut t = text("one");
        t.rotation = 0.7;
        let before = t.painted_origin();
        t.set_content("one\ntwo\nthree".to_string());
        assert!((t.height() - 60.0).abs() < f64::EPSILON);
        assert!(t.painted_origin().distance(before) < 1e-9);
    }

    #[test]
    fn test_horizontal_scale_is_folded_into_width() {
        let mut t = text("hi");
        t.apply_horizontal_scale(0.5, 30.0);
        assert!((t.width - 100.0).abs() < f64::EPSILON);
        t.apply_horizontal_scale(0.1, 30.0);
        assert!((t.width - 30.0).abs() < f64::EPSILON);
    }
}

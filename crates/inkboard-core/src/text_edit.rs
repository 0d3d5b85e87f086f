//! Overlay text editing.
//!
//! While a text box is being edited the canvas hides it and the host shows a
//! native editable field in its place. [`TextEditor`] drives that field through
//! an [`OverlayHost`] and keeps its geometry in step with the text shape.

use crate::input::{Key, Modifiers};
use crate::registry::ShapeRegistry;
use crate::shapes::{ShapeId, Text, TextAlign};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Extra height given to a freshly opened field so the caret line isn't clipped.
const OPEN_HEIGHT_SLACK: f64 = 5.0;
/// Slack added to the measured scroll height right after opening.
const MEASURED_HEIGHT_SLACK: f64 = 3.0;

/// Host-specific corrections between canvas font metrics and the field's
/// native text metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsCorrection {
    /// Constant upward shift of the field, in pixels.
    pub vertical_offset_base: f64,
    /// Upward shift per pixel of font size (rounded after scaling).
    pub vertical_offset_per_font_px: f64,
    /// Round the field width up to a whole pixel.
    pub ceil_width: bool,
    /// Extra width added after rounding.
    pub width_padding: f64,
}

impl MetricsCorrection {
    /// No correction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Gecko lays text out a little lower and needs whole-pixel widths.
    pub fn gecko() -> Self {
        Self {
            vertical_offset_base: 2.0,
            vertical_offset_per_font_px: 1.0 / 20.0,
            ceil_width: true,
            width_padding: 0.0,
        }
    }

    /// WebKit needs whole-pixel widths.
    pub fn webkit() -> Self {
        Self {
            ceil_width: true,
            ..Self::default()
        }
    }

    /// EdgeHTML wraps one pixel early.
    pub fn legacy_edge() -> Self {
        Self {
            width_padding: 1.0,
            ..Self::default()
        }
    }

    /// Upward shift of the field for a given font size.
    pub fn vertical_lift(&self, font_size: f64) -> f64 {
        self.vertical_offset_base + (font_size * self.vertical_offset_per_font_px).round()
    }

    /// Apply the width corrections.
    pub fn adjust_width(&self, width: f64) -> f64 {
        let width = if self.ceil_width { width.ceil() } else { width };
        width + self.width_padding
    }
}

/// Geometry and typography of the overlay field, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_family: String,
    pub line_height: f64,
    pub align: TextAlign,
    /// CSS hex color of the text.
    pub color: String,
    /// Rotation about the field's top-left corner, in degrees. That corner
    /// sits on the painted top-left corner of the text box.
    pub rotation_deg: f64,
    /// Vertical translation applied after rotation (negative lifts the field).
    pub translate_y: f64,
    /// Field contents.
    pub text: String,
}

impl OverlayLayout {
    /// Layout that puts the field exactly over `text`, given the page position
    /// of the canvas origin.
    pub fn for_text(text: &Text, origin: Point, correction: &MetricsCorrection) -> Self {
        let lift = correction.vertical_lift(text.font_size);
        let corner = text.painted_origin();
        Self {
            left: origin.x + corner.x,
            top: origin.y + corner.y,
            width: text.width - text.padding * 2.0,
            height: text.height() - text.padding * 2.0 + OPEN_HEIGHT_SLACK,
            font_size: text.font_size,
            font_family: text.font_family.clone(),
            line_height: text.line_height,
            align: text.align,
            color: text.style.stroke_color.to_hex(),
            rotation_deg: text.rotation.to_degrees(),
            translate_y: if lift == 0.0 { 0.0 } else { -lift },
            text: text.content.clone(),
        }
    }

    /// CSS `transform` value for the field.
    pub fn css_transform(&self) -> String {
        let mut transform = String::new();
        if self.rotation_deg != 0.0 {
            transform.push_str(&format!("rotateZ({}deg)", self.rotation_deg));
        }
        if self.translate_y != 0.0 {
            if !transform.is_empty() {
                transform.push(' ');
            }
            transform.push_str(&format!("translateY({}px)", self.translate_y));
        }
        transform
    }
}

/// Host side of the overlay field.
pub trait OverlayHost {
    /// Create and focus the field.
    fn open_field(&mut self, layout: &OverlayLayout);

    /// Restyle the open field.
    fn update_field(&mut self, layout: &OverlayLayout);

    /// Remove the field.
    fn close_field(&mut self);

    /// Current contents of the field.
    fn field_value(&self) -> String;

    /// Intrinsic content height of the field.
    fn field_scroll_height(&self) -> f64;

    fn metrics_correction(&self) -> MetricsCorrection {
        MetricsCorrection::none()
    }
}

/// An open editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub shape_id: ShapeId,
    /// Content before editing started, restored on cancel.
    pub original_text: String,
    pub layout: OverlayLayout,
}

/// `Displayed → Editing → Displayed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Displayed,
    Editing(EditSession),
}

/// How an editing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Committed(ShapeId),
    Cancelled(ShapeId),
}

impl EditOutcome {
    pub fn shape_id(&self) -> ShapeId {
        match *self {
            EditOutcome::Committed(id) | EditOutcome::Cancelled(id) => id,
        }
    }
}

/// Result of a key press while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not editing; the key is not ours.
    Ignored,
    /// The field was resized to its content.
    Resized,
    Closed(EditOutcome),
}

/// Drives one overlay field at a time.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    state: EditState,
    placeholder: String,
}

impl TextEditor {
    /// Create a new editor. `placeholder` sizes the field when the box has no width.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: EditState::Displayed,
            placeholder: placeholder.into(),
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditState::Editing(session) => Some(session),
            EditState::Displayed => None,
        }
    }

    /// Shape being edited.
    pub fn editing_shape(&self) -> Option<ShapeId> {
        self.session().map(|s| s.shape_id)
    }

    /// Open the field over text shape `id`.
    ///
    /// An open session on another shape is committed first and returned.
    /// Nothing opens if `id` is not a text shape.
    pub fn enter<H: OverlayHost>(
        &mut self,
        host: &mut H,
        registry: &mut ShapeRegistry,
        id: ShapeId,
        origin: Point,
    ) -> (Option<EditOutcome>, bool) {
        if self.editing_shape() == Some(id) {
            return (None, true);
        }
        if !registry.get(id).is_some_and(|s| s.is_text()) {
            return (None, false);
        }
        let previous = self.commit(host, registry);
        let Some(text) = registry.get(id).and_then(|s| s.as_text()) else {
            return (previous, false);
        };

        let mut layout = OverlayLayout::for_text(text, origin, &host.metrics_correction());
        host.open_field(&layout);
        layout.height = host.field_scroll_height() + MEASURED_HEIGHT_SLACK;
        host.update_field(&layout);

        log::debug!("text edit opened on {id}");
        self.state = EditState::Editing(EditSession {
            shape_id: id,
            original_text: text.content.clone(),
            layout,
        });
        (previous, true)
    }

    /// Handle a key press inside the field.
    ///
    /// Enter without modifiers commits, Escape cancels, anything else
    /// re-fits the field to the box width and its content height.
    pub fn on_key<H: OverlayHost>(
        &mut self,
        host: &mut H,
        registry: &mut ShapeRegistry,
        key: &Key,
        modifiers: Modifiers,
    ) -> KeyResponse {
        if !self.is_editing() {
            return KeyResponse::Ignored;
        }
        match key {
            Key::Enter if !modifiers.any() => self
                .commit(host, registry)
                .map_or(KeyResponse::Ignored, KeyResponse::Closed),
            Key::Escape => self
                .cancel(host, registry)
                .map_or(KeyResponse::Ignored, KeyResponse::Closed),
            _ => {
                self.fit_to_content(host, registry);
                KeyResponse::Resized
            }
        }
    }

    fn fit_to_content<H: OverlayHost>(&mut self, host: &mut H, registry: &ShapeRegistry) {
        let EditState::Editing(session) = &mut self.state else {
            return;
        };
        let Some(text) = registry.get(session.shape_id).and_then(|s| s.as_text()) else {
            return;
        };
        // Horizontal scale is always folded into the width.
        let mut width = text.width;
        if width <= 0.0 {
            width = self.placeholder.chars().count() as f64 * text.font_size;
        }
        let layout = &mut session.layout;
        layout.width = host.metrics_correction().adjust_width(width);
        layout.height = host.field_scroll_height() + text.font_size;
        layout.text = host.field_value();
        host.update_field(layout);
        log::trace!("text field resized to {}x{}", layout.width, layout.height);
    }

    /// Write the field's value into the shape and close the field.
    pub fn commit<H: OverlayHost>(
        &mut self,
        host: &mut H,
        registry: &mut ShapeRegistry,
    ) -> Option<EditOutcome> {
        let session = self.take_session()?;
        let value = host.field_value();
        host.close_field();
        if let Some(text) = registry.get_mut(session.shape_id).and_then(|s| s.as_text_mut()) {
            text.set_content(value);
        }
        log::debug!("text edit committed on {}", session.shape_id);
        Some(EditOutcome::Committed(session.shape_id))
    }

    /// Close the field and restore the text from before editing.
    pub fn cancel<H: OverlayHost>(
        &mut self,
        host: &mut H,
        registry: &mut ShapeRegistry,
    ) -> Option<EditOutcome> {
        let session = self.take_session()?;
        host.close_field();
        if let Some(text) = registry.get_mut(session.shape_id).and_then(|s| s.as_text_mut()) {
            text.set_content(session.original_text);
        }
        log::debug!("text edit cancelled on {}", session.shape_id);
        Some(EditOutcome::Cancelled(session.shape_id))
    }

    /// A click landed somewhere on the page. Clicking outside the field commits.
    pub fn click<H: OverlayHost>(
        &mut self,
        host: &mut H,
        registry: &mut ShapeRegistry,
        inside_field: bool,
    ) -> Option<EditOutcome> {
        if inside_field {
            return None;
        }
        self.commit(host, registry)
    }

    /// Close the field without touching any shape, e.g. after the shape was removed.
    pub fn abandon<H: OverlayHost>(&mut self, host: &mut H) -> Option<ShapeId> {
        let session = self.take_session()?;
        host.close_field();
        log::debug!("text edit abandoned on {}", session.shape_id);
        Some(session.shape_id)
    }

    fn take_session(&mut self) -> Option<EditSession> {
        match std::mem::take(&mut self.state) {
            EditState::Editing(session) => Some(session),
            EditState::Displayed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape, ShapeStyle};

    #[derive(Default)]
    struct FakeField {
        open: Option<OverlayLayout>,
        opened: usize,
        closed: usize,
        value: String,
        scroll_height: f64,
        correction: MetricsCorrection,
    }

    impl OverlayHost for FakeField {
        fn open_field(&mut self, layout: &OverlayLayout) {
            self.open = Some(layout.clone());
            self.value = layout.text.clone();
            self.opened += 1;
        }

        fn update_field(&mut self, layout: &OverlayLayout) {
            self.open = Some(layout.clone());
        }

        fn close_field(&mut self) {
            self.open = None;
            self.closed += 1;
        }

        fn field_value(&self) -> String {
            self.value.clone()
        }

        fn field_scroll_height(&self) -> f64 {
            self.scroll_height
        }

        fn metrics_correction(&self) -> MetricsCorrection {
            self.correction
        }
    }

    fn setup(content: &str) -> (ShapeRegistry, ShapeId, FakeField) {
        let mut registry = ShapeRegistry::new();
        let text = Text::new(Point::new(50.0, 80.0), content, ShapeStyle::default());
        let id = registry.commit(Shape::Text(text)).unwrap();
        let host = FakeField {
            scroll_height: 24.0,
            ..Default::default()
        };
        (registry, id, host)
    }

    fn content(registry: &ShapeRegistry, id: ShapeId) -> String {
        registry.get(id).unwrap().as_text().unwrap().content.clone()
    }

    #[test]
    fn test_enter_places_field_over_text() {
        let (mut registry, id, mut host) = setup("type here");
        let mut editor = TextEditor::new("type here");
        let (previous, opened) = editor.enter(&mut host, &mut registry, id, Point::new(10.0, 20.0));
        assert!(previous.is_none());
        assert!(opened);
        assert!(editor.is_editing());

        let layout = host.open.clone().unwrap();
        assert_eq!((layout.left, layout.top), (60.0, 100.0));
        assert!((layout.width - 200.0).abs() < f64::EPSILON);
        // Re-measured from the field's scroll height.
        assert!((layout.height - 27.0).abs() < f64::EPSILON);
        assert_eq!(layout.text, "type here");
        assert_eq!(layout.color, "#000000");
        assert_eq!(layout.css_transform(), "");
    }

    #[test]
    fn test_initial_height_before_measurement() {
        let (registry, id, _) = setup("one line");
        let text = registry.get(id).unwrap().as_text().unwrap();
        let layout = OverlayLayout::for_text(text, Point::ZERO, &MetricsCorrection::none());
        assert!((layout.height - (20.0 + 5.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_restores_exact_text() {
        let original = "héllo\n  wörld ";
        let (mut registry, id, mut host) = setup(original);
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        host.value = "something else".to_string();
        let response = editor.on_key(&mut host, &mut registry, &Key::Escape, Modifiers::NONE);
        assert_eq!(response, KeyResponse::Closed(EditOutcome::Cancelled(id)));
        assert_eq!(content(&registry, id), original);
        assert!(host.open.is_none());
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_enter_key_commits_field_value() {
        let (mut registry, id, mut host) = setup("type here");
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        host.value = "Sprint goals".to_string();
        let response = editor.on_key(&mut host, &mut registry, &Key::Enter, Modifiers::NONE);
        assert_eq!(response, KeyResponse::Closed(EditOutcome::Committed(id)));
        assert_eq!(content(&registry, id), "Sprint goals");
        assert_eq!(host.closed, 1);
    }

    #[test]
    fn test_shift_enter_does_not_commit() {
        let (mut registry, id, mut host) = setup("type here");
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let response = editor.on_key(&mut host, &mut registry, &Key::Enter, shift);
        assert_eq!(response, KeyResponse::Resized);
        assert!(editor.is_editing());
    }

    #[test]
    fn test_typing_grows_field() {
        let (mut registry, id, mut host) = setup("type here");
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        host.scroll_height = 60.0;
        host.value = "a\nb\nc".to_string();
        let key = Key::Character("c".into());
        let response = editor.on_key(&mut host, &mut registry, &key, Modifiers::NONE);
        assert_eq!(response, KeyResponse::Resized);
        let layout = host.open.clone().unwrap();
        assert!((layout.height - 80.0).abs() < f64::EPSILON);
        assert!((layout.width - 200.0).abs() < f64::EPSILON);
        assert_eq!(layout.text, "a\nb\nc");
        // Typing alone never writes back to the shape.
        assert_eq!(content(&registry, id), "type here");
    }

    #[test]
    fn test_zero_width_falls_back_to_placeholder() {
        let (mut registry, id, mut host) = setup("");
        registry.get_mut(id).unwrap().as_text_mut().unwrap().width = 0.0;
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        editor.on_key(&mut host, &mut registry, &Key::Character("x".into()), Modifiers::NONE);
        let layout = host.open.clone().unwrap();
        assert!((layout.width - 9.0 * 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_corrections() {
        let gecko = MetricsCorrection::gecko();
        assert!((gecko.vertical_lift(20.0) - 3.0).abs() < f64::EPSILON);
        assert!((gecko.adjust_width(120.2) - 121.0).abs() < f64::EPSILON);
        assert!((MetricsCorrection::webkit().adjust_width(99.1) - 100.0).abs() < f64::EPSILON);
        assert!((MetricsCorrection::legacy_edge().adjust_width(99.5) - 100.5).abs() < f64::EPSILON);
        assert!(MetricsCorrection::none().vertical_lift(40.0).abs() < f64::EPSILON);

        let (mut registry, id, mut host) = setup("type here");
        host.correction = gecko;
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        assert_eq!(host.open.clone().unwrap().css_transform(), "translateY(-3px)");
    }

    #[test]
    fn test_rotation_carries_into_layout() {
        let (mut registry, id, _) = setup("tilted");
        registry.get_mut(id).unwrap().set_rotation(std::f64::consts::FRAC_PI_2);
        let text = registry.get(id).unwrap().as_text().unwrap();
        let layout = OverlayLayout::for_text(text, Point::ZERO, &MetricsCorrection::none());
        assert!((layout.rotation_deg - 90.0).abs() < 1e-9);
        assert!(layout.css_transform().starts_with("rotateZ("));
    }

    #[test]
    fn test_rotated_field_sits_on_painted_corner() {
        let (mut registry, id, mut host) = setup("tilted");
        registry.get_mut(id).unwrap().set_rotation(std::f64::consts::FRAC_PI_2);
        let text = registry.get(id).unwrap().as_text().unwrap();
        // 200x20 box at (50, 80) turned a quarter about (150, 90).
        assert!(text.painted_origin().distance(Point::new(160.0, -10.0)) < 1e-9);

        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::new(5.0, 5.0));
        let layout = host.open.clone().unwrap();
        assert!((layout.left - 165.0).abs() < 1e-9);
        assert!((layout.top - -5.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_session_closes_existing_one() {
        let (mut registry, first, mut host) = setup("first");
        let second = registry
            .commit(Shape::Text(Text::new(Point::new(0.0, 200.0), "second", ShapeStyle::default())))
            .unwrap();
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, first, Point::ZERO);
        host.value = "first, edited".to_string();
        let (previous, opened) = editor.enter(&mut host, &mut registry, second, Point::ZERO);
        assert_eq!(previous, Some(EditOutcome::Committed(first)));
        assert!(opened);
        assert_eq!(content(&registry, first), "first, edited");
        assert_eq!(editor.editing_shape(), Some(second));
        assert_eq!((host.opened, host.closed), (2, 1));
    }

    #[test]
    fn test_only_text_shapes_can_be_edited() {
        let (mut registry, _, mut host) = setup("x");
        let rect = registry
            .commit(Shape::Rectangle(Rectangle::new(
                Point::ZERO,
                10.0,
                10.0,
                ShapeStyle::default(),
            )))
            .unwrap();
        let mut editor = TextEditor::new("type here");
        assert_eq!(editor.enter(&mut host, &mut registry, rect, Point::ZERO), (None, false));
        assert!(!editor.is_editing());
        assert_eq!(host.opened, 0);
    }

    #[test]
    fn test_outside_click_commits() {
        let (mut registry, id, mut host) = setup("type here");
        let mut editor = TextEditor::new("type here");
        editor.enter(&mut host, &mut registry, id, Point::ZERO);
        host.value = "done".to_string();
        assert!(editor.click(&mut host, &mut registry, true).is_none());
        assert!(editor.is_editing());
        assert_eq!(
            editor.click(&mut host, &mut registry, false),
            Some(EditOutcome::Committed(id))
        );
        assert_eq!(content(&registry, id), "done");
    }

    #[test]
    fn test_keys_ignored_when_not_editing() {
        let (mut registry, _, mut host) = setup("x");
        let mut editor = TextEditor::new("type here");
        assert_eq!(
            editor.on_key(&mut host, &mut registry, &Key::Enter, Modifiers::NONE),
            KeyResponse::Ignored
        );
        assert!(editor.commit(&mut host, &mut registry).is_none());
        assert!(editor.cancel(&mut host, &mut registry).is_none());
        assert_eq!(host.closed, 0);
    }
}

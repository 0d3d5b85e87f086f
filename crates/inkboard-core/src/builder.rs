//! Incremental shape builder: pointer-down → move* → up becomes one shape.

use crate::config::GesturePolicies;
use crate::shapes::{Circle, Line, Rectangle, Shape, ShapeStyle, Stroke};
use crate::tools::ToolMode;
use kurbo::Point;

/// The gesture currently being built.
#[derive(Debug, Clone)]
struct Gesture {
    mode: ToolMode,
    start: Point,
    shape: Shape,
}

/// Builds at most one in-progress shape at a time.
///
/// The in-progress shape belongs to the builder until [`ShapeBuilder::finish`]
/// hands it over; it is never visible to undo before that.
#[derive(Debug, Clone, Default)]
pub struct ShapeBuilder {
    gesture: Option<Gesture>,
}

impl ShapeBuilder {
    /// Create an idle builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture. Returns the seeded shape, or `None` when a gesture is
    /// already open or `mode` does not draw.
    pub fn begin(&mut self, mode: ToolMode, start: Point, style: ShapeStyle) -> Option<&Shape> {
        if self.gesture.is_some() {
            log::debug!("begin ignored: a {:?} gesture is already open", self.mode());
            return None;
        }
        let shape = match mode {
            ToolMode::Brush | ToolMode::Eraser => Shape::Stroke(Stroke::seeded(start, style)),
            ToolMode::Line => Shape::Line(Line::seeded(start, style)),
            ToolMode::Circle => Shape::Circle(Circle::new(start, 0.0, style)),
            ToolMode::Rectangle => Shape::Rectangle(Rectangle::from_corners(start, start, style)),
            ToolMode::Text | ToolMode::Select => return None,
        };
        log::debug!("gesture started: {:?} at ({}, {})", mode, start.x, start.y);
        let gesture = self.gesture.insert(Gesture { mode, start, shape });
        Some(&gesture.shape)
    }

    /// Feed a pointer sample into the open gesture. Every sample is kept.
    pub fn extend(&mut self, point: Point) -> Option<&Shape> {
        let gesture = self.gesture.as_mut()?;
        match &mut gesture.shape {
            Shape::Stroke(stroke) => stroke.add_point(point),
            Shape::Line(line) => line.points.push(point),
            Shape::Circle(circle) => circle.drag_to(point),
            Shape::Rectangle(rect) => rect.set_corners(gesture.start, point),
            Shape::Text(_) => {}
        }
        log::trace!("gesture extended to ({}, {})", point.x, point.y);
        Some(&gesture.shape)
    }

    /// Close the gesture and hand over its shape.
    ///
    /// Returns `None` when no gesture is open, or when the gesture is smaller
    /// than the minimum extent configured for its kind.
    pub fn finish(&mut self, policies: &GesturePolicies) -> Option<Shape> {
        let gesture = self.gesture.take()?;
        let shape = gesture.shape;
        let bounds = shape.bounds();
        let extent = bounds.width().hypot(bounds.height());
        let policy = policies.for_kind(shape.kind());
        if extent < policy.min_extent {
            log::debug!(
                "dropping {:?} gesture: extent {extent} below minimum {}",
                gesture.mode,
                policy.min_extent
            );
            return None;
        }
        Some(shape)
    }

    /// Discard the open gesture without committing. Returns the discarded shape.
    pub fn cancel(&mut self) -> Option<Shape> {
        let gesture = self.gesture.take()?;
        log::debug!("gesture cancelled: {:?}", gesture.mode);
        Some(gesture.shape)
    }

    /// Whether a gesture is open.
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Mode of the open gesture.
    pub fn mode(&self) -> Option<ToolMode> {
        self.gesture.as_ref().map(|g| g.mode)
    }

    /// The in-progress shape, for rendering.
    pub fn preview(&self) -> Option<&Shape> {
        self.gesture.as_ref().map(|g| &g.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GesturePolicy;
    use crate::shapes::ShapeKind;

    fn style() -> ShapeStyle {
        ShapeStyle::default()
    }

    #[test]
    fn test_stroke_keeps_every_sample() {
        let mut b = ShapeBuilder::new();
        b.begin(ToolMode::Brush, Point::new(0.0, 0.0), style());
        b.extend(Point::new(10.0, 0.0));
        b.extend(Point::new(10.0, 10.0));
        let shape = b.finish(&GesturePolicies::default()).unwrap();
        assert_eq!(
            shape.points().unwrap(),
            &[
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0)
            ]
        );
        assert!(!b.is_active());
    }

    #[test]
    fn test_click_without_drag_is_a_dot() {
        let mut b = ShapeBuilder::new();
        let p = Point::new(7.0, 3.0);
        b.begin(ToolMode::Brush, p, style());
        let shape = b.finish(&GesturePolicies::default()).unwrap();
        let points = shape.points().unwrap();
        assert!(points.len() >= 2);
        assert!(points.iter().all(|q| *q == p));
    }

    #[test]
    fn test_begin_while_open_is_ignored() {
        let mut b = ShapeBuilder::new();
        assert!(b.begin(ToolMode::Brush, Point::ZERO, style()).is_some());
        assert!(b.begin(ToolMode::Line, Point::new(5.0, 5.0), style()).is_none());
        assert_eq!(b.mode(), Some(ToolMode::Brush));
    }

    #[test]
    fn test_non_drawing_modes_do_not_begin() {
        let mut b = ShapeBuilder::new();
        assert!(b.begin(ToolMode::Select, Point::ZERO, style()).is_none());
        assert!(b.begin(ToolMode::Text, Point::ZERO, style()).is_none());
        assert!(!b.is_active());
    }

    #[test]
    fn test_extend_and_finish_without_gesture() {
        let mut b = ShapeBuilder::new();
        assert!(b.extend(Point::new(1.0, 1.0)).is_none());
        assert!(b.finish(&GesturePolicies::default()).is_none());
        assert!(b.cancel().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let mut b = ShapeBuilder::new();
        b.begin(ToolMode::Brush, Point::ZERO, style());
        for i in 0..10 {
            b.extend(Point::new(f64::from(i), 0.0));
        }
        let discarded = b.cancel().unwrap();
        assert_eq!(discarded.points().unwrap().len(), 12);
        assert!(b.preview().is_none());
    }

    #[test]
    fn test_rectangle_and_circle_follow_pointer() {
        let mut b = ShapeBuilder::new();
        b.begin(ToolMode::Rectangle, Point::new(10.0, 10.0), style());
        b.extend(Point::new(0.0, 30.0));
        let Some(Shape::Rectangle(rect)) = b.finish(&GesturePolicies::default()) else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.position, Point::new(0.0, 10.0));
        assert!((rect.width - 10.0).abs() < f64::EPSILON);
        assert!((rect.height - 20.0).abs() < f64::EPSILON);

        b.begin(ToolMode::Circle, Point::new(0.0, 0.0), style());
        b.extend(Point::new(3.0, 4.0));
        let Some(Shape::Circle(circle)) = b.finish(&GesturePolicies::default()) else {
            panic!("expected circle");
        };
        assert!((circle.radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_eraser_builds_erase_stroke() {
        let mut b = ShapeBuilder::new();
        b.begin(ToolMode::Eraser, Point::ZERO, ShapeStyle::eraser(30.0));
        let shape = b.finish(&GesturePolicies::default()).unwrap();
        assert_eq!(shape.kind(), ShapeKind::EraseStroke);
    }

    #[test]
    fn test_min_extent_policy_drops_small_gestures() {
        let policies = GesturePolicies {
            rectangle: GesturePolicy { min_extent: 5.0 },
            ..Default::default()
        };
        let mut b = ShapeBuilder::new();
        b.begin(ToolMode::Rectangle, Point::ZERO, style());
        b.extend(Point::new(1.0, 1.0));
        assert!(b.finish(&policies).is_none());
        assert!(!b.is_active());

        b.begin(ToolMode::Rectangle, Point::ZERO, style());
        b.extend(Point::new(10.0, 10.0));
        assert!(b.finish(&policies).is_some());

        // Strokes keep the default policy and commit as dots.
        b.begin(ToolMode::Brush, Point::ZERO, style());
        assert!(b.finish(&policies).is_some());
    }
}

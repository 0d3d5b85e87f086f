//! Circle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle, dragged out from its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Center point.
    pub center: Point,
    /// Radius.
    pub radius: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Point, radius: f64, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius: radius.abs(),
            style,
        }
    }

    /// Update the radius from a drag point.
    pub fn drag_to(&mut self, point: Point) {
        self.radius = self.center.distance(point);
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center, self.radius)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.center.distance(point) <= self.radius + self.style.stroke_width / 2.0 + tolerance
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.center = affine * self.center;
        let coeffs = affine.as_coeffs();
        let scale = (coeffs[0].hypot(coeffs[1]) + coeffs[2].hypot(coeffs[3])) / 2.0;
        self.radius *= scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_sets_radius() {
        let mut circle = Circle::new(Point::new(10.0, 10.0), 0.0, ShapeStyle::default());
        circle.drag_to(Point::new(13.0, 14.0));
        assert!((circle.radius - 5.0).abs() < 1e-9);
        let bounds = circle.bounds();
        assert!((bounds.width() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_inside() {
        let circle = Circle::new(Point::new(50.0, 50.0), 20.0, ShapeStyle::default());
        assert!(circle.hit_test(Point::new(55.0, 50.0), 0.0));
        assert!(!circle.hit_test(Point::new(80.0, 50.0), 0.0));
    }

    #[test]
    fn test_uniform_scale() {
        let mut circle = Circle::new(Point::new(0.0, 0.0), 10.0, ShapeStyle::default());
        circle.transform(Affine::scale(2.0));
        assert!((circle.radius - 20.0).abs() < 1e-9);
    }
}

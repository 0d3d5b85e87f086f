//! Freehand stroke shape (ink and eraser).

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist, points_bounds};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke: every sampled pointer position, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Points in the stroke path.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Stroke {
    /// Create a stroke seeded at `start`.
    ///
    /// The start point is stored twice so that a click without a drag
    /// still renders as a dot.
    pub fn seeded(start: Point, style: ShapeStyle) -> Self {
        Self::from_points(vec![start, start], style)
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style,
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeTrait for Stroke {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
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
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_stroke_is_a_dot() {
        let stroke = Stroke::seeded(Point::new(4.0, 5.0), ShapeStyle::default());
        assert_eq!(stroke.points, vec![Point::new(4.0, 5.0); 2]);
        assert!(stroke.bounds().area().abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_points() {
        let mut stroke = Stroke::seeded(Point::ZERO, ShapeStyle::default());
        stroke.add_point(Point::new(10.0, 10.0));
        assert_eq!(stroke.len(), 3);
        assert!(!stroke.is_empty());
    }

    #[test]
    fn test_bounds() {
        let stroke = Stroke::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            ShapeStyle::default(),
        );
        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_accounts_for_width() {
        let stroke = Stroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            ShapeStyle::eraser(30.0),
        );
        assert!(stroke.hit_test(Point::new(50.0, 14.0), 0.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 2.0));
    }

    #[test]
    fn test_dot_hit_test() {
        let stroke = Stroke::seeded(Point::new(10.0, 10.0), ShapeStyle::default());
        assert!(stroke.hit_test(Point::new(11.0, 10.0), 0.0));
        assert!(!stroke.hit_test(Point::new(20.0, 10.0), 1.0));
    }
}

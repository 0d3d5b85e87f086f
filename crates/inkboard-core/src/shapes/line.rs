//! Straight line shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist, points_bounds};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line.
///
/// The gesture's sampled points are all kept; the visible segment runs from
/// the first sample to the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    /// Sampled points, in gesture order.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Line {
    /// Create a line seeded at `start`.
    pub fn seeded(start: Point, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            style,
        }
    }

    /// Create a line between two points.
    pub fn new(start: Point, end: Point, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start, end],
            style,
        }
    }

    /// Start of the visible segment.
    pub fn start(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    /// End of the visible segment.
    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or(Point::ZERO)
    }

    /// Length of the visible segment.
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&[self.start(), self.end()])
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.points.is_empty() {
            return false;
        }
        point_to_segment_dist(point, self.start(), self.end())
            <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if self.points.is_empty() {
            return path;
        }
        path.move_to(self.start());
        path.line_to(self.end());
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
    fn test_segment_uses_first_and_last_samples() {
        let mut line = Line::seeded(Point::new(0.0, 0.0), ShapeStyle::default());
        line.points.push(Point::new(5.0, 40.0));
        line.points.push(Point::new(30.0, 40.0));
        assert_eq!(line.start(), Point::new(0.0, 0.0));
        assert_eq!(line.end(), Point::new(30.0, 40.0));
        assert!((line.length() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), ShapeStyle::default());
        assert!(line.hit_test(Point::new(50.0, 2.0), 1.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 1.0));
    }

    #[test]
    fn test_transform_moves_all_samples() {
        let mut line = Line::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            ShapeStyle::default(),
        );
        line.transform(Affine::translate((5.0, 5.0)));
        assert_eq!(line.points, vec![Point::new(5.0, 5.0), Point::new(15.0, 5.0)]);
    }
}

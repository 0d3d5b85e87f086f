//! Committed shapes, in paint order, with LIFO undo.

use crate::shapes::{Shape, ShapeId};
use kurbo::Point;

/// The ordered list of committed shapes.
///
/// Insertion order is paint order (back to front) and undo order.
/// A shape id appears at most once.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    shapes: Vec<Shape>,
}

impl ShapeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape on top. Returns its id, or `None` if the id is already present.
    pub fn commit(&mut self, shape: Shape) -> Option<ShapeId> {
        let id = shape.id();
        if self.contains(id) {
            log::warn!("refusing to commit shape {id} twice");
            return None;
        }
        log::debug!("committed {:?} {id} ({} shapes)", shape.kind(), self.shapes.len() + 1);
        self.shapes.push(shape);
        Some(id)
    }

    /// Remove and return the most recently committed shape, whatever its kind.
    pub fn undo(&mut self) -> Option<Shape> {
        let shape = self.shapes.pop()?;
        log::debug!("undo removed {:?} {}", shape.kind(), shape.id());
        Some(shape)
    }

    /// Remove a specific shape, preserving the order of the rest.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        Some(self.shapes.remove(index))
    }

    /// Remove every shape. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.shapes.len();
        self.shapes.clear();
        count
    }

    /// Get a shape by ID.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Shapes in paint order (back to front).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Shape ids in paint order.
    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(Shape::id).collect()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Find the topmost pickable shape under a point.
    ///
    /// Erase strokes are never picked: they only exist as a composite effect.
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| !s.style().is_erase())
            .find(|s| s.hit_test(point, tolerance))
            .map(Shape::id)
    }
}

//! Rendering surface boundary.
//!
//! The engine owns shape state; a [`Surface`] only paints it. Implementations
//! wrap whatever the host draws with (a canvas 2D context, a GPU scene, a
//! test recorder).

use crate::export::{Bitmap, ExportError};
use crate::selection::TransformHandle;
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;

/// A drawing surface the engine mirrors its shapes onto.
pub trait Surface {
    /// Add a shape, or replace the one with the same id.
    fn add_shape(&mut self, shape: &Shape);

    /// Remove a shape. Unknown ids are ignored.
    fn remove_shape(&mut self, id: ShapeId);

    /// Remove every shape.
    fn clear(&mut self);

    /// Repaint everything.
    fn redraw(&mut self);

    /// Replace `shape` and repaint only what it touches. Called on every
    /// pointer move of a gesture, so it must stay cheap.
    ///
    /// Defaults to an upsert followed by a full redraw.
    fn redraw_incremental(&mut self, shape: &Shape) {
        self.add_shape(shape);
        self.redraw();
    }

    /// Pixel-accurate pick, if the surface can do better than geometry.
    fn hit_test(&self, point: Point) -> Option<ShapeId> {
        let _ = point;
        None
    }

    /// Rasterize the visible board at pixel ratio 1.
    fn export_image(&mut self) -> Result<Bitmap, ExportError>;

    /// Page-space position of the surface's top-left corner.
    fn screen_origin(&self) -> Point {
        Point::ZERO
    }

    /// Hide or show a shape without removing it.
    fn set_shape_hidden(&mut self, id: ShapeId, hidden: bool);

    /// Show a transform handle, or none.
    fn set_handle(&mut self, handle: Option<&TransformHandle>);
}

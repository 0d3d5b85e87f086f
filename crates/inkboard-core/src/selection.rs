//! Selection state machine and transform handle manipulation.

use crate::registry::ShapeRegistry;
use crate::shapes::{Shape, ShapeId};
use kurbo::{Affine, Point, Rect, Vec2};
use std::f64::consts::FRAC_PI_2;

/// Distance from shape edge to rotation anchor (in canvas units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Minimum size a resize can shrink a box to.
const MIN_RESIZE_EXTENT: f64 = 1.0;

/// Anchor positions on a transform handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    MiddleLeft,
    MiddleRight,
    Rotate,
}

/// A single anchor of a transform handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub kind: HandleKind,
    /// Position in canvas coordinates.
    pub position: Point,
}

impl Anchor {
    /// Check if a point hits this anchor.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }
}

/// The resize/rotate control bound to the selected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformHandle {
    pub shape_id: ShapeId,
    /// Unrotated bounds of the shape.
    pub bounds: Rect,
    /// Rotation in radians around the bounds center.
    pub rotation: f64,
    pub anchors: Vec<Anchor>,
    /// Hidden while the shape's text is being edited.
    pub hidden: bool,
}

impl TransformHandle {
    /// Build the handle for a shape.
    ///
    /// Text boxes only resize horizontally, so they get the middle anchors;
    /// everything else gets four corners. All shapes get a rotate anchor.
    pub fn for_shape(shape: &Shape) -> Self {
        let bounds = shape.bounds();
        let rotation = shape.rotation();
        let kinds: &[HandleKind] = if shape.is_text() {
            &[HandleKind::MiddleLeft, HandleKind::MiddleRight, HandleKind::Rotate]
        } else {
            &[
                HandleKind::TopLeft,
                HandleKind::TopRight,
                HandleKind::BottomLeft,
                HandleKind::BottomRight,
                HandleKind::Rotate,
            ]
        };
        let rotate = Affine::rotate_about(rotation, bounds.center());
        let anchors = kinds
            .iter()
            .map(|&kind| Anchor {
                kind,
                position: rotate * anchor_position(bounds, kind),
            })
            .collect();
        Self {
            shape_id: shape.id(),
            bounds,
            rotation,
            anchors,
            hidden: false,
        }
    }

    /// Find which anchor (if any) is hit at the given point.
    pub fn hit_anchor(&self, point: Point, tolerance: f64) -> Option<HandleKind> {
        if self.hidden {
            return None;
        }
        self.anchors
            .iter()
            .find(|a| a.hit_test(point, tolerance))
            .map(|a| a.kind)
    }
}

/// Unrotated position of an anchor on a bounding box.
fn anchor_position(bounds: Rect, kind: HandleKind) -> Point {
    let center = bounds.center();
    match kind {
        HandleKind::TopLeft => Point::new(bounds.x0, bounds.y0),
        HandleKind::TopRight => Point::new(bounds.x1, bounds.y0),
        HandleKind::BottomLeft => Point::new(bounds.x0, bounds.y1),
        HandleKind::BottomRight => Point::new(bounds.x1, bounds.y1),
        HandleKind::MiddleLeft => Point::new(bounds.x0, center.y),
        HandleKind::MiddleRight => Point::new(bounds.x1, center.y),
        HandleKind::Rotate => Point::new(center.x, bounds.y0 - ROTATE_HANDLE_OFFSET),
    }
}

/// Selection state: `Idle → Armed(shape) → Attached(handle)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Pointer went down on a shape; the click has not completed yet.
    Armed(ShapeId),
    /// A transform handle is bound to the shape.
    Attached(TransformHandle),
}

/// What a drag on the selected shape does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationKind {
    Move,
    Resize(HandleKind),
    Rotate,
}

/// State of an active drag on the selected shape.
#[derive(Debug, Clone)]
pub struct Manipulation {
    pub shape_id: ShapeId,
    pub kind: ManipulationKind,
    pub start_point: Point,
    /// Shape as it was when the drag began.
    pub original: Shape,
}

impl Manipulation {
    /// Get the drag delta.
    pub fn delta(&self, current: Point) -> Vec2 {
        current - self.start_point
    }
}

/// Tracks the single selected shape and its transform handle.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    state: SelectionState,
    manipulation: Option<Manipulation>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The shape the handle is attached to.
    pub fn selected(&self) -> Option<ShapeId> {
        self.handle().map(|h| h.shape_id)
    }

    /// The shape that is armed or attached.
    pub fn target(&self) -> Option<ShapeId> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Armed(id) => Some(*id),
            SelectionState::Attached(handle) => Some(handle.shape_id),
        }
    }

    pub fn handle(&self) -> Option<&TransformHandle> {
        match &self.state {
            SelectionState::Attached(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, SelectionState::Attached(_))
    }

    pub fn manipulation(&self) -> Option<&Manipulation> {
        self.manipulation.as_ref()
    }

    /// Attach a handle to `hit`, or go idle when nothing was hit.
    ///
    /// Any handle on a different shape is detached first.
    pub fn select(&mut self, registry: &ShapeRegistry, hit: Option<ShapeId>) -> Option<ShapeId> {
        if hit.is_none() || hit != self.selected() {
            self.detach();
        }
        let shape = registry.get(hit?)?;
        if !self.is_attached() {
            self.attach(shape);
        }
        hit
    }

    /// Pointer went down on a shape.
    pub fn arm(&mut self, id: ShapeId) {
        if self.target() != Some(id) {
            self.detach();
        }
        if !self.is_attached() {
            self.state = SelectionState::Armed(id);
        }
    }

    /// Pointer came up. Completes an armed click when it ends on the same shape.
    pub fn release(&mut self, registry: &ShapeRegistry, hit: Option<ShapeId>) {
        let SelectionState::Armed(id) = self.state else {
            return;
        };
        match registry.get(id) {
            Some(shape) if hit == Some(id) => self.attach(shape),
            _ => self.state = SelectionState::Idle,
        }
    }

    /// Bind a fresh handle to `shape`.
    pub fn attach(&mut self, shape: &Shape) {
        log::debug!("handle attached to {:?} {}", shape.kind(), shape.id());
        self.state = SelectionState::Attached(TransformHandle::for_shape(shape));
    }

    /// Drop the handle. Never touches the shape. Returns true if anything was detached.
    pub fn detach(&mut self) -> bool {
        self.manipulation = None;
        let was_active = self.state != SelectionState::Idle;
        if was_active {
            log::debug!("selection detached from {:?}", self.target());
        }
        self.state = SelectionState::Idle;
        was_active
    }

    /// Drop any selection bound to `id`, e.g. after the shape was removed.
    pub fn forget(&mut self, id: ShapeId) -> bool {
        if self.target() == Some(id) {
            self.detach()
        } else {
            false
        }
    }

    /// Recompute the handle geometry from the shape's current box.
    pub fn refresh(&mut self, registry: &ShapeRegistry) {
        let SelectionState::Attached(handle) = &self.state else {
            return;
        };
        let hidden = handle.hidden;
        match registry.get(handle.shape_id) {
            Some(shape) => {
                let mut fresh = TransformHandle::for_shape(shape);
                fresh.hidden = hidden;
                self.state = SelectionState::Attached(fresh);
            }
            None => {
                self.detach();
            }
        }
    }

    /// Hide or show the attached handle.
    pub fn set_hidden(&mut self, hidden: bool) {
        if let SelectionState::Attached(handle) = &mut self.state {
            handle.hidden = hidden;
        }
    }

    /// Start a drag on the attached shape: an anchor resizes or rotates,
    /// the body moves. `hit` is the topmost shape under the point; the body
    /// only moves when that is the attached shape. Returns false otherwise.
    pub fn begin_manipulation(
        &mut self,
        registry: &ShapeRegistry,
        point: Point,
        hit: Option<ShapeId>,
        handle_tolerance: f64,
    ) -> bool {
        let Some(handle) = self.handle() else {
            return false;
        };
        let Some(shape) = registry.get(handle.shape_id) else {
            return false;
        };
        let kind = match handle.hit_anchor(point, handle_tolerance) {
            Some(HandleKind::Rotate) => ManipulationKind::Rotate,
            Some(anchor) => ManipulationKind::Resize(anchor),
            None if hit == Some(handle.shape_id) => ManipulationKind::Move,
            None => return false,
        };
        log::debug!("manipulation {:?} started on {}", kind, shape.id());
        self.manipulation = Some(Manipulation {
            shape_id: shape.id(),
            kind,
            start_point: point,
            original: shape.clone(),
        });
        true
    }

    /// Apply the drag to the shape and refresh the handle.
    pub fn update_manipulation(
        &mut self,
        registry: &mut ShapeRegistry,
        point: Point,
        keep_aspect_ratio: bool,
        min_text_width: f64,
    ) -> Option<ShapeId> {
        let m = self.manipulation.as_ref()?;
        let updated = apply_manipulation(m, point, keep_aspect_ratio, min_text_width);
        let id = m.shape_id;
        *registry.get_mut(id)? = updated;
        self.refresh(registry);
        Some(id)
    }

    /// Finish the drag. Returns the manipulated shape.
    pub fn end_manipulation(&mut self) -> Option<ShapeId> {
        self.manipulation.take().map(|m| m.shape_id)
    }
}

/// Compute the manipulated shape from its original state.
pub fn apply_manipulation(
    m: &Manipulation,
    current: Point,
    keep_aspect_ratio: bool,
    min_text_width: f64,
) -> Shape {
    let mut shape = m.original.clone();
    let delta = m.delta(current);
    match m.kind {
        ManipulationKind::Move => shape.transform(Affine::translate(delta)),
        ManipulationKind::Resize(anchor) => match &mut shape {
            Shape::Text(text) => {
                // Only the width changes; scale is folded back into the box.
                // The painted edge opposite the dragged anchor stays put.
                let axis = text.x_axis();
                let along = delta.dot(axis);
                let old_width = text.width.max(f64::EPSILON);
                let origin = text.painted_origin();
                match anchor {
                    HandleKind::MiddleRight => {
                        let scale = (old_width + along) / old_width;
                        text.apply_horizontal_scale(scale, min_text_width);
                        text.set_painted_origin(origin);
                    }
                    HandleKind::MiddleLeft => {
                        let top_right = origin + axis * text.width;
                        let scale = (old_width - along) / old_width;
                        text.apply_horizontal_scale(scale, min_text_width);
                        text.set_painted_origin(top_right - axis * text.width);
                    }
                    _ => {}
                }
            }
            _ => {
                let old = shape.bounds();
                let new = resized_bounds(old, anchor, delta, keep_aspect_ratio);
                let sx = if old.width() > f64::EPSILON {
                    new.width() / old.width()
                } else {
                    1.0
                };
                let sy = if old.height() > f64::EPSILON {
                    new.height() / old.height()
                } else {
                    1.0
                };
                let affine = Affine::translate(new.origin().to_vec2())
                    * Affine::scale_non_uniform(sx, sy)
                    * Affine::translate(-old.origin().to_vec2());
                shape.transform(affine);
            }
        },
        ManipulationKind::Rotate => {
            let center = m.original.bounds().center();
            let angle_of = |p: Point| (p.y - center.y).atan2(p.x - center.x) + FRAC_PI_2;
            let turn = angle_of(current) - angle_of(m.start_point);
            if shape.supports_rotation() {
                shape.set_rotation(m.original.rotation() + turn);
            } else {
                shape.transform(Affine::rotate_about(turn, center));
            }
        }
    }
    shape
}

/// New bounds after dragging `anchor` by `delta`; the opposite side stays put.
fn resized_bounds(bounds: Rect, anchor: HandleKind, delta: Vec2, keep_aspect_ratio: bool) -> Rect {
    let (x0, y0, x1, y1) = match anchor {
        HandleKind::TopLeft => (bounds.x0 + delta.x, bounds.y0 + delta.y, bounds.x1, bounds.y1),
        HandleKind::TopRight => (bounds.x0, bounds.y0 + delta.y, bounds.x1 + delta.x, bounds.y1),
        HandleKind::BottomLeft => (bounds.x0 + delta.x, bounds.y0, bounds.x1, bounds.y1 + delta.y),
        HandleKind::BottomRight => (bounds.x0, bounds.y0, bounds.x1 + delta.x, bounds.y1 + delta.y),
        HandleKind::MiddleLeft => (bounds.x0 + delta.x, bounds.y0, bounds.x1, bounds.y1),
        HandleKind::MiddleRight => (bounds.x0, bounds.y0, bounds.x1 + delta.x, bounds.y1),
        HandleKind::Rotate => return bounds,
    };
    let mut rect = Rect::new(x0, y0, x1, y1).abs();
    if keep_aspect_ratio && bounds.height() > f64::EPSILON {
        let aspect = bounds.width() / bounds.height();
        let size = rect.width().max(rect.height() * aspect);
        rect = Rect::from_origin_size(rect.origin(), (size, size / aspect));
    }
    Rect::from_origin_size(
        rect.origin(),
        (rect.width().max(MIN_RESIZE_EXTENT), rect.height().max(MIN_RESIZE_EXTENT)),
    )
}

//! The drawing-session engine.
//!
//! [`Engine`] routes host input to the builder, selection and text editor,
//! and mirrors every state change onto the [`Surface`].

use crate::builder::ShapeBuilder;
use crate::config::EngineConfig;
use crate::export::{encode_png, ExportError, ExportedImage};
use crate::input::{ClickTracker, Instant, Key, Modifiers, MouseButton, PointerEvent};
use crate::registry::ShapeRegistry;
use crate::selection::{SelectionManager, SelectionState};
use crate::shapes::{Shape, ShapeId, ShapeStyle, Text};
use crate::surface::Surface;
use crate::text_edit::{EditOutcome, KeyResponse, OverlayHost, TextEditor};
use crate::tools::{CursorStyle, ToolManager, ToolMode, ToolParams};
use kurbo::Point;
use std::time::Duration;

/// Everything the engine knows, with no host attached.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub config: EngineConfig,
    pub tools: ToolManager,
    pub builder: ShapeBuilder,
    pub registry: ShapeRegistry,
    pub selection: SelectionManager,
    pub text: TextEditor,
    pub clicks: ClickTracker,
}

impl EngineState {
    /// Create a new engine state from a configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tools: ToolManager::new(config.tool),
            builder: ShapeBuilder::new(),
            registry: ShapeRegistry::new(),
            selection: SelectionManager::new(),
            text: TextEditor::new(config.text.placeholder.clone()),
            clicks: ClickTracker::new(
                Duration::from_millis(config.double_click_ms),
                config.double_click_distance,
            ),
            config,
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// The whiteboard engine bound to a rendering surface and an overlay host.
pub struct Engine<S: Surface, H: OverlayHost> {
    state: EngineState,
    surface: S,
    overlay: H,
}

impl<S: Surface, H: OverlayHost> Engine<S, H> {
    /// Create an engine with the default configuration.
    pub fn new(surface: S, overlay: H) -> Self {
        Self::with_config(EngineConfig::default(), surface, overlay)
    }

    pub fn with_config(config: EngineConfig, surface: S, overlay: H) -> Self {
        Self::from_state(EngineState::new(config), surface, overlay)
    }

    /// Attach hosts to an existing state. The surface is repopulated from it.
    pub fn from_state(state: EngineState, surface: S, overlay: H) -> Self {
        let mut engine = Self {
            state,
            surface,
            overlay,
        };
        engine.surface.clear();
        for shape in engine.state.registry.iter() {
            engine.surface.add_shape(shape);
        }
        engine.sync_handle();
        engine.surface.redraw();
        engine
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.state.registry
    }

    pub fn selection(&self) -> &SelectionState {
        self.state.selection.state()
    }

    pub fn text_editor(&self) -> &TextEditor {
        &self.state.text
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn overlay(&self) -> &H {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut H {
        &mut self.overlay
    }

    /// Detach the hosts, keeping the state.
    pub fn into_parts(self) -> (EngineState, S, H) {
        (self.state, self.surface, self.overlay)
    }

    // --- Tool mode ---

    /// Switch the active mode. An open gesture is discarded, never committed.
    pub fn set_mode(&mut self, mode: ToolMode, params: Option<ToolParams>) {
        self.cancel_gesture();
        self.state.tools.set_mode(mode, params);
        log::debug!("tool mode set to {}", mode.name());
    }

    /// Update brush size, opacity and ink without changing mode.
    pub fn set_params(&mut self, params: ToolParams) {
        self.state.tools.set_params(params);
    }

    pub fn current_mode(&self) -> ToolMode {
        self.state.tools.mode()
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.state.tools.cursor_style()
    }

    // --- Gestures ---

    /// Start building a shape in the current mode. No-op if a gesture is
    /// already open or the mode does not draw.
    pub fn begin_gesture(&mut self, start: Point) -> bool {
        let mode = self.state.tools.mode();
        let style = self.state.tools.style_for(mode, self.state.config.eraser_width);
        let Some(shape) = self.state.builder.begin(mode, start, style) else {
            return false;
        };
        self.surface.add_shape(shape);
        self.surface.redraw();
        true
    }

    /// Feed a pointer sample into the open gesture.
    pub fn extend_gesture(&mut self, point: Point) -> bool {
        let Some(shape) = self.state.builder.extend(point) else {
            return false;
        };
        self.surface.redraw_incremental(shape);
        true
    }

    /// Commit the open gesture. Returns the new shape's id.
    pub fn end_gesture(&mut self) -> Option<ShapeId> {
        let preview_id = self.state.builder.preview().map(Shape::id)?;
        let finished = self.state.builder.finish(&self.state.config.gestures);
        let committed = finished.and_then(|shape| {
            self.surface.add_shape(&shape);
            self.state.registry.commit(shape)
        });
        if committed.is_none() {
            self.surface.remove_shape(preview_id);
        }
        self.surface.redraw();
        committed
    }

    /// Discard the open gesture. Returns false if none was open.
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(shape) = self.state.builder.cancel() else {
            return false;
        };
        self.surface.remove_shape(shape.id());
        self.surface.redraw();
        true
    }

    // --- Registry ---

    /// Remove the most recently committed shape, whatever its kind.
    pub fn undo(&mut self) -> Option<ShapeId> {
        if self.state.registry.is_empty() {
            return None;
        }
        self.state.selection.detach();
        self.surface.set_handle(None);
        let shape = self.state.registry.undo()?;
        let id = shape.id();
        if self.state.text.editing_shape() == Some(id) {
            self.state.text.abandon(&mut self.overlay);
        }
        self.surface.remove_shape(id);
        self.surface.redraw();
        Some(id)
    }

    /// Remove every shape. Also drops any open gesture, handle and text edit.
    pub fn clear(&mut self) -> usize {
        if let Some(shape) = self.state.builder.cancel() {
            log::debug!("clear discarded open {:?} gesture", shape.kind());
        }
        self.state.text.abandon(&mut self.overlay);
        self.state.selection.detach();
        let removed = self.state.registry.clear();
        self.state.clicks.reset();
        self.surface.set_handle(None);
        self.surface.clear();
        self.surface.redraw();
        log::info!("board cleared ({removed} shapes)");
        removed
    }

    /// Remove one shape, keeping the order of the rest.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.state.registry.remove(id)?;
        if self.state.selection.forget(id) {
            self.surface.set_handle(None);
        }
        if self.state.text.editing_shape() == Some(id) {
            self.state.text.abandon(&mut self.overlay);
        }
        self.surface.remove_shape(id);
        self.surface.redraw();
        Some(shape)
    }

    // --- Selection ---

    /// Topmost pickable shape at `point`. The surface's pick wins when it
    /// names a committed, non-erase shape.
    pub fn hit(&self, point: Point) -> Option<ShapeId> {
        let registry = &self.state.registry;
        self.surface
            .hit_test(point)
            .filter(|id| registry.get(*id).is_some_and(|s| !s.style().is_erase()))
            .or_else(|| registry.topmost_at(point, self.state.config.hit_tolerance))
    }

    /// Attach the handle to the shape under `point`, or detach on empty space.
    pub fn select_at(&mut self, point: Point) -> Option<ShapeId> {
        let hit = self.hit(point);
        let selected = self.state.selection.select(&self.state.registry, hit);
        self.sync_handle();
        self.surface.redraw();
        selected
    }

    /// Delete the shape under the handle. No-op without one.
    pub fn delete_selected(&mut self) -> Option<ShapeId> {
        let id = self.state.selection.selected()?;
        self.remove(id).map(|s| s.id())
    }

    fn sync_handle(&mut self) {
        self.surface.set_handle(self.state.selection.handle());
    }

    // --- Text ---

    /// Add a placeholder text box and attach its handle.
    pub fn insert_text(&mut self, position: Option<Point>) -> Option<ShapeId> {
        let defaults = &self.state.config.text;
        let params = self.state.tools.params();
        let mut text = Text::new(
            position.unwrap_or(defaults.position),
            defaults.placeholder.clone(),
            ShapeStyle::ink(params.ink_color, 1.0, 1.0),
        )
        .with_font_size(defaults.font_size)
        .with_width(defaults.width)
        .with_font_family(defaults.font_family.clone());
        text.align = defaults.align;
        text.line_height = defaults.line_height;
        text.padding = defaults.padding;

        let shape = Shape::Text(text);
        self.surface.add_shape(&shape);
        let id = self.state.registry.commit(shape)?;
        self.state.selection.select(&self.state.registry, Some(id));
        self.sync_handle();
        self.surface.redraw();
        Some(id)
    }

    /// Open the overlay field on text shape `id`.
    pub fn enter_text_edit(&mut self, id: ShapeId) -> bool {
        let origin = self.surface.screen_origin();
        let (previous, opened) = self
            .state
            .text
            .enter(&mut self.overlay, &mut self.state.registry, id, origin);
        if let Some(outcome) = previous {
            self.finish_text_edit(outcome);
        }
        if !opened {
            return false;
        }
        self.state.selection.select(&self.state.registry, Some(id));
        self.state.selection.set_hidden(true);
        self.surface.set_shape_hidden(id, true);
        self.sync_handle();
        self.surface.redraw();
        true
    }

    /// Write the field back into the shape and close it.
    pub fn commit_text_edit(&mut self) -> Option<ShapeId> {
        let outcome = self.state.text.commit(&mut self.overlay, &mut self.state.registry)?;
        Some(self.finish_text_edit(outcome))
    }

    /// Close the field, restoring the text from before editing.
    pub fn cancel_text_edit(&mut self) -> Option<ShapeId> {
        let outcome = self.state.text.cancel(&mut self.overlay, &mut self.state.registry)?;
        Some(self.finish_text_edit(outcome))
    }

    /// A click somewhere on the page outside the canvas.
    pub fn on_page_click(&mut self, inside_field: bool) -> Option<ShapeId> {
        let outcome = self
            .state
            .text
            .click(&mut self.overlay, &mut self.state.registry, inside_field)?;
        Some(self.finish_text_edit(outcome))
    }

    fn finish_text_edit(&mut self, outcome: EditOutcome) -> ShapeId {
        let id = outcome.shape_id();
        if let Some(shape) = self.state.registry.get(id) {
            self.surface.add_shape(shape);
        }
        self.surface.set_shape_hidden(id, false);
        self.state.selection.set_hidden(false);
        self.state.selection.refresh(&self.state.registry);
        self.sync_handle();
        self.surface.redraw();
        id
    }

    // --- Export ---

    /// Rasterize the board and encode it as `board_image.png`.
    pub fn export_image(&mut self) -> Result<ExportedImage, ExportError> {
        let bitmap = self.surface.export_image().inspect_err(|e| {
            log::warn!("export failed: {e}");
        })?;
        encode_png(&bitmap).inspect_err(|e| log::warn!("export failed: {e}"))
    }

    // --- Input ---

    /// Dispatch a pointer event. Only the primary button draws or selects.
    pub fn handle_pointer(&mut self, event: PointerEvent, modifiers: Modifiers) {
        let position = event.position();
        match event {
            PointerEvent::Down {
                button: MouseButton::Left,
                ..
            } => self.on_pointer_down(position),
            PointerEvent::Move { .. } => self.on_pointer_move(position, modifiers),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.on_pointer_up(position),
            _ => {}
        }
    }

    pub fn on_pointer_down(&mut self, position: Point) {
        self.on_pointer_down_at(position, Instant::now());
    }

    /// [`Engine::on_pointer_down`] with an explicit timestamp for double-click detection.
    pub fn on_pointer_down_at(&mut self, position: Point, now: Instant) {
        // The overlay field lives outside the canvas, so any canvas press is an outside click.
        if self.state.text.is_editing() {
            self.on_page_click(false);
        }
        // A pointer-up was missed.
        if self.state.builder.is_active() {
            log::debug!("implicit cancel of open gesture");
            self.cancel_gesture();
        }

        let double = self.state.clicks.register(position, now);
        let mode = self.state.tools.mode();
        if mode.is_drawing() {
            self.begin_gesture(position);
            return;
        }

        let hit = self.hit(position);
        let hit_text = hit.filter(|id| self.state.registry.get(*id).is_some_and(Shape::is_text));
        if double {
            if let Some(id) = hit_text {
                self.enter_text_edit(id);
                return;
            }
        }

        match mode {
            ToolMode::Select => self.press_selection(position, hit),
            ToolMode::Text if hit_text.is_some() => self.press_selection(position, hit_text),
            _ => {
                if self.state.selection.detach() {
                    self.sync_handle();
                    self.surface.redraw();
                }
            }
        }
    }

    fn press_selection(&mut self, position: Point, hit: Option<ShapeId>) {
        let grabbed = self.state.selection.begin_manipulation(
            &self.state.registry,
            position,
            hit,
            self.state.config.handle_tolerance,
        );
        if grabbed {
            return;
        }
        match hit {
            Some(id) => self.state.selection.arm(id),
            None => {
                self.state.selection.detach();
            }
        }
        self.sync_handle();
        self.surface.redraw();
    }

    /// Shift keeps the aspect ratio while resizing.
    pub fn on_pointer_move(&mut self, position: Point, modifiers: Modifiers) {
        if self.state.builder.is_active() {
            self.extend_gesture(position);
            return;
        }
        if self.state.selection.manipulation().is_none() {
            return;
        }
        let min_width = self.state.config.text.min_width;
        let Some(id) = self.state.selection.update_manipulation(
            &mut self.state.registry,
            position,
            modifiers.shift,
            min_width,
        ) else {
            return;
        };
        self.sync_handle();
        if let Some(shape) = self.state.registry.get(id) {
            self.surface.redraw_incremental(shape);
        }
    }

    pub fn on_pointer_up(&mut self, position: Point) {
        if self.state.builder.is_active() {
            self.end_gesture();
            return;
        }
        if self.state.selection.end_manipulation().is_some() {
            self.surface.redraw();
            return;
        }
        if matches!(self.state.selection.state(), SelectionState::Armed(_)) {
            let hit = self.hit(position);
            self.state.selection.release(&self.state.registry, hit);
            self.sync_handle();
            self.surface.redraw();
        }
    }

    /// Handle a key press. Returns true if the engine consumed it.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        if self.state.text.is_editing() {
            let response = self
                .state
                .text
                .on_key(&mut self.overlay, &mut self.state.registry, key, modifiers);
            if let KeyResponse::Closed(outcome) = response {
                self.finish_text_edit(outcome);
            }
            return response != KeyResponse::Ignored;
        }
        match key {
            Key::Delete | Key::Backspace => self.delete_selected().is_some(),
            Key::Escape => {
                let cancelled = self.cancel_gesture();
                let detached = self.state.selection.detach();
                if detached {
                    self.sync_handle();
                    self.surface.redraw();
                }
                cancelled || detached
            }
            k if modifiers.action() && k.is_char('z') => self.undo().is_some(),
            _ => false,
        }
    }

    /// The window lost focus: any open gesture is discarded.
    pub fn on_blur(&mut self) {
        if self.cancel_gesture() {
            log::debug!("gesture cancelled on blur");
        }
        self.state.selection.end_manipulation();
        self.state.clicks.reset();
    }
}

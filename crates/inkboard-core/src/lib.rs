//! Inkboard Core Library
//!
//! Drawing-session and shape-state engine for the Inkboard whiteboard:
//! tool modes, gesture building, the shape registry with undo, selection
//! and transform handles, and overlay text editing. Rendering and the host
//! page are reached only through the [`Surface`] and [`OverlayHost`] traits.

pub mod builder;
pub mod config;
pub mod engine;
pub mod export;
pub mod input;
pub mod registry;
pub mod selection;
pub mod shapes;
pub mod surface;
pub mod text_edit;
pub mod tools;

pub use builder::ShapeBuilder;
pub use config::{ConfigError, EngineConfig, GesturePolicies, GesturePolicy, TextDefaults};
pub use engine::{Engine, EngineState};
pub use export::{encode_png, Bitmap, ExportError, ExportedImage, EXPORT_FILE_NAME};
pub use input::{ClickTracker, Key, Modifiers, MouseButton, PointerEvent};
pub use registry::ShapeRegistry;
pub use selection::{HandleKind, SelectionManager, SelectionState, TransformHandle};
pub use shapes::{Shape, ShapeId, ShapeKind, ShapeStyle};
pub use surface::Surface;
pub use text_edit::{MetricsCorrection, OverlayHost, OverlayLayout, TextEditor};
pub use tools::{CursorStyle, ToolManager, ToolMode, ToolParams};

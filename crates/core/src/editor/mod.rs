//! Interactive placement of an overlay image over a background.
//!
//! # Architecture
//!
//! The editor is split into focused submodules:
//! - [`state`]: Gesture state machine and the change/notice types it emits
//! - [`handles`]: Selection frame geometry and hit testing
//! - [`interaction`]: Pointer handling that turns gestures into poses
//! - [`rendering`]: Drawing the canvas into a pixel buffer
//! - [`loader`]: Background image decoding
//! - [`canvas_editor`]: The [`CanvasEditor`] that ties them together
//!
//! # Usage
//!
//! ```ignore
//! use mockup_canvas_core::editor::{CanvasEditor, ImageRole};
//! use mockup_canvas_core::geometry::Point;
//!
//! let mut editor = CanvasEditor::new(Config::load()?)?;
//! editor.on_transform_change(|change| println!("{:?}", change.relative));
//! editor.load_image(ImageRole::Background, ImageSource::Path("shirt.jpg".into()));
//! editor.wait_for(ImageRole::Background)?;
//!
//! editor.pointer_down(Point::new(400.0, 300.0));
//! editor.pointer_move(Point::new(420.0, 310.0));
//! editor.pointer_up();
//! ```

mod canvas_editor;
pub mod handles;
pub mod interaction;
mod loader;
pub mod rendering;
pub mod state;

pub use canvas_editor::{CanvasEditor, UploadHandler};
pub use handles::{HandleLayout, HandleStyle};
pub use rendering::{RenderMode, DEFAULT_ACCENT, PLACEHOLDER_HINT};
pub use state::{
    ChangePhase, Corner, CursorHint, GestureState, HitTarget, ImageRole, Notice, TransformChange,
};

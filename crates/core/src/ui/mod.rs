//! User interface components for mockup-canvas.
//!
//! This module provides a desktop window around the [`CanvasEditor`] for
//! placing a logo by hand.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: Outcome and status types
//! - [`settings`]: User preferences and persistence
//! - [`rendering`]: Canvas display and status drawing
//! - [`input`]: Pointer handling and coordinate mapping
//! - [`editor_window`]: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use mockup_canvas_core::{ui, CanvasEditor, Config, ImageRole, ImageSource};
//!
//! let mut editor = CanvasEditor::new(Config::load()?)?;
//! editor.load_image(ImageRole::Background, ImageSource::Path("shirt.jpg".into()));
//! editor.load_image(ImageRole::Overlay, ImageSource::Path("logo.png".into()));
//!
//! let outcome = ui::run_editor_window(editor, ui::Settings::load())?;
//! if let Some(placement) = outcome.placement {
//!     println!("{:?}", placement);
//! }
//! ```

mod editor_window;
mod input;
mod rendering;
mod settings;
mod state;

// Public API exports
pub use editor_window::EditorWindow;
pub use settings::{Settings, ACCENT_PRESETS};
pub use state::{EditorOutcome, UiState};

use crate::editor::CanvasEditor;
use crate::error::Result;

/// Opens the editor window and waits for the user to close it.
///
/// # Arguments
/// * `editor` - The editor to show, usually with image loads already requested
/// * `settings` - Persisted user preferences (accent color, export format)
///
/// # Returns
/// - `Ok(outcome)` with [`EditorOutcome::is_confirmed`] set when the user pressed "Done"
/// - `Ok(EditorOutcome::default())` when the window was closed or Escape was pressed
/// - `Err(e)` if the window could not be created
pub fn run_editor_window(editor: CanvasEditor, settings: Settings) -> Result<EditorOutcome> {
    editor_window::run(editor, settings)
}

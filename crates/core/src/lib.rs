//! Mockup Canvas Core Library
//!
//! This library provides the placement engine behind the mockup canvas: a
//! logo (the overlay) is dragged, scaled and rotated over a product photo
//! (the background), and its pose is reported in the photo's own pixels.
//!
//! # Overview
//!
//! The background is letterboxed into a fixed-size canvas. Every pose change
//! is emitted twice: in canvas pixels for drawing, and relative to the
//! background so it survives a different canvas size or display scale. The
//! library handles:
//!
//! - **Coordinate Mapping**: Letterbox fit and conversions via [`mapping`]
//! - **Pose Model**: Clamped overlay transforms via [`transform`]
//! - **Editing**: Gestures, handles and rendering via [`editor`]
//! - **Image Processing**: Decoding, validation and export via [`image_processing`]
//! - **User Interface**: A desktop editor window via [`ui`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`CanvasEditor`]:
//!
//! ```ignore
//! use mockup_canvas_core::{CanvasEditor, Config, ImageRole, ImageSource};
//!
//! let mut editor = CanvasEditor::new(Config::load()?)?;
//! editor.load_image(ImageRole::Background, ImageSource::Path("shirt.jpg".into()));
//! editor.load_image(ImageRole::Overlay, ImageSource::Path("logo.png".into()));
//! editor.wait_for(ImageRole::Background)?;
//! editor.wait_for(ImageRole::Overlay)?;
//!
//! editor.set_scale(0.5);
//! let png = editor.export_still_image(ExportFormat::Png)?;
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration loading and management
//! - [`editor`]: The interactive canvas editor
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Points and angle helpers
//! - [`image_processing`]: Image reading and encoding utilities
//! - [`mapping`]: Canvas and background coordinate spaces
//! - [`transform`]: Overlay pose, relative pose and placement record
//! - [`ui`]: User interface components

pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod image_processing;
pub mod mapping;
pub mod transform;
pub mod ui;

// Re-export primary types for convenience
pub use config::Config;
pub use editor::{CanvasEditor, ChangePhase, CursorHint, ImageRole, Notice, TransformChange};
pub use error::{AppError, Result};
pub use geometry::Point;
pub use image_processing::{ExportFormat, ImageProcessor, ImageSource};
pub use mapping::FitBounds;
pub use transform::{Placement, RelativePose, Transform, TransformUpdate};

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present.
///
/// # Example
///
/// ```ignore
/// mockup_canvas_core::init();
/// let config = mockup_canvas_core::Config::load()?;
/// ```
pub fn init() {
    let _ = dotenvy::dotenv();
}

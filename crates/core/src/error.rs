//! Error types for the mockup-canvas-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.
//!
//! Geometry itself never fails: out-of-range values are clamped and degenerate
//! gestures are no-ops. Errors come from the edges of the engine (configuration,
//! image decoding and encoding, the editor window).

use thiserror::Error;

/// Errors that can occur within the mockup-canvas-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An image source could not be read or decoded.
    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    /// The canvas could not be encoded to a still image.
    #[error("Image encoding failed: {0}")]
    ImageEncode(String),

    /// The image source kind is not handled by the engine (e.g. remote URLs).
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    /// An uploaded file exceeds the configured size ceiling.
    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge {
        /// Actual size of the file.
        size: u64,
        /// Configured ceiling.
        max: u64,
    },

    /// The drawing surface could not be created or used.
    #[error("Render error: {0}")]
    Render(String),

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an image decoding error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Creates an image encoding error with the given message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::ImageEncode(msg.into())
    }

    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

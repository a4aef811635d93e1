//! UI state types.

use crate::image_processing::ExportFormat;
use crate::transform::{Placement, Transform};

/// What the editor window hands back when it closes.
///
/// Everything stays `None` when the user closes the window without
/// pressing "Done".
#[derive(Clone, Debug, Default)]
pub struct EditorOutcome {
    /// Final pose in canvas pixels.
    pub transform: Option<Transform>,
    /// Final pose in background pixels; absent without a background.
    pub placement: Option<Placement>,
    /// The flattened canvas, encoded as `format`.
    pub image: Option<Vec<u8>>,
    pub format: ExportFormat,
}

impl EditorOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.transform.is_some()
    }
}

/// Message shown in the status bar.
///
/// Loading and error messages replace each other; `Ready` clears the bar.
#[derive(Clone, Debug, PartialEq)]
pub enum UiState {
    Ready,
    Loading,
    Info(String),
    Error(String),
}

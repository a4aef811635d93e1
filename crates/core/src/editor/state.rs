//! Editor state types and event definitions.
//!
//! This module contains the gesture state machine and the values the editor
//! hands back to its caller.

use crate::geometry::Point;
use crate::mapping::FitBounds;
use crate::transform::{Placement, RelativePose, Transform};

/// Which of the two layers an image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageRole {
    /// The product photo the placement is relative to.
    Background,
    /// The logo being placed.
    Overlay,
}

impl ImageRole {
    pub(crate) fn index(self) -> usize {
        match self {
            ImageRole::Background => 0,
            ImageRole::Overlay => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRole::Background => "background",
            ImageRole::Overlay => "overlay",
        }
    }
}

/// Corner of the overlay's bounding box, clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Unit direction of the corner from the box center (y-down).
    pub fn sign(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (-1.0, 1.0),
        }
    }
}

/// What a pointer position lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    RotateHandle,
    Corner(Corner),
    Body,
}

/// Current gesture.
///
/// The editor follows a simple state machine:
/// `Idle` -> `Dragging` | `Resizing` | `Rotating` (on pointer down)
///         <- (on pointer up or leave)
///
/// Each active variant carries the snapshot taken at pointer-down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position minus overlay center at pointer-down.
        grab_offset: Point,
    },
    Resizing {
        corner: Corner,
        initial_scale: f64,
        /// Pointer distance from the overlay center at pointer-down.
        initial_distance: f64,
    },
    Rotating {
        initial_rotation: f64,
        /// Pointer angle about the overlay center at pointer-down.
        initial_angle: f64,
    },
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }
}

/// Distinguishes live preview updates from the value committed on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangePhase {
    Live,
    Committed,
}

/// What the editor emits whenever the overlay pose changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformChange {
    /// Pose in canvas pixels.
    pub transform: Transform,
    /// Pose in background pixels; `None` until a background is loaded.
    pub relative: Option<RelativePose>,
    /// Fit used for the conversion; `None` until a background is loaded.
    pub fit: Option<FitBounds>,
    pub phase: ChangePhase,
}

impl TransformChange {
    /// The persisted form of this change, when a background is present.
    pub fn placement(&self) -> Option<Placement> {
        self.fit
            .as_ref()
            .map(|fit| Placement::from_transform(&self.transform, fit))
    }
}

/// Pointer cursor to show for the position under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Move,
    Grabbing,
    Rotate,
    /// Diagonal resize along the top-left / bottom-right axis.
    ResizeNwSe,
    /// Diagonal resize along the top-right / bottom-left axis.
    ResizeNeSw,
}

/// A recoverable problem the caller should surface to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub role: ImageRole,
    pub message: String,
}

/// Events received from the background image loader.
///
/// These events are sent through a channel from the decoding thread to the
/// editor, tagged with the request generation so stale results can be dropped.
pub(crate) struct LoadEvent {
    pub role: ImageRole,
    pub generation: u64,
    pub result: crate::error::Result<super::rendering::Layer>,
}

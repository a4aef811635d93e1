//! Pointer handling for the overlay.
//!
//! The controller resolves pointer-down into exactly one gesture and turns
//! subsequent pointer moves into new poses. It never touches the renderer or
//! the caller; [`super::CanvasEditor`] wires the results through.

use super::handles::{cursor_for, HandleLayout, HandleStyle, LayoutCache};
use super::state::{CursorHint, GestureState, HitTarget};
use crate::geometry::{angle_between, distance, Point};
use crate::transform::{Transform, TransformModel, TransformUpdate};

/// Below this pointer-to-center distance a resize has no usable ratio.
const MIN_RESIZE_DISTANCE: f64 = 1e-9;

#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: GestureState,
    selection_visible: bool,
    style: HandleStyle,
    layouts: LayoutCache,
}

impl InteractionController {
    pub fn new(style: HandleStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn selection_visible(&self) -> bool {
        self.selection_visible
    }

    pub fn set_selection_visible(&mut self, visible: bool) {
        self.selection_visible = visible;
    }

    pub fn style(&self) -> &HandleStyle {
        &self.style
    }

    /// Handle layout for `transform`, reused while the pose is unchanged.
    pub fn layout(&mut self, transform: &Transform) -> HandleLayout {
        self.layouts.get(transform, &self.style)
    }

    /// Resolves what `point` lands on. A missing overlay is never hit.
    pub fn hit_test(
        &mut self,
        point: Point,
        transform: &Transform,
        overlay_present: bool,
    ) -> Option<HitTarget> {
        if !overlay_present || !point.is_finite() {
            return None;
        }
        let style = self.style;
        self.layout(transform).hit_test(point, &style)
    }

    /// Cursor feedback for a hovering pointer.
    pub fn hover(&mut self, point: Point, transform: &Transform, overlay_present: bool) -> CursorHint {
        match self.gesture {
            GestureState::Dragging { .. } => CursorHint::Grabbing,
            GestureState::Rotating { .. } => CursorHint::Rotate,
            GestureState::Resizing { corner, .. } => {
                cursor_for(Some(HitTarget::Corner(corner)), transform.normalized_rotation())
            }
            GestureState::Idle => {
                let target = self.hit_test(point, transform, overlay_present);
                cursor_for(target, transform.normalized_rotation())
            }
        }
    }

    /// Starts a gesture from `Idle`. While a gesture is active this is ignored.
    pub fn pointer_down(
        &mut self,
        point: Point,
        transform: &Transform,
        overlay_present: bool,
    ) -> GestureState {
        if self.gesture.is_active() {
            return self.gesture;
        }

        let center = transform.center();
        self.gesture = match self.hit_test(point, transform, overlay_present) {
            Some(HitTarget::RotateHandle) => GestureState::Rotating {
                initial_rotation: transform.rotation,
                initial_angle: angle_between(center, point),
            },
            Some(HitTarget::Corner(corner)) => GestureState::Resizing {
                corner,
                initial_scale: transform.scale,
                initial_distance: distance(point, center),
            },
            Some(HitTarget::Body) => GestureState::Dragging {
                grab_offset: point - center,
            },
            None => GestureState::Idle,
        };
        self.selection_visible = self.gesture.is_active();

        log::debug!("Pointer down at ({:.1}, {:.1}): {:?}", point.x, point.y, self.gesture);
        self.gesture
    }

    /// Applies the active gesture for a pointer at `point`.
    ///
    /// Returns the new pose, or `None` when no gesture is active.
    pub fn pointer_move(&mut self, point: Point, model: &mut TransformModel) -> Option<Transform> {
        if !point.is_finite() {
            return None;
        }
        let current = model.current();
        let center = current.center();

        let update = match self.gesture {
            GestureState::Idle => return None,
            GestureState::Dragging { grab_offset } => TransformUpdate::position(point - grab_offset),
            GestureState::Resizing {
                initial_scale,
                initial_distance,
                ..
            } => {
                if initial_distance < MIN_RESIZE_DISTANCE {
                    return Some(current);
                }
                let ratio = distance(point, center) / initial_distance;
                TransformUpdate::scale(initial_scale * ratio)
            }
            GestureState::Rotating {
                initial_rotation,
                initial_angle,
            } => {
                let delta = angle_between(center, point) - initial_angle;
                TransformUpdate::rotation(initial_rotation + delta)
            }
        };

        Some(model.update(update))
    }

    /// Ends the active gesture. Returns whether one was active.
    pub fn pointer_up(&mut self) -> bool {
        let was_active = self.gesture.is_active();
        if was_active {
            log::debug!("Gesture finished: {:?}", self.gesture);
        }
        self.gesture = GestureState::Idle;
        was_active
    }
}

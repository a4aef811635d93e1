//! Pointer handling and coordinate mapping.
//!
//! This module turns egui's per-frame pointer state into the editor's
//! pointer events, mapped from window coordinates to canvas pixels.

use crate::editor::CursorHint;
use crate::geometry::Point;
use eframe::egui;

/// A pointer event in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed(Point),
    Moved(Point),
    Hover(Point),
    Released,
    /// The pointer left the canvas.
    Left,
}

/// The parts of egui's pointer state the editor cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSnapshot {
    pub pressed: bool,
    pub released: bool,
    pub press_origin: Option<egui::Pos2>,
    pub latest: Option<egui::Pos2>,
    pub moved: bool,
}

impl PointerSnapshot {
    pub fn from_input(input: &egui::InputState) -> Self {
        Self {
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
            press_origin: input.pointer.press_origin(),
            latest: input.pointer.latest_pos(),
            moved: input.pointer.is_moving(),
        }
    }
}

/// Maps a window position to canvas pixels for a canvas drawn in `canvas_rect`.
pub fn screen_to_canvas(pos: egui::Pos2, canvas_rect: egui::Rect, canvas_size: (u32, u32)) -> Point {
    let scale_x = canvas_size.0 as f64 / canvas_rect.width().max(1.0) as f64;
    let scale_y = canvas_size.1 as f64 / canvas_rect.height().max(1.0) as f64;
    Point::new(
        (pos.x - canvas_rect.min.x) as f64 * scale_x,
        (pos.y - canvas_rect.min.y) as f64 * scale_y,
    )
}

/// Translates one frame of pointer state into editor events, in order.
///
/// `gesture_active` tells whether the editor is mid-gesture; leaving the
/// canvas then ends the gesture instead of merely hovering.
pub fn pointer_events(
    snapshot: &PointerSnapshot,
    canvas_rect: egui::Rect,
    canvas_size: (u32, u32),
    gesture_active: bool,
) -> Vec<PointerEvent> {
    let to_canvas = |pos| screen_to_canvas(pos, canvas_rect, canvas_size);
    let mut events = Vec::new();
    let mut active = gesture_active;

    if snapshot.pressed {
        if let Some(origin) = snapshot.press_origin.filter(|p| canvas_rect.contains(*p)) {
            events.push(PointerEvent::Pressed(to_canvas(origin)));
            active = true;
        }
    }

    match snapshot.latest {
        Some(pos) if canvas_rect.contains(pos) => {
            if active && snapshot.moved {
                events.push(PointerEvent::Moved(to_canvas(pos)));
            } else if !active {
                events.push(PointerEvent::Hover(to_canvas(pos)));
            }
        }
        _ => {
            if active {
                events.push(PointerEvent::Left);
                return events;
            }
        }
    }

    if snapshot.released && active {
        events.push(PointerEvent::Released);
    }
    events
}

pub fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::Move => egui::CursorIcon::Grab,
        CursorHint::Grabbing => egui::CursorIcon::Grabbing,
        CursorHint::Rotate => egui::CursorIcon::Crosshair,
        CursorHint::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        CursorHint::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        // Canvas of 800x600 shown at half size
        egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(400.0, 300.0))
    }

    #[test]
    fn test_screen_to_canvas() {
        let p = screen_to_canvas(egui::pos2(300.0, 200.0), rect(), (800, 600));
        assert_eq!(p, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_press_then_move() {
        let snapshot = PointerSnapshot {
            pressed: true,
            press_origin: Some(egui::pos2(150.0, 100.0)),
            latest: Some(egui::pos2(160.0, 100.0)),
            moved: true,
            ..Default::default()
        };
        let events = pointer_events(&snapshot, rect(), (800, 600), false);
        assert_eq!(
            events,
            vec![
                PointerEvent::Pressed(Point::new(100.0, 100.0)),
                PointerEvent::Moved(Point::new(120.0, 100.0)),
            ]
        );
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let snapshot = PointerSnapshot {
            pressed: true,
            press_origin: Some(egui::pos2(5.0, 5.0)),
            latest: Some(egui::pos2(5.0, 5.0)),
            ..Default::default()
        };
        assert!(pointer_events(&snapshot, rect(), (800, 600), false).is_empty());
    }

    #[test]
    fn test_leaving_ends_gesture() {
        let snapshot = PointerSnapshot {
            latest: None,
            ..Default::default()
        };
        let events = pointer_events(&snapshot, rect(), (800, 600), true);
        assert_eq!(events, vec![PointerEvent::Left]);
    }

    #[test]
    fn test_release_during_gesture() {
        let snapshot = PointerSnapshot {
            released: true,
            latest: Some(egui::pos2(200.0, 200.0)),
            ..Default::default()
        };
        let events = pointer_events(&snapshot, rect(), (800, 600), true);
        assert_eq!(events, vec![PointerEvent::Released]);
    }

    #[test]
    fn test_hover_when_idle() {
        let snapshot = PointerSnapshot {
            latest: Some(egui::pos2(300.0, 200.0)),
            ..Default::default()
        };
        let events = pointer_events(&snapshot, rect(), (800, 600), false);
        assert_eq!(events, vec![PointerEvent::Hover(Point::new(400.0, 300.0))]);
    }
}

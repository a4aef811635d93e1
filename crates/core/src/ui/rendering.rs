//! UI rendering helpers.
//!
//! This module contains the pieces of the editor window that deal with
//! egui rather than the canvas itself: fitting the canvas into the panel,
//! uploading the rendered frame as a texture and drawing the status bar.

use super::state::UiState;
use crate::mapping::compute_fit_bounds;
use eframe::egui;
use tiny_skia::Pixmap;

/// Where the canvas is shown inside the available panel area.
///
/// The canvas keeps its aspect ratio and is never upscaled past 1:1.
pub fn canvas_display_rect(available: egui::Rect, canvas_size: (u32, u32)) -> egui::Rect {
    let fit = compute_fit_bounds(
        canvas_size.0 as f64,
        canvas_size.1 as f64,
        available.width() as f64,
        available.height() as f64,
    );

    match fit {
        Some(fit) if fit.scale_x < 1.0 => egui::Rect::from_min_size(
            available.min + egui::vec2(fit.offset_x as f32, fit.offset_y as f32),
            egui::vec2(fit.draw_width as f32, fit.draw_height as f32),
        ),
        Some(_) => egui::Rect::from_center_size(
            available.center(),
            egui::vec2(canvas_size.0 as f32, canvas_size.1 as f32),
        ),
        None => egui::Rect::NOTHING,
    }
}

/// Wraps the rendered surface for texture upload.
///
/// tiny-skia stores premultiplied RGBA, which is what egui textures use.
pub fn pixmap_to_color_image(pixmap: &Pixmap) -> egui::ColorImage {
    let size = [pixmap.width() as usize, pixmap.height() as usize];
    egui::ColorImage::from_rgba_premultiplied(size, pixmap.data())
}

/// Draws a thin border around the canvas so the letterbox bars stay visible.
pub fn draw_canvas_border(painter: &egui::Painter, canvas_rect: egui::Rect) {
    painter.rect_stroke(
        canvas_rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(80)),
        egui::StrokeKind::Outside,
    );
}

/// Renders the status line for the current state.
pub fn draw_status(ui: &mut egui::Ui, state: &UiState) {
    match state {
        UiState::Ready => {}
        UiState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading images...");
            });
        }
        UiState::Info(message) => {
            ui.label(egui::RichText::new(message).color(egui::Color32::LIGHT_GRAY));
        }
        UiState::Error(message) => {
            ui.label(egui::RichText::new(format!("Error: {}", message)).color(egui::Color32::RED));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_shrinks_to_fit() {
        let available = egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(400.0, 400.0));
        let rect = canvas_display_rect(available, (800, 600));
        assert_eq!(rect.width(), 400.0);
        assert_eq!(rect.height(), 300.0);
        assert_eq!(rect.min, egui::pos2(0.0, 90.0));
    }

    #[test]
    fn test_canvas_is_not_upscaled() {
        let available = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 800.0));
        let rect = canvas_display_rect(available, (800, 600));
        assert_eq!(rect.size(), egui::vec2(800.0, 600.0));
        assert_eq!(rect.center(), egui::pos2(500.0, 400.0));
    }

    #[test]
    fn test_color_image_size() {
        let pixmap = Pixmap::new(3, 2).unwrap();
        let image = pixmap_to_color_image(&pixmap);
        assert_eq!(image.size, [3, 2]);
    }
}

//! Main editor window.
//!
//! This module contains the `EditorWindow` struct which implements the
//! `eframe::App` trait around a [`CanvasEditor`].

use super::input::{cursor_icon, pointer_events, PointerEvent, PointerSnapshot};
use super::rendering::{canvas_display_rect, draw_canvas_border, draw_status, pixmap_to_color_image};
use super::settings::{Settings, ACCENT_PRESETS};
use super::state::{EditorOutcome, UiState};
use crate::editor::{CanvasEditor, Notice};
use crate::error::{AppError, Result};
use crate::image_processing::ExportFormat;
use crate::transform::{MAX_SCALE, MIN_SCALE};
use eframe::egui;
use std::borrow::Cow;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The editor window.
///
/// Shows the canvas with a toolbar for numeric edits and hands the final
/// placement back to the caller when the user presses "Done".
pub struct EditorWindow {
    editor: CanvasEditor,
    texture: Option<egui::TextureHandle>,
    pub result: Arc<Mutex<EditorOutcome>>,

    // Status
    state: UiState,
    notices: Receiver<Notice>,

    // Settings
    settings: Settings,
    show_settings: bool,
}

impl EditorWindow {
    /// Creates a new editor window.
    ///
    /// # Arguments
    /// * `editor` - The editor, with image loads already requested
    /// * `result` - Shared result container for returning the outcome to the caller
    /// * `settings` - Persisted user preferences
    pub fn new(mut editor: CanvasEditor, result: Arc<Mutex<EditorOutcome>>, settings: Settings) -> Self {
        let (tx, rx) = channel();
        editor.on_notify(move |notice| {
            let _ = tx.send(notice.clone());
        });
        editor.set_accent(settings.accent);

        Self {
            editor,
            texture: None,
            result,
            state: UiState::Ready,
            notices: rx,
            settings,
            show_settings: false,
        }
    }

    /// Applies finished loads and surfaces load failures.
    fn process_background_events(&mut self, ctx: &egui::Context) {
        if self.editor.poll() > 0 {
            ctx.request_repaint();
        }
        while let Ok(notice) = self.notices.try_recv() {
            self.state = UiState::Error(format!("{}: {}", notice.role.as_str(), notice.message));
        }
        if self.editor.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Renders the toolbar with numeric pose inputs.
    fn render_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let transform = self.editor.transform();

        ui.horizontal(|ui| {
            let mut scale = transform.scale;
            ui.label("Scale");
            if ui
                .add(egui::DragValue::new(&mut scale).range(MIN_SCALE..=MAX_SCALE).speed(0.01))
                .changed()
            {
                self.editor.set_scale(scale);
            }

            let mut rotation = transform.normalized_rotation();
            ui.label("Rotation");
            if ui
                .add(egui::DragValue::new(&mut rotation).speed(1.0).suffix("°"))
                .changed()
            {
                self.editor.set_rotation(rotation);
            }

            let mut opacity = transform.opacity;
            if ui
                .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"))
                .changed()
            {
                self.editor.set_opacity(opacity);
            }

            ui.separator();

            if ui.button("Reset").clicked() {
                self.editor.reset();
            }
            if ui.button("Copy image").clicked() {
                self.copy_to_clipboard();
            }
            if ui.button("⚙").clicked() {
                self.show_settings = !self.show_settings;
            }
            if ui.button("Done").clicked() {
                self.finish(ctx);
            }
        });

        if self.show_settings {
            self.render_settings_ui(ui);
        }
    }

    /// Renders the settings panel.
    fn render_settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        let before = self.settings.clone();

        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Accent")
                .selected_text(self.settings.accent_name())
                .show_ui(ui, |ui| {
                    for (name, color) in ACCENT_PRESETS {
                        ui.selectable_value(&mut self.settings.accent, *color, *name);
                    }
                });

            egui::ComboBox::from_label("Export as")
                .selected_text(self.settings.export_format.mime_type())
                .show_ui(ui, |ui| {
                    for format in [ExportFormat::Png, ExportFormat::Jpeg] {
                        ui.selectable_value(&mut self.settings.export_format, format, format.mime_type());
                    }
                });
        });

        if self.settings != before {
            self.editor.set_accent(self.settings.accent);
            self.save_settings();
        }
    }

    fn copy_to_clipboard(&mut self) {
        let image = self.editor.export_rgba();
        let (width, height) = image.dimensions();
        let data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(image.into_raw()),
        };

        self.state = match arboard::Clipboard::new().and_then(|mut c| c.set_image(data)) {
            Ok(()) => UiState::Info("Copied to clipboard".to_string()),
            Err(e) => UiState::Error(format!("Clipboard unavailable: {}", e)),
        };
    }

    /// Exports the canvas, stores the outcome and closes the window.
    fn finish(&mut self, ctx: &egui::Context) {
        let format = self.settings.export_format;
        let image = match self.editor.export_still_image(format) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.state = UiState::Error(e.to_string());
                return;
            }
        };

        match self.result.lock() {
            Ok(mut outcome) => {
                *outcome = EditorOutcome {
                    transform: Some(self.editor.transform()),
                    placement: self.editor.placement(),
                    image: Some(image),
                    format,
                };
            }
            Err(_) => {
                self.state = UiState::Error("Failed to store the result".to_string());
                return;
            }
        }

        self.save_settings();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Feeds this frame's pointer input to the editor.
    fn handle_pointer(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let snapshot = ctx.input(PointerSnapshot::from_input);
        let active = self.editor.gesture().is_active();
        let events = pointer_events(&snapshot, canvas_rect, self.editor.canvas_size(), active);

        for event in events {
            match event {
                PointerEvent::Pressed(point) => {
                    self.editor.pointer_down(point);
                    ctx.set_cursor_icon(cursor_icon(self.editor.hover(point)));
                }
                PointerEvent::Moved(point) | PointerEvent::Hover(point) => {
                    if matches!(event, PointerEvent::Moved(_)) {
                        self.editor.pointer_move(point);
                    }
                    ctx.set_cursor_icon(cursor_icon(self.editor.hover(point)));
                }
                PointerEvent::Released => {
                    self.editor.pointer_up();
                }
                PointerEvent::Left => {
                    self.editor.pointer_leave();
                }
            }
        }
    }

    /// Re-uploads the canvas texture when the editor drew a new frame.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let redrawn = self.editor.render();
        if !redrawn && self.texture.is_some() {
            return;
        }

        let color_image = pixmap_to_color_image(self.editor.pixmap());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "canvas",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
    }
}

impl eframe::App for EditorWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Enforce dark mode
        ctx.set_visuals(egui::Visuals::dark());

        self.process_background_events(ctx);

        // Keyboard shortcuts, unless a text field has focus
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::R)) {
                self.editor.reset();
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui, ctx);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let loading = UiState::Loading;
            let state = if self.editor.is_loading() {
                &loading
            } else {
                &self.state
            };
            draw_status(ui, state);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let canvas_rect = canvas_display_rect(ui.max_rect(), self.editor.canvas_size());

            // Claim the canvas area so drags do not reach the window
            ui.interact(canvas_rect, ui.id().with("canvas"), egui::Sense::click_and_drag());
            self.handle_pointer(ctx, canvas_rect);
            self.sync_texture(ctx);

            if let Some(texture) = &self.texture {
                ui.painter().image(
                    texture.id(),
                    canvas_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            draw_canvas_border(ui.painter(), canvas_rect);
        });
    }
}

/// Opens the editor window and returns when the user closes it.
///
/// # Returns
/// The confirmed outcome, or an empty [`EditorOutcome`] if cancelled.
pub fn run(editor: CanvasEditor, settings: Settings) -> Result<EditorOutcome> {
    let (width, height) = editor.canvas_size();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mockup Canvas")
            .with_inner_size([width as f32 + 32.0, height as f32 + 96.0]),
        ..Default::default()
    };

    let result = Arc::new(Mutex::new(EditorOutcome::default()));
    let app_result = result.clone();

    eframe::run_native(
        "Mockup Canvas",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(EditorWindow::new(editor, app_result, settings)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))?;

    // Extract result from shared state
    let outcome = result
        .lock()
        .map_err(|_| AppError::ui("Failed to acquire result lock"))?;
    Ok(outcome.clone())
}

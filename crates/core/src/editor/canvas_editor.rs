//! The canvas editor.
//!
//! This module contains the `CanvasEditor` struct, which owns the overlay
//! pose, the images, the gesture controller and the drawing surface, and
//! reports every pose change to its caller in both canvas and
//! background-relative coordinates.

use super::handles::HandleStyle;
use super::interaction::InteractionController;
use super::loader::ImageLoader;
use super::rendering::{Layer, RenderMode, Renderer, Scene};
use super::state::{ChangePhase, CursorHint, GestureState, ImageRole, Notice, TransformChange};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geometry::Point;
use crate::image_processing::{ExportFormat, ImageProcessor, ImageSource};
use crate::mapping::{FitBounds, FitCache};
use crate::transform::{Placement, RelativePose, Transform, TransformModel, TransformUpdate};
use image::{DynamicImage, RgbaImage};
use tiny_skia::Pixmap;

/// Storage collaborator that receives raw uploads.
///
/// The editor only needs the decoded image; what happens to the bytes
/// (object storage, a project record) is up to the implementation.
pub trait UploadHandler {
    fn upload(&mut self, role: ImageRole, bytes: &[u8], file_name: Option<&str>) -> Result<()>;
}

type ChangeCallback = Box<dyn FnMut(&TransformChange)>;
type NoticeCallback = Box<dyn FnMut(&Notice)>;

pub struct CanvasEditor {
    config: Config,
    model: TransformModel,
    controller: InteractionController,
    renderer: Renderer,
    fit_cache: FitCache,
    loader: ImageLoader,

    // Layers
    background: Option<Layer>,
    overlay: Option<Layer>,

    /// Initial pose waiting for a background to be relative to.
    pending_pose: Option<RelativePose>,
    last_change: Option<TransformChange>,
    needs_redraw: bool,

    // Collaborators
    on_change: Option<ChangeCallback>,
    on_notify: Option<NoticeCallback>,
    uploader: Option<Box<dyn UploadHandler>>,
}

impl CanvasEditor {
    /// Creates an empty editor with a canvas of the configured size.
    ///
    /// # Errors
    /// Returns [`AppError::Render`] if the drawing surface cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let mut renderer = Renderer::new(config.canvas_width, config.canvas_height)?;

        if let Some(path) = &config.placeholder_font {
            match Renderer::load_font(path) {
                Ok(font) => renderer.set_font(Some(font)),
                Err(e) => log::warn!("Placeholder hint disabled: {}", e),
            }
        }

        Ok(Self {
            model: TransformModel::new(config.canvas_size()),
            controller: InteractionController::new(HandleStyle::default()),
            renderer,
            fit_cache: FitCache::default(),
            loader: ImageLoader::new(config.max_upload_bytes),
            background: None,
            overlay: None,
            pending_pose: None,
            last_change: None,
            needs_redraw: true,
            on_change: None,
            on_notify: None,
            uploader: None,
            config,
        })
    }

    pub fn with_handle_style(mut self, style: HandleStyle) -> Self {
        self.controller = InteractionController::new(style);
        self
    }

    /// Registers the callback invoked on every pose change.
    pub fn on_transform_change(&mut self, callback: impl FnMut(&TransformChange) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Registers the callback for recoverable problems (e.g. decode failures).
    pub fn on_notify(&mut self, callback: impl FnMut(&Notice) + 'static) {
        self.on_notify = Some(Box::new(callback));
    }

    pub fn set_upload_handler(&mut self, handler: Box<dyn UploadHandler>) {
        self.uploader = Some(handler);
    }

    pub fn set_accent(&mut self, accent: [u8; 4]) {
        self.renderer.set_accent(accent);
        self.needs_redraw = true;
    }

    /// Places the overlay at a background-relative pose.
    ///
    /// Without a background the pose is kept and applied once one loads.
    pub fn set_initial_transform(&mut self, pose: RelativePose) {
        match self.fit_bounds() {
            Some(fit) => {
                self.model.update(pose.to_update(&fit));
                self.needs_redraw = true;
            }
            None => self.pending_pose = Some(pose),
        }
    }

    // --- Images ---

    /// Starts decoding `source` in the background; see [`Self::poll`].
    pub fn load_image(&mut self, role: ImageRole, source: ImageSource) {
        self.loader.request(role, source);
    }

    /// Installs an already decoded image, superseding pending loads.
    pub fn set_image(&mut self, role: ImageRole, image: &DynamicImage) -> Result<()> {
        self.loader.supersede(role);
        let layer = Layer::from_image(image)?;
        self.install_layer(role, layer);
        Ok(())
    }

    /// Validates an upload, hands it to the storage collaborator and decodes it.
    ///
    /// # Errors
    /// Returns [`AppError::FileTooLarge`] or [`AppError::ImageDecode`] for
    /// rejected files, or the upload handler's error.
    pub fn upload(&mut self, role: ImageRole, bytes: Vec<u8>, file_name: Option<&str>) -> Result<()> {
        ImageProcessor::validate_upload(bytes.len() as u64, file_name, self.loader.max_bytes())?;
        if let Some(uploader) = self.uploader.as_mut() {
            uploader.upload(role, &bytes, file_name)?;
        }
        self.loader.request(role, ImageSource::Bytes(bytes));
        Ok(())
    }

    /// Removes a layer. A removed background brings back the placeholder.
    pub fn clear_image(&mut self, role: ImageRole) {
        self.loader.supersede(role);
        self.remove_layer(role);
    }

    /// Applies finished background loads. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let finished = self.loader.drain();
        let count = finished.len();
        for (role, result) in finished {
            match result {
                Ok(layer) => self.install_layer(role, layer),
                Err(e) => self.fail_layer(role, &e),
            }
        }
        count
    }

    /// Blocks until the pending load for `role` has been applied.
    pub fn wait_for(&mut self, role: ImageRole) -> Result<()> {
        match self.loader.wait(role) {
            Some(Ok(layer)) => {
                self.install_layer(role, layer);
                Ok(())
            }
            Some(Err(e)) => {
                self.fail_layer(role, &e);
                Err(e)
            }
            None => Err(AppError::decode(format!("No {} load in flight", role.as_str()))),
        }
    }

    /// Whether a requested image has not been applied yet.
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn has_image(&self, role: ImageRole) -> bool {
        match role {
            ImageRole::Background => self.background.is_some(),
            ImageRole::Overlay => self.overlay.is_some(),
        }
    }

    fn install_layer(&mut self, role: ImageRole, layer: Layer) {
        let (width, height) = layer.size();
        match role {
            ImageRole::Background => {
                self.background = Some(layer);
                self.refresh_fit();
                if let (Some(pose), Some(fit)) = (self.pending_pose, self.fit_bounds()) {
                    log::debug!("Applying initial pose {:?}", pose);
                    self.model.update(pose.to_update(&fit));
                    self.pending_pose = None;
                }
            }
            ImageRole::Overlay => {
                self.model.set_natural_size(width as f64, height as f64);
                self.overlay = Some(layer);
            }
        }
        log::info!("{} ready ({}x{})", role.as_str(), width, height);
        self.needs_redraw = true;
    }

    fn remove_layer(&mut self, role: ImageRole) {
        match role {
            ImageRole::Background => {
                self.background = None;
                self.fit_cache.invalidate();
            }
            ImageRole::Overlay => {
                self.overlay = None;
                self.controller.pointer_up();
                self.controller.set_selection_visible(false);
            }
        }
        self.needs_redraw = true;
    }

    fn fail_layer(&mut self, role: ImageRole, error: &AppError) {
        log::warn!("Failed to load {}: {}", role.as_str(), error);
        self.remove_layer(role);
        let notice = Notice {
            role,
            message: error.to_string(),
        };
        if let Some(callback) = self.on_notify.as_mut() {
            callback(&notice);
        }
    }

    fn refresh_fit(&mut self) {
        let canvas = (self.config.canvas_width, self.config.canvas_height);
        match &self.background {
            Some(background) => {
                self.fit_cache.get(background.size(), canvas);
            }
            None => self.fit_cache.invalidate(),
        }
    }

    // --- Pointer input ---

    /// Starts a gesture at a canvas position.
    pub fn pointer_down(&mut self, point: Point) -> GestureState {
        let was_visible = self.controller.selection_visible();
        let state = self
            .controller
            .pointer_down(point, &self.model.current(), self.overlay.is_some());
        if state.is_active() || was_visible != self.controller.selection_visible() {
            self.needs_redraw = true;
        }
        state
    }

    /// Advances the active gesture and emits a live change.
    pub fn pointer_move(&mut self, point: Point) -> Option<TransformChange> {
        self.controller.pointer_move(point, &mut self.model)?;
        Some(self.emit(ChangePhase::Live))
    }

    /// Ends the active gesture and emits the committed pose.
    pub fn pointer_up(&mut self) -> Option<TransformChange> {
        if self.controller.pointer_up() {
            Some(self.emit(ChangePhase::Committed))
        } else {
            None
        }
    }

    /// The pointer left the canvas; treated like a release.
    pub fn pointer_leave(&mut self) -> Option<TransformChange> {
        self.pointer_up()
    }

    /// Cursor to show for a pointer hovering at `point`.
    pub fn hover(&mut self, point: Point) -> CursorHint {
        self.controller
            .hover(point, &self.model.current(), self.overlay.is_some())
    }

    pub fn gesture(&self) -> GestureState {
        self.controller.gesture()
    }

    pub fn selection_visible(&self) -> bool {
        self.controller.selection_visible()
    }

    pub fn set_selection_visible(&mut self, visible: bool) {
        self.controller.set_selection_visible(visible);
        self.needs_redraw = true;
    }

    // --- Direct edits ---

    /// Applies a numeric edit (clamped) and emits it as committed.
    pub fn update(&mut self, update: TransformUpdate) -> TransformChange {
        self.model.update(update);
        self.emit(ChangePhase::Committed)
    }

    pub fn set_position(&mut self, point: Point) -> TransformChange {
        self.update(TransformUpdate::position(point))
    }

    pub fn set_scale(&mut self, scale: f64) -> TransformChange {
        self.update(TransformUpdate::scale(scale))
    }

    pub fn set_rotation(&mut self, rotation: f64) -> TransformChange {
        self.update(TransformUpdate::rotation(rotation))
    }

    pub fn set_opacity(&mut self, opacity: f64) -> TransformChange {
        self.update(TransformUpdate::opacity(opacity))
    }

    /// Centers the overlay with default scale, rotation and opacity.
    pub fn reset(&mut self) -> TransformChange {
        self.model.reset();
        self.emit(ChangePhase::Committed)
    }

    fn emit(&mut self, phase: ChangePhase) -> TransformChange {
        let transform = self.model.current();
        let fit = self.fit_bounds();
        let change = TransformChange {
            transform,
            relative: fit.as_ref().map(|f| RelativePose::from_transform(&transform, f)),
            fit,
            phase,
        };
        self.last_change = Some(change);
        self.needs_redraw = true;
        if let Some(callback) = self.on_change.as_mut() {
            callback(&change);
        }
        change
    }

    // --- Queries ---

    pub fn transform(&self) -> Transform {
        self.model.current()
    }

    pub fn fit_bounds(&self) -> Option<FitBounds> {
        self.background.as_ref().and(self.fit_cache.cached())
    }

    pub fn relative_pose(&self) -> Option<RelativePose> {
        let transform = self.model.current();
        self.fit_bounds()
            .map(|fit| RelativePose::from_transform(&transform, &fit))
    }

    pub fn placement(&self) -> Option<Placement> {
        let transform = self.model.current();
        self.fit_bounds()
            .map(|fit| Placement::from_transform(&transform, &fit))
    }

    pub fn last_change(&self) -> Option<TransformChange> {
        self.last_change
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.config.canvas_width, self.config.canvas_height)
    }

    // --- Canvas ---

    /// Changes the canvas size, keeping the overlay at the same spot on the
    /// background.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> Result<()> {
        let relative = self.relative_pose();
        let config = Config::builder()
            .with_canvas_size(width, height)
            .with_max_upload_bytes(self.config.max_upload_bytes)
            .with_placeholder_font(self.config.placeholder_font.clone())
            .build()?;

        self.renderer.resize(width, height)?;
        self.config = config;
        self.model.set_canvas_size(self.config.canvas_size());
        self.refresh_fit();

        if let (Some(pose), Some(fit)) = (relative, self.fit_bounds()) {
            let center = fit.to_canvas(Point::new(pose.x, pose.y));
            self.model.update(TransformUpdate::position(center));
        }
        self.needs_redraw = true;
        Ok(())
    }

    /// Redraws the canvas if anything changed since the last frame.
    ///
    /// Returns whether a new frame was drawn.
    pub fn render(&mut self) -> bool {
        if !self.needs_redraw {
            return false;
        }
        self.draw(RenderMode::Interactive);
        self.needs_redraw = false;
        true
    }

    pub fn pixmap(&self) -> &Pixmap {
        self.renderer.pixmap()
    }

    /// Flattens background and overlay (no handles) into an RGBA image.
    pub fn export_rgba(&mut self) -> RgbaImage {
        self.draw(RenderMode::Export);
        let image = self.renderer.to_rgba_image();
        // The surface now lacks the selection; bring it back on the next frame
        self.needs_redraw = true;
        image
    }

    /// Encodes the flattened canvas.
    pub fn export_still_image(&mut self, format: ExportFormat) -> Result<Vec<u8>> {
        let image = self.export_rgba();
        let bytes = ImageProcessor::encode(&image, format)?;
        log::info!("Exported {} bytes as {}", bytes.len(), format.mime_type());
        Ok(bytes)
    }

    /// Encodes the flattened canvas as a base64 `data:` URL.
    pub fn export_data_url(&mut self, format: ExportFormat) -> Result<String> {
        let image = self.export_rgba();
        ImageProcessor::encode_to_data_url(&image, format)
    }

    fn draw(&mut self, mode: RenderMode) {
        let transform = self.model.current();
        let fit = self.fit_bounds();
        let layout = self
            .overlay
            .as_ref()
            .map(|_| self.controller.layout(&transform));

        let scene = Scene {
            background: self.background.as_ref(),
            overlay: self.overlay.as_ref(),
            transform: &transform,
            fit,
            selection_visible: self.controller.selection_visible(),
            layout,
            style: self.controller.style(),
        };
        self.renderer.render(&scene, mode);
    }
}

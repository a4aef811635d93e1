//! Canvas rendering using tiny-skia.
//!
//! Every frame is drawn from scratch from the scene description, so the
//! output depends only on the images, the pose, the fit and whether the
//! selection is shown.

use super::handles::{HandleLayout, HandleStyle};
use crate::error::{AppError, Result};
use crate::geometry::Point;
use crate::mapping::FitBounds;
use crate::transform::Transform;
use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint,
    PixmapRef, PremultipliedColorU8, Rect, Stroke,
};

/// Hint shown on the empty canvas when a font is configured.
pub const PLACEHOLDER_HINT: &str = "Upload a product photo to start placing your logo";

/// Default selection color (RGBA).
pub const DEFAULT_ACCENT: [u8; 4] = [59, 130, 246, 255];

const CHECKER_SIZE: u32 = 20;
const CHECKER_LIGHT: [u8; 3] = [243, 244, 246];
const CHECKER_DARK: [u8; 3] = [229, 231, 235];
const PLACEHOLDER_INK: [u8; 3] = [156, 163, 175];
const HINT_FONT_SIZE: f32 = 18.0;
const OUTLINE_WIDTH: f32 = 1.5;

/// A decoded image ready to be drawn (premultiplied RGBA).
#[derive(Clone)]
pub struct Layer {
    pixmap: Pixmap,
}

impl Layer {
    /// Converts a decoded image into a drawable layer.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let rgba = image.to_rgba8();
        let mut pixmap = Pixmap::new(rgba.width(), rgba.height())
            .ok_or_else(|| AppError::decode("Image has zero width or height"))?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }

        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Whether selection decorations may be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Interactive,
    /// Flattened output: background and overlay only.
    Export,
}

/// Everything one frame depends on.
pub struct Scene<'a> {
    pub background: Option<&'a Layer>,
    pub overlay: Option<&'a Layer>,
    pub transform: &'a Transform,
    pub fit: Option<FitBounds>,
    pub selection_visible: bool,
    pub layout: Option<HandleLayout>,
    pub style: &'a HandleStyle,
}

pub struct Renderer {
    pixmap: Pixmap,
    font: Option<FontVec>,
    accent: [u8; 4],
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            AppError::render(format!("Cannot create a {}x{} canvas", width, height))
        })?;
        Ok(Self {
            pixmap,
            font: None,
            accent: DEFAULT_ACCENT,
        })
    }

    /// Reads a TTF/OTF font for the placeholder hint.
    pub fn load_font(path: &Path) -> Result<FontVec> {
        let bytes = fs::read(path)?;
        FontVec::try_from_vec(bytes)
            .map_err(|e| AppError::render(format!("Invalid font {}: {}", path.display(), e)))
    }

    pub fn set_font(&mut self, font: Option<FontVec>) {
        self.font = font;
    }

    pub fn set_accent(&mut self, accent: [u8; 4]) {
        self.accent = accent;
    }

    /// Replaces the surface with a blank one of the new size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.pixmap = Pixmap::new(width, height).ok_or_else(|| {
            AppError::render(format!("Cannot create a {}x{} canvas", width, height))
        })?;
        Ok(())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Draws a full frame.
    pub fn render(&mut self, scene: &Scene<'_>, mode: RenderMode) {
        self.pixmap.fill(Color::TRANSPARENT);

        match (scene.background, scene.fit) {
            (Some(background), Some(fit)) => self.draw_background(background, &fit),
            _ => self.draw_placeholder(),
        }

        if let Some(overlay) = scene.overlay {
            self.draw_overlay(overlay, scene.transform);

            if mode == RenderMode::Interactive && scene.selection_visible {
                if let Some(layout) = &scene.layout {
                    self.draw_selection(layout, scene.style);
                }
            }
        }
    }

    /// Copies the surface out as straight-alpha RGBA.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    fn draw_background(&mut self, background: &Layer, fit: &FitBounds) {
        let transform = tiny_skia::Transform::from_row(
            fit.scale_x as f32,
            0.0,
            0.0,
            fit.scale_y as f32,
            fit.offset_x as f32,
            fit.offset_y as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, background.pixmap(), &paint, transform, None);
    }

    fn draw_overlay(&mut self, overlay: &Layer, t: &Transform) {
        let scale = t.scale as f32;
        let transform = frame_transform(t)
            .pre_scale(scale, scale)
            .pre_translate(-(overlay.width() as f32) / 2.0, -(overlay.height() as f32) / 2.0);
        let paint = PixmapPaint {
            opacity: t.opacity as f32,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, overlay.pixmap(), &paint, transform, None);
    }

    /// Bounding box, corner handles, rotation line and handle, all drawn in
    /// the overlay's local frame under the same rotation as the overlay.
    fn draw_selection(&mut self, layout: &HandleLayout, style: &HandleStyle) {
        let frame = tiny_skia::Transform::from_translate(layout.center.x as f32, layout.center.y as f32)
            .pre_concat(tiny_skia::Transform::from_rotate(layout.rotation as f32));

        let [r, g, b, a] = self.accent;
        let mut accent = Paint::default();
        accent.set_color_rgba8(r, g, b, a);
        accent.anti_alias = true;

        let mut fill = Paint::default();
        fill.set_color(Color::WHITE);
        fill.anti_alias = true;

        let stroke = Stroke {
            width: OUTLINE_WIDTH,
            line_cap: LineCap::Round,
            ..Default::default()
        };

        let (hw, hh) = (layout.half_width as f32, layout.half_height as f32);
        if let Some(rect) = Rect::from_xywh(-hw, -hh, hw * 2.0, hh * 2.0) {
            let path = PathBuilder::from_rect(rect);
            self.pixmap.stroke_path(&path, &accent, &stroke, frame, None);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(layout.local_anchor.x as f32, layout.local_anchor.y as f32);
        pb.line_to(
            layout.local_rotate_handle.x as f32,
            layout.local_rotate_handle.y as f32,
        );
        if let Some(path) = pb.finish() {
            self.pixmap.stroke_path(&path, &accent, &stroke, frame, None);
        }

        let size = style.handle_size as f32;
        for corner in &layout.local_corners {
            let Some(rect) = Rect::from_xywh(
                corner.x as f32 - size / 2.0,
                corner.y as f32 - size / 2.0,
                size,
                size,
            ) else {
                continue;
            };
            let path = PathBuilder::from_rect(rect);
            self.pixmap.fill_path(&path, &fill, FillRule::Winding, frame, None);
            self.pixmap.stroke_path(&path, &accent, &stroke, frame, None);
        }

        let Point { x, y } = layout.local_rotate_handle;
        if let Some(circle) = PathBuilder::from_circle(x as f32, y as f32, style.rotate_radius as f32) {
            self.pixmap.fill_path(&circle, &fill, FillRule::Winding, frame, None);
            self.pixmap.stroke_path(&circle, &accent, &stroke, frame, None);
        }
    }

    /// Checkerboard with a picture glyph and, when a font is set, a hint.
    fn draw_placeholder(&mut self) {
        let (width, height) = self.size();

        let mut light = Paint::default();
        light.set_color_rgba8(CHECKER_LIGHT[0], CHECKER_LIGHT[1], CHECKER_LIGHT[2], 255);
        let mut dark = Paint::default();
        dark.set_color_rgba8(CHECKER_DARK[0], CHECKER_DARK[1], CHECKER_DARK[2], 255);

        for row in 0..height.div_ceil(CHECKER_SIZE) {
            for col in 0..width.div_ceil(CHECKER_SIZE) {
                let paint = if (row + col) % 2 == 0 { &light } else { &dark };
                if let Some(rect) = Rect::from_xywh(
                    (col * CHECKER_SIZE) as f32,
                    (row * CHECKER_SIZE) as f32,
                    CHECKER_SIZE as f32,
                    CHECKER_SIZE as f32,
                ) {
                    self.pixmap
                        .fill_rect(rect, paint, tiny_skia::Transform::identity(), None);
                }
            }
        }

        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let icon = (width.min(height) as f32 * 0.15).max(24.0);
        self.draw_picture_glyph(cx, cy - icon * 0.25, icon);

        if let Some(font) = &self.font {
            draw_text(
                &mut self.pixmap,
                font,
                PLACEHOLDER_HINT,
                cx,
                cy + icon * 0.6 + HINT_FONT_SIZE,
                HINT_FONT_SIZE,
                PLACEHOLDER_INK,
            );
        }
    }

    /// Framed landscape (mountain and sun) centered on `(cx, cy)`.
    fn draw_picture_glyph(&mut self, cx: f32, cy: f32, size: f32) {
        let mut ink = Paint::default();
        ink.set_color_rgba8(PLACEHOLDER_INK[0], PLACEHOLDER_INK[1], PLACEHOLDER_INK[2], 255);
        ink.anti_alias = true;
        let identity = tiny_skia::Transform::identity();

        let (w, h) = (size, size * 0.75);
        let (left, top) = (cx - w / 2.0, cy - h / 2.0);
        if let Some(rect) = Rect::from_xywh(left, top, w, h) {
            let stroke = Stroke {
                width: (size / 16.0).max(2.0),
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&PathBuilder::from_rect(rect), &ink, &stroke, identity, None);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(left + w * 0.1, top + h * 0.85);
        pb.line_to(left + w * 0.4, top + h * 0.4);
        pb.line_to(left + w * 0.6, top + h * 0.65);
        pb.line_to(left + w * 0.72, top + h * 0.5);
        pb.line_to(left + w * 0.9, top + h * 0.85);
        pb.close();
        if let Some(path) = pb.finish() {
            self.pixmap
                .fill_path(&path, &ink, FillRule::Winding, identity, None);
        }

        if let Some(sun) = PathBuilder::from_circle(left + w * 0.75, top + h * 0.25, size * 0.08) {
            self.pixmap
                .fill_path(&sun, &ink, FillRule::Winding, identity, None);
        }
    }
}

/// Translation to the overlay center followed by its rotation.
fn frame_transform(t: &Transform) -> tiny_skia::Transform {
    tiny_skia::Transform::from_translate(t.x as f32, t.y as f32)
        .pre_concat(tiny_skia::Transform::from_rotate(t.normalized_rotation() as f32))
}

/// Draws a single line of text centered on `center_x`.
fn draw_text(
    pixmap: &mut Pixmap,
    font: &FontVec,
    text: &str,
    center_x: f32,
    baseline: f32,
    px: f32,
    rgb: [u8; 3],
) {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);

    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }

    let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
    let stride = pixmap.width() as usize;
    let pixels = pixmap.pixels_mut();

    let mut caret = center_x - width / 2.0;
    previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= w || y >= h {
                return;
            }
            let idx = y as usize * stride + x as usize;
            pixels[idx] = blend_opaque(pixels[idx], rgb, coverage);
        });
    }
}

/// Source-over of an opaque color with partial coverage.
fn blend_opaque(dst: PremultipliedColorU8, rgb: [u8; 3], coverage: f32) -> PremultipliedColorU8 {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
    PremultipliedColorU8::from_rgba(
        mix(rgb[0], dst.red()),
        mix(rgb[1], dst.green()),
        mix(rgb[2], dst.blue()),
        mix(255, dst.alpha()),
    )
    .unwrap_or(dst)
}

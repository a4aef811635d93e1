//! Coordinate mapping between the canvas and the background image.
//!
//! The canvas is a fixed-size viewport. The background is letterboxed into it
//! ("contain" fit), and every persisted position is expressed in the
//! background's own pixel space so that it survives a different canvas size.
//!
//! ```text
//! image-relative (bg pixels) --to_canvas--> canvas pixels
//!                            <--to_relative--
//! ```

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Placement of the background image inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitBounds {
    /// Left edge of the drawn background (letterbox origin).
    pub offset_x: f64,
    /// Top edge of the drawn background.
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    /// Canvas pixels per background pixel, horizontally.
    pub scale_x: f64,
    /// Canvas pixels per background pixel, vertically.
    pub scale_y: f64,
}

impl FitBounds {
    /// Image-relative point to canvas point.
    pub fn to_canvas(&self, relative: Point) -> Point {
        Point::new(
            self.offset_x + relative.x * self.scale_x,
            self.offset_y + relative.y * self.scale_y,
        )
    }

    /// Canvas point to image-relative point.
    pub fn to_relative(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x - self.offset_x) / self.scale_x,
            (canvas.y - self.offset_y) / self.scale_y,
        )
    }

    /// Whether a canvas point falls on the drawn background.
    pub fn contains(&self, canvas: Point) -> bool {
        canvas.x >= self.offset_x
            && canvas.x <= self.offset_x + self.draw_width
            && canvas.y >= self.offset_y
            && canvas.y <= self.offset_y + self.draw_height
    }
}

/// Computes the letterbox fit of a `bg_width`x`bg_height` image in the canvas.
///
/// Returns `None` when any dimension is zero or not finite; there is nothing
/// to map against in that case.
pub fn compute_fit_bounds(
    bg_width: f64,
    bg_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> Option<FitBounds> {
    let dims = [bg_width, bg_height, canvas_width, canvas_height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return None;
    }

    let bg_aspect = bg_width / bg_height;
    let canvas_aspect = canvas_width / canvas_height;

    let (draw_width, draw_height, offset_x, offset_y) = if bg_aspect > canvas_aspect {
        // Relatively wider: fill the width, bars above and below
        let draw_height = canvas_width / bg_aspect;
        (canvas_width, draw_height, 0.0, (canvas_height - draw_height) / 2.0)
    } else {
        let draw_width = canvas_height * bg_aspect;
        (draw_width, canvas_height, (canvas_width - draw_width) / 2.0, 0.0)
    };

    Some(FitBounds {
        offset_x,
        offset_y,
        draw_width,
        draw_height,
        scale_x: draw_width / bg_width,
        scale_y: draw_height / bg_height,
    })
}

/// Image-relative point to canvas point, centering on the canvas when no
/// background has been fitted yet.
pub fn to_canvas(relative: Point, bounds: Option<&FitBounds>, canvas: (f64, f64)) -> Point {
    match bounds {
        Some(b) => b.to_canvas(relative),
        None => Point::new(canvas.0 / 2.0, canvas.1 / 2.0),
    }
}

/// Canvas point to image-relative point, passing the canvas coordinates
/// through unchanged when no background has been fitted yet.
pub fn to_relative(canvas: Point, bounds: Option<&FitBounds>) -> Point {
    match bounds {
        Some(b) => b.to_relative(canvas),
        None => canvas,
    }
}

type FitKey = ((u32, u32), (u32, u32));

/// Memoized [`compute_fit_bounds`], keyed on background and canvas size.
#[derive(Debug, Default)]
pub struct FitCache {
    key: Option<FitKey>,
    bounds: Option<FitBounds>,
}

impl FitCache {
    /// Returns the fit for the given sizes, recomputing only when they changed.
    pub fn get(&mut self, background: (u32, u32), canvas: (u32, u32)) -> Option<FitBounds> {
        let key = (background, canvas);
        if self.key != Some(key) {
            log::debug!(
                "Recomputing fit bounds: background {}x{}, canvas {}x{}",
                background.0,
                background.1,
                canvas.0,
                canvas.1
            );
            self.bounds = compute_fit_bounds(
                background.0 as f64,
                background.1 as f64,
                canvas.0 as f64,
                canvas.1 as f64,
            );
            self.key = Some(key);
        }
        self.bounds
    }

    /// Last computed fit, if any.
    pub fn cached(&self) -> Option<FitBounds> {
        self.bounds
    }

    /// Drops the cached fit (e.g. when the background is removed).
    pub fn invalidate(&mut self) {
        self.key = None;
        self.bounds = None;
    }
}

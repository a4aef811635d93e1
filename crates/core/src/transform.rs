//! The overlay's pose and its persisted, image-relative forms.
//!
//! [`Transform`] lives in canvas space and is what gestures mutate.
//! [`RelativePose`] and [`Placement`] are the canvas-independent forms handed
//! to callers and to the downstream mockup renderer.

use crate::geometry::{normalize_degrees, Point};
use crate::mapping::FitBounds;
use serde::{Deserialize, Serialize};

/// Smallest scale multiplier a gesture or setter can produce.
pub const MIN_SCALE: f64 = 0.1;
/// Largest scale multiplier a gesture or setter can produce.
pub const MAX_SCALE: f64 = 3.0;

/// Pose of the overlay in canvas space.
///
/// `x`/`y` is the overlay center. `rotation` accumulates freely across
/// gestures; use [`Transform::normalized_rotation`] when drawing or storing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub natural_width: f64,
    pub natural_height: f64,
}

impl Transform {
    /// Default pose: centered on the canvas, unscaled, unrotated, opaque.
    pub fn centered(canvas: (f64, f64), natural: (f64, f64)) -> Self {
        Self {
            x: canvas.0 / 2.0,
            y: canvas.1 / 2.0,
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            natural_width: natural.0,
            natural_height: natural.1,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Drawn size of the overlay (natural size times scale).
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.natural_width * self.scale, self.natural_height * self.scale)
    }

    pub fn normalized_rotation(&self) -> f64 {
        normalize_degrees(self.rotation)
    }

    /// Merges `update` into this pose and clamps the result.
    ///
    /// Scale is clamped to [`MIN_SCALE`, `MAX_SCALE`] and opacity to [0, 1].
    /// Rotation passes through. Non-finite inputs are ignored.
    pub fn apply(self, update: TransformUpdate) -> Self {
        Self {
            x: merge(self.x, update.x),
            y: merge(self.y, update.y),
            scale: merge(self.scale, update.scale).clamp(MIN_SCALE, MAX_SCALE),
            rotation: merge(self.rotation, update.rotation),
            opacity: merge(self.opacity, update.opacity).clamp(0.0, 1.0),
            natural_width: self.natural_width,
            natural_height: self.natural_height,
        }
    }
}

fn merge(previous: f64, next: Option<f64>) -> f64 {
    match next {
        Some(value) if value.is_finite() => value,
        _ => previous,
    }
}

/// A partial pose; `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
}

impl TransformUpdate {
    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Default::default()
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Default::default()
        }
    }
}

/// Owner of the current overlay [`Transform`].
#[derive(Clone, Debug)]
pub struct TransformModel {
    current: Transform,
    canvas: (f64, f64),
}

impl TransformModel {
    pub fn new(canvas: (f64, f64)) -> Self {
        Self {
            current: Transform::centered(canvas, (0.0, 0.0)),
            canvas,
        }
    }

    pub fn current(&self) -> Transform {
        self.current
    }

    /// Applies a clamped partial update and returns the new pose.
    pub fn update(&mut self, update: TransformUpdate) -> Transform {
        self.current = self.current.apply(update);
        self.current
    }

    /// Returns to the default pose, keeping the overlay's natural size.
    pub fn reset(&mut self) -> Transform {
        let natural = (self.current.natural_width, self.current.natural_height);
        self.current = Transform::centered(self.canvas, natural);
        self.current
    }

    /// Records the decoded overlay's pixel size.
    pub fn set_natural_size(&mut self, width: f64, height: f64) -> Transform {
        self.current.natural_width = width;
        self.current.natural_height = height;
        self.current
    }

    pub fn set_canvas_size(&mut self, canvas: (f64, f64)) {
        self.canvas = canvas;
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.canvas
    }
}

/// Overlay pose in background-image pixels.
///
/// `x`/`y` is the overlay center inside the original background image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativePose {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub opacity: f64,
}

impl RelativePose {
    /// Converts a canvas pose through `bounds`. Rotation is stored normalized.
    pub fn from_transform(transform: &Transform, bounds: &FitBounds) -> Self {
        let center = bounds.to_relative(transform.center());
        Self {
            x: center.x,
            y: center.y,
            scale: transform.scale,
            rotation: transform.normalized_rotation(),
            opacity: transform.opacity,
        }
    }

    /// The update that places the overlay at this pose on the given fit.
    pub fn to_update(&self, bounds: &FitBounds) -> TransformUpdate {
        let center = bounds.to_canvas(Point::new(self.x, self.y));
        TransformUpdate {
            x: Some(center.x),
            y: Some(center.y),
            scale: Some(self.scale),
            rotation: Some(self.rotation),
            opacity: Some(self.opacity),
        }
    }
}

/// Persisted logo placement, in the shape the mockup service stores it.
///
/// The marking zone is the overlay's unrotated box in background pixels
/// (top-left origin); rotation is about the zone's center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub marking_zone_x: f64,
    pub marking_zone_y: f64,
    pub marking_zone_w: f64,
    pub marking_zone_h: f64,
    pub logo_scale: f64,
    pub logo_rotation: f64,
    #[serde(default = "full_opacity")]
    pub logo_opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

impl Placement {
    pub fn from_transform(transform: &Transform, bounds: &FitBounds) -> Self {
        let pose = RelativePose::from_transform(transform, bounds);
        let (w, h) = transform.scaled_size();
        let zone_w = w / bounds.scale_x;
        let zone_h = h / bounds.scale_y;
        Self {
            marking_zone_x: pose.x - zone_w / 2.0,
            marking_zone_y: pose.y - zone_h / 2.0,
            marking_zone_w: zone_w,
            marking_zone_h: zone_h,
            logo_scale: pose.scale,
            logo_rotation: pose.rotation,
            logo_opacity: pose.opacity,
        }
    }

    /// Center of the marking zone as an initial pose.
    pub fn to_relative_pose(&self) -> RelativePose {
        RelativePose {
            x: self.marking_zone_x + self.marking_zone_w / 2.0,
            y: self.marking_zone_y + self.marking_zone_h / 2.0,
            scale: self.logo_scale,
            rotation: self.logo_rotation,
            opacity: self.logo_opacity,
        }
    }
}

//! Selection handle geometry and hit-testing.
//!
//! Handles are laid out around the overlay's unrotated box and then rotated
//! about the overlay center by the current rotation, so both the hit-test and
//! the drawing follow the rotated overlay. The same hit-test serves
//! pointer-down and hover feedback.

use super::state::{Corner, CursorHint, HitTarget};
use crate::geometry::{distance, normalize_degrees, rotate_point, Point};
use crate::transform::Transform;

/// Sizes of the selection decorations, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleStyle {
    /// Side of a corner square.
    pub handle_size: f64,
    pub corner_hit_radius: f64,
    pub rotate_hit_radius: f64,
    /// Distance of the rotation handle above the top edge.
    pub rotate_offset: f64,
    /// Drawn radius of the rotation handle.
    pub rotate_radius: f64,
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self {
            handle_size: 10.0,
            corner_hit_radius: 10.0,
            rotate_hit_radius: 12.0,
            rotate_offset: 30.0,
            rotate_radius: 6.0,
        }
    }
}

/// Handle positions for one overlay pose.
///
/// `local_*` points are offsets from the overlay center in its unrotated
/// frame (what the renderer draws under the overlay's rotation); the other
/// points are the rotated canvas positions used for hit-testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleLayout {
    pub center: Point,
    pub half_width: f64,
    pub half_height: f64,
    pub rotation: f64,
    pub local_corners: [Point; 4],
    pub corners: [Point; 4],
    pub local_rotate_handle: Point,
    pub rotate_handle: Point,
    /// Midpoint of the top edge, where the rotation line starts.
    pub local_anchor: Point,
    pub anchor: Point,
    /// Rotated corners of the bounding box itself.
    pub outline: [Point; 4],
}

impl HandleLayout {
    pub fn compute(transform: &Transform, style: &HandleStyle) -> Self {
        let center = transform.center();
        let (width, height) = transform.scaled_size();
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        let rotation = transform.normalized_rotation();
        let pad = style.handle_size / 2.0;

        let to_canvas = |local: Point| rotate_point(center + local, center, rotation);

        let box_corner = |corner: Corner| {
            let (sx, sy) = corner.sign();
            Point::new(sx * half_width, sy * half_height)
        };
        let local_corners = Corner::ALL.map(|corner| {
            let (sx, sy) = corner.sign();
            Point::new(sx * (half_width + pad), sy * (half_height + pad))
        });
        let local_rotate_handle = Point::new(0.0, -(half_height + style.rotate_offset));
        let local_anchor = Point::new(0.0, -half_height);

        Self {
            center,
            half_width,
            half_height,
            rotation,
            local_corners,
            corners: local_corners.map(to_canvas),
            local_rotate_handle,
            rotate_handle: to_canvas(local_rotate_handle),
            local_anchor,
            anchor: to_canvas(local_anchor),
            outline: Corner::ALL.map(|corner| to_canvas(box_corner(corner))),
        }
    }

    /// Whether `point` lies on the overlay body.
    ///
    /// The point is taken into the overlay's unrotated frame and compared
    /// against the axis-aligned box.
    pub fn contains(&self, point: Point) -> bool {
        let local = rotate_point(point, self.center, -self.rotation) - self.center;
        local.x.abs() <= self.half_width && local.y.abs() <= self.half_height
    }

    /// Resolves what `point` hits: rotation handle, then corners, then body.
    pub fn hit_test(&self, point: Point, style: &HandleStyle) -> Option<HitTarget> {
        if distance(point, self.rotate_handle) <= style.rotate_hit_radius {
            return Some(HitTarget::RotateHandle);
        }
        for (corner, handle) in Corner::ALL.iter().zip(self.corners.iter()) {
            if distance(point, *handle) <= style.corner_hit_radius {
                return Some(HitTarget::Corner(*corner));
            }
        }
        if self.contains(point) {
            return Some(HitTarget::Body);
        }
        None
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners[corner_index(corner)]
    }
}

fn corner_index(corner: Corner) -> usize {
    match corner {
        Corner::TopLeft => 0,
        Corner::TopRight => 1,
        Corner::BottomRight => 2,
        Corner::BottomLeft => 3,
    }
}

/// Cursor for a hit target; resize cursors follow the overlay rotation.
pub fn cursor_for(target: Option<HitTarget>, rotation: f64) -> CursorHint {
    match target {
        None => CursorHint::Default,
        Some(HitTarget::Body) => CursorHint::Move,
        Some(HitTarget::RotateHandle) => CursorHint::Rotate,
        Some(HitTarget::Corner(corner)) => {
            let (sx, sy) = corner.sign();
            let direction = normalize_degrees(sy.atan2(sx).to_degrees() + rotation) % 180.0;
            if direction < 90.0 {
                CursorHint::ResizeNwSe
            } else {
                CursorHint::ResizeNeSw
            }
        }
    }
}

type LayoutKey = [f64; 5];

/// Memoized [`HandleLayout::compute`], keyed on center, scaled size and rotation.
#[derive(Debug, Default)]
pub struct LayoutCache {
    key: Option<LayoutKey>,
    layout: Option<HandleLayout>,
}

impl LayoutCache {
    pub fn get(&mut self, transform: &Transform, style: &HandleStyle) -> HandleLayout {
        let (width, height) = transform.scaled_size();
        let key = [
            transform.x,
            transform.y,
            width,
            height,
            transform.normalized_rotation(),
        ];
        match self.layout {
            Some(layout) if self.key == Some(key) => layout,
            _ => {
                let layout = HandleLayout::compute(transform, style);
                self.key = Some(key);
                self.layout = Some(layout);
                layout
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.layout = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(rotation: f64) -> Transform {
        Transform {
            rotation,
            ..Transform::centered((800.0, 600.0), (100.0, 60.0))
        }
    }

    #[test]
    fn test_unrotated_layout() {
        let style = HandleStyle::default();
        let layout = HandleLayout::compute(&transform(0.0), &style);
        assert_eq!(layout.outline[0], Point::new(350.0, 270.0));
        assert_eq!(layout.corner(Corner::TopLeft), Point::new(345.0, 265.0));
        assert_eq!(layout.corner(Corner::BottomRight), Point::new(455.0, 335.0));
        assert_eq!(layout.rotate_handle, Point::new(400.0, 240.0));
        assert_eq!(layout.anchor, Point::new(400.0, 270.0));
    }

    #[test]
    fn test_hit_priority() {
        let style = HandleStyle::default();
        let layout = HandleLayout::compute(&transform(0.0), &style);
        assert_eq!(
            layout.hit_test(Point::new(400.0, 242.0), &style),
            Some(HitTarget::RotateHandle)
        );
        assert_eq!(
            layout.hit_test(Point::new(452.0, 333.0), &style),
            Some(HitTarget::Corner(Corner::BottomRight))
        );
        assert_eq!(layout.hit_test(Point::new(400.0, 300.0), &style), Some(HitTarget::Body));
        assert_eq!(layout.hit_test(Point::new(600.0, 300.0), &style), None);
    }

    #[test]
    fn test_corner_handles_follow_rotation() {
        let style = HandleStyle::default();
        let t = transform(90.0);
        let layout = HandleLayout::compute(&t, &style);

        // Unrotated top-right handle sits at offset (55, -35) from the center
        let expected = rotate_point(
            Point::new(455.0, 265.0),
            t.center(),
            90.0,
        );
        assert_eq!(
            layout.hit_test(expected, &style),
            Some(HitTarget::Corner(Corner::TopRight))
        );
        // The unrotated position is no longer a handle
        assert_ne!(
            layout.hit_test(Point::new(455.0, 265.0), &style),
            Some(HitTarget::Corner(Corner::TopRight))
        );
    }

    #[test]
    fn test_body_uses_local_frame() {
        let style = HandleStyle::default();
        let layout = HandleLayout::compute(&transform(90.0), &style);
        // Rotated a quarter turn, the 100x60 box spans 60 wide and 100 tall
        assert!(layout.contains(Point::new(400.0, 345.0)));
        assert!(!layout.contains(Point::new(445.0, 300.0)));
    }

    #[test]
    fn test_cursor_follows_rotation() {
        let tl = Some(HitTarget::Corner(Corner::TopLeft));
        assert_eq!(cursor_for(tl, 0.0), CursorHint::ResizeNwSe);
        assert_eq!(cursor_for(tl, 90.0), CursorHint::ResizeNeSw);
        assert_eq!(cursor_for(tl, 180.0), CursorHint::ResizeNwSe);
        assert_eq!(cursor_for(Some(HitTarget::Body), 30.0), CursorHint::Move);
        assert_eq!(cursor_for(None, 30.0), CursorHint::Default);
    }

    #[test]
    fn test_layout_cache() {
        let style = HandleStyle::default();
        let mut cache = LayoutCache::default();
        let a = cache.get(&transform(10.0), &style);
        assert_eq!(cache.get(&transform(370.0), &style), a);
        let b = cache.get(&transform(20.0), &style);
        assert_ne!(a, b);
    }
}

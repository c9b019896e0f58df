//! Placement arithmetic for head boxes and overlay regions.
//!
//! Everything here is pure integer/float math so the geometry can be tested
//! without touching pixel data. Fractional results truncate toward zero,
//! matching the integer arithmetic the placement constants were tuned with.

use crate::face_locator::FaceBounds;

/// Horizontal bias applied to overlay placements, as a fraction of the
/// factor-scaled head width. Shifts the overlay slightly left of center.
const X_BIAS: f64 = 0.1;

/// A detector-reported face box expanded to cover the full head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadBox {
    /// X coordinate of the top-left corner (pixels, may be negative).
    pub x: i64,
    /// Y coordinate of the top-left corner (pixels, may be negative).
    pub y: i64,
    /// Width in pixels. Non-positive boxes are skipped by the transforms.
    pub width: i64,
    /// Height in pixels. Non-positive boxes are skipped by the transforms.
    pub height: i64,
}

impl HeadBox {
    /// Head box from explicit coordinates.
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Expand a raw detection by `head_scale`.
    ///
    /// Only the extent grows; the top-left corner stays where the detector
    /// put it, so the expansion spills down and to the right.
    pub fn from_bounds(bounds: &FaceBounds, head_scale: f64) -> Self {
        Self {
            x: bounds.x as i64,
            y: bounds.y as i64,
            width: (bounds.width * head_scale) as i64,
            height: (bounds.height * head_scale) as i64,
        }
    }

    /// Intersect with an image of the given dimensions.
    ///
    /// Returns `None` when the box has no positive-area overlap with the
    /// image, including degenerate boxes with non-positive extent.
    pub fn clip(&self, image_width: u32, image_height: u32) -> Option<Region> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(image_width as i64);
        let y1 = self.y.saturating_add(self.height).min(image_height as i64);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Region {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// An axis-aligned region known to lie fully inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X coordinate of the top-left corner.
    pub x: u32,
    /// Y coordinate of the top-left corner.
    pub y: u32,
    /// Width in pixels (always positive).
    pub width: u32,
    /// Height in pixels (always positive).
    pub height: u32,
}

/// Per-effect placement parameters for the region compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Linear scale from head width to overlay width.
    pub resize_factor: f64,
    /// Clamp the center-relative corner to ≥ 0 before applying the bias.
    /// The final x can still go negative and is handled by clipping.
    pub clamp_center: bool,
    /// Fraction of the factor-scaled head *width* subtracted from y,
    /// raising the overlay above the head center.
    pub y_bias_width_factor: f64,
    /// Clamp the final placement corner to ≥ 0 before clipping.
    pub clamp_origin: bool,
}

/// Where a resized overlay lands relative to the base image. The corner may
/// be negative or exceed the image; [`clip_placement`] resolves that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRect {
    /// X coordinate of the top-left corner (may be negative).
    pub x: i64,
    /// Y coordinate of the top-left corner (may be negative).
    pub y: i64,
    /// Target overlay width in pixels.
    pub width: u32,
    /// Target overlay height in pixels (preserves the asset aspect ratio).
    pub height: u32,
}

/// A placement clipped against image bounds: the destination region in the
/// base image plus the matching offset into the resized overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedPlacement {
    /// Destination region in the base image.
    pub dst: Region,
    /// Horizontal offset into the resized overlay.
    pub src_x: u32,
    /// Vertical offset into the resized overlay.
    pub src_y: u32,
}

/// Compute where an overlay with aspect ratio `asset_aspect` (width over
/// height) should land for `head` under `style`.
///
/// The overlay is centered on the head, scaled to `resize_factor` times the
/// head width with the asset aspect preserved, and nudged left by
/// [`X_BIAS`] of the scaled width. Returns `None` when the computed
/// dimensions are non-positive (degenerate head or asset geometry).
pub fn overlay_placement(
    head: &HeadBox,
    style: &OverlayStyle,
    asset_aspect: f64,
) -> Option<PlacementRect> {
    let f = style.resize_factor;
    let w = head.width as f64;
    let h = head.height as f64;

    let new_width = (f * w) as i64;
    if asset_aspect <= 0.0 || new_width <= 0 {
        return None;
    }
    let new_height = (new_width as f64 / asset_aspect) as i64;
    if new_height <= 0 {
        return None;
    }

    let center_x = head.x as f64 + w / 2.0;
    let center_y = head.y as f64 + h / 2.0;

    let mut corner_x = center_x - 0.5 * f * w;
    let mut corner_y = center_y - 0.5 * f * h;
    if style.clamp_center {
        corner_x = corner_x.max(0.0);
        corner_y = corner_y.max(0.0);
    }

    let mut x = corner_x as i64 - (X_BIAS * f * w) as i64;
    let mut y = corner_y as i64 - (style.y_bias_width_factor * f * w) as i64;
    if style.clamp_origin {
        x = x.max(0);
        y = y.max(0);
    }

    Some(PlacementRect {
        x,
        y,
        width: new_width as u32,
        height: new_height as u32,
    })
}

/// Clip a placement against `[0, image_width) × [0, image_height)`.
///
/// Returns `None` when nothing of the placement lands inside the image.
pub fn clip_placement(
    rect: &PlacementRect,
    image_width: u32,
    image_height: u32,
) -> Option<ClippedPlacement> {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = (rect.x + rect.width as i64).min(image_width as i64);
    let y1 = (rect.y + rect.height as i64).min(image_height as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(ClippedPlacement {
        dst: Region {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        },
        src_x: (x0 - rect.x) as u32,
        src_y: (y0 - rect.y) as u32,
    })
}

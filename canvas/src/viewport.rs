//! Coordinate spaces and the conversions between them.
//!
//! Three spaces are in play:
//!
//! - **client**: raw pointer coordinates from the browser event.
//! - **display** ([`DisplayPoint`]): CSS pixels relative to the canvas
//!   element's top-left corner.
//! - **normalized** ([`NormPoint`]): fractions of the canvas width/height in
//!   `[0, 1]`, independent of resolution.
//!
//! Committed rectangles, circles and triangles are stored normalized so they
//! stay anchored to the same blueprint location after a resize or DPR change.
//! Only the render pass projects them back to display pixels. State that
//! has to stay in display pixels (in-progress gestures, polygons, calibration
//! points) is moved by a [`Rescale`] when the canvas size changes.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::ASPECT_TOLERANCE;
use crate::geom::{XY, clamp_unit};

/// A point in display (CSS pixel) space, relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl XY for DisplayPoint {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
}

/// A point in normalized `[0, 1] × [0, 1]` canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    /// Build a normalized point, clamping both axes into `[0, 1]`.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x: clamp_unit(x), y: clamp_unit(y) }
    }
}

impl XY for NormPoint {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
}

/// A point in device (backing-store) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePoint {
    pub x: f64,
    pub y: f64,
}

/// Circle radius expressed as a fraction of `min(width, height)`.
///
/// Using the shorter side keeps circles round under non-uniform resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRadius(pub f64);

/// The canvas element's bounding rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for DisplayRect {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 1.0, height: 1.0 }
    }
}

impl DisplayRect {
    /// A rect anchored at the client origin.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { left: 0.0, top: 0.0, width, height }
    }

    /// Convert client coordinates into a canvas-local display point.
    #[must_use]
    pub fn local(&self, client_x: f64, client_y: f64) -> DisplayPoint {
        DisplayPoint::new(client_x - self.left, client_y - self.top)
    }

    /// Width floored to one pixel so zero-sized containers never divide by zero.
    #[must_use]
    pub fn safe_width(&self) -> f64 {
        floor_to_one(self.width)
    }

    /// Height floored to one pixel.
    #[must_use]
    pub fn safe_height(&self) -> f64 {
        floor_to_one(self.height)
    }

    /// The shorter side, floored to one pixel.
    #[must_use]
    pub fn short_side(&self) -> f64 {
        self.safe_width().min(self.safe_height())
    }
}

fn floor_to_one(v: f64) -> f64 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

/// Convert a display point to normalized space, clamping each axis to `[0, 1]`.
#[must_use]
pub fn to_normalized(point: DisplayPoint, rect: &DisplayRect) -> NormPoint {
    NormPoint::new(point.x / rect.safe_width(), point.y / rect.safe_height())
}

/// Project a normalized point back to display pixels. Not clamped.
#[must_use]
pub fn to_display(point: NormPoint, rect: &DisplayRect) -> DisplayPoint {
    DisplayPoint::new(point.x * rect.safe_width(), point.y * rect.safe_height())
}

/// Convert a pixel radius into a fraction of the canvas's shorter side.
#[must_use]
pub fn radius_to_normalized(radius_px: f64, rect: &DisplayRect) -> NormRadius {
    NormRadius(radius_px.abs() / rect.short_side())
}

/// Project a normalized radius back to display pixels.
#[must_use]
pub fn radius_to_display(radius: NormRadius, rect: &DisplayRect) -> f64 {
    radius.0 * rect.short_side()
}

/// Canvas dimensions plus device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub rect: DisplayRect,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { rect: DisplayRect::default(), dpr: 1.0 }
    }
}

impl Viewport {
    /// Build a viewport, sanitizing the device pixel ratio.
    #[must_use]
    pub fn new(rect: DisplayRect, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { rect, dpr }
    }

    /// Scale a display point into backing-store pixels.
    #[must_use]
    pub fn to_device(&self, point: DisplayPoint) -> DevicePoint {
        DevicePoint { x: point.x * self.dpr, y: point.y * self.dpr }
    }

    /// Inverse of [`Viewport::to_device`].
    #[must_use]
    pub fn from_device(&self, point: DevicePoint) -> DisplayPoint {
        DisplayPoint::new(point.x / self.dpr, point.y / self.dpr)
    }

    /// Backing-store size in whole device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.rect.safe_width() * self.dpr).round() as u32,
            (self.rect.safe_height() * self.dpr).round() as u32,
        )
    }
}

/// Size ratio between the canvas before and after a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub sx: f64,
    pub sy: f64,
    /// Ratio of the shorter sides, for radii.
    pub short: f64,
}

impl Rescale {
    /// The ratio from `from` to `to`, or `None` when the size is unchanged.
    #[must_use]
    pub fn between(from: &DisplayRect, to: &DisplayRect) -> Option<Self> {
        let sx = to.safe_width() / from.safe_width();
        let sy = to.safe_height() / from.safe_height();
        if (sx - 1.0).abs() < f64::EPSILON && (sy - 1.0).abs() < f64::EPSILON {
            return None;
        }
        Some(Self { sx, sy, short: to.short_side() / from.short_side() })
    }

    /// Move a display point so it stays over the same spot of the image.
    #[must_use]
    pub fn point(&self, point: DisplayPoint) -> DisplayPoint {
        DisplayPoint::new(point.x * self.sx, point.y * self.sy)
    }

    #[must_use]
    pub fn radius(&self, radius_px: f64) -> f64 {
        radius_px * self.short
    }

    /// Whether pixel distances scale the same along both axes, so a
    /// units-per-pixel factor survives the resize.
    #[must_use]
    pub fn keeps_aspect(&self) -> bool {
        (self.sx - self.sy).abs() <= ASPECT_TOLERANCE * self.sx.max(self.sy)
    }
}

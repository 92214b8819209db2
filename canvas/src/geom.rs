//! Pure geometry helpers: distances, polygon area, closed-form shape areas.
//!
//! Everything here is coordinate-space agnostic. Functions that take points
//! accept anything implementing [`XY`], so the same shoelace code runs over
//! display-pixel polygons and normalized vertices alike.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::f64::consts::PI;

/// Read access to a 2D coordinate pair.
pub trait XY: Copy {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

/// Euclidean distance between two points in the same space.
#[must_use]
pub fn distance<P: XY>(a: P, b: P) -> f64 {
    (b.x() - a.x()).hypot(b.y() - a.y())
}

/// Polygon area by the shoelace formula over the cyclic vertex sequence.
///
/// Always non-negative regardless of winding. Fewer than three points, or a
/// degenerate (collinear / duplicate) point set, yields `0.0`.
#[must_use]
pub fn polygon_area<P: XY>(points: &[P]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x() * b.y() - b.x() * a.y();
    }
    twice.abs() / 2.0
}

/// Rectangle area from real-world width and height.
#[must_use]
pub fn rect_area(width: f64, height: f64) -> f64 {
    width.abs() * height.abs()
}

/// Circle area from a real-world radius.
#[must_use]
pub fn circle_area(radius: f64) -> f64 {
    PI * radius * radius
}

/// Triangle area from a real-world base and perpendicular height.
#[must_use]
pub fn triangle_area(base: f64, height: f64) -> f64 {
    0.5 * base * height
}

/// Clamp to `[0, 1]`. NaN collapses to `0.0`.
#[must_use]
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Parse user-entered text as a strictly positive, finite number.
#[must_use]
pub fn parse_positive(text: &str) -> Option<f64> {
    let Ok(value) = text.trim().parse::<f64>() else {
        return None;
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Round to two decimal places for display.
#[must_use]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

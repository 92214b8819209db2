//! Shared numeric constants for the canvas crate.

// ── Gestures ────────────────────────────────────────────────────

/// Drags shorter than this (display pixels) are treated as accidental clicks.
pub const MIN_DRAG_PX: f64 = 6.0;

/// Number of clicks that complete a triangle.
pub const TRIANGLE_VERTICES: usize = 3;

/// Minimum vertex count for a finished polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

// ── Resize ──────────────────────────────────────────────────────

/// Relative difference between the x and y resize ratios still treated as
/// the same aspect ratio. Beyond it the calibration no longer holds.
pub const ASPECT_TOLERANCE: f64 = 0.01;

// ── Rendering ───────────────────────────────────────────────────

/// Radius of vertex and calibration markers, in display pixels.
pub const MARKER_RADIUS_PX: f64 = 4.0;

/// Dash segment length for live previews, in display pixels.
pub const PREVIEW_DASH_PX: f64 = 6.0;

/// Stroke width for committed shapes, in display pixels.
pub const SHAPE_STROKE_PX: f64 = 2.0;

/// Fill used for committed shapes.
pub const SHAPE_FILL: &str = "rgba(37, 99, 235, 0.18)";

/// Stroke used for committed shapes.
pub const SHAPE_STROKE: &str = "#2563EB";

/// Stroke used for previews and in-progress polygons.
pub const PREVIEW_STROKE: &str = "#F59E0B";

/// Stroke used for the calibration reference line.
pub const CALIBRATION_STROKE: &str = "#DC2626";

/// Font for shape labels.
pub const LABEL_FONT: &str = "12px sans-serif";

/// Label text color.
pub const LABEL_COLOR: &str = "#111827";

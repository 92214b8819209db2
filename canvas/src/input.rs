//! Input model: drawing modes, the gesture state machine, and the
//! input request/response contract used to collect real dimensions.
//!
//! `Gesture` is the transient, uncommitted state between pointer events. A
//! finished gesture becomes a [`Draft`] that waits in
//! [`Gesture::AwaitingInput`] until the host answers the matching
//! [`InputRequest`] with an [`InputReply`]. Nothing is committed until then,
//! and a cancelled or invalid reply leaves no trace.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::parse_positive;
use crate::viewport::{DisplayPoint, Rescale};

/// Which drawing mode is active. Modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Drag out a rectangle.
    #[default]
    Rect,
    /// Drag from center to edge.
    Circle,
    /// Click three vertices.
    Triangle,
    /// Click any number of vertices, then finish. Requires calibration.
    Polygon,
    /// Click two reference points a known distance apart.
    Calibrate,
}

impl Mode {
    /// Whether this mode draws by dragging (as opposed to clicking vertices).
    #[must_use]
    pub fn is_drag(self) -> bool {
        matches!(self, Self::Rect | Self::Circle)
    }

    /// Modes that work on the calibrated polygon list.
    #[must_use]
    pub fn is_calibrated_workflow(self) -> bool {
        matches!(self, Self::Polygon | Self::Calibrate)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// A finished gesture awaiting real-world input.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Rect { start: DisplayPoint, end: DisplayPoint },
    Circle { center: DisplayPoint, radius_px: f64 },
    Triangle { vertices: [DisplayPoint; 3] },
    Polygon { points: Vec<DisplayPoint> },
    CalibrationDistance { pixel_distance: f64 },
}

/// Transient pointer state for the active mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Rectangle or circle drag between pointer-down and pointer-up.
    Dragging { anchor: DisplayPoint, current: DisplayPoint },
    /// Vertices clicked so far for a triangle or polygon.
    Collecting { points: Vec<DisplayPoint> },
    /// A finished gesture suspended on an [`InputRequest`].
    AwaitingInput { draft: Draft },
}

impl Gesture {
    /// Vertices accumulated so far (empty unless collecting).
    #[must_use]
    pub fn points(&self) -> &[DisplayPoint] {
        match self {
            Self::Collecting { points } => points,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, Self::AwaitingInput { .. })
    }

    /// Move every captured point along with a canvas resize.
    pub fn rescale(&mut self, by: &Rescale) {
        match self {
            Self::Idle => {}
            Self::Dragging { anchor, current } => {
                *anchor = by.point(*anchor);
                *current = by.point(*current);
            }
            Self::Collecting { points } => rescale_all(points, by),
            Self::AwaitingInput { draft } => draft.rescale(by),
        }
    }
}

impl Draft {
    /// Move the draft's geometry along with a canvas resize.
    ///
    /// The calibration distance is left alone; the calibrator owns the
    /// reference line and the engine copies the new length from it.
    pub fn rescale(&mut self, by: &Rescale) {
        match self {
            Self::Rect { start, end } => {
                *start = by.point(*start);
                *end = by.point(*end);
            }
            Self::Circle { center, radius_px } => {
                *center = by.point(*center);
                *radius_px = by.radius(*radius_px);
            }
            Self::Triangle { vertices } => rescale_all(vertices, by),
            Self::Polygon { points } => rescale_all(points, by),
            Self::CalibrationDistance { .. } => {}
        }
    }
}

pub(crate) fn rescale_all(points: &mut [DisplayPoint], by: &Rescale) {
    for point in points {
        *point = by.point(*point);
    }
}

// =============================================================
// Input request / reply
// =============================================================

/// Field key for the label prompt.
pub const FIELD_LABEL: &str = "label";
/// Field key for rectangle width in feet.
pub const FIELD_WIDTH_FT: &str = "width_ft";
/// Field key for rectangle or triangle height in feet.
pub const FIELD_HEIGHT_FT: &str = "height_ft";
/// Field key for circle radius in feet.
pub const FIELD_RADIUS_FT: &str = "radius_ft";
/// Field key for triangle base in feet.
pub const FIELD_BASE_FT: &str = "base_ft";
/// Field key for the calibration distance.
pub const FIELD_DISTANCE: &str = "distance";

/// What a pending request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPurpose {
    RectDimensions,
    CircleRadius,
    TriangleDimensions,
    PolygonLabel,
    CalibrationDistance,
}

/// One value the host must collect from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputField {
    pub key: &'static str,
    pub prompt: String,
    pub numeric: bool,
}

impl InputField {
    fn text(key: &'static str, prompt: impl Into<String>) -> Self {
        Self { key, prompt: prompt.into(), numeric: false }
    }

    fn number(key: &'static str, prompt: impl Into<String>) -> Self {
        Self { key, prompt: prompt.into(), numeric: true }
    }
}

/// A request for structured input issued when a gesture completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRequest {
    pub purpose: InputPurpose,
    pub title: String,
    pub fields: Vec<InputField>,
}

/// The host's answer to an [`InputRequest`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum InputReply {
    /// Raw text values keyed by [`InputField::key`].
    Submit(HashMap<String, String>),
    /// The user dismissed the prompt.
    Cancel,
}

impl InputReply {
    /// Convenience constructor from `(key, value)` pairs.
    pub fn submit<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Submit(pairs.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect())
    }
}

/// Build the request matching a draft.
#[must_use]
pub fn request_for(draft: &Draft, unit_symbol: &str) -> InputRequest {
    match draft {
        Draft::Rect { .. } => InputRequest {
            purpose: InputPurpose::RectDimensions,
            title: "Rectangle dimensions".to_owned(),
            fields: vec![
                InputField::text(FIELD_LABEL, "Label (e.g. Kitchen)"),
                InputField::number(FIELD_WIDTH_FT, "Width (ft)"),
                InputField::number(FIELD_HEIGHT_FT, "Height (ft)"),
            ],
        },
        Draft::Circle { .. } => InputRequest {
            purpose: InputPurpose::CircleRadius,
            title: "Circle radius".to_owned(),
            fields: vec![
                InputField::text(FIELD_LABEL, "Label"),
                InputField::number(FIELD_RADIUS_FT, "Radius (ft)"),
            ],
        },
        Draft::Triangle { .. } => InputRequest {
            purpose: InputPurpose::TriangleDimensions,
            title: "Triangle dimensions".to_owned(),
            fields: vec![
                InputField::text(FIELD_LABEL, "Label"),
                InputField::number(FIELD_BASE_FT, "Base (ft)"),
                InputField::number(FIELD_HEIGHT_FT, "Height (ft)"),
            ],
        },
        Draft::Polygon { points } => InputRequest {
            purpose: InputPurpose::PolygonLabel,
            title: format!("Room outline ({} points)", points.len()),
            fields: vec![InputField::text(FIELD_LABEL, "Label (optional)")],
        },
        Draft::CalibrationDistance { pixel_distance } => InputRequest {
            purpose: InputPurpose::CalibrationDistance,
            title: format!("Reference line is {pixel_distance:.1}px"),
            fields: vec![InputField::number(FIELD_DISTANCE, format!("Real distance ({unit_symbol})"))],
        },
    }
}

/// Submitted values, with typed accessors.
pub struct FormValues<'a> {
    values: &'a HashMap<String, String>,
}

impl<'a> FormValues<'a> {
    #[must_use]
    pub fn new(values: &'a HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Raw text for `key`, if present.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).map(String::as_str)
    }

    /// Trimmed label, or `None` when missing or blank.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.raw(FIELD_LABEL)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }

    /// A strictly positive number for `key`.
    #[must_use]
    pub fn positive(&self, key: &str) -> Option<f64> {
        self.raw(key).and_then(parse_positive)
    }
}

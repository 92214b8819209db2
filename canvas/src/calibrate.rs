//! Two-point scale calibration.
//!
//! The user clicks two points on the blueprint a known real distance apart.
//! Their pixel distance and the entered real distance give a
//! units-per-pixel factor, which the polygon mode multiplies (squared) into
//! pixel areas.
//!
//! ```text
//! Idle → AwaitingFirstPoint → AwaitingSecondPoint → AwaitingDistance → Calibrated
//!   ↑            (cancel / invalid distance / unit change)             │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A factor computed under one unit is meaningless under another, so
//! changing the unit always discards the calibration. The reference points
//! are display pixels: a resize moves them with the image and the factor is
//! recomputed from the moved line. A resize that changes the aspect ratio
//! stretches the image unevenly and discards the calibration as well.

#[cfg(test)]
#[path = "calibrate_test.rs"]
mod calibrate_test;

use serde::{Deserialize, Serialize};

use crate::geom::{distance, parse_positive};
use crate::viewport::{DisplayPoint, Rescale};

/// Linear unit the real distance was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "cm")]
    Centimeters,
}

impl Unit {
    /// Short symbol used in labels (`ft`, `in`, `m`, `cm`).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Feet => "ft",
            Self::Inches => "in",
            Self::Meters => "m",
            Self::Centimeters => "cm",
        }
    }

    /// Parse a unit symbol as sent by the host's unit selector.
    #[must_use]
    pub fn from_symbol(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ft" => Some(Self::Feet),
            "in" => Some(Self::Inches),
            "m" => Some(Self::Meters),
            "cm" => Some(Self::Centimeters),
            _ => None,
        }
    }
}

/// A completed calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleCalibration {
    pub first: DisplayPoint,
    pub second: DisplayPoint,
    pub pixel_distance: f64,
    pub real_distance: f64,
    pub unit: Unit,
    pub units_per_pixel: f64,
}

impl ScaleCalibration {
    /// Convert a pixel² area into unit² using this calibration.
    #[must_use]
    pub fn area_from_px2(&self, area_px2: f64) -> f64 {
        area_px2 * self.units_per_pixel * self.units_per_pixel
    }
}

/// Calibration progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationState {
    /// Not calibrating and no calibration held.
    #[default]
    Idle,
    /// Waiting for the first reference click.
    AwaitingFirstPoint,
    /// First point placed; waiting for the second.
    AwaitingSecondPoint { first: DisplayPoint },
    /// Both points placed; the host has been asked for the real distance.
    AwaitingDistance { first: DisplayPoint, second: DisplayPoint, pixel_distance: f64 },
    /// A usable units-per-pixel factor is available.
    Calibrated(ScaleCalibration),
}

/// Reasons a calibration attempt is rejected.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("calibration points must be apart; click two distinct points")]
    ZeroPixelDistance,
    #[error("enter a positive real distance to calibrate")]
    InvalidDistance,
    #[error("no calibration in progress")]
    NotAwaitingDistance,
}

/// Outcome of a calibration click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Click ignored because calibration was not started.
    Ignored,
    /// First reference point recorded.
    FirstPlaced,
    /// Second point recorded; the host must now supply the real distance.
    DistanceNeeded { pixel_distance: f64 },
}

/// Owns calibration state and the selected unit.
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    state: CalibrationState,
    unit: Unit,
}

impl Calibrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The active calibration, if any.
    #[must_use]
    pub fn calibration(&self) -> Option<&ScaleCalibration> {
        match &self.state {
            CalibrationState::Calibrated(cal) => Some(cal),
            _ => None,
        }
    }

    /// Units per display pixel, only while calibrated.
    #[must_use]
    pub fn units_per_pixel(&self) -> Option<f64> {
        self.calibration().map(|c| c.units_per_pixel)
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibration().is_some()
    }

    /// Whether a calibration is in progress (points being placed or distance pending).
    #[must_use]
    pub fn in_progress(&self) -> bool {
        matches!(
            self.state,
            CalibrationState::AwaitingFirstPoint
                | CalibrationState::AwaitingSecondPoint { .. }
                | CalibrationState::AwaitingDistance { .. }
        )
    }

    /// Start a new calibration, discarding any existing one.
    pub fn begin(&mut self) {
        self.state = CalibrationState::AwaitingFirstPoint;
    }

    /// Record a reference click.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::ZeroPixelDistance`] when the second click
    /// lands on the first; the attempt is discarded and the state returns to
    /// idle.
    pub fn click(&mut self, point: DisplayPoint) -> Result<ClickOutcome, CalibrationError> {
        match self.state {
            CalibrationState::AwaitingFirstPoint => {
                self.state = CalibrationState::AwaitingSecondPoint { first: point };
                Ok(ClickOutcome::FirstPlaced)
            }
            CalibrationState::AwaitingSecondPoint { first } => {
                let pixel_distance = distance(first, point);
                if pixel_distance <= 0.0 || !pixel_distance.is_finite() {
                    self.state = CalibrationState::Idle;
                    return Err(CalibrationError::ZeroPixelDistance);
                }
                self.state = CalibrationState::AwaitingDistance { first, second: point, pixel_distance };
                Ok(ClickOutcome::DistanceNeeded { pixel_distance })
            }
            _ => Ok(ClickOutcome::Ignored),
        }
    }

    /// Resolve a pending distance request with the user's raw input.
    ///
    /// `None` means the user cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidDistance`] for missing, non-numeric
    /// or non-positive input (both points are discarded), or
    /// [`CalibrationError::NotAwaitingDistance`] when no request is pending.
    pub fn supply_distance(&mut self, raw: Option<&str>) -> Result<ScaleCalibration, CalibrationError> {
        let CalibrationState::AwaitingDistance { first, second, pixel_distance } = self.state else {
            return Err(CalibrationError::NotAwaitingDistance);
        };
        let Some(real_distance) = raw.and_then(parse_positive) else {
            self.state = CalibrationState::Idle;
            return Err(CalibrationError::InvalidDistance);
        };
        let cal = ScaleCalibration {
            first,
            second,
            pixel_distance,
            real_distance,
            unit: self.unit,
            units_per_pixel: real_distance / pixel_distance,
        };
        self.state = CalibrationState::Calibrated(cal);
        Ok(cal)
    }

    /// Abandon an in-progress calibration. A completed calibration is kept.
    pub fn cancel(&mut self) {
        if self.in_progress() {
            self.state = CalibrationState::Idle;
        }
    }

    /// Change the unit. Returns `true` if a calibration (or attempt) was discarded.
    pub fn set_unit(&mut self, unit: Unit) -> bool {
        if unit == self.unit {
            return false;
        }
        self.unit = unit;
        let had_state = self.state != CalibrationState::Idle;
        self.state = CalibrationState::Idle;
        had_state
    }

    /// Follow a canvas resize.
    ///
    /// Returns `false` when the aspect ratio changed and a placed point or
    /// calibration had to be discarded.
    pub fn rescale(&mut self, by: &Rescale) -> bool {
        if matches!(self.state, CalibrationState::Idle | CalibrationState::AwaitingFirstPoint) {
            return true;
        }
        if !by.keeps_aspect() {
            self.state = CalibrationState::Idle;
            return false;
        }
        self.state = match self.state {
            CalibrationState::AwaitingSecondPoint { first } => {
                CalibrationState::AwaitingSecondPoint { first: by.point(first) }
            }
            CalibrationState::AwaitingDistance { first, second, .. } => {
                let (first, second) = (by.point(first), by.point(second));
                CalibrationState::AwaitingDistance { first, second, pixel_distance: distance(first, second) }
            }
            CalibrationState::Calibrated(cal) => {
                let (first, second) = (by.point(cal.first), by.point(cal.second));
                let pixel_distance = distance(first, second);
                CalibrationState::Calibrated(ScaleCalibration {
                    first,
                    second,
                    pixel_distance,
                    units_per_pixel: cal.real_distance / pixel_distance,
                    ..cal
                })
            }
            other => other,
        };
        true
    }

    /// Drop everything back to idle.
    pub fn reset(&mut self) {
        self.state = CalibrationState::Idle;
    }
}

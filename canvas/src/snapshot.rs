//! Read-only export of the current estimate for the chat assistant.
//!
//! The snapshot carries only human-meaningful quantities: labels, kinds,
//! areas and the dimensions the user typed. Pixel and normalized geometry
//! never leave the engine.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};

use crate::calibrate::{ScaleCalibration, Unit};
use crate::geom::round2;
use crate::selection::{PolygonLayer, Selection, SelectionManager, Shape, ShapeKind};

/// The snapshot sent alongside a chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub total_sq_ft: f64,
    pub selections_count: usize,
    pub selections: Vec<SnapshotEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibrated: Option<CalibratedSnapshot>,
}

/// One committed selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub area_sq_ft: f64,
    pub real: RealMeasurement,
}

/// The real dimensions entered for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RealMeasurement {
    #[serde(rename_all = "camelCase")]
    Rect { width_ft: f64, height_ft: f64 },
    #[serde(rename_all = "camelCase")]
    Circle { radius_ft: f64 },
    #[serde(rename_all = "camelCase")]
    Triangle { base_ft: f64, height_ft: f64 },
}

impl From<&Shape> for RealMeasurement {
    fn from(shape: &Shape) -> Self {
        match *shape {
            Shape::Rect { width_ft, height_ft, .. } => Self::Rect { width_ft, height_ft },
            Shape::Circle { radius_ft, .. } => Self::Circle { radius_ft },
            Shape::Triangle { base_ft, height_ft, .. } => Self::Triangle { base_ft, height_ft },
        }
    }
}

/// Polygon totals from the calibrated mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibratedSnapshot {
    pub unit: Unit,
    pub units_per_pixel: f64,
    pub polygons: Vec<PolygonEntry>,
    pub total_area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonEntry {
    pub label: String,
    pub area: f64,
}

fn entry(selection: &Selection) -> SnapshotEntry {
    SnapshotEntry {
        label: selection.label.clone(),
        kind: selection.kind(),
        area_sq_ft: round2(selection.area_sq_ft),
        real: RealMeasurement::from(&selection.shape),
    }
}

/// Snapshot of the manual-dimension selections only.
#[must_use]
pub fn from_selections(selections: &SelectionManager) -> Snapshot {
    Snapshot {
        total_sq_ft: round2(selections.aggregate()),
        selections_count: selections.len(),
        selections: selections.iter().map(entry).collect(),
        calibrated: None,
    }
}

/// Snapshot including calibrated polygons when a calibration exists.
///
/// Without a calibration the polygon section is omitted rather than
/// reporting areas computed under a stale scale.
#[must_use]
pub fn build(
    selections: &SelectionManager,
    polygons: &PolygonLayer,
    calibration: Option<&ScaleCalibration>,
) -> Snapshot {
    let mut snapshot = from_selections(selections);
    snapshot.calibrated = calibration.map(|cal| CalibratedSnapshot {
        unit: cal.unit,
        units_per_pixel: cal.units_per_pixel,
        polygons: polygons
            .iter()
            .map(|p| PolygonEntry { label: p.label.clone(), area: round2(cal.area_from_px2(p.area_px2())) })
            .collect(),
        total_area: round2(cal.area_from_px2(polygons.total_area_px2())),
    });
    snapshot
}

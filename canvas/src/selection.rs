//! Committed measurements and their aggregate totals.
//!
//! Two independent lists live here, one per measuring mode:
//!
//! - [`SelectionManager`]: rectangles, circles and triangles whose area comes
//!   from real dimensions the user typed in. The drawn geometry only places
//!   the shape on the blueprint; it is never used for area.
//! - [`PolygonLayer`]: free-form outlines traced in calibrated mode, whose
//!   area is the pixel area scaled by the current calibration.
//!
//! Totals are recomputed eagerly on every mutation. Lists are human-sized,
//! so a full O(n) pass is all that is needed.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calibrate::{ScaleCalibration, Unit};
use crate::consts::MIN_POLYGON_POINTS;
use crate::geom::{circle_area, polygon_area, rect_area, triangle_area};
use crate::snapshot::{self, Snapshot};
use crate::input::rescale_all;
use crate::viewport::{DisplayPoint, NormPoint, NormRadius, Rescale};

/// Unique identifier for a committed selection or polygon.
pub type SelectionId = Uuid;

/// Discriminant for [`Shape`], used in labels and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
    Polygon,
}

impl ShapeKind {
    /// Human-readable name used for default labels.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Rect => "Rectangle",
            Self::Circle => "Circle",
            Self::Triangle => "Triangle",
            Self::Polygon => "Polygon",
        }
    }
}

/// A measured shape: normalized placement plus the real dimensions entered for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect { corners: [NormPoint; 2], width_ft: f64, height_ft: f64 },
    Circle { center: NormPoint, radius: NormRadius, radius_ft: f64 },
    Triangle { vertices: [NormPoint; 3], base_ft: f64, height_ft: f64 },
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rect { .. } => ShapeKind::Rect,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Triangle { .. } => ShapeKind::Triangle,
        }
    }

    /// Area in square feet from the entered real dimensions.
    #[must_use]
    pub fn area_sq_ft(&self) -> f64 {
        match *self {
            Self::Rect { width_ft, height_ft, .. } => rect_area(width_ft, height_ft),
            Self::Circle { radius_ft, .. } => circle_area(radius_ft),
            Self::Triangle { base_ft, height_ft, .. } => triangle_area(base_ft, height_ft),
        }
    }
}

/// A committed, labeled, area-bearing shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub id: SelectionId,
    pub label: String,
    pub shape: Shape,
    pub area_sq_ft: f64,
}

impl Selection {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

/// Ordered list of committed selections for the manual-dimension mode.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    entries: Vec<Selection>,
    total_sq_ft: f64,
}

impl SelectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new selection and recompute the total.
    pub fn commit(&mut self, label: String, shape: Shape) -> &Selection {
        let area_sq_ft = shape.area_sq_ft();
        self.entries.push(Selection { id: Uuid::new_v4(), label, shape, area_sq_ft });
        self.recompute();
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    /// Remove the most recent selection. `None` (and no change) when empty.
    pub fn undo(&mut self) -> Option<Selection> {
        let removed = self.entries.pop();
        self.recompute();
        removed
    }

    /// Remove the selection at `index`; later entries shift down.
    pub fn remove_at(&mut self, index: usize) -> Option<Selection> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Remove a selection by id.
    pub fn remove(&mut self, id: &SelectionId) -> Option<Selection> {
        let index = self.entries.iter().position(|s| &s.id == id)?;
        self.remove_at(index)
    }

    /// Remove every selection.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recompute();
    }

    /// Sum of all committed areas in square feet.
    #[must_use]
    pub fn aggregate(&self) -> f64 {
        self.total_sq_ft
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Selection> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Selection> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of committed selections of `kind`, used for default labels.
    #[must_use]
    pub fn count_of(&self, kind: ShapeKind) -> usize {
        self.entries.iter().filter(|s| s.kind() == kind).count()
    }

    /// Read-only export for the chat assistant.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        snapshot::from_selections(self)
    }

    fn recompute(&mut self) {
        self.total_sq_ft = self.entries.iter().map(|s| s.area_sq_ft).sum();
    }
}

// =============================================================
// Calibrated polygons
// =============================================================

/// A finished polygon in display-pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub id: SelectionId,
    pub label: String,
    pub points: Vec<DisplayPoint>,
}

impl Polygon {
    /// Pixel² area by the shoelace formula.
    #[must_use]
    pub fn area_px2(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Area total for the polygon mode, which is only meaningful once calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AreaReport {
    Calibrated { area: f64, unit: Unit },
    NotCalibrated,
}

impl AreaReport {
    #[must_use]
    pub fn area(&self) -> Option<f64> {
        match self {
            Self::Calibrated { area, .. } => Some(*area),
            Self::NotCalibrated => None,
        }
    }
}

/// Rejected polygon finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a polygon needs at least 3 points (have {have})")]
pub struct TooFewPoints {
    pub have: usize,
}

/// Ordered list of finished polygons for the calibrated mode.
#[derive(Debug, Clone, Default)]
pub struct PolygonLayer {
    polygons: Vec<Polygon>,
    total_px2: f64,
}

impl PolygonLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished polygon.
    ///
    /// # Errors
    ///
    /// Returns [`TooFewPoints`] when fewer than three points are given.
    pub fn push(&mut self, label: String, points: Vec<DisplayPoint>) -> Result<&Polygon, TooFewPoints> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(TooFewPoints { have: points.len() });
        }
        self.polygons.push(Polygon { id: Uuid::new_v4(), label, points });
        self.recompute();
        let last = self.polygons.len() - 1;
        Ok(&self.polygons[last])
    }

    pub fn undo(&mut self) -> Option<Polygon> {
        let removed = self.polygons.pop();
        self.recompute();
        removed
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Polygon> {
        if index >= self.polygons.len() {
            return None;
        }
        let removed = self.polygons.remove(index);
        self.recompute();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.recompute();
    }

    /// Keep finished outlines over the same rooms after a canvas resize.
    pub fn rescale(&mut self, by: &Rescale) {
        for polygon in &mut self.polygons {
            rescale_all(&mut polygon.points, by);
        }
        self.recompute();
    }

    /// Sum of pixel² areas.
    #[must_use]
    pub fn total_area_px2(&self) -> f64 {
        self.total_px2
    }

    /// Total real area under `calibration`, or `NotCalibrated`.
    #[must_use]
    pub fn total_area(&self, calibration: Option<&ScaleCalibration>) -> AreaReport {
        match calibration {
            Some(cal) => AreaReport::Calibrated { area: cal.area_from_px2(self.total_px2), unit: cal.unit },
            None => AreaReport::NotCalibrated,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    fn recompute(&mut self) {
        self.total_px2 = self.polygons.iter().map(Polygon::area_px2).sum();
    }
}

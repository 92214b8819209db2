#![allow(clippy::float_cmp)]

use super::*;

fn p(x: f64, y: f64) -> DisplayPoint {
    DisplayPoint::new(x, y)
}

/// Calibrator with both points placed 100px apart, waiting for the distance.
fn awaiting_distance() -> Calibrator {
    let mut cal = Calibrator::new();
    cal.begin();
    assert_eq!(cal.click(p(0.0, 0.0)), Ok(ClickOutcome::FirstPlaced));
    assert_eq!(cal.click(p(100.0, 0.0)), Ok(ClickOutcome::DistanceNeeded { pixel_distance: 100.0 }));
    cal
}

// =============================================================
// Unit
// =============================================================

#[test]
fn unit_default_is_feet() {
    assert_eq!(Unit::default(), Unit::Feet);
}

#[test]
fn unit_symbols_round_trip() {
    for unit in [Unit::Feet, Unit::Inches, Unit::Meters, Unit::Centimeters] {
        assert_eq!(Unit::from_symbol(unit.symbol()), Some(unit));
    }
    assert_eq!(Unit::from_symbol("yd"), None);
}

#[test]
fn unit_serializes_as_symbol() {
    assert_eq!(serde_json::to_string(&Unit::Meters).unwrap_or_default(), "\"m\"");
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn starts_idle_and_uncalibrated() {
    let cal = Calibrator::new();
    assert_eq!(*cal.state(), CalibrationState::Idle);
    assert!(!cal.is_calibrated());
    assert_eq!(cal.units_per_pixel(), None);
}

#[test]
fn clicks_ignored_until_begin() {
    let mut cal = Calibrator::new();
    assert_eq!(cal.click(p(1.0, 1.0)), Ok(ClickOutcome::Ignored));
    assert_eq!(*cal.state(), CalibrationState::Idle);
}

#[test]
fn hundred_px_twenty_ft_is_point_two() {
    let mut cal = awaiting_distance();
    let result = cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.units_per_pixel, 0.2);
    assert_eq!(result.unit, Unit::Feet);
    assert_eq!(cal.units_per_pixel(), Some(0.2));
}

#[test]
fn area_from_px2_squares_the_factor() {
    let mut cal = awaiting_distance();
    let result = cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    assert!((result.area_from_px2(500.0) - 20.0).abs() < 1e-9);
}

#[test]
fn zero_pixel_distance_aborts() {
    let mut cal = Calibrator::new();
    cal.begin();
    cal.click(p(5.0, 5.0)).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(cal.click(p(5.0, 5.0)), Err(CalibrationError::ZeroPixelDistance));
    assert_eq!(*cal.state(), CalibrationState::Idle);
}

#[test]
fn invalid_distance_discards_points() {
    for raw in [Some("abc"), Some("0"), Some("-3"), Some(""), None] {
        let mut cal = awaiting_distance();
        assert_eq!(cal.supply_distance(raw), Err(CalibrationError::InvalidDistance));
        assert_eq!(*cal.state(), CalibrationState::Idle, "input {raw:?}");
    }
}

#[test]
fn supply_distance_without_request_is_rejected() {
    let mut cal = Calibrator::new();
    assert_eq!(cal.supply_distance(Some("10")), Err(CalibrationError::NotAwaitingDistance));
}

#[test]
fn begin_discards_existing_calibration() {
    let mut cal = awaiting_distance();
    cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    cal.begin();
    assert!(!cal.is_calibrated());
    assert!(cal.in_progress());
}

#[test]
fn cancel_keeps_completed_calibration() {
    let mut cal = awaiting_distance();
    cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    cal.cancel();
    assert!(cal.is_calibrated());
}

#[test]
fn cancel_abandons_progress() {
    let mut cal = awaiting_distance();
    cal.cancel();
    assert_eq!(*cal.state(), CalibrationState::Idle);
}

// =============================================================
// Unit changes
// =============================================================

#[test]
fn unit_change_clears_calibration() {
    let mut cal = awaiting_distance();
    cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    assert!(cal.set_unit(Unit::Meters));
    assert!(!cal.is_calibrated());
    assert_eq!(cal.unit(), Unit::Meters);
}

#[test]
fn same_unit_is_a_no_op() {
    let mut cal = awaiting_distance();
    cal.supply_distance(Some("20")).unwrap_or_else(|e| panic!("{e}"));
    assert!(!cal.set_unit(Unit::Feet));
    assert!(cal.is_calibrated());
}

#[test]
fn unit_change_while_idle_reports_nothing_discarded() {
    let mut cal = Calibrator::new();
    assert!(!cal.set_unit(Unit::Inches));
}

#[test]
fn calibration_uses_unit_at_supply_time() {
    let mut cal = Calibrator::new();
    cal.set_unit(Unit::Meters);
    cal.begin();
    cal.click(p(0.0, 0.0)).unwrap_or_else(|e| panic!("{e}"));
    cal.click(p(0.0, 50.0)).unwrap_or_else(|e| panic!("{e}"));
    let result = cal.supply_distance(Some("5")).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.unit, Unit::Meters);
    assert_eq!(result.units_per_pixel, 0.1);
}

// =============================================================
// Resize
// =============================================================

fn rescale(from: (f64, f64), to: (f64, f64)) -> Rescale {
    use crate::viewport::DisplayRect;
    Rescale::between(&DisplayRect::sized(from.0, from.1), &DisplayRect::sized(to.0, to.1))
        .unwrap_or_else(|| panic!("size changed"))
}

#[test]
fn uniform_resize_recomputes_factor() {
    let mut cal = awaiting_distance();
    assert!(cal.supply_distance(Some("20")).is_ok());
    assert!(cal.rescale(&rescale((1000.0, 500.0), (500.0, 250.0))));
    let scaled = cal.calibration().copied().unwrap_or_else(|| panic!("still calibrated"));
    assert_eq!(scaled.second, p(50.0, 0.0));
    assert_eq!(scaled.pixel_distance, 50.0);
    assert_eq!(scaled.units_per_pixel, 0.4);
    // A 50px square now covers what a 100px square did: 400 ft² either way.
    assert_eq!(scaled.area_from_px2(2_500.0), 400.0);
}

#[test]
fn uniform_resize_moves_pending_line() {
    let mut cal = awaiting_distance();
    assert!(cal.rescale(&rescale((1000.0, 500.0), (2000.0, 1000.0))));
    assert_eq!(
        *cal.state(),
        CalibrationState::AwaitingDistance { first: p(0.0, 0.0), second: p(200.0, 0.0), pixel_distance: 200.0 }
    );
    assert_eq!(cal.supply_distance(Some("20")).map(|c| c.units_per_pixel), Ok(0.1));
}

#[test]
fn aspect_change_discards_calibration() {
    let mut cal = awaiting_distance();
    assert!(cal.supply_distance(Some("20")).is_ok());
    assert!(!cal.rescale(&rescale((1000.0, 500.0), (1000.0, 800.0))));
    assert_eq!(*cal.state(), CalibrationState::Idle);
    assert_eq!(cal.units_per_pixel(), None);
}

#[test]
fn resize_before_first_point_is_harmless() {
    let mut cal = Calibrator::new();
    cal.begin();
    assert!(cal.rescale(&rescale((1000.0, 500.0), (1000.0, 800.0))));
    assert_eq!(*cal.state(), CalibrationState::AwaitingFirstPoint);
}

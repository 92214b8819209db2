#![allow(clippy::float_cmp)]

use super::*;

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

// =============================================================
// Mode / Gesture
// =============================================================

#[test]
fn mode_default_is_rect() {
    assert_eq!(Mode::default(), Mode::Rect);
}

#[test]
fn drag_modes() {
    assert!(Mode::Rect.is_drag());
    assert!(Mode::Circle.is_drag());
    assert!(!Mode::Triangle.is_drag());
    assert!(!Mode::Polygon.is_drag());
    assert!(!Mode::Calibrate.is_drag());
}

#[test]
fn calibrated_workflow_modes() {
    assert!(Mode::Polygon.is_calibrated_workflow());
    assert!(Mode::Calibrate.is_calibrated_workflow());
    assert!(!Mode::Rect.is_calibrated_workflow());
    assert!(!Mode::Triangle.is_calibrated_workflow());
}

#[test]
fn mode_deserializes_lowercase() {
    let mode: Mode = serde_json::from_str("\"calibrate\"").unwrap_or_default();
    assert_eq!(mode, Mode::Calibrate);
}

fn halving() -> Rescale {
    use crate::viewport::DisplayRect;
    Rescale::between(&DisplayRect::sized(1000.0, 500.0), &DisplayRect::sized(500.0, 250.0))
        .unwrap_or_else(|| panic!("size changed"))
}

#[test]
fn rescale_moves_pending_draft() {
    let mut gesture = Gesture::AwaitingInput {
        draft: Draft::Circle { center: DisplayPoint::new(400.0, 200.0), radius_px: 80.0 },
    };
    gesture.rescale(&halving());
    assert_eq!(
        gesture,
        Gesture::AwaitingInput { draft: Draft::Circle { center: DisplayPoint::new(200.0, 100.0), radius_px: 40.0 } }
    );
}

#[test]
fn rescale_moves_drag_and_vertices() {
    let mut dragging = Gesture::Dragging { anchor: DisplayPoint::new(10.0, 10.0), current: DisplayPoint::new(90.0, 50.0) };
    dragging.rescale(&halving());
    assert_eq!(
        dragging,
        Gesture::Dragging { anchor: DisplayPoint::new(5.0, 5.0), current: DisplayPoint::new(45.0, 25.0) }
    );

    let mut collecting = Gesture::Collecting { points: vec![DisplayPoint::new(2.0, 4.0), DisplayPoint::new(8.0, 6.0)] };
    collecting.rescale(&halving());
    assert_eq!(collecting.points(), &[DisplayPoint::new(1.0, 2.0), DisplayPoint::new(4.0, 3.0)]);
}

#[test]
fn rescale_leaves_calibration_draft_to_the_engine() {
    let mut gesture = Gesture::AwaitingInput { draft: Draft::CalibrationDistance { pixel_distance: 100.0 } };
    gesture.rescale(&halving());
    assert_eq!(gesture, Gesture::AwaitingInput { draft: Draft::CalibrationDistance { pixel_distance: 100.0 } });
}

#[test]
fn gesture_points_only_while_collecting() {
    assert!(Gesture::Idle.points().is_empty());
    let collecting = Gesture::Collecting { points: vec![DisplayPoint::new(1.0, 2.0)] };
    assert_eq!(collecting.points().len(), 1);
    let dragging = Gesture::Dragging { anchor: DisplayPoint::new(0.0, 0.0), current: DisplayPoint::new(5.0, 5.0) };
    assert!(dragging.points().is_empty());
}

#[test]
fn awaiting_input_flag() {
    let g = Gesture::AwaitingInput { draft: Draft::CalibrationDistance { pixel_distance: 10.0 } };
    assert!(g.is_awaiting_input());
    assert!(!Gesture::Idle.is_awaiting_input());
}

// =============================================================
// request_for
// =============================================================

fn keys(request: &InputRequest) -> Vec<&'static str> {
    request.fields.iter().map(|f| f.key).collect()
}

#[test]
fn rect_request_asks_label_width_height() {
    let draft = Draft::Rect { start: DisplayPoint::new(0.0, 0.0), end: DisplayPoint::new(50.0, 40.0) };
    let request = request_for(&draft, "ft");
    assert_eq!(request.purpose, InputPurpose::RectDimensions);
    assert_eq!(keys(&request), vec![FIELD_LABEL, FIELD_WIDTH_FT, FIELD_HEIGHT_FT]);
    assert!(!request.fields[0].numeric);
    assert!(request.fields[1].numeric);
}

#[test]
fn circle_request_asks_radius() {
    let draft = Draft::Circle { center: DisplayPoint::new(0.0, 0.0), radius_px: 20.0 };
    assert_eq!(keys(&request_for(&draft, "ft")), vec![FIELD_LABEL, FIELD_RADIUS_FT]);
}

#[test]
fn triangle_request_asks_base_height() {
    let p = DisplayPoint::new(0.0, 0.0);
    let request = request_for(&Draft::Triangle { vertices: [p, p, p] }, "ft");
    assert_eq!(keys(&request), vec![FIELD_LABEL, FIELD_BASE_FT, FIELD_HEIGHT_FT]);
}

#[test]
fn polygon_request_asks_only_label() {
    let draft = Draft::Polygon { points: vec![DisplayPoint::new(0.0, 0.0); 4] };
    let request = request_for(&draft, "ft");
    assert_eq!(request.purpose, InputPurpose::PolygonLabel);
    assert_eq!(keys(&request), vec![FIELD_LABEL]);
}

#[test]
fn calibration_request_names_unit() {
    let request = request_for(&Draft::CalibrationDistance { pixel_distance: 123.45 }, "m");
    assert_eq!(keys(&request), vec![FIELD_DISTANCE]);
    assert!(request.fields[0].prompt.contains("(m)"));
    assert!(request.title.contains("123.5"));
}

// =============================================================
// InputReply / FormValues
// =============================================================

#[test]
fn reply_deserializes_submit_and_cancel() {
    let submit: InputReply =
        serde_json::from_str(r#"{"kind":"submit","values":{"label":"Den","width_ft":"9"}}"#)
            .unwrap_or(InputReply::Cancel);
    assert_eq!(submit, InputReply::submit([("label", "Den"), ("width_ft", "9")]));

    let cancel: InputReply = serde_json::from_str(r#"{"kind":"cancel"}"#)
        .unwrap_or_else(|_| InputReply::Submit(HashMap::new()));
    assert_eq!(cancel, InputReply::Cancel);
}

#[test]
fn label_is_trimmed() {
    let v = values(&[("label", "  Kitchen  ")]);
    assert_eq!(FormValues::new(&v).label(), Some("Kitchen".to_owned()));
}

#[test]
fn blank_or_missing_label_is_none() {
    let blank = values(&[("label", "   ")]);
    assert_eq!(FormValues::new(&blank).label(), None);
    let missing = values(&[]);
    assert_eq!(FormValues::new(&missing).label(), None);
}

#[test]
fn positive_parses_and_validates() {
    let v = values(&[("width_ft", "12"), ("height_ft", "-1"), ("radius_ft", "abc")]);
    let form = FormValues::new(&v);
    assert_eq!(form.positive(FIELD_WIDTH_FT), Some(12.0));
    assert_eq!(form.positive(FIELD_HEIGHT_FT), None);
    assert_eq!(form.positive(FIELD_RADIUS_FT), None);
    assert_eq!(form.positive(FIELD_BASE_FT), None);
    assert_eq!(form.raw(FIELD_WIDTH_FT), Some("12"));
}

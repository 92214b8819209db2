//! Rendering: turns engine state into draw operations and paints them.
//!
//! [`scene`] is pure: it projects committed shapes from normalized space back
//! to display pixels under the current viewport and returns a flat list of
//! [`DrawOp`]s. [`draw`] is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`].
//!
//! The blueprint image itself is an `<img>` element underneath the canvas;
//! the canvas only carries the measurement overlay.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::calibrate::CalibrationState;
use crate::consts::{
    CALIBRATION_STROKE, LABEL_COLOR, LABEL_FONT, MARKER_RADIUS_PX, PREVIEW_DASH_PX, PREVIEW_STROKE, SHAPE_FILL,
    SHAPE_STROKE, SHAPE_STROKE_PX,
};
use crate::engine::EngineCore;
use crate::geom::distance;
use crate::input::{Draft, Gesture, Mode};
use crate::selection::{Selection, Shape};
use crate::viewport::{DisplayPoint, DisplayRect, Viewport, radius_to_display, to_display};

/// Which palette an operation is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Committed shape: filled, solid outline.
    Committed,
    /// Live preview or in-progress vertices: dashed outline, no fill.
    Preview,
    /// Calibration reference line and points.
    Calibration,
}

/// One primitive in display-pixel space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Path { points: Vec<DisplayPoint>, closed: bool, layer: Layer },
    Circle { center: DisplayPoint, radius: f64, layer: Layer },
    Marker { at: DisplayPoint, layer: Layer },
    Label { at: DisplayPoint, text: String },
}

/// Build the draw list for the current engine state, bottom layer first.
#[must_use]
pub fn scene(core: &EngineCore) -> Vec<DrawOp> {
    let rect = core.viewport.rect;
    let mut ops = Vec::new();

    for selection in core.selections.iter() {
        push_selection(&mut ops, selection, &rect);
    }

    let calibration = core.calibrator.calibration();
    for polygon in core.polygons.iter() {
        ops.push(DrawOp::Path { points: polygon.points.clone(), closed: true, layer: Layer::Committed });
        let text = match calibration {
            Some(cal) => {
                format!("{}: {:.2} {}²", polygon.label, cal.area_from_px2(polygon.area_px2()), cal.unit.symbol())
            }
            None => format!("{}: not calibrated", polygon.label),
        };
        ops.push(DrawOp::Label { at: centroid(&polygon.points), text });
    }

    push_calibration(&mut ops, core);
    push_gesture(&mut ops, core);
    ops
}

fn push_selection(ops: &mut Vec<DrawOp>, selection: &Selection, rect: &DisplayRect) {
    let text = format!("{}: {:.2} sq ft", selection.label, selection.area_sq_ft);
    match &selection.shape {
        Shape::Rect { corners, .. } => {
            let points = rect_outline(to_display(corners[0], rect), to_display(corners[1], rect));
            let at = centroid(&points);
            ops.push(DrawOp::Path { points, closed: true, layer: Layer::Committed });
            ops.push(DrawOp::Label { at, text });
        }
        Shape::Circle { center, radius, .. } => {
            let center = to_display(*center, rect);
            ops.push(DrawOp::Circle { center, radius: radius_to_display(*radius, rect), layer: Layer::Committed });
            ops.push(DrawOp::Label { at: center, text });
        }
        Shape::Triangle { vertices, .. } => {
            let points = vertices.iter().map(|v| to_display(*v, rect)).collect::<Vec<_>>();
            let at = centroid(&points);
            ops.push(DrawOp::Path { points, closed: true, layer: Layer::Committed });
            ops.push(DrawOp::Label { at, text });
        }
    }
}

fn push_calibration(ops: &mut Vec<DrawOp>, core: &EngineCore) {
    let (first, second) = match core.calibrator.state() {
        CalibrationState::AwaitingSecondPoint { first } => (*first, core.ui.hover),
        CalibrationState::AwaitingDistance { first, second, .. } => (*first, Some(*second)),
        CalibrationState::Calibrated(cal) if matches!(core.ui.mode, Mode::Calibrate | Mode::Polygon) => {
            (cal.first, Some(cal.second))
        }
        _ => return,
    };
    ops.push(DrawOp::Marker { at: first, layer: Layer::Calibration });
    if let Some(second) = second {
        ops.push(DrawOp::Path { points: vec![first, second], closed: false, layer: Layer::Calibration });
        ops.push(DrawOp::Marker { at: second, layer: Layer::Calibration });
    }
}

fn push_gesture(ops: &mut Vec<DrawOp>, core: &EngineCore) {
    match &core.gesture {
        Gesture::Idle => {}
        Gesture::Dragging { anchor, current } => {
            if core.ui.mode == Mode::Circle {
                let radius = distance(*anchor, *current);
                ops.push(DrawOp::Circle { center: *anchor, radius, layer: Layer::Preview });
            } else {
                ops.push(DrawOp::Path { points: rect_outline(*anchor, *current), closed: true, layer: Layer::Preview });
            }
        }
        Gesture::Collecting { points } => {
            let mut path = points.clone();
            if let Some(hover) = core.ui.hover {
                path.push(hover);
            }
            ops.push(DrawOp::Path { points: path, closed: false, layer: Layer::Preview });
            ops.extend(points.iter().map(|p| DrawOp::Marker { at: *p, layer: Layer::Preview }));
        }
        Gesture::AwaitingInput { draft } => match draft {
            Draft::Rect { start, end } => {
                ops.push(DrawOp::Path { points: rect_outline(*start, *end), closed: true, layer: Layer::Preview });
            }
            Draft::Circle { center, radius_px } => {
                ops.push(DrawOp::Circle { center: *center, radius: *radius_px, layer: Layer::Preview });
            }
            Draft::Triangle { vertices } => {
                ops.push(DrawOp::Path { points: vertices.to_vec(), closed: true, layer: Layer::Preview });
            }
            Draft::Polygon { points } => {
                ops.push(DrawOp::Path { points: points.clone(), closed: true, layer: Layer::Preview });
            }
            // Drawn from the calibrator state.
            Draft::CalibrationDistance { .. } => {}
        },
    }
}

/// The four corners of the axis-aligned rectangle spanned by `a` and `b`.
fn rect_outline(a: DisplayPoint, b: DisplayPoint) -> Vec<DisplayPoint> {
    vec![a, DisplayPoint::new(b.x, a.y), b, DisplayPoint::new(a.x, b.y)]
}

/// Vertex average; good enough for label placement.
#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[DisplayPoint]) -> DisplayPoint {
    if points.is_empty() {
        return DisplayPoint::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    DisplayPoint::new(sx / n, sy / n)
}

// =============================================================
// Canvas2D
// =============================================================

/// Paint `ops` onto `ctx`, clearing first.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, ops: &[DrawOp], viewport: &Viewport) -> Result<(), JsValue> {
    let rect = viewport.rect;
    ctx.set_transform(viewport.dpr, 0.0, 0.0, viewport.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, rect.safe_width(), rect.safe_height());

    for op in ops {
        match op {
            DrawOp::Path { points, closed, layer } => draw_path(ctx, points, *closed, *layer)?,
            DrawOp::Circle { center, radius, layer } => {
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
                finish_shape(ctx, *layer, true)?;
            }
            DrawOp::Marker { at, layer } => {
                ctx.begin_path();
                ctx.arc(at.x, at.y, MARKER_RADIUS_PX, 0.0, 2.0 * PI)?;
                ctx.set_fill_style_str(stroke_color(*layer));
                ctx.fill();
            }
            DrawOp::Label { at, text } => {
                ctx.set_font(LABEL_FONT);
                ctx.set_fill_style_str(LABEL_COLOR);
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                ctx.fill_text(text, at.x, at.y)?;
            }
        }
    }
    Ok(())
}

fn draw_path(ctx: &CanvasRenderingContext2d, points: &[DisplayPoint], closed: bool, layer: Layer) -> Result<(), JsValue> {
    let Some((first, rest)) = points.split_first() else {
        return Ok(());
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    if closed {
        ctx.close_path();
    }
    finish_shape(ctx, layer, closed)
}

fn finish_shape(ctx: &CanvasRenderingContext2d, layer: Layer, closed: bool) -> Result<(), JsValue> {
    ctx.save();
    if layer == Layer::Committed && closed {
        ctx.set_fill_style_str(SHAPE_FILL);
        ctx.fill();
    }
    ctx.set_stroke_style_str(stroke_color(layer));
    ctx.set_line_width(SHAPE_STROKE_PX);
    if layer == Layer::Preview {
        let dash_array = js_sys::Array::new();
        dash_array.push(&PREVIEW_DASH_PX.into());
        dash_array.push(&PREVIEW_DASH_PX.into());
        ctx.set_line_dash(&dash_array)?;
    }
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

fn stroke_color(layer: Layer) -> &'static str {
    match layer {
        Layer::Committed => SHAPE_STROKE,
        Layer::Preview => PREVIEW_STROKE,
        Layer::Calibration => CALIBRATION_STROKE,
    }
}

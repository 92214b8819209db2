use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::calibrate::{CalibrationError, CalibrationState, Calibrator, ClickOutcome, Unit};
use crate::consts::{MIN_DRAG_PX, MIN_POLYGON_POINTS, TRIANGLE_VERTICES};
use crate::geom::distance;
use crate::input::{
    Button, Draft, FIELD_BASE_FT, FIELD_DISTANCE, FIELD_HEIGHT_FT, FIELD_RADIUS_FT, FIELD_WIDTH_FT, FormValues,
    Gesture, InputReply, InputRequest, Key, Mode, request_for,
};
use crate::render;
use crate::selection::{AreaReport, PolygonLayer, SelectionManager, Shape, ShapeKind};
use crate::snapshot::{self, Snapshot};
use crate::viewport::{DisplayPoint, DisplayRect, Rescale, Viewport, radius_to_normalized, to_normalized};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    /// Show a form for the pending draft and answer with
    /// [`EngineCore::submit_input`] or [`EngineCore::cancel_input`].
    InputRequested(InputRequest),
    Status(String),
    SelectionsChanged { total_sq_ft: f64, count: usize },
    PolygonsChanged(AreaReport),
    /// New units-per-pixel factor, or `None` when the calibration was dropped.
    CalibrationChanged(Option<f64>),
}

/// Reasons a pending draft could not be committed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitError {
    #[error("enter a positive number for {field}; nothing was added")]
    InvalidNumber { field: &'static str },
    #[error("input cancelled; nothing was added")]
    Cancelled,
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// Mode selection and the latest status line.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub mode: Mode,
    pub status: Option<String>,
    /// Last pointer position, for the polygon and calibration rubber band.
    pub hover: Option<DisplayPoint>,
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub selections: SelectionManager,
    pub polygons: PolygonLayer,
    pub calibrator: Calibrator,
    pub gesture: Gesture,
    pub ui: UiState,
    pub viewport: Viewport,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Viewport / mode ---

    /// Update the canvas rectangle and device pixel ratio.
    ///
    /// A size change moves everything still held in display pixels so it
    /// stays over the same spot of the blueprint.
    pub fn set_viewport(&mut self, rect: DisplayRect, dpr: f64) -> Vec<Action> {
        let resize = Rescale::between(&self.viewport.rect, &rect);
        self.viewport = Viewport::new(rect, dpr);
        let mut actions = match resize {
            Some(by) => self.follow_resize(&by),
            None => Vec::new(),
        };
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Switch drawing mode, dropping anything in progress.
    ///
    /// Polygon mode needs a calibration; without one the switch is refused.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        if mode == Mode::Polygon && !self.calibrator.is_calibrated() {
            return vec![self.status("Calibrate the scale before tracing polygons.")];
        }
        self.gesture = Gesture::Idle;
        self.calibrator.cancel();
        self.ui.mode = mode;
        let mut actions = vec![Action::RenderNeeded];
        if mode == Mode::Calibrate {
            self.calibrator.begin();
            actions.push(Action::CalibrationChanged(None));
            actions.push(Action::PolygonsChanged(self.area_report()));
            actions.push(self.status("Click the first reference point."));
        }
        actions
    }

    /// Change the calibration unit. A held calibration is discarded.
    pub fn set_unit(&mut self, unit: Unit) -> Vec<Action> {
        if !self.calibrator.set_unit(unit) {
            return Vec::new();
        }
        self.gesture = Gesture::Idle;
        if self.ui.mode == Mode::Polygon {
            self.ui.mode = Mode::Calibrate;
        }
        vec![
            Action::CalibrationChanged(None),
            Action::PolygonsChanged(self.area_report()),
            self.status(format!("Unit set to {}; calibrate again.", unit.symbol())),
            Action::RenderNeeded,
        ]
    }

    // --- Pointer input ---

    /// `point` is canvas-local display coordinates.
    pub fn on_pointer_down(&mut self, point: DisplayPoint, button: Button) -> Vec<Action> {
        if button != Button::Primary || self.gesture.is_awaiting_input() {
            return Vec::new();
        }
        match self.ui.mode {
            Mode::Rect | Mode::Circle => {
                self.gesture = Gesture::Dragging { anchor: point, current: point };
                vec![Action::RenderNeeded]
            }
            Mode::Triangle => self.add_triangle_vertex(point),
            Mode::Polygon => self.add_polygon_vertex(point),
            Mode::Calibrate => self.calibration_click(point),
        }
    }

    pub fn on_pointer_move(&mut self, point: DisplayPoint) -> Vec<Action> {
        self.ui.hover = Some(point);
        match &mut self.gesture {
            Gesture::Dragging { current, .. } => {
                *current = point;
                vec![Action::RenderNeeded]
            }
            Gesture::Collecting { .. } => vec![Action::RenderNeeded],
            _ if self.calibrator.in_progress() => vec![Action::RenderNeeded],
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, point: DisplayPoint, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Gesture::Dragging { anchor, .. } = self.gesture else {
            return Vec::new();
        };
        let length = distance(anchor, point);
        if length < MIN_DRAG_PX {
            self.gesture = Gesture::Idle;
            return vec![Action::RenderNeeded];
        }
        let draft = match self.ui.mode {
            Mode::Circle => Draft::Circle { center: anchor, radius_px: length },
            _ => Draft::Rect { start: anchor, end: point },
        };
        self.request_input(draft)
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => self.escape(),
            "Enter" => self.finish_polygon(),
            "Backspace" => self.undo_point(),
            _ => Vec::new(),
        }
    }

    // --- Polygon ---

    /// Close the in-progress polygon and ask for its label.
    pub fn finish_polygon(&mut self) -> Vec<Action> {
        if self.ui.mode != Mode::Polygon || self.gesture.is_awaiting_input() {
            return Vec::new();
        }
        let have = self.gesture.points().len();
        if have < MIN_POLYGON_POINTS {
            return vec![self.status(format!("A polygon needs at least 3 points (have {have})."))];
        }
        let points = match std::mem::take(&mut self.gesture) {
            Gesture::Collecting { points } => points,
            _ => Vec::new(),
        };
        self.request_input(Draft::Polygon { points })
    }

    /// Remove the last accumulated vertex.
    pub fn undo_point(&mut self) -> Vec<Action> {
        let Gesture::Collecting { points } = &mut self.gesture else {
            return Vec::new();
        };
        points.pop();
        if points.is_empty() {
            self.gesture = Gesture::Idle;
        }
        vec![Action::RenderNeeded]
    }

    // --- Input replies ---

    /// Resolve the pending input request.
    pub fn submit_input(&mut self, reply: InputReply) -> Vec<Action> {
        if !self.gesture.is_awaiting_input() {
            return vec![self.status("Nothing is waiting for input.")];
        }
        let Gesture::AwaitingInput { draft } = std::mem::take(&mut self.gesture) else {
            return Vec::new();
        };
        match self.commit(draft, &reply) {
            Ok(mut actions) => {
                actions.push(Action::RenderNeeded);
                actions
            }
            Err(err) => {
                let mut actions = vec![self.status(err.to_string()), Action::RenderNeeded];
                if matches!(err, CommitError::Calibration(_)) {
                    actions.push(Action::CalibrationChanged(None));
                }
                actions
            }
        }
    }

    pub fn cancel_input(&mut self) -> Vec<Action> {
        self.submit_input(InputReply::Cancel)
    }

    // --- List edits ---

    /// Remove the most recent entry of the active list: polygons while
    /// calibrating or tracing, manual selections otherwise.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.ui.mode.is_calibrated_workflow() {
            return match self.polygons.undo() {
                Some(p) => self.polygons_changed(format!("Removed {}.", p.label)),
                None => vec![self.status("Nothing to undo.")],
            };
        }
        match self.selections.undo() {
            Some(s) => self.selections_changed(format!("Removed {}.", s.label)),
            None => vec![self.status("Nothing to undo.")],
        }
    }

    /// Remove the selection at `index`.
    pub fn remove_at(&mut self, index: usize) -> Vec<Action> {
        match self.selections.remove_at(index) {
            Some(s) => self.selections_changed(format!("Removed {}.", s.label)),
            None => Vec::new(),
        }
    }

    /// Remove the finished polygon at `index`.
    pub fn remove_polygon_at(&mut self, index: usize) -> Vec<Action> {
        match self.polygons.remove_at(index) {
            Some(p) => self.polygons_changed(format!("Removed {}.", p.label)),
            None => Vec::new(),
        }
    }

    /// Empty both lists and drop any in-progress gesture. The calibration stays.
    pub fn clear(&mut self) -> Vec<Action> {
        self.gesture = Gesture::Idle;
        self.selections.clear();
        self.polygons.clear();
        vec![
            Action::SelectionsChanged { total_sq_ft: 0.0, count: 0 },
            Action::PolygonsChanged(self.area_report()),
            self.status("Cleared."),
            Action::RenderNeeded,
        ]
    }

    // --- Queries ---

    /// Calibrated total for the polygon list.
    #[must_use]
    pub fn area_report(&self) -> AreaReport {
        self.polygons.total_area(self.calibrator.calibration())
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        snapshot::build(&self.selections, &self.polygons, self.calibrator.calibration())
    }

    /// The snapshot as a JSON string for the chat request body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only happens for non-finite numbers.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    // --- Internals ---

    fn status(&mut self, message: impl Into<String>) -> Action {
        let message = message.into();
        self.ui.status = Some(message.clone());
        Action::Status(message)
    }

    fn request_input(&mut self, draft: Draft) -> Vec<Action> {
        let request = request_for(&draft, self.calibrator.unit().symbol());
        self.gesture = Gesture::AwaitingInput { draft };
        vec![Action::InputRequested(request), Action::RenderNeeded]
    }

    fn add_triangle_vertex(&mut self, point: DisplayPoint) -> Vec<Action> {
        let mut points = match std::mem::take(&mut self.gesture) {
            Gesture::Collecting { points } => points,
            _ => Vec::with_capacity(TRIANGLE_VERTICES),
        };
        points.push(point);
        if let [a, b, c] = points.as_slice() {
            let vertices = [*a, *b, *c];
            return self.request_input(Draft::Triangle { vertices });
        }
        self.gesture = Gesture::Collecting { points };
        vec![Action::RenderNeeded]
    }

    fn add_polygon_vertex(&mut self, point: DisplayPoint) -> Vec<Action> {
        if !self.calibrator.is_calibrated() {
            return vec![self.status("Calibrate the scale before tracing polygons.")];
        }
        match &mut self.gesture {
            Gesture::Collecting { points } => points.push(point),
            _ => self.gesture = Gesture::Collecting { points: vec![point] },
        }
        vec![Action::RenderNeeded]
    }

    fn calibration_click(&mut self, point: DisplayPoint) -> Vec<Action> {
        if !self.calibrator.in_progress() {
            self.calibrator.begin();
        }
        match self.calibrator.click(point) {
            Ok(ClickOutcome::FirstPlaced) => {
                vec![self.status("Click the second reference point."), Action::RenderNeeded]
            }
            Ok(ClickOutcome::DistanceNeeded { pixel_distance }) => {
                self.request_input(Draft::CalibrationDistance { pixel_distance })
            }
            Ok(ClickOutcome::Ignored) => Vec::new(),
            Err(err) => vec![self.status(err.to_string()), Action::RenderNeeded],
        }
    }

    fn follow_resize(&mut self, by: &Rescale) -> Vec<Action> {
        self.gesture.rescale(by);
        self.polygons.rescale(by);
        self.ui.hover = self.ui.hover.map(|p| by.point(p));

        if self.calibrator.rescale(by) {
            if let (
                Gesture::AwaitingInput { draft: Draft::CalibrationDistance { pixel_distance } },
                CalibrationState::AwaitingDistance { pixel_distance: moved, .. },
            ) = (&mut self.gesture, self.calibrator.state())
            {
                *pixel_distance = *moved;
            }
            return match self.calibrator.units_per_pixel() {
                Some(factor) => {
                    vec![Action::CalibrationChanged(Some(factor)), Action::PolygonsChanged(self.area_report())]
                }
                None => Vec::new(),
            };
        }

        let stale = match &self.gesture {
            Gesture::AwaitingInput { draft: Draft::CalibrationDistance { .. } } => true,
            Gesture::Collecting { .. } => self.ui.mode == Mode::Polygon,
            _ => false,
        };
        if stale {
            self.gesture = Gesture::Idle;
        }
        if self.ui.mode == Mode::Polygon {
            self.ui.mode = Mode::Calibrate;
        }
        vec![
            Action::CalibrationChanged(None),
            Action::PolygonsChanged(self.area_report()),
            self.status("Canvas proportions changed; calibrate again."),
        ]
    }

    fn escape(&mut self) -> Vec<Action> {
        match self.gesture {
            Gesture::AwaitingInput { .. } => self.cancel_input(),
            Gesture::Dragging { .. } | Gesture::Collecting { .. } => {
                self.gesture = Gesture::Idle;
                vec![Action::RenderNeeded]
            }
            Gesture::Idle if self.calibrator.in_progress() => {
                self.calibrator.cancel();
                vec![self.status("Calibration cancelled."), Action::RenderNeeded]
            }
            Gesture::Idle => Vec::new(),
        }
    }

    fn commit(&mut self, draft: Draft, reply: &InputReply) -> Result<Vec<Action>, CommitError> {
        let values = match reply {
            InputReply::Submit(values) => values,
            InputReply::Cancel => return Err(self.cancelled(draft)),
        };
        let form = FormValues::new(values);
        let rect = self.viewport.rect;
        let shape = match draft {
            Draft::Rect { start, end } => Shape::Rect {
                corners: [to_normalized(start, &rect), to_normalized(end, &rect)],
                width_ft: require(&form, FIELD_WIDTH_FT, "width")?,
                height_ft: require(&form, FIELD_HEIGHT_FT, "height")?,
            },
            Draft::Circle { center, radius_px } => Shape::Circle {
                center: to_normalized(center, &rect),
                radius: radius_to_normalized(radius_px, &rect),
                radius_ft: require(&form, FIELD_RADIUS_FT, "radius")?,
            },
            Draft::Triangle { vertices } => Shape::Triangle {
                vertices: vertices.map(|v| to_normalized(v, &rect)),
                base_ft: require(&form, FIELD_BASE_FT, "base")?,
                height_ft: require(&form, FIELD_HEIGHT_FT, "height")?,
            },
            Draft::Polygon { points } => {
                let label = form.label().unwrap_or_else(|| self.default_polygon_label());
                return self.commit_polygon(label, points);
            }
            Draft::CalibrationDistance { .. } => {
                let cal = self.calibrator.supply_distance(form.raw(FIELD_DISTANCE))?;
                self.ui.mode = Mode::Polygon;
                return Ok(vec![
                    Action::CalibrationChanged(Some(cal.units_per_pixel)),
                    Action::PolygonsChanged(self.area_report()),
                    self.status(format!(
                        "Calibrated: {:.4} {} per pixel. Click to trace a room.",
                        cal.units_per_pixel,
                        cal.unit.symbol()
                    )),
                ]);
            }
        };
        let kind = shape.kind();
        let label = form.label().unwrap_or_else(|| self.default_label(kind));
        let committed = self.selections.commit(label, shape);
        let message = format!("Added {}: {:.2} sq ft.", committed.label, committed.area_sq_ft);
        Ok(self.selections_changed(message))
    }

    fn commit_polygon(&mut self, label: String, points: Vec<DisplayPoint>) -> Result<Vec<Action>, CommitError> {
        let area_px2 = match self.polygons.push(label, points) {
            Ok(polygon) => polygon.area_px2(),
            Err(err) => return Ok(vec![self.status(err.to_string())]),
        };
        let message = match self.calibrator.calibration() {
            Some(cal) => format!("Added polygon: {:.2} {}².", cal.area_from_px2(area_px2), cal.unit.symbol()),
            None => "Added polygon (not calibrated).".to_owned(),
        };
        Ok(self.polygons_changed(message))
    }

    /// Undo the side effects of a cancelled draft.
    ///
    /// A cancelled polygon label returns to tracing with its points intact;
    /// a cancelled calibration distance discards both reference points.
    fn cancelled(&mut self, draft: Draft) -> CommitError {
        match draft {
            Draft::Polygon { points } => self.gesture = Gesture::Collecting { points },
            Draft::CalibrationDistance { .. } => self.calibrator.reset(),
            _ => {}
        }
        CommitError::Cancelled
    }

    fn default_label(&self, kind: ShapeKind) -> String {
        format!("{} {}", kind.display_name(), self.selections.count_of(kind) + 1)
    }

    fn default_polygon_label(&self) -> String {
        format!("{} {}", ShapeKind::Polygon.display_name(), self.polygons.len() + 1)
    }

    fn selections_changed(&mut self, message: String) -> Vec<Action> {
        vec![
            Action::SelectionsChanged { total_sq_ft: self.selections.aggregate(), count: self.selections.len() },
            self.status(message),
            Action::RenderNeeded,
        ]
    }

    fn polygons_changed(&mut self, message: String) -> Vec<Action> {
        vec![Action::PolygonsChanged(self.area_report()), self.status(message), Action::RenderNeeded]
    }
}

fn require(form: &FormValues<'_>, key: &str, field: &'static str) -> Result<f64, CommitError> {
    form.positive(key).ok_or(CommitError::InvalidNumber { field })
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    // --- Viewport ---

    /// Resize the backing store to match the element's CSS box at `dpr`.
    pub fn set_viewport(&mut self, rect: DisplayRect, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(rect, dpr);
        let (width, height) = self.core.viewport.device_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        actions
    }

    // --- Input events (client coordinates) ---

    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64, button: Button) -> Vec<Action> {
        let point = self.core.viewport.rect.local(client_x, client_y);
        self.core.on_pointer_down(point, button)
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64) -> Vec<Action> {
        let point = self.core.viewport.rect.local(client_x, client_y);
        self.core.on_pointer_move(point)
    }

    pub fn on_pointer_up(&mut self, client_x: f64, client_y: f64, button: Button) -> Vec<Action> {
        let point = self.core.viewport.rect.local(client_x, client_y);
        self.core.on_pointer_up(point, button)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let ops = render::scene(&self.core);
        render::draw(&ctx, &ops, &self.core.viewport)
    }
}

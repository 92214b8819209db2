//! Estimate service — blueprint upload → LLM → flooring totals.
//!
//! DESIGN
//! ======
//! The model is asked for a JSON object with its room breakdown and a
//! subtotal. Only `subtotal_sqft`, `rooms` and `notes` are trusted; waste,
//! total and box count are always recomputed here from the user's
//! parameters so the arithmetic never depends on the model.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ContentBlock, LlmError, Message, ResponseFormat};

/// Longest model output echoed back when it is not valid JSON.
pub const RAW_PREVIEW_CHARS: usize = 4000;

/// Media type assumed when the upload carries none.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("Missing file")]
    MissingFile,
    #[error("wastePct must be a number >= 0 (got {0:?})")]
    InvalidWastePct(String),
    #[error("Model did not return valid JSON")]
    InvalidModelJson { raw: String },
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl ErrorCode for EstimateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFile => "E_MISSING_FILE",
            Self::InvalidWastePct(_) => "E_INVALID_WASTE_PCT",
            Self::InvalidModelJson { .. } => "E_INVALID_MODEL_JSON",
            Self::Llm(_) => "E_LLM_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::InvalidModelJson { .. } => true,
            _ => false,
        }
    }
}

/// User parameters sent with the upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateParams {
    pub waste_pct: f64,
    /// `None` when absent, unparseable or not positive.
    pub sqft_per_box: Option<f64>,
}

impl EstimateParams {
    /// Parse the raw form values.
    ///
    /// A missing or blank `wastePct` means 0.
    ///
    /// # Errors
    ///
    /// [`EstimateError::InvalidWastePct`] when `wastePct` is not a finite
    /// number or is negative.
    pub fn parse(waste_pct: Option<&str>, sqft_per_box: Option<&str>) -> Result<Self, EstimateError> {
        let waste_pct = match waste_pct.map(str::trim).filter(|s| !s.is_empty()) {
            None => 0.0,
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => return Err(EstimateError::InvalidWastePct(raw.to_string())),
            },
        };
        let sqft_per_box = sqft_per_box
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0);
        Ok(Self { waste_pct, sqft_per_box })
    }
}

/// An uploaded blueprint.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The endpoint's response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub subtotal_sqft: Option<f64>,
    pub waste_pct: f64,
    pub waste_sqft: Option<f64>,
    pub total_sqft: Option<f64>,
    pub sqft_per_box: Option<f64>,
    pub boxes_needed: Option<u64>,
    pub rooms: Value,
    pub notes: Value,
}

// =============================================================================
// PROMPT
// =============================================================================

#[must_use]
pub fn build_prompt(params: EstimateParams) -> String {
    let waste_pct = params.waste_pct;
    let sqft_per_box = params.sqft_per_box.unwrap_or(0.0);
    format!(
        "You are a construction takeoff assistant. From the uploaded blueprint, estimate the TOTAL FLOORING AREA (sq ft).
Rules:
- Return ONLY valid JSON with the keys subtotal_sqft, rooms and notes.
- rooms is a list of {{\"name\", \"sqft\"}} objects for every room you can measure.
- If scale is ambiguous, provide best estimate AND include a warning in notes.
- Prefer labeled room dimensions if visible (e.g., \"13' x 24'\").
- If you can't confidently compute, give the reason in notes and set subtotal_sqft to null.

Compute:
subtotal_sqft = sum of room floor areas you can infer
waste_sqft = subtotal_sqft * (wastePct/100)
total_sqft = subtotal_sqft + waste_sqft
boxes_needed = ceil(total_sqft / sqftPerBox) if sqftPerBox>0 else null

wastePct={waste_pct}
sqftPerBox={sqft_per_box}"
    )
}

// =============================================================================
// MODEL OUTPUT
// =============================================================================

/// Parse the model's text as a JSON object, tolerating a Markdown fence.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// First [`RAW_PREVIEW_CHARS`] characters of `text`.
#[must_use]
pub fn raw_preview(text: &str) -> String {
    text.chars().take(RAW_PREVIEW_CHARS).collect()
}

/// Numbers pass through; numeric strings are parsed; anything else is absent.
fn as_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn list_or_empty(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Array(Vec::new()),
        Some(Value::String(note)) => Value::Array(vec![Value::String(note.clone())]),
        Some(other) => other.clone(),
    }
}

/// Recompute every derived quantity from the model's subtotal.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn post_calculate(model: &Map<String, Value>, params: EstimateParams) -> Estimate {
    let subtotal = as_number(model.get("subtotal_sqft"));
    let waste = subtotal.map(|s| s * params.waste_pct / 100.0);
    let total = subtotal.zip(waste).map(|(s, w)| s + w);
    let boxes = total
        .zip(params.sqft_per_box)
        .map(|(total, per_box)| (total / per_box).ceil().max(0.0) as u64);

    Estimate {
        subtotal_sqft: subtotal,
        waste_pct: params.waste_pct,
        waste_sqft: waste,
        total_sqft: total,
        sqft_per_box: params.sqft_per_box,
        boxes_needed: boxes,
        rooms: list_or_empty(model.get("rooms")),
        notes: list_or_empty(model.get("notes")),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Ask the model for an estimate of `upload` and post-calculate the totals.
///
/// # Errors
///
/// [`EstimateError::MissingFile`] for an empty upload,
/// [`EstimateError::InvalidModelJson`] when the answer is not a JSON object,
/// and [`EstimateError::Llm`] when the provider call fails.
pub async fn estimate(
    llm: &dyn LlmChat,
    upload: &Upload,
    params: EstimateParams,
    max_tokens: u32,
) -> Result<Estimate, EstimateError> {
    if upload.bytes.is_empty() {
        return Err(EstimateError::MissingFile);
    }

    info!(
        file = upload.file_name.as_deref().unwrap_or("-"),
        media_type = %upload.media_type,
        bytes = upload.bytes.len(),
        waste_pct = params.waste_pct,
        "estimate: request"
    );

    let message = Message::user_blocks(vec![
        ContentBlock::text(build_prompt(params)),
        ContentBlock::attachment(&upload.media_type, &upload.bytes),
    ]);
    let response = llm
        .chat(max_tokens, "", &[message], ResponseFormat::Json)
        .await?;

    info!(
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "estimate: LLM response"
    );

    let text = response.text();
    let Some(object) = extract_json_object(&text) else {
        warn!(len = text.len(), "estimate: model output is not a JSON object");
        return Err(EstimateError::InvalidModelJson { raw: raw_preview(&text) });
    };

    let estimate = post_calculate(&object, params);
    info!(
        subtotal_sqft = ?estimate.subtotal_sqft,
        total_sqft = ?estimate.total_sqft,
        boxes_needed = ?estimate.boxes_needed,
        "estimate: complete"
    );
    Ok(estimate)
}

#[cfg(test)]
#[path = "estimate_test.rs"]
mod estimate_test;

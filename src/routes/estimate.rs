//! `POST /api/flooring-estimate` — multipart blueprint upload.

use axum::Json;
use axum::extract::{Multipart, State};
use tracing::debug;

use crate::error::ApiError;
use crate::services::estimate::{self, DEFAULT_MEDIA_TYPE, Estimate, EstimateParams, Upload};
use crate::state::AppState;

/// The recognised multipart fields. Unknown fields are skipped.
#[derive(Debug, Default)]
struct EstimateForm {
    file: Option<Upload>,
    waste_pct: Option<String>,
    sqft_per_box: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<EstimateForm, ApiError> {
    let mut form = EstimateForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        debug!(field_name = %name, "estimate: multipart field");
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_owned);
                let media_type = field
                    .content_type()
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(DEFAULT_MEDIA_TYPE)
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                form.file = Some(Upload { file_name, media_type, bytes });
            }
            "wastePct" => form.waste_pct = Some(field.text().await?),
            "sqftPerBox" => form.sqft_per_box = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(form)
}

pub async fn flooring_estimate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Estimate>, ApiError> {
    let form = read_form(&mut multipart).await?;

    let upload = form
        .file
        .filter(|upload| !upload.bytes.is_empty())
        .ok_or(ApiError::MissingFile)?;
    if upload.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::FileTooLarge { max_mb: state.config.max_upload_mb() });
    }
    let params = EstimateParams::parse(form.waste_pct.as_deref(), form.sqft_per_box.as_deref())?;
    let llm = state.llm()?;

    let estimate = estimate::estimate(llm.as_ref(), &upload, params, state.config.estimate_max_tokens).await?;
    Ok(Json(estimate))
}

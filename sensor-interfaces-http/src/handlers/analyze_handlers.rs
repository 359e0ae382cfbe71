use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use sensor_application::commands::analyze_commands;
use sensor_application::AppState;
use sensor_domain::DashboardView;

use crate::error::HttpError;
use crate::middleware::{authorize, decode_upload, UploadError};

pub async fn analyze_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<DashboardView>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let upload = decode_upload(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        error!("failed to decode upload: {}", err);
        state.metrics.record_analysis_error();
        match err {
            UploadError::TooLarge { .. } => HttpError::PayloadTooLarge(err.to_string()),
            UploadError::Gzip(_) => HttpError::BadRequest(err.to_string()),
        }
    })?;
    let view = analyze_commands::run_analysis(&state, &upload).await?;
    Ok(Json(view))
}

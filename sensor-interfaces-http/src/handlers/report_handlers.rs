use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use sensor_application::queries::report_queries;
use sensor_application::AppState;
use sensor_domain::REPORT_MIME;

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let report = report_queries::fetch_report(&state, id).await?;

    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(REPORT_MIME));
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|err| HttpError::Internal(err.to_string()))?,
    );
    Ok((response_headers, report.to_bytes()).into_response())
}

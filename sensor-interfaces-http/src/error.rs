use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound,
    PayloadTooLarge(String),
    Internal(String),
}

impl From<sensor_application::AppError> for HttpError {
    fn from(value: sensor_application::AppError) -> Self {
        match value {
            sensor_application::AppError::Unauthorized => HttpError::Unauthorized,
            sensor_application::AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            sensor_application::AppError::NotFound(_) => HttpError::NotFound,
            sensor_application::AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("bad request: {}", msg)),
            HttpError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            HttpError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

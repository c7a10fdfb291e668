use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// Input rejected by the loader.
    Invalid(Vec<String>),
    NotFound(String),
    /// The job exists but has no result (yet).
    NotReady(&'static str),
    /// The job ended without a timetable.
    NoResult(String),
}

#[derive(Serialize)]
struct Body {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error, details) = match self {
            ApiError::Invalid(msgs) => (StatusCode::BAD_REQUEST, "invalid input".to_string(), msgs),
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("job {id} not found"), vec![]),
            ApiError::NotReady(status) => (StatusCode::CONFLICT, format!("job is {status}"), vec![]),
            ApiError::NoResult(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, vec![]),
        };
        (code, Json(Body { error, details })).into_response()
    }
}

impl From<sched_core::LoadError> for ApiError {
    fn from(e: sched_core::LoadError) -> Self {
        ApiError::Invalid(e.messages().to_vec())
    }
}

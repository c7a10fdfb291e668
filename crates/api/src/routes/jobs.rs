use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use types::SolveResult;

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Job status", body = JobStatus),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobStatus>, ApiError> {
    state.jobs.get(&id).map(Json).ok_or(ApiError::NotFound(id))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Timetable, possibly partial or cancelled", body = SolveResult),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job still queued or running"),
            (status = 422, description = "Job ended without a timetable")
        )
    )]
pub async fn result(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SolveResult>, ApiError> {
    match state.jobs.get(&id) {
        None => Err(ApiError::NotFound(id)),
        Some(JobStatus::Solved { result }) => Ok(Json(result)),
        Some(s @ (JobStatus::Queued | JobStatus::Running)) => Err(ApiError::NotReady(s.name())),
        Some(JobStatus::Infeasible { message } | JobStatus::Cancelled { message } | JobStatus::Failed { message }) => {
            Err(ApiError::NoResult(message))
        }
    }
}

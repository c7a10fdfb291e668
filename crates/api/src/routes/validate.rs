use axum::Json;
use serde::Serialize;
use tracing::info;
use types::{Diagnostic, TimetableInput};

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    /// Empty when the input does not load.
    pub diagnostics: Vec<Diagnostic>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = TimetableInput,
    responses(
    (status = 200, description = "Validation result with pre-solve diagnostics", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(input): Json<TimetableInput>) -> Json<ValidationReport> {
    let report = match sched_core::load(&input) {
        Ok(problem) => ValidationReport {
            ok: true,
            errors: vec![],
            diagnostics: solver_csp::diagnose(&problem),
        },
        Err(e) => ValidationReport {
            ok: false,
            errors: e.messages().to_vec(),
            diagnostics: vec![],
        },
    };
    info!(ok = report.ok, errors = report.errors.len(), diagnostics = report.diagnostics.len(), "validated input");
    Json(report)
}

use axum::Json;
use serde_json::{json, Value};

#[utoipa::path(
         get,
         path = "/v1/health",
         responses((status = 200, description = "Service is up"))
     )]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

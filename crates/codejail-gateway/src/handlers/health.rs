//! Health probe.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

/// `GET /ping`
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

//! Session endpoints.

use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use axum::extract::{Path, State};
use axum::Json;
use codejail_core::SessionId;
use serde::Serialize;
use std::sync::Arc;

/// Session ID echoed back by create and delete.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
}

/// `POST /sessions`
pub async fn create(State(state): State<Arc<AppState>>) -> Result<Json<SessionResponse>> {
    let session = state.sessions().ensure(None).await?;
    Ok(Json(SessionResponse {
        session_id: session.id,
    }))
}

/// `DELETE /sessions/{id}`
///
/// Deleting a session that does not exist succeeds. Holds the session lock
/// while deleting.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<SessionResponse>> {
    let id = SessionId::parse(raw).map_err(|e| GatewayError::file_op(e.into()))?;
    let _guard = state.locks.acquire(&id).await;

    let sessions = state.sessions().clone();
    let target = id.clone();
    tokio::task::spawn_blocking(move || sessions.destroy(&target))
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?
        .map_err(GatewayError::file_op)?;

    Ok(Json(SessionResponse { session_id: id }))
}

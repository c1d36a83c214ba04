//! Workspace file endpoints.

use super::{body, query};
use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use codejail_sandbox::{ContentEncoding, FileEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Query string carrying a workspace path.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

/// Directory listing response.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<FileEntry>,
}

/// Body of `POST /files/write`.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub path: String,
    #[serde(default)]
    pub content: String,
    pub encoding: Option<String>,
}

/// Body of `POST /files/delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub path: String,
}

/// Path echoed back by write and delete.
#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: String,
}

impl PathResponse {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
        }
    }
}

/// `GET /files/list?path=<p>`
pub async fn list(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<ListResponse>> {
    let params = query(params)?;
    let items = state
        .files
        .list(params.path.as_deref())
        .await
        .map_err(GatewayError::file_op)?;
    Ok(Json(ListResponse { items }))
}

/// `GET /files/download?path=<p>`
pub async fn download(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<PathQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let params = query(params)?;
    let raw = params.path.unwrap_or_default();
    let bytes = state.files.read(&raw).await.map_err(GatewayError::file_op)?;

    let name = Path::new(&raw)
        .file_name()
        .map(|n| n.to_string_lossy().replace('"', ""))
        .unwrap_or_else(|| "download".to_string());
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];
    Ok((headers, bytes))
}

/// `POST /files/write`
pub async fn write(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<PathResponse>> {
    let request = body(payload)?;
    let encoding = match request.encoding.as_deref() {
        Some(raw) => raw.parse::<ContentEncoding>().map_err(GatewayError::file_op)?,
        None => ContentEncoding::default(),
    };

    let path = state
        .files
        .write(&request.path, &request.content, encoding)
        .await
        .map_err(GatewayError::file_op)?;
    Ok(Json(PathResponse::new(&path)))
}

/// `POST /files/delete`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<PathResponse>> {
    let request = body(payload)?;
    let path = state
        .files
        .delete(&request.path)
        .await
        .map_err(GatewayError::file_op)?;
    Ok(Json(PathResponse::new(&path)))
}

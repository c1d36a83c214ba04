//! Shared harness for the integration tests.
//!
//! Requests go through the real router in-process, against a fresh
//! workspace root in a temporary directory.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use codejail_core::Config;
use codejail_gateway::{router, AppState};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a throwaway workspace.
pub struct Harness {
    pub state: Arc<AppState>,
    _dir: TempDir,
}

impl Harness {
    /// Harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Harness with configuration tweaks applied before startup.
    pub fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut config = Config::default();
        config.workspace.root = dir.path().to_path_buf();
        config.exec.kill_grace_ms = 500;
        tweak(&mut config);
        let state = Arc::new(AppState::new(config).expect("state"));
        Self { state, _dir: dir }
    }

    /// Canonical workspace root.
    pub fn root(&self) -> &Path {
        self.state.files.resolver().root()
    }

    /// Directory of a session under the workspace root.
    pub fn session_dir(&self, id: &str) -> PathBuf {
        self.root().join(".sessions").join(id)
    }

    /// Send a request, returning status and raw body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).expect("json reply"))
    }

    /// GET and return the raw body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).expect("request")).await
    }

    /// DELETE and decode the JSON reply.
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self
            .send(Request::delete(uri).body(Body::empty()).expect("request"))
            .await;
        (status, serde_json::from_slice(&bytes).expect("json reply"))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a binary can be found on `PATH`.
pub fn has_binary(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}

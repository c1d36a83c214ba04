//! Command and code execution endpoints.

use super::body;
use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use codejail_core::SessionId;
use codejail_sandbox::{CodeOutcome, CommandLine, ExecutionResult, Language, SandboxError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Body of `POST /command`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Shell string or argv array.
    pub command: Option<CommandLine>,

    /// Timeout in seconds.
    pub timeout: Option<u64>,

    /// Session to run in; minted when absent.
    pub session_id: Option<String>,
}

/// Body of `POST /code`.
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    /// Language identifier; defaults to python.
    pub language: Option<String>,

    /// Source snippet.
    #[serde(default)]
    pub code: String,

    /// Timeout in seconds, shared by compile and run.
    pub timeout: Option<u64>,

    /// Session to run in; minted when absent.
    pub session_id: Option<String>,
}

/// Execution result annotated with its session.
#[derive(Debug, Serialize)]
pub struct ExecResponse {
    #[serde(flatten)]
    pub result: ExecutionResult,

    pub session_id: SessionId,
}

impl From<CodeOutcome> for ExecResponse {
    fn from(outcome: CodeOutcome) -> Self {
        Self {
            result: outcome.result,
            session_id: outcome.session.id,
        }
    }
}

fn timeout_for(state: &AppState, requested: Option<u64>) -> Result<Duration> {
    if requested == Some(0) {
        return Err(GatewayError::InvalidParams("timeout must be at least 1 second".into()));
    }
    Ok(Duration::from_secs(state.config.effective_timeout(requested)))
}

/// `POST /command`
pub async fn command(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<ExecResponse>> {
    let request = body(payload)?;
    let exec = &state.config.exec;

    let command = request
        .command
        .ok_or_else(|| SandboxError::invalid_request("missing command"))?;
    let argv = command.into_argv(&exec.shell, &exec.shell_flag, exec.allow_shell_commands)?;
    let timeout = timeout_for(&state, request.timeout)?;
    let id = SessionId::parse_or_generate(request.session_id.as_deref()).map_err(SandboxError::from)?;

    let _guard = state.locks.acquire(&id).await;
    let outcome = state.runner.run_command(id, &argv, timeout).await?;
    info!(
        "Command in session {} exited {} after {}ms",
        outcome.session.id, outcome.result.exit_code, outcome.result.duration_ms
    );
    Ok(Json(outcome.into()))
}

/// `POST /code`
pub async fn code(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<ExecResponse>> {
    let request = body(payload)?;

    let language = match request.language.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Language::parse(raw)?,
        _ => Language::default(),
    };
    let timeout = timeout_for(&state, request.timeout)?;
    let id = SessionId::parse_or_generate(request.session_id.as_deref()).map_err(SandboxError::from)?;

    let _guard = state.locks.acquire(&id).await;
    let outcome = state
        .runner
        .run_code(id, language, &request.code, timeout)
        .await?;
    info!(
        "{} code in session {} exited {} at {:?} stage after {}ms",
        language,
        outcome.session.id,
        outcome.result.exit_code,
        outcome.stage,
        outcome.result.duration_ms
    );
    Ok(Json(outcome.into()))
}

//! HTTP gateway server.

use crate::error::GatewayError;
use crate::handlers;
use crate::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use codejail_core::{Config, PathResolver};
use codejail_sandbox::{CodeRunner, ResourceLimits, SessionLocks, SessionStore, WorkspaceFiles};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState {
    /// Effective configuration, immutable for the process lifetime.
    pub config: Arc<Config>,

    /// File operations over the workspace root.
    pub files: WorkspaceFiles,

    /// Session-scoped execution.
    pub runner: CodeRunner,

    /// Per-session locks; no-ops unless `exec.serialize_sessions` is set.
    pub locks: SessionLocks,
}

impl AppState {
    /// Build the state for an existing workspace root.
    pub fn new(config: Config) -> Result<Self> {
        let resolver = PathResolver::new(&config.workspace.root)?;
        let limits = ResourceLimits::from_config(&config.exec);
        let runner = CodeRunner::new(SessionStore::new(resolver.clone()), limits)
            .with_env(config.exec.env.clone());

        Ok(Self {
            files: WorkspaceFiles::new(resolver),
            runner,
            locks: SessionLocks::new(config.exec.serialize_sessions),
            config: Arc::new(config),
        })
    }

    /// The session store.
    pub fn sessions(&self) -> &SessionStore {
        self.runner.sessions()
    }
}

/// Build the router with every endpoint.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/ping", get(handlers::health::ping))
        .route("/files/list", get(handlers::files::list))
        .route("/files/download", get(handlers::files::download))
        .route("/files/write", post(handlers::files::write))
        .route("/files/delete", post(handlers::files::delete))
        .route("/sessions", post(handlers::sessions::create))
        .route("/sessions/:id", delete(handlers::sessions::destroy))
        .route("/command", post(handlers::exec::command))
        .route("/code", post(handlers::exec::code))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP gateway server.
pub struct Gateway {
    state: Arc<AppState>,
}

impl Gateway {
    /// Create a new gateway from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// Shared handler state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The bind address from configuration.
    ///
    /// The host is an IPv4 or IPv6 literal; IPv6 may be bracketed.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let server = &self.state.config.server;
        let host = server.host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host.parse().map_err(|e| {
            GatewayError::InvalidParams(format!("bind address {:?}: {}", server.host, e))
        })?;
        Ok(SocketAddr::new(ip, server.port))
    }

    /// Run until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves, then finish in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.bind_address()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(
            "Serving on http://{} with workspace {}",
            listener.local_addr()?,
            self.state.files.resolver().root().display()
        );

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        if let Some(ref mut t) = term {
            t.recv().await;
        } else {
            std::future::pending::<()>().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down...");
        }
        _ = terminate => {
            info!("SIGTERM received, shutting down...");
        }
    }
}

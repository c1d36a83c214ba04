//! Session-scoped command and code execution.

use crate::executor::{CommandExecutor, ExecutionContext, ExecutionResult};
use crate::language::{prepare, Language};
use crate::limits::ResourceLimits;
use crate::session::{Session, SessionStore};
use crate::Result;
use codejail_core::SessionId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Which phase produced a [`CodeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

/// Result of one command or code execution.
#[derive(Debug, Clone)]
pub struct CodeOutcome {
    /// Session the execution ran in.
    pub session: Session,

    /// Phase whose result this is.
    pub stage: Stage,

    /// Process outcome.
    pub result: ExecutionResult,
}

/// Runs commands and snippets inside session directories.
#[derive(Debug, Clone)]
pub struct CodeRunner {
    sessions: SessionStore,
    limits: ResourceLimits,
    env: HashMap<String, String>,
}

impl CodeRunner {
    /// Create a runner over a session store.
    pub fn new(sessions: SessionStore, limits: ResourceLimits) -> Self {
        Self {
            sessions,
            limits,
            env: HashMap::new(),
        }
    }

    /// Environment overrides applied to every process.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// The session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn executor(&self, session: &Session, timeout: Duration) -> CommandExecutor {
        let limits = self.limits.with_wall_time(timeout.as_secs());
        CommandExecutor::new(
            ExecutionContext::new(&session.dir)
                .with_limits(limits)
                .with_envs(self.env.clone()),
        )
    }

    /// Run an argv in the session's directory, creating the session if needed.
    pub async fn run_command(&self, id: SessionId, argv: &[String], timeout: Duration) -> Result<CodeOutcome> {
        let session = self.sessions.ensure_id(id).await?;
        debug!("Running command in session {}", session.id);

        let result = self.executor(&session, timeout).run_with_timeout(argv, timeout).await?;
        Ok(CodeOutcome {
            session,
            stage: Stage::Run,
            result,
        })
    }

    /// Write a snippet into the session and run it.
    ///
    /// For compiled languages the compile and run phases share one deadline;
    /// a failed compile is returned as the outcome and nothing is run.
    pub async fn run_code(
        &self,
        id: SessionId,
        language: Language,
        code: &str,
        timeout: Duration,
    ) -> Result<CodeOutcome> {
        let deadline = Instant::now() + timeout;
        let session = self.sessions.ensure_id(id).await?;
        let jail = self.sessions.resolver().scoped(&session.dir)?;
        let plan = prepare(language, code, &jail).await?;
        let executor = self.executor(&session, timeout);

        if let Some(compile) = &plan.compile {
            let result = executor.run_until(compile, deadline).await?;
            if !result.success() {
                info!(
                    "Compile failed in session {}: exit_code={}",
                    session.id, result.exit_code
                );
                return Ok(CodeOutcome {
                    session,
                    stage: Stage::Compile,
                    result,
                });
            }
        }

        let result = executor.run_until(&plan.run, deadline).await?;
        Ok(CodeOutcome {
            session,
            stage: Stage::Run,
            result,
        })
    }
}

//! Process execution with a wall-clock deadline.

use crate::error::SandboxError;
use crate::limits::ResourceLimits;
use crate::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Exit code reported for a process killed on timeout.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Appended to stderr when a process is killed on timeout.
pub const TIMEOUT_MARKER: &str = "\nprocess timeout";

/// Appended to a stream once it exceeds the capture limit.
pub const TRUNCATION_MARKER: &str = "\n[output truncated]\n";

/// A command as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandLine {
    /// A string interpreted by the system shell.
    Shell(String),

    /// A literal argv sequence.
    Argv(Vec<String>),
}

impl CommandLine {
    /// Whether there is nothing to run.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Shell(s) => s.trim().is_empty(),
            Self::Argv(argv) => argv.first().map_or(true, |p| p.is_empty()),
        }
    }

    /// Convert into the argv to spawn.
    ///
    /// Shell strings become `[shell, flag, command]` when `allow_shell` is set
    /// and are rejected otherwise.
    pub fn into_argv(self, shell: &str, shell_flag: &str, allow_shell: bool) -> Result<Vec<String>> {
        if self.is_empty() {
            return Err(SandboxError::invalid_request("missing command"));
        }
        match self {
            Self::Shell(command) if allow_shell => {
                Ok(vec![shell.to_string(), shell_flag.to_string(), command])
            }
            Self::Shell(_) => Err(SandboxError::invalid_request(
                "shell commands are disabled; pass command as an argv array",
            )),
            Self::Argv(argv) => Ok(argv),
        }
    }
}

/// Context for command execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Working directory.
    pub cwd: PathBuf,

    /// Environment overrides on top of the inherited environment.
    pub env: HashMap<String, String>,

    /// Limits for the execution.
    pub limits: ResourceLimits,
}

impl ExecutionContext {
    /// Create a new execution context with the given working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: HashMap::new(),
            limits: ResourceLimits::default(),
        }
    }

    /// Set the resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables.
    pub fn with_envs(mut self, vars: HashMap<String, String>) -> Self {
        self.env.extend(vars);
        self
    }
}

/// Outcome of one process execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code; [`TIMEOUT_EXIT_CODE`] when killed on timeout.
    pub exit_code: i32,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process was killed because the deadline passed.
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Check if execution was successful.
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Runs external commands in a working directory under a deadline.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    context: ExecutionContext,
}

impl CommandExecutor {
    /// Create a new command executor with the given context.
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Get the execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run `argv` with the context's wall time limit.
    pub async fn run(&self, argv: &[String]) -> Result<ExecutionResult> {
        self.run_with_timeout(argv, self.context.limits.wall_time()).await
    }

    /// Run `argv`, killing it once `timeout` elapses.
    pub async fn run_with_timeout(&self, argv: &[String], timeout: Duration) -> Result<ExecutionResult> {
        self.run_until(argv, Instant::now() + timeout).await
    }

    /// Run `argv`, killing it at `deadline`.
    ///
    /// The deadline covers both process exit and draining its pipes. A
    /// launch failure is an error; every outcome after a successful spawn,
    /// including timeout, is an [`ExecutionResult`].
    pub async fn run_until(&self, argv: &[String], deadline: Instant) -> Result<ExecutionResult> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| SandboxError::invalid_request("missing command"))?;

        debug!("Executing {:?} in {}", argv, self.context.cwd.display());
        let start = Instant::now();

        let mut std_cmd = std::process::Command::new(program);
        std_cmd
            .args(args)
            .current_dir(&self.context.cwd)
            .envs(&self.context.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group so a timeout can take down every descendant
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = Command::from(std_cmd);
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            warn!("Failed to launch {}: {}", program, e);
            SandboxError::launch_failed(program.clone(), e)
        })?;
        let pid = child.id();

        let limit = self.context.limits.output_size_bytes;
        let stdout = CaptureBuffer::new(limit);
        let stderr = CaptureBuffer::new(limit);
        let mut stdout_task = spawn_pump(child.stdout.take(), stdout.clone());
        let mut stderr_task = spawn_pump(child.stderr.take(), stderr.clone());

        let finished = tokio::time::timeout_at(deadline, async {
            let status = child.wait().await;
            let _ = (&mut stdout_task).await;
            let _ = (&mut stderr_task).await;
            status
        })
        .await;

        let (exit_code, timed_out) = match finished {
            Ok(status) => (exit_code_of(status?), false),
            Err(_) => {
                warn!(
                    "Command {:?} exceeded its deadline after {}ms, killing",
                    program,
                    start.elapsed().as_millis()
                );
                kill_process_group(pid, &mut child).await;

                let grace = self.context.limits.kill_grace();
                let drained = tokio::time::timeout(grace, async {
                    let _ = (&mut stdout_task).await;
                    let _ = (&mut stderr_task).await;
                })
                .await;
                if drained.is_err() {
                    // Something outside the group still holds a pipe open
                    warn!("Output pipes still open {}ms after kill", grace.as_millis());
                    stdout_task.abort();
                    stderr_task.abort();
                }
                (TIMEOUT_EXIT_CODE, true)
            }
        };

        let mut stderr = stderr.into_string();
        if timed_out {
            stderr.push_str(TIMEOUT_MARKER);
        }

        let result = ExecutionResult {
            exit_code,
            stdout: stdout.into_string(),
            stderr,
            duration_ms: start.elapsed().as_millis() as u64,
            timed_out,
        };
        info!(
            "Command {:?} finished: exit_code={} duration_ms={}",
            program, result.exit_code, result.duration_ms
        );
        Ok(result)
    }
}

/// Map an exit status to an exit code, keeping [`TIMEOUT_EXIT_CODE`] reserved.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    TIMEOUT_EXIT_CODE
}

#[cfg(unix)]
async fn kill_process_group(pid: Option<u32>, child: &mut Child) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => warn!("Failed to kill process group {}: {}", pid, e),
        }
    }
    reap(child).await;
}

#[cfg(not(unix))]
async fn kill_process_group(_pid: Option<u32>, child: &mut Child) {
    reap(child).await;
}

async fn reap(child: &mut Child) {
    // Already reaped when the deadline hit during pipe drain
    if let Err(e) = child.kill().await {
        debug!("Child already exited before kill: {}", e);
    }
}

/// Size-capped output sink shared with its reader task.
///
/// Shared so whatever was read before a reader is aborted survives.
#[derive(Debug, Clone)]
struct CaptureBuffer {
    inner: Arc<Mutex<Captured>>,
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
    limit: usize,
}

impl CaptureBuffer {
    fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Captured {
                limit,
                ..Default::default()
            })),
        }
    }

    fn push(&self, chunk: &[u8]) {
        let mut captured = self.inner.lock();
        let room = captured.limit.saturating_sub(captured.bytes.len());
        if chunk.len() > room {
            captured.truncated = true;
        }
        let take = chunk.len().min(room);
        captured.bytes.extend_from_slice(&chunk[..take]);
    }

    fn into_string(self) -> String {
        let captured = self.inner.lock();
        let mut text = String::from_utf8_lossy(&captured.bytes).into_owned();
        if captured.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

fn spawn_pump<R>(reader: Option<R>, sink: CaptureBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut reader) = reader else {
            return;
        };
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                // Keep reading past the cap so the child never blocks on a full pipe
                Ok(n) => sink.push(&chunk[..n]),
                Err(e) => {
                    warn!("Error reading stream: {}", e);
                    break;
                }
            }
        }
    })
}

//! Child process execution with line capture and deadline enforcement
//!
//! Output is drained line-by-line from the moment the child starts, so a
//! killed process still yields everything it wrote before the deadline.
//! The exit-vs-deadline race resolves at a single `select!` point: only
//! one of the two branches ever acts.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::common::{Error, Result};

/// Description of a single child process invocation
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Binary name or path; bare names are resolved through PATH
    pub binary: String,
    /// Argument list
    pub args: Vec<String>,
    /// Working directory for the child
    pub current_dir: Option<PathBuf>,
    /// Environment overrides applied on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Deadline after which the child is killed; None runs to completion
    pub timeout: Option<Duration>,
}

impl ProcessSpec {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a single space-separated argument string, split on
    /// whitespace. No shell quoting rules are applied beyond that.
    pub fn args_str(mut self, args: &str) -> Self {
        self.args.extend(args.split_whitespace().map(String::from));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Everything observed from one run of a child process
#[derive(Debug)]
pub struct CapturedOutput {
    /// Lines written to stdout, in order
    pub stdout: Vec<String>,
    /// Lines written to stderr, in order
    pub stderr: Vec<String>,
    /// Exit status of a natural exit; None when the run was killed
    pub exit_code: Option<i32>,
    /// True when the deadline fired and the child was terminated
    pub was_killed: bool,
    /// Wall-clock time from spawn to exit-or-kill
    pub elapsed: Duration,
}

impl CapturedOutput {
    /// All captured lines, stdout first then stderr
    pub fn combined(&self) -> Vec<String> {
        let mut lines = self.stdout.clone();
        lines.extend(self.stderr.iter().cloned());
        lines
    }
}

/// Spawns child processes and supervises their deadlines
pub struct ProcessRunner {
    kill_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            kill_grace: Duration::from_millis(500),
        }
    }

    /// Override the grace period between the termination signal and the
    /// forced reap
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Run the process described by `spec` to completion or deadline
    pub async fn run(&self, spec: &ProcessSpec) -> Result<CapturedOutput> {
        let binary = resolve_binary(&spec.binary)?;

        let mut cmd = Command::new(&binary);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        tracing::debug!(binary = %binary.display(), args = ?spec.args, "spawning");

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::spawn(&spec.binary, &e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::spawn(&spec.binary, "failed to open stdout pipe"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::spawn(&spec.binary, "failed to open stderr pipe"))?;

        let (stdout_buf, stdout_task) = spawn_reader(stdout);
        let (stderr_buf, stderr_task) = spawn_reader(stderr);

        let (exit_code, was_killed, elapsed) = match spec.timeout {
            Some(deadline) => {
                tokio::select! {
                    status = child.wait() => {
                        let elapsed = started.elapsed();
                        (status?.code(), false, elapsed)
                    }
                    _ = tokio::time::sleep(deadline) => {
                        let elapsed = started.elapsed();
                        tracing::debug!(secs = deadline.as_secs(), "deadline fired, killing child");
                        self.kill_and_reap(&mut child).await?;
                        (None, true, elapsed)
                    }
                }
            }
            None => {
                let status = child.wait().await?;
                (status.code(), false, started.elapsed())
            }
        };

        // After a kill the drain is bounded: a grandchild can hold the
        // pipe open indefinitely, and lines read so far are still in the
        // buffers.
        let drain_bound = if was_killed {
            Some(self.kill_grace)
        } else {
            None
        };
        let mut stdout_lines = drain(stdout_buf, stdout_task, drain_bound).await;
        let stderr_lines = drain(stderr_buf, stderr_task, drain_bound).await;

        if was_killed {
            if let Some(deadline) = spec.timeout {
                stdout_lines.push(format!(
                    "Process took more than {} seconds to complete. Process Killed!",
                    deadline.as_secs()
                ));
            }
        }

        Ok(CapturedOutput {
            stdout: stdout_lines,
            stderr: stderr_lines,
            exit_code,
            was_killed,
            elapsed,
        })
    }

    /// Send the termination signal and reap within the grace period.
    ///
    /// A child that already exited is not a failure: the signal simply
    /// has nothing left to do.
    async fn kill_and_reap(&self, child: &mut Child) -> Result<()> {
        match child.start_kill() {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
                tracing::debug!("child already exited before the kill");
            }
            Err(e) => return Err(Error::Kill(e.to_string())),
        }

        match tokio::time::timeout(self.kill_grace, child.wait()).await {
            Ok(status) => {
                status?;
            }
            Err(_) => {
                tracing::warn!("child did not exit within the kill grace period");
            }
        }
        Ok(())
    }
}

/// Spawn a task collecting lines from a child stream until EOF
fn spawn_reader<R>(stream: R) -> (Arc<Mutex<Vec<String>>>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buf);
    let handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            sink.lock().await.push(line);
        }
    });
    (buf, handle)
}

/// Wait for a reader task and take its buffer.
///
/// With a bound, a reader still blocked on the pipe is abandoned once the
/// bound elapses; whatever it collected is kept.
async fn drain(
    buf: Arc<Mutex<Vec<String>>>,
    mut handle: JoinHandle<()>,
    bound: Option<Duration>,
) -> Vec<String> {
    match bound {
        Some(limit) => {
            if tokio::time::timeout(limit, &mut handle).await.is_err() {
                handle.abort();
            }
        }
        None => {
            let _ = handle.await;
        }
    }
    let mut lines = buf.lock().await;
    std::mem::take(&mut *lines)
}

/// Resolve a binary name to a runnable path
///
/// Bare names go through PATH; anything with a directory component is
/// checked as given.
fn resolve_binary(name: &str) -> Result<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(Error::binary_not_found(name, &[name]));
    }

    which::which(name).map_err(|_| {
        let path = std::env::var("PATH").unwrap_or_default();
        Error::binary_not_found(name, &[path.as_str()])
    })
}

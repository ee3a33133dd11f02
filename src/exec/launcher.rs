// src/exec/launcher.rs

//! Running one cluster process to completion.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::capture::{finish_opt, CapturedStream};
use super::resolve::check_program;
use super::{CancelSignal, ExitOutcome, LaunchSpec, TerminationStatus};

/// How long to keep draining output pipes after the child exited.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// The process could not be started (as opposed to starting and then
/// failing, which is a normal [`ExitOutcome`]).
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("executable '{0}' not found")]
    NotFound(String),

    #[error("could not spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
}

pub type LaunchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ExitOutcome, LaunchError>> + Send + 'a>>;

/// Trait abstracting how a [`LaunchSpec`] is turned into a running process.
///
/// Production code uses [`ShellLauncher`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait Launcher: Send + Sync + 'static {
    /// Run `spec` until it terminates.
    ///
    /// When `cancel` fires the implementation must stop the process and
    /// still resolve, with `ExitOutcome::cancelled` set.
    fn launch(&self, spec: LaunchSpec, cancel: CancelSignal) -> LaunchFuture<'_>;
}

/// Runs each spec through the platform shell.
#[derive(Debug, Clone, Default)]
pub struct ShellLauncher;

impl ShellLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Run `spec` to completion with no way to cancel it.
    pub async fn run(&self, spec: LaunchSpec) -> Result<ExitOutcome, LaunchError> {
        run_process(spec, CancelSignal::never()).await
    }
}

impl Launcher for ShellLauncher {
    fn launch(&self, spec: LaunchSpec, cancel: CancelSignal) -> LaunchFuture<'_> {
        Box::pin(run_process(spec, cancel))
    }
}

fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

async fn run_process(spec: LaunchSpec, mut cancel: CancelSignal) -> Result<ExitOutcome, LaunchError> {
    check_program(spec.command(), spec.environment())?;

    info!(
        role = %spec.role(),
        index = spec.index(),
        cmd = %spec.command(),
        env = ?spec.environment(),
        "starting process"
    );

    let mut cmd = shell_command(spec.command());
    cmd.envs(spec.environment())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(LaunchError::Spawn)?;
    debug!(process = %spec, pid = ?child.id(), "process spawned");

    let stdout = child
        .stdout
        .take()
        .map(|s| CapturedStream::spawn(s, &spec, "stdout"));
    let stderr = child
        .stderr
        .take()
        .map(|s| CapturedStream::spawn(s, &spec, "stderr"));

    // Either the process exits on its own (normal case), or the run is
    // cancelled and we kill it.
    let (status, cancelled) = tokio::select! {
        status = child.wait() => (status.map_err(LaunchError::Wait)?, false),

        _ = cancel.cancelled() => {
            info!(process = %spec, "cancellation requested; killing process");
            if let Err(e) = child.start_kill() {
                warn!(process = %spec, error = %e, "failed to kill process on cancellation");
            }
            (child.wait().await.map_err(LaunchError::Wait)?, true)
        }
    };

    let outcome = ExitOutcome {
        status: TerminationStatus::from(status),
        stdout: finish_opt(stdout, OUTPUT_GRACE).await,
        stderr: finish_opt(stderr, OUTPUT_GRACE).await,
        cancelled,
    };

    debug!(process = %spec, status = %outcome.status, cancelled, "process reaped");
    Ok(outcome)
}

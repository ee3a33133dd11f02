// src/cluster/worker.rs

//! One supervised process per worker.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::{ClusterError, Result};
use crate::exec::{CancelSignal, ExitOutcome, LaunchError, LaunchSpec, Launcher};
use crate::types::{ProcessRole, WorkerState};

/// Supervisory reference to one in-flight process.
///
/// Created by [`ClusterOrchestrator::start_all`](super::ClusterOrchestrator::start_all)
/// and consumed by [`join_all`](super::join_all).
#[derive(Debug)]
pub struct WorkerHandle {
    role: ProcessRole,
    index: usize,
    command: String,
    state: watch::Receiver<WorkerState>,
    join: JoinHandle<std::result::Result<ExitOutcome, LaunchError>>,
}

/// What `join_all` learned about one worker.
#[derive(Debug)]
pub struct WorkerReport {
    pub role: ProcessRole,
    pub index: usize,
    pub command: String,
    pub result: std::result::Result<ExitOutcome, LaunchError>,
}

/// Marks the worker `Terminated` however the task ends, including by panic.
struct TerminateOnDrop(watch::Sender<WorkerState>);

impl Drop for TerminateOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(WorkerState::Terminated);
    }
}

impl WorkerHandle {
    /// Dispatch `spec` on its own tokio task.
    pub(crate) fn spawn<L: Launcher>(
        launcher: Arc<L>,
        spec: LaunchSpec,
        cancel: CancelSignal,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(WorkerState::default());
        let role = spec.role();
        let index = spec.index();
        let command = spec.command().to_string();

        let join = tokio::spawn(async move {
            let state = TerminateOnDrop(state_tx);
            state.0.send_replace(WorkerState::Running);

            let label = spec.to_string();
            let result = launcher.launch(spec, cancel).await;
            log_result(&label, &result);

            drop(state);
            result
        });

        Self {
            role,
            index,
            command,
            state: state_rx,
            join,
        }
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// The worker task has finished (its process has been reaped).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the worker has progressed at least to `target`.
    pub async fn reached(&mut self, target: WorkerState) {
        // The sender only goes away after publishing `Terminated`, which
        // satisfies every target.
        let _ = self.state.wait_for(|s| *s >= target).await;
    }

    pub(crate) async fn join(self) -> Result<WorkerReport> {
        let Self {
            role,
            index,
            command,
            join,
            ..
        } = self;

        match join.await {
            Ok(result) => Ok(WorkerReport {
                role,
                index,
                command,
                result,
            }),
            Err(e) => Err(ClusterError::WorkerPanicked {
                role,
                index,
                message: e.to_string(),
            }),
        }
    }
}

fn log_result(label: &str, result: &std::result::Result<ExitOutcome, LaunchError>) {
    match result {
        Ok(outcome) if outcome.cancelled => {
            info!(process = %label, status = %outcome.status, "process stopped by cancellation");
        }
        Ok(outcome) if outcome.success() => {
            info!(process = %label, status = %outcome.status, "process exited");
        }
        Ok(outcome) => {
            warn!(
                process = %label,
                status = %outcome.status,
                exit_code = ?outcome.status.code(),
                stderr_tail = %tail(&outcome.stderr, 5),
                "process terminated abnormally"
            );
        }
        Err(e) => {
            error!(process = %label, error = %e, "process failed to start");
        }
    }
}

/// Last `n` lines of captured output, for log context.
fn tail(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
        assert_eq!(tail("", 3), "");
    }
}

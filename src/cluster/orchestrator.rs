// src/cluster/orchestrator.rs

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::errors::{ClusterError, Result};
use crate::exec::{Canceller, LaunchSpec, Launcher, ShellLauncher};
use crate::types::ProcessRole;

use super::summary::check_started;
use super::worker::{WorkerHandle, WorkerReport};

/// Build the node and companion launch specs for every cluster index.
///
/// Returns exactly `2 * size` specs, node before companion for each index.
/// Callers must not rely on this order for launch order.
pub fn build_specs(config: &ClusterConfig) -> Vec<LaunchSpec> {
    let mut specs = Vec::with_capacity(config.size() * 2);

    for index in 0..config.size() {
        let port = config.port_for(index);

        let node = config.node().render(index, port);
        specs.push(LaunchSpec::new(ProcessRole::Node, index, node.cmd, node.env));

        let companion = config.companion().render(index, port);
        let mut env = companion.env;
        env.insert(config.port_env_var().to_string(), port.to_string());
        specs.push(LaunchSpec::new(
            ProcessRole::Companion,
            index,
            companion.cmd,
            env,
        ));
    }

    specs
}

/// Launches a cluster and supervises its processes.
///
/// Every process runs on its own tokio task. The orchestrator also owns the
/// cancellation switch shared by all of them.
pub struct ClusterOrchestrator<L: Launcher = ShellLauncher> {
    launcher: Arc<L>,
    canceller: Canceller,
}

impl ClusterOrchestrator<ShellLauncher> {
    pub fn new() -> Self {
        Self::with_launcher(ShellLauncher::new())
    }
}

impl Default for ClusterOrchestrator<ShellLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> ClusterOrchestrator<L> {
    pub fn with_launcher(launcher: L) -> Self {
        Self::with_shared_launcher(Arc::new(launcher))
    }

    /// Use a launcher the caller keeps a reference to (handy for fakes that
    /// record what they were asked to run).
    pub fn with_shared_launcher(launcher: Arc<L>) -> Self {
        Self {
            launcher,
            canceller: Canceller::new(),
        }
    }

    /// Dispatch every process of the cluster and return their handles.
    ///
    /// Returns as soon as all `2 * size` workers are dispatched, not when any
    /// of them completes. Must be called from within a tokio runtime.
    pub fn start_all(&self, config: &ClusterConfig) -> Vec<WorkerHandle> {
        let specs = build_specs(config);
        info!(
            size = config.size(),
            processes = specs.len(),
            base_port = config.base_port(),
            "starting cluster"
        );

        specs
            .into_iter()
            .map(|spec| {
                debug!(process = %spec, cmd = %spec.command(), "dispatching worker");
                WorkerHandle::spawn(Arc::clone(&self.launcher), spec, self.canceller.subscribe())
            })
            .collect()
    }

    /// Ask every running process of this orchestrator to stop.
    ///
    /// Workers dispatched afterwards are stopped right after they start.
    pub fn cancel(&self) {
        info!("cancelling cluster run");
        self.canceller.cancel();
    }

    /// A clone of the cancellation switch, for use from other tasks
    /// (deadline timers, signal handlers).
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }
}

/// Wait for every handle to terminate.
///
/// Handles may complete in any order, including before this is called. A
/// process exiting non-zero or failing to start never stops the wait; every
/// handle is joined and reported. Only a panicking worker produces an error,
/// and only after all other handles were joined.
pub async fn join_all(handles: Vec<WorkerHandle>) -> Result<Vec<WorkerReport>> {
    let total = handles.len();
    let mut reports = Vec::with_capacity(total);
    let mut panicked: Option<ClusterError> = None;

    for handle in handles {
        match handle.join().await {
            Ok(report) => reports.push(report),
            Err(e) => {
                if panicked.is_none() {
                    panicked = Some(e);
                }
            }
        }
    }

    debug!(total, joined = reports.len(), "all workers joined");

    match panicked {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

/// Wait for every handle, but give up at the first worker that could not
/// start its process (or panicked).
///
/// Results are taken in completion order, so a launch failure is returned
/// while its siblings are still running. Those siblings are left alone: their
/// tasks keep running detached, and the orchestrator's `cancel` still reaches
/// them.
pub async fn join_fail_fast(handles: Vec<WorkerHandle>) -> Result<Vec<WorkerReport>> {
    let total = handles.len();
    let mut waiting = JoinSet::new();
    for handle in handles {
        waiting.spawn(handle.join());
    }

    let mut reports = Vec::with_capacity(total);
    while let Some(joined) = waiting.join_next().await {
        let report = match joined {
            Ok(report) => report?,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // Aborted: only when the set itself is dropped.
            Err(_) => continue,
        };
        reports.push(check_started(report)?);
    }

    debug!(total, joined = reports.len(), "all workers joined");
    Ok(reports)
}

// src/lib.rs

pub mod cli;
pub mod cluster;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::cluster::{build_specs, join_fail_fast, ClusterOrchestrator, ClusterSummary};
use crate::config::{load_from_path, ClusterConfig, RawClusterFile};
use crate::exec::{Canceller, Launcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file or compiled-in defaults, plus CLI overrides)
/// - the orchestrator with the real shell launcher
/// - the optional deadline
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let orchestrator = ClusterOrchestrator::new();

    // Ctrl-C → kill every child, then join as usual.
    let ctrl_c = {
        let canceller = orchestrator.canceller();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received");
            canceller.cancel();
        })
    };

    let result = run_cluster(&orchestrator, &cfg).await;
    ctrl_c.abort();

    let summary = result?;
    if summary.abnormal > 0 {
        warn!(abnormal = summary.abnormal, "some processes terminated abnormally");
    }
    Ok(())
}

/// Start every process of `cfg`, wait for all of them and summarise.
///
/// If the config carries a timeout, processes still running when it expires
/// are killed. The first process that fails to start ends the run right away
/// with [`ClusterError::LaunchFailed`](errors::ClusterError::LaunchFailed);
/// processes that did start are left running.
pub async fn run_cluster<L: Launcher>(
    orchestrator: &ClusterOrchestrator<L>,
    cfg: &ClusterConfig,
) -> errors::Result<ClusterSummary> {
    let handles = orchestrator.start_all(cfg);

    let deadline = cfg
        .timeout()
        .map(|timeout| spawn_deadline(timeout, orchestrator.canceller()));

    let joined = join_fail_fast(handles).await;
    if let Some(deadline) = deadline {
        deadline.abort();
    }

    let reports = match joined {
        Ok(reports) => reports,
        Err(err) => {
            error!(error = %err, "cluster run failed");
            return Err(err);
        }
    };

    let summary = ClusterSummary::from_reports(&reports);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        abnormal = summary.abnormal,
        cancelled = summary.cancelled,
        "cluster finished"
    );
    Ok(summary)
}

fn spawn_deadline(timeout: std::time::Duration, canceller: Canceller) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!(?timeout, "cluster deadline reached; stopping remaining processes");
        canceller.cancel();
    })
}

/// Compiled-in defaults, optionally replaced by `--config`, then patched with
/// the remaining CLI flags and validated.
pub fn resolve_config(args: &CliArgs) -> errors::Result<ClusterConfig> {
    let mut raw = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading cluster config");
            load_from_path(path)?
        }
        None => RawClusterFile::default(),
    };

    if let Some(size) = args.size {
        raw.cluster.size = size;
    }
    if let Some(port) = args.base_port {
        raw.cluster.base_port = port;
    }
    if let Some(secs) = args.timeout {
        raw.cluster.timeout = Some(format!("{secs}s"));
    }

    ClusterConfig::try_from(raw)
}

/// Simple dry-run output: print every process that would be launched.
fn print_dry_run(cfg: &ClusterConfig) {
    for line in dry_run_lines(cfg) {
        println!("{line}");
    }
    debug!("dry-run complete (no execution)");
}

fn dry_run_lines(cfg: &ClusterConfig) -> Vec<String> {
    let mut lines = vec![
        "clusterbench dry-run".to_string(),
        format!("  cluster.size = {}", cfg.size()),
        format!("  cluster.base_port = {}", cfg.base_port()),
        format!("  cluster.port_env_var = {}", cfg.port_env_var()),
    ];
    if let Some(timeout) = cfg.timeout() {
        lines.push(format!("  cluster.timeout = {timeout:?}"));
    }
    lines.push(String::new());

    let specs = build_specs(cfg);
    lines.push(format!("processes ({}):", specs.len()));
    for spec in specs {
        lines.push(format!("  - {spec}"));
        lines.push(format!("      cmd: {}", spec.command()));
        if !spec.environment().is_empty() {
            lines.push(format!("      env: {:?}", spec.environment()));
        }
    }

    lines
}

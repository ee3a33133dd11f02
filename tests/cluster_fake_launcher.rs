// tests/cluster_fake_launcher.rs

mod common;
use crate::common::builders::ClusterConfigBuilder;
use crate::common::fake_launcher::FakeLauncher;
use crate::common::{init_tracing, with_timeout};

use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clusterbench::cluster::{join_all, join_fail_fast, ClusterOrchestrator, ClusterSummary};
use clusterbench::errors::ClusterError;
use clusterbench::exec::TerminationStatus;
use clusterbench::run_cluster;
use clusterbench::types::{ProcessRole, WorkerState};

type TestResult = Result<(), Box<dyn Error>>;

async fn wait_until_running(launcher: &FakeLauncher, expected: usize) {
    for _ in 0..500 {
        if launcher.running() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} running processes, saw {}",
        launcher.running()
    );
}

#[tokio::test]
async fn start_all_dispatches_two_workers_per_index() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::completing());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(4).build();

    let handles = orchestrator.start_all(&cfg);
    assert_eq!(handles.len(), 8);

    let pairs: HashSet<(ProcessRole, usize)> =
        handles.iter().map(|h| (h.role(), h.index())).collect();
    assert_eq!(pairs.len(), 8, "every (role, index) must be unique");

    let reports = with_timeout(join_all(handles)).await?;
    assert_eq!(reports.len(), 8);
    assert_eq!(launcher.launched().len(), 8, "each spec launched exactly once");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn workers_run_concurrently() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(3).build();

    let mut handles = orchestrator.start_all(&cfg);

    // All six are in flight at once before any is allowed to finish.
    with_timeout(wait_until_running(&launcher, 6)).await;
    for handle in handles.iter_mut() {
        with_timeout(handle.reached(WorkerState::Running)).await;
        assert_eq!(handle.state(), WorkerState::Running);
        assert!(!handle.is_finished());
    }

    launcher.release_all();
    let reports = with_timeout(join_all(handles)).await?;

    assert_eq!(reports.len(), 6);
    assert_eq!(launcher.max_running(), 6);
    assert!(reports.iter().all(|r| r.result.as_ref().is_ok_and(|o| o.success())));

    Ok(())
}

#[tokio::test]
async fn every_handle_is_terminated_after_join() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(2).build();

    let mut handles = orchestrator.start_all(&cfg);
    with_timeout(wait_until_running(&launcher, 4)).await;
    launcher.release_all();

    for handle in handles.iter_mut() {
        with_timeout(handle.reached(WorkerState::Terminated)).await;
        assert_eq!(handle.state(), WorkerState::Terminated);
    }

    let reports = with_timeout(join_all(handles)).await?;
    assert_eq!(reports.len(), 4);

    Ok(())
}

#[tokio::test]
async fn handles_finished_before_join_are_still_reported() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::completing());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(3).build();

    let handles = orchestrator.start_all(&cfg);

    // Let every worker finish long before anyone joins them.
    for _ in 0..500 {
        if handles.iter().all(|h| h.is_finished()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(handles.iter().all(|h| h.is_finished()));

    let reports = with_timeout(join_all(handles)).await?;
    assert_eq!(reports.len(), 6);

    Ok(())
}

#[tokio::test]
async fn non_zero_exit_does_not_abort_join() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::completing().exit_with(ProcessRole::Node, 1, 1));
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(3).build();

    let summary = with_timeout(run_cluster(&orchestrator, &cfg)).await?;
    assert_eq!(
        summary,
        ClusterSummary {
            total: 6,
            succeeded: 5,
            abnormal: 1,
            cancelled: 0,
            failed_to_start: 0,
        }
    );

    let handles = orchestrator.start_all(&cfg);
    let reports = with_timeout(join_all(handles)).await?;
    let failed = reports
        .iter()
        .find(|r| r.role == ProcessRole::Node && r.index == 1)
        .unwrap();
    assert_eq!(
        failed.result.as_ref().unwrap().status,
        TerminationStatus::Exited(1)
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn launch_failure_ends_the_run_while_siblings_keep_running() -> TestResult {
    init_tracing();

    // Every process that starts is held forever, so only an early return can
    // get the error back.
    let launcher = Arc::new(FakeLauncher::held().fail_to_start(ProcessRole::Companion, 2));
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(3).build();

    let result = with_timeout(run_cluster(&orchestrator, &cfg)).await;

    match result {
        Err(ClusterError::LaunchFailed {
            role,
            index,
            command,
            ..
        }) => {
            assert_eq!(role, ProcessRole::Companion);
            assert_eq!(index, 2);
            assert_eq!(command, "../MerkleSquare/demo/mverserver");
        }
        other => panic!("expected LaunchFailed, got {other:?}"),
    }

    // The five siblings were started and nothing stopped them.
    with_timeout(wait_until_running(&launcher, 5)).await;
    assert_eq!(launcher.running(), 5);
    assert_eq!(launcher.launched().len(), 6);

    orchestrator.cancel();
    Ok(())
}

#[tokio::test]
async fn launch_failure_is_reported_while_sibling_handle_is_running() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held().fail_to_start(ProcessRole::Node, 0));
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(1).build();

    let mut handles = orchestrator.start_all(&cfg);
    let mut companion = handles.pop().expect("companion handle");
    assert_eq!(companion.role(), ProcessRole::Companion);

    let err = with_timeout(join_fail_fast(handles)).await.unwrap_err();
    assert!(
        matches!(err, ClusterError::LaunchFailed { role: ProcessRole::Node, index: 0, .. }),
        "got {err:?}"
    );

    with_timeout(companion.reached(WorkerState::Running)).await;
    assert_eq!(companion.state(), WorkerState::Running);
    assert!(!companion.is_finished());

    launcher.release_all();
    with_timeout(companion.reached(WorkerState::Terminated)).await;
    Ok(())
}

#[tokio::test]
async fn empty_cluster_returns_immediately() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(0).build();

    let handles = orchestrator.start_all(&cfg);
    assert!(handles.is_empty());

    let summary = with_timeout(run_cluster(&orchestrator, &cfg)).await?;
    assert_eq!(summary, ClusterSummary::default());
    assert!(launcher.launched().is_empty());

    Ok(())
}

#[tokio::test]
async fn cancel_stops_every_running_worker() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(2).build();

    let handles = orchestrator.start_all(&cfg);
    with_timeout(wait_until_running(&launcher, 4)).await;

    orchestrator.cancel();
    let reports = with_timeout(join_all(handles)).await?;

    assert_eq!(reports.len(), 4);
    for report in &reports {
        let outcome = report.result.as_ref().unwrap();
        assert!(outcome.cancelled);
        assert!(matches!(outcome.status, TerminationStatus::Signalled(_)));
    }
    assert_eq!(launcher.running(), 0);

    Ok(())
}

#[tokio::test]
async fn deadline_cancels_processes_that_never_exit() -> TestResult {
    init_tracing();

    let launcher = Arc::new(FakeLauncher::held());
    let orchestrator = ClusterOrchestrator::with_shared_launcher(Arc::clone(&launcher));
    let cfg = ClusterConfigBuilder::new().size(2).timeout("200ms").build();

    let summary = with_timeout(run_cluster(&orchestrator, &cfg)).await?;
    assert_eq!(summary.total, 4);
    assert_eq!(summary.cancelled, 4);

    Ok(())
}

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::watch;

use clusterbench::exec::{
    CancelSignal, ExitOutcome, LaunchError, LaunchFuture, LaunchSpec, Launcher, TerminationStatus,
};
use clusterbench::types::ProcessRole;

/// SIGTERM, reported for processes stopped by cancellation.
const CANCEL_SIGNAL: i32 = 15;

/// A launcher that never spawns anything.
///
/// - records every spec it was asked to launch
/// - tracks how many "processes" are running at once
/// - either completes immediately or holds every process until
///   [`release_all`](FakeLauncher::release_all) or cancellation
/// - can be told to fail specific launches or exit with specific codes
pub struct FakeLauncher {
    launched: Mutex<Vec<LaunchSpec>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
    gate: watch::Sender<bool>,
    fail_to_start: HashSet<(ProcessRole, usize)>,
    exit_codes: HashMap<(ProcessRole, usize), i32>,
}

impl FakeLauncher {
    /// Every launch completes right away with exit code 0.
    pub fn completing() -> Self {
        Self::with_gate(true)
    }

    /// Every launch stays running until released or cancelled.
    pub fn held() -> Self {
        Self::with_gate(false)
    }

    fn with_gate(open: bool) -> Self {
        let (gate, _rx) = watch::channel(open);
        Self {
            launched: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            gate,
            fail_to_start: HashSet::new(),
            exit_codes: HashMap::new(),
        }
    }

    pub fn fail_to_start(mut self, role: ProcessRole, index: usize) -> Self {
        self.fail_to_start.insert((role, index));
        self
    }

    pub fn exit_with(mut self, role: ProcessRole, index: usize, code: i32) -> Self {
        self.exit_codes.insert((role, index), code);
        self
    }

    /// Let every held process exit.
    pub fn release_all(&self) {
        self.gate.send_replace(true);
    }

    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.launched.lock().unwrap().clone()
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously running processes seen so far.
    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    async fn run(&self, spec: LaunchSpec, mut cancel: CancelSignal) -> Result<ExitOutcome, LaunchError> {
        self.launched.lock().unwrap().push(spec.clone());

        let key = (spec.role(), spec.index());
        if self.fail_to_start.contains(&key) {
            return Err(LaunchError::NotFound(spec.command().to_string()));
        }

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);

        let gate = self.gate.subscribe();
        let cancelled = tokio::select! {
            _ = wait_open(gate) => false,
            _ = cancel.cancelled() => true,
        };

        self.running.fetch_sub(1, Ordering::SeqCst);

        let status = if cancelled {
            TerminationStatus::Signalled(CANCEL_SIGNAL)
        } else {
            TerminationStatus::Exited(self.exit_codes.get(&key).copied().unwrap_or(0))
        };

        Ok(ExitOutcome {
            status,
            stdout: format!("{spec}\n"),
            stderr: String::new(),
            cancelled,
        })
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, spec: LaunchSpec, cancel: CancelSignal) -> LaunchFuture<'_> {
        Box::pin(self.run(spec, cancel))
    }
}

async fn wait_open(mut gate: watch::Receiver<bool>) {
    loop {
        if *gate.borrow_and_update() {
            return;
        }
        if gate.changed().await.is_err() {
            return;
        }
    }
}

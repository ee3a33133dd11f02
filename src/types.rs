// src/types.rs

use std::fmt;

/// Which half of a cluster index a process belongs to.
///
/// - `Node`: the primary server binary, configured through a per-index
///   config artifact.
/// - `Companion`: the secondary server binary, configured through a per-index
///   port environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessRole {
    Node,
    Companion,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Node => f.write_str("node"),
            ProcessRole::Companion => f.write_str("companion"),
        }
    }
}

/// Lifecycle of a single worker.
///
/// There is no `Cancelled` state: a cancelled worker still ends up in
/// `Terminated`, with the cancellation recorded on its outcome.
///
/// Variants are ordered by progress, so `state >= Running` means "has
/// started".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkerState {
    #[default]
    Dispatched,
    Running,
    Terminated,
}

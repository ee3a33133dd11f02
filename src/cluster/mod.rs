// src/cluster/mod.rs

//! Cluster orchestration.
//!
//! This module ties together:
//! - building the 2×N launch specs from a [`ClusterConfig`](crate::config::ClusterConfig)
//! - dispatching each spec as an independent worker
//! - joining every worker, stopping early when one fails to start, and
//!   summarising how the run ended
//!
//! The orchestration itself lives in [`orchestrator`]; per-process supervision
//! is in [`worker`].

pub mod orchestrator;
pub mod summary;
pub mod worker;

pub use orchestrator::{build_specs, join_all, join_fail_fast, ClusterOrchestrator};
pub use summary::{check_started, ClusterSummary};
pub use worker::{WorkerHandle, WorkerReport};

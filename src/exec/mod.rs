// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the cluster commands,
//! using `tokio::process::Command`, and reporting how each one ended.
//!
//! - [`spec`] defines the immutable [`LaunchSpec`] handed to a launcher.
//! - [`launcher`] provides the [`Launcher`] trait and the production
//!   [`ShellLauncher`], which tests can replace with a fake implementation.
//! - [`outcome`] describes how a process terminated.
//! - [`cancel`] broadcasts a stop request to every running process.
//! - [`capture`] drains stdout/stderr while the child runs.
//! - [`resolve`] checks that a command's program exists before spawning.

pub mod cancel;
pub mod capture;
pub mod launcher;
pub mod outcome;
pub mod resolve;
pub mod spec;

pub use cancel::{CancelSignal, Canceller};
pub use launcher::{LaunchError, LaunchFuture, Launcher, ShellLauncher};
pub use outcome::{ExitOutcome, TerminationStatus};
pub use spec::LaunchSpec;

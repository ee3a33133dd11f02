// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::exec::LaunchError;
use crate::types::ProcessRole;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{role} {index} failed to start `{command}`: {source}")]
    LaunchFailed {
        role: ProcessRole,
        index: usize,
        command: String,
        #[source]
        source: LaunchError,
    },

    #[error("worker for {role} {index} panicked: {message}")]
    WorkerPanicked {
        role: ProcessRole,
        index: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ClusterError>;

// src/config/mod.rs

//! Cluster configuration for clusterbench.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a cluster description from disk (`loader.rs`).
//! - Validate it into an immutable [`ClusterConfig`] (`validate.rs`).
//! - Render per-index commands from templates (`template.rs`).

pub mod loader;
pub mod model;
pub mod template;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ClusterConfig, ClusterSection, CommandTemplate, RawClusterFile};
pub use template::RenderedCommand;

// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_CLUSTER_SIZE: usize = 5;
pub const DEFAULT_BASE_PORT: u16 = 6000;
pub const DEFAULT_PORT_ENV_VAR: &str = "PORT";

/// Cluster description as read from a TOML file, before validation.
///
/// ```toml
/// [cluster]
/// size = 5
/// base_port = 6000
/// port_env_var = "PORT"
/// timeout = "10m"
///
/// [node]
/// cmd = "target/debug/MerkleVerseWrapper -c config/cluster_res/srv_{index}.toml"
/// env = { RUST_BACKTRACE = "1", RUST_LOG = "debug" }
///
/// [companion]
/// cmd = "../MerkleSquare/demo/mverserver"
/// ```
///
/// Every section is optional; missing ones fall back to the compiled-in
/// benchmark cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClusterFile {
    #[serde(default)]
    pub cluster: ClusterSection,

    #[serde(default = "default_node_template")]
    pub node: CommandTemplate,

    #[serde(default = "default_companion_template")]
    pub companion: CommandTemplate,
}

/// `[cluster]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSection {
    /// Number of node/companion pairs.
    #[serde(default = "default_size")]
    pub size: usize,

    /// Port handed to companion 0; companion `i` gets `base_port + i`.
    #[serde(default = "default_base_port")]
    pub base_port: u16,

    /// Environment variable companions read their port from.
    #[serde(default = "default_port_env_var")]
    pub port_env_var: String,

    /// Optional deadline such as `"90s"` or `"10m"`. Without one the
    /// harness waits for the processes indefinitely.
    #[serde(default)]
    pub timeout: Option<String>,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            size: default_size(),
            base_port: default_base_port(),
            port_env_var: default_port_env_var(),
            timeout: None,
        }
    }
}

/// `[node]` / `[companion]` sections.
///
/// `cmd` and every `env` value may use `{index}` and `{port}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandTemplate {
    pub cmd: String,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandTemplate {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

fn default_size() -> usize {
    DEFAULT_CLUSTER_SIZE
}

fn default_base_port() -> u16 {
    DEFAULT_BASE_PORT
}

fn default_port_env_var() -> String {
    DEFAULT_PORT_ENV_VAR.to_string()
}

pub fn default_node_template() -> CommandTemplate {
    CommandTemplate::new("target/debug/MerkleVerseWrapper -c config/cluster_res/srv_{index}.toml")
        .with_env("RUST_BACKTRACE", "1")
        .with_env("RUST_LOG", "debug")
}

pub fn default_companion_template() -> CommandTemplate {
    CommandTemplate::new("../MerkleSquare/demo/mverserver")
}

/// The compiled-in benchmark cluster.
impl Default for RawClusterFile {
    fn default() -> Self {
        Self {
            cluster: ClusterSection::default(),
            node: default_node_template(),
            companion: default_companion_template(),
        }
    }
}

/// Validated, immutable description of one orchestration run.
///
/// Only obtainable through `TryFrom<RawClusterFile>`, so every instance has
/// passed the checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    size: usize,
    base_port: u16,
    port_env_var: String,
    node: CommandTemplate,
    companion: CommandTemplate,
    timeout: Option<Duration>,
}

impl ClusterConfig {
    pub(crate) fn new_unchecked(
        size: usize,
        base_port: u16,
        port_env_var: String,
        node: CommandTemplate,
        companion: CommandTemplate,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            size,
            base_port,
            port_env_var,
            node,
            companion,
            timeout,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    pub fn port_env_var(&self) -> &str {
        &self.port_env_var
    }

    pub fn node(&self) -> &CommandTemplate {
        &self.node
    }

    pub fn companion(&self) -> &CommandTemplate {
        &self.companion
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Port assigned to cluster index `index`.
    ///
    /// Validation guarantees this fits in a `u16` for every index below
    /// `size`.
    pub fn port_for(&self, index: usize) -> u16 {
        self.base_port + index as u16
    }
}

#![allow(dead_code)]

use clusterbench::config::{ClusterConfig, CommandTemplate, RawClusterFile};

/// Builder for `ClusterConfig` to simplify test setup.
///
/// Starts from the compiled-in cluster; every change goes through the same
/// validation as a config file.
pub struct ClusterConfigBuilder {
    raw: RawClusterFile,
}

impl ClusterConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawClusterFile::default(),
        }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.raw.cluster.size = size;
        self
    }

    pub fn base_port(mut self, port: u16) -> Self {
        self.raw.cluster.base_port = port;
        self
    }

    pub fn port_env_var(mut self, name: &str) -> Self {
        self.raw.cluster.port_env_var = name.to_string();
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.raw.cluster.timeout = Some(timeout.to_string());
        self
    }

    pub fn node(mut self, cmd: &str) -> Self {
        self.raw.node = CommandTemplate::new(cmd);
        self
    }

    pub fn companion(mut self, cmd: &str) -> Self {
        self.raw.companion = CommandTemplate::new(cmd);
        self
    }

    pub fn node_env(mut self, key: &str, value: &str) -> Self {
        self.raw.node.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn companion_env(mut self, key: &str, value: &str) -> Self {
        self.raw.companion.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Both roles run the same command.
    pub fn every_process(self, cmd: &str) -> Self {
        self.node(cmd).companion(cmd)
    }

    pub fn build(self) -> ClusterConfig {
        ClusterConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for ClusterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

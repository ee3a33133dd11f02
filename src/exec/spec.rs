// src/exec/spec.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::types::ProcessRole;

/// Everything needed to start one cluster process.
///
/// Built once by the orchestrator and consumed by exactly one launcher
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    role: ProcessRole,
    index: usize,
    command: String,
    environment: BTreeMap<String, String>,
}

impl LaunchSpec {
    pub fn new(
        role: ProcessRole,
        index: usize,
        command: impl Into<String>,
        environment: BTreeMap<String, String>,
    ) -> Self {
        Self {
            role,
            index,
            command: command.into(),
            environment,
        }
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Shell command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Overrides applied on top of the inherited environment.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.role, self.index)
    }
}

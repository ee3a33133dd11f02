// src/config/template.rs

//! Placeholder substitution for command templates.

use std::collections::BTreeMap;

use super::model::CommandTemplate;

const INDEX_PLACEHOLDER: &str = "{index}";
const PORT_PLACEHOLDER: &str = "{port}";

/// A template with `{index}` / `{port}` substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub cmd: String,
    pub env: BTreeMap<String, String>,
}

impl CommandTemplate {
    /// Substitute the placeholders in `cmd` and every `env` value.
    ///
    /// Keys are left untouched.
    pub fn render(&self, index: usize, port: u16) -> RenderedCommand {
        let env = self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), substitute(v, index, port)))
            .collect();

        RenderedCommand {
            cmd: substitute(&self.cmd, index, port),
            env,
        }
    }
}

fn substitute(s: &str, index: usize, port: u16) -> String {
    s.replace(INDEX_PLACEHOLDER, &index.to_string())
        .replace(PORT_PLACEHOLDER, &port.to_string())
}

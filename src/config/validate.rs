// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ClusterConfig, CommandTemplate, RawClusterFile};
use crate::errors::{ClusterError, Result};

impl TryFrom<RawClusterFile> for ClusterConfig {
    type Error = crate::errors::ClusterError;

    fn try_from(raw: RawClusterFile) -> std::result::Result<Self, Self::Error> {
        validate_template("node", &raw.node)?;
        validate_template("companion", &raw.companion)?;
        validate_port_env_var(&raw.cluster.port_env_var)?;
        validate_port_range(raw.cluster.size, raw.cluster.base_port)?;

        let timeout = raw
            .cluster
            .timeout
            .as_deref()
            .map(parse_timeout)
            .transpose()?;

        Ok(ClusterConfig::new_unchecked(
            raw.cluster.size,
            raw.cluster.base_port,
            raw.cluster.port_env_var,
            raw.node,
            raw.companion,
            timeout,
        ))
    }
}

fn validate_template(section: &str, tpl: &CommandTemplate) -> Result<()> {
    if tpl.cmd.trim().is_empty() {
        return Err(ClusterError::ConfigError(format!(
            "[{section}].cmd must not be empty"
        )));
    }
    for key in tpl.env.keys() {
        if !is_valid_env_name(key) {
            return Err(ClusterError::ConfigError(format!(
                "[{section}].env has invalid variable name '{key}'"
            )));
        }
    }
    Ok(())
}

fn validate_port_env_var(name: &str) -> Result<()> {
    if !is_valid_env_name(name) {
        return Err(ClusterError::ConfigError(format!(
            "[cluster].port_env_var '{name}' is not a valid environment variable name"
        )));
    }
    Ok(())
}

fn validate_port_range(size: usize, base_port: u16) -> Result<()> {
    if size == 0 {
        return Ok(());
    }
    let last = base_port as usize + (size - 1);
    if last > u16::MAX as usize {
        return Err(ClusterError::ConfigError(format!(
            "[cluster] base_port {base_port} + size {size} exceeds the port range (last port would be {last})"
        )));
    }
    Ok(())
}

fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

fn parse_timeout(s: &str) -> Result<Duration> {
    let d = parse_duration(s).map_err(|e| {
        ClusterError::ConfigError(format!("[cluster].timeout '{s}' is invalid: {e}"))
    })?;
    if d.is_zero() {
        return Err(ClusterError::ConfigError(
            "[cluster].timeout must be greater than zero".to_string(),
        ));
    }
    Ok(d)
}

/// Parse a duration such as `"500ms"`, `"3s"`, `"10m"` or `"1h"`.
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

    match unit_part.trim().to_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        unit => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration {value} is too large"))
}

// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag is optional: running `clusterbench` with no arguments starts
//! the compiled-in default cluster.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `clusterbench`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "clusterbench",
    version,
    about = "Launch a cluster of node/companion server pairs and wait for all of them to exit.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional cluster description (TOML).
    ///
    /// Without it the compiled-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of node/companion pairs to launch (overrides the config file).
    #[arg(long, value_name = "N")]
    pub size: Option<usize>,

    /// First companion port; index `i` gets `base_port + i`.
    #[arg(long, value_name = "PORT")]
    pub base_port: Option<u16>,

    /// Kill every process still running after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CLUSTERBENCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the launch commands for every process, but don't start any.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_valid() {
        let args = CliArgs::try_parse_from(["clusterbench"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.size.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn overrides_are_parsed() {
        let args = CliArgs::try_parse_from([
            "clusterbench",
            "--size",
            "3",
            "--base-port",
            "7000",
            "--timeout",
            "30",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.size, Some(3));
        assert_eq!(args.base_port, Some(7000));
        assert_eq!(args.timeout, Some(30));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}

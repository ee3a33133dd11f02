// src/exec/resolve.rs

//! Preflight lookup of the program a shell command line would run.
//!
//! Commands go through `sh -c`, which happily starts even when the program
//! it is asked to run does not exist (the shell then exits with 127). To
//! report that case as a launch failure we resolve the first word of the
//! command ourselves before spawning. Anything we cannot reason about
//! statically (builtins, keywords, expansions, subshells) is let through.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::LaunchError;

const SHELL_WORDS: &[&str] = &[
    // keywords
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "while", "until", "do", "done",
    "in", "function", "select", "time", "!", "{", "}", "[[", "]]",
    // builtins
    ".", ":", "[", "alias", "bg", "break", "builtin", "cd", "command", "continue", "echo", "eval",
    "exec", "exit", "export", "false", "fg", "getopts", "hash", "jobs", "kill", "local", "printf",
    "pwd", "read", "readonly", "return", "set", "shift", "source", "test", "times", "trap",
    "true", "type", "ulimit", "umask", "unalias", "unset", "wait",
];

/// Check that the program at the start of `command` can be found.
///
/// `env` is consulted for a `PATH` override before the harness's own `PATH`.
pub fn check_program(command: &str, env: &BTreeMap<String, String>) -> Result<(), LaunchError> {
    if command.trim().is_empty() {
        return Err(LaunchError::EmptyCommand);
    }

    if cfg!(windows) {
        return Ok(());
    }

    let Some(program) = program_word(command) else {
        // Only variable assignments; the shell runs that fine.
        return Ok(());
    };

    if !is_resolvable_statically(program) {
        return Ok(());
    }

    if program.contains('/') {
        return if is_executable(Path::new(program)) {
            Ok(())
        } else {
            Err(LaunchError::NotFound(program.to_string()))
        };
    }

    let path_var = env
        .get("PATH")
        .map(OsString::from)
        .or_else(|| std::env::var_os("PATH"))
        .unwrap_or_default();

    let found = std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .any(|candidate: PathBuf| is_executable(&candidate));

    if found {
        Ok(())
    } else {
        Err(LaunchError::NotFound(program.to_string()))
    }
}

/// First word that is not a leading `NAME=value` assignment.
fn program_word(command: &str) -> Option<&str> {
    command
        .split_whitespace()
        .find(|word| !is_assignment(word))
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn is_resolvable_statically(program: &str) -> bool {
    const META: &[char] = &[
        '$', '`', '\'', '"', '\\', '*', '?', '~', '(', ')', '<', '>', '|', '&', ';',
    ];

    !SHELL_WORDS.contains(&program) && !program.contains(META)
}

fn is_executable(path: &Path) -> bool {
    let Ok(meta) = path.metadata() else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

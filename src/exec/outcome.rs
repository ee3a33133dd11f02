// src/exec/outcome.rs

use std::fmt;
use std::process::ExitStatus;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by the given signal (unix only).
    Signalled(i32),
    /// The platform reported neither a code nor a signal.
    Unknown,
}

impl TerminationStatus {
    pub fn success(&self) -> bool {
        matches!(self, TerminationStatus::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            TerminationStatus::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<ExitStatus> for TerminationStatus {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return TerminationStatus::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return TerminationStatus::Signalled(sig);
            }
        }

        TerminationStatus::Unknown
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Exited(code) => write!(f, "exit code {code}"),
            TerminationStatus::Signalled(sig) => write!(f, "signal {sig}"),
            TerminationStatus::Unknown => f.write_str("unknown status"),
        }
    }
}

/// Result of running one process to completion.
///
/// A non-zero exit or a signal is still an `ExitOutcome`; only failing to
/// start the process at all is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    pub status: TerminationStatus,
    pub stdout: String,
    pub stderr: String,
    /// The process was killed because the run was cancelled.
    pub cancelled: bool,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Non-zero exit, signal, or unknown status.
    pub fn is_abnormal(&self) -> bool {
        !self.success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exit_zero_is_success() {
        assert!(TerminationStatus::Exited(0).success());
        assert!(!TerminationStatus::Exited(1).success());
        assert!(!TerminationStatus::Signalled(9).success());
        assert!(!TerminationStatus::Unknown.success());
    }

    #[test]
    fn code_is_only_present_for_normal_exit() {
        assert_eq!(TerminationStatus::Exited(3).code(), Some(3));
        assert_eq!(TerminationStatus::Signalled(15).code(), None);
    }

    #[cfg(unix)]
    #[test]
    fn raw_wait_status_is_decoded() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait(2) encoding: exit code in the high byte, signal in the low bits.
        let exited = ExitStatus::from_raw(2 << 8);
        assert_eq!(TerminationStatus::from(exited), TerminationStatus::Exited(2));

        let killed = ExitStatus::from_raw(9);
        assert_eq!(TerminationStatus::from(killed), TerminationStatus::Signalled(9));
    }
}

// src/cluster/summary.rs

use crate::errors::ClusterError;

use super::worker::WorkerReport;

/// Tally of how the workers of one run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterSummary {
    pub total: usize,
    pub succeeded: usize,
    pub abnormal: usize,
    pub cancelled: usize,
    pub failed_to_start: usize,
}

impl ClusterSummary {
    pub fn from_reports(reports: &[WorkerReport]) -> Self {
        let mut summary = ClusterSummary {
            total: reports.len(),
            ..Default::default()
        };

        for report in reports {
            match &report.result {
                Ok(outcome) if outcome.cancelled => summary.cancelled += 1,
                Ok(outcome) if outcome.success() => summary.succeeded += 1,
                Ok(_) => summary.abnormal += 1,
                Err(_) => summary.failed_to_start += 1,
            }
        }

        summary
    }
}

/// Pass a report through, or turn it into a run error if its process never
/// started.
pub fn check_started(report: WorkerReport) -> Result<WorkerReport, ClusterError> {
    let WorkerReport {
        role,
        index,
        command,
        result,
    } = report;

    match result {
        Ok(outcome) => Ok(WorkerReport {
            role,
            index,
            command,
            result: Ok(outcome),
        }),
        Err(source) => Err(ClusterError::LaunchFailed {
            role,
            index,
            command,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExitOutcome, LaunchError, TerminationStatus};
    use crate::types::ProcessRole;

    fn report(index: usize, result: Result<ExitOutcome, LaunchError>) -> WorkerReport {
        WorkerReport {
            role: ProcessRole::Companion,
            index,
            command: format!("server-{index}"),
            result,
        }
    }

    fn exited(code: i32, cancelled: bool) -> Result<ExitOutcome, LaunchError> {
        Ok(ExitOutcome {
            status: TerminationStatus::Exited(code),
            stdout: String::new(),
            stderr: String::new(),
            cancelled,
        })
    }

    #[test]
    fn every_report_lands_in_exactly_one_bucket() {
        let reports = vec![
            report(0, exited(0, false)),
            report(1, exited(1, false)),
            report(2, exited(143, true)),
            report(3, Err(LaunchError::NotFound("x".into()))),
        ];

        let s = ClusterSummary::from_reports(&reports);
        assert_eq!(
            s,
            ClusterSummary {
                total: 4,
                succeeded: 1,
                abnormal: 1,
                cancelled: 1,
                failed_to_start: 1,
            }
        );
    }

    #[test]
    fn launch_failure_names_the_command() {
        let err = check_started(report(1, Err(LaunchError::NotFound("a".into())))).unwrap_err();
        match err {
            ClusterError::LaunchFailed { index, command, .. } => {
                assert_eq!(index, 1);
                assert_eq!(command, "server-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn started_processes_pass_through() {
        let passed = check_started(report(0, exited(2, false))).unwrap();
        assert_eq!(passed.index, 0);
        assert!(passed.result.is_ok_and(|o| o.status == TerminationStatus::Exited(2)));
    }
}

//! Exit code logic for the exporter process.
//!
//! Single responsibility: map a run's outcome to the process exit code.

use std::process::ExitCode;

use exporter_core::ExportStats;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every step succeeded.
    Success,
    /// The run finished but some items or formats failed.
    Partial,
    /// The run could not proceed.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Determines the exit outcome of a run that reached the end.
pub(crate) fn determine_exit_outcome(stats: &ExportStats) -> ProcessExit {
    if stats.has_failures() {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Partial.code(), 1);
        assert_eq!(ProcessExit::Failure.code(), 2);
    }

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        assert_eq!(determine_exit_outcome(&ExportStats::new()), ProcessExit::Success);
    }
}

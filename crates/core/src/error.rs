use thiserror::Error;
use types::UnscheduledReason;

/// Data-validation failure. Carries every problem found in the input so that
/// one run reports them all.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("invalid timetable input: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl LoadError {
    pub fn messages(&self) -> &[String] {
        match self {
            LoadError::Invalid(msgs) => msgs,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("no feasible timetable: {requirement} could not be scheduled ({reason})")]
    Infeasible {
        requirement: String,
        reason: UnscheduledReason,
    },
    #[error("generation cancelled before a complete timetable was found")]
    Cancelled,
    #[error(transparent)]
    Load(#[from] LoadError),
}

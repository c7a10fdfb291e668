pub mod error;
pub mod load;
pub mod problem;
pub mod time;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use error::{LoadError, SolveError};
pub use load::load;
pub use problem::{AvailabilityWindow, Break, Problem, Requirement, SectionKey, Slot};
pub use time::ClockTime;
pub use types::{SolveEnvelope, SolveParams, SolveResult, TimetableInput};

/// Validation only: runs the loader and discards the normalised problem.
pub fn validate(input: &TimetableInput) -> Result<(), LoadError> {
    load(input).map(|_| ())
}

/// Cooperative stop signal shared between a caller-side policy (a wall-clock
/// budget, a shutdown) and a running search. Checked once per search node.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, env: SolveEnvelope, cancel: CancelFlag) -> anyhow::Result<SolveResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}

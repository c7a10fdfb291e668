use parking_lot::RwLock;
use sched_core::{CancelFlag, SolveEnvelope, SolveError, SolveResult, Solver};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    /// Includes partial and budget-cancelled partial results.
    Solved { result: SolveResult },
    Infeasible { message: String },
    Cancelled { message: String },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Solved { .. } => "solved",
            JobStatus::Infeasible { .. } => "infeasible",
            JobStatus::Cancelled { .. } => "cancelled",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// Job registry that runs each solve on the tokio runtime under an optional
/// wall-clock budget.
#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: Arc<S>,
    /// `None` disables the budget.
    default_budget: Option<Duration>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S, default_budget: Option<Duration>) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
            default_budget,
        }
    }

    fn budget_for(&self, env: &SolveEnvelope) -> Option<Duration> {
        match env.params.time_budget_sec {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => self.default_budget,
        }
    }

    pub fn enqueue(&self, env: SolveEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let budget = self.budget_for(&env);
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write().insert(id_for_task.clone(), JobStatus::Running);
            info!(job = %id_for_task, budget_sec = budget.map(|b| b.as_secs()), "job started");

            let cancel = CancelFlag::new();
            let timer = budget.map(|b| {
                let cancel = cancel.clone();
                let job = id_for_task.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(b).await;
                    warn!(%job, "time budget spent, cancelling");
                    cancel.cancel();
                })
            });

            let outcome = solver.solve(env, cancel).await;
            if let Some(t) = timer {
                t.abort();
            }
            let status = match outcome {
                Ok(result) => JobStatus::Solved { result },
                Err(e) => match e.downcast_ref::<SolveError>() {
                    Some(SolveError::Cancelled) => JobStatus::Cancelled {
                        message: e.to_string(),
                    },
                    Some(SolveError::Infeasible { .. }) => JobStatus::Infeasible {
                        message: e.to_string(),
                    },
                    _ => {
                        error!(?e, "job failed");
                        JobStatus::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };
            info!(job = %id_for_task, status = status.name(), "job finished");
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

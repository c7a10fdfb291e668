use crate::config::ServerConfig;
use jobs::InMemJobs;
use solver_csp::CspSolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<CspSolver>>,
}

impl AppState {
    pub fn new(cfg: &ServerConfig) -> Self {
        let jobs = InMemJobs::new(CspSolver::new(), cfg.time_budget);
        Self { jobs: Arc::new(jobs) }
    }
}

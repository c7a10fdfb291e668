//! Constraint-satisfaction timetabler.
//!
//! Occurrences of requirements are the variables; `(day, slot, room)` triples
//! are the values. [`solve_problem`] runs MRV/LCV backtracking with forward
//! checking over a loaded [`Problem`], and [`CspSolver`] wraps the whole
//! load, diagnose, solve and assemble pipeline behind the [`Solver`] trait.

mod assemble;
mod availability;
mod diagnostics;
mod domain;
mod engine;
mod model;
mod report;
#[cfg(test)]
mod testing;
mod tracker;
mod trail;

use async_trait::async_trait;
use sched_core::{CancelFlag, Problem, SolveEnvelope, SolveError, SolveResult, Solver};
use std::time::Instant;
use tracing::info;
use types::{DayId, Diagnostic, RoomId, SlotId, SolveStats, SolveStatus, UnscheduledRow};

pub use assemble::assemble;
pub use diagnostics::diagnose;
pub use engine::SearchConfig;
pub use model::is_virtual_room;

/// One placed occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Index into [`Problem::requirements`].
    pub requirement: usize,
    /// 1-based.
    pub occurrence_index: u32,
    pub day: DayId,
    pub slot: SlotId,
    pub room: Option<RoomId>,
}

#[derive(Clone, Debug)]
pub struct Solution {
    /// Only requirements with every occurrence placed.
    pub assignments: Vec<Assignment>,
    pub unscheduled: Vec<UnscheduledRow>,
    pub stats: SolveStats,
    pub cancelled: bool,
}

pub fn solve_problem(problem: &Problem, config: &SearchConfig, cancel: &CancelFlag) -> Result<Solution, SolveError> {
    let started = Instant::now();
    let model = model::Model::new(problem);
    let index = availability::AvailabilityIndex::build(&model);
    let domains = domain::build_domains(&model, &index);
    info!(
        requirements = model.reqs.len(),
        occurrences = model.occs.len(),
        rooms = model.rooms.len(),
        cells = model.grid.len(),
        partial = config.partial_solution_mode,
        seed = config.random_seed,
        "starting search"
    );

    let outcome = engine::SearchContext::new(&model, &domains, config, cancel).run()?;
    let assignments = outcome
        .placed
        .iter()
        .map(|&(occ, value)| {
            let o = model.occs[occ];
            Assignment {
                requirement: o.req,
                occurrence_index: o.index,
                day: problem.days[model.grid.day_of(value.cell)].clone(),
                slot: problem.slots[model.grid.slot_of(value.cell)].id.clone(),
                room: value.room.map(|r| model.rooms.name(r).clone()),
            }
        })
        .collect();

    let mut stats = outcome.stats;
    stats.elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        placed = outcome.placed.len(),
        unscheduled = outcome.report.len(),
        nodes = stats.nodes,
        backtracks = stats.backtracks,
        restarts = stats.restarts,
        elapsed_ms = stats.elapsed_ms,
        "search finished"
    );
    Ok(Solution {
        assignments,
        unscheduled: outcome.report.into_rows(),
        stats,
        cancelled: outcome.cancelled,
    })
}

pub fn build_result(problem: &Problem, solution: Solution, diagnostics: Vec<Diagnostic>) -> SolveResult {
    let status = if solution.cancelled {
        SolveStatus::Cancelled
    } else if solution.unscheduled.is_empty() {
        SolveStatus::Solved
    } else {
        SolveStatus::Partial
    };
    SolveResult {
        status,
        scheduled: assemble(problem, &solution.assignments),
        unscheduled: solution.unscheduled,
        diagnostics,
        stats: solution.stats,
    }
}

/// Load, diagnose, search and assemble in one call.
pub fn solve_envelope(env: &SolveEnvelope, cancel: &CancelFlag) -> Result<SolveResult, SolveError> {
    let problem = sched_core::load(&env.input)?;
    let diagnostics = diagnose(&problem);
    let config = SearchConfig::from(&env.params);
    let solution = solve_problem(&problem, &config, cancel)?;
    Ok(build_result(&problem, solution, diagnostics))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CspSolver;

impl CspSolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Solver for CspSolver {
    async fn solve(&self, env: SolveEnvelope, cancel: CancelFlag) -> anyhow::Result<SolveResult> {
        let result = tokio::task::spawn_blocking(move || solve_envelope(&env, &cancel)).await??;
        Ok(result)
    }
}

//! Backtracking search over occurrences.
//!
//! The engine owns one mutable [`SearchContext`]: a conflict tracker, the
//! dynamic domains of every occurrence and an undo trail. Each search node
//! opens a trail frame before a tentative assignment and closes it on every
//! way out of the node except success, so after an unsuccessful descent the
//! context is back in its initial state.
//!
//! Requirements that cannot be placed are dropped from the active set (or fail
//! the whole run in strict mode) and the search restarts from the root with
//! the remaining ones. Attempt counters and wipeout tallies survive restarts.
//! An attempt is a distinct `(occurrence, value)` placement; trying the same
//! value again in a later tree is free.

use crate::domain::{DynamicDomain, StaticDomain, Value};
use crate::model::{Model, OccId};
use crate::report::UnscheduledReport;
use crate::trail::{Trail, TrailEntry};
use crate::tracker::ConflictTracker;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{CancelFlag, SolveError};
use std::cmp::Reverse;
use tracing::{debug, info};
use types::{SolveParams, SolveStats, UnscheduledReason};

/// Attempt counts at which a struggling occurrence is reported.
const STRUGGLE_MARKS: [u32; 3] = [100, 250, 400];

/// Emits at `info` in debug mode and at `debug` otherwise.
macro_rules! diag {
    ($on:expr, $($arg:tt)+) => {
        if $on {
            info!($($arg)+)
        } else {
            debug!($($arg)+)
        }
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub partial_solution_mode: bool,
    /// Diagnostics only; never changes a decision.
    pub debug_mode: bool,
    pub max_attempts_per_variable: u32,
    pub random_seed: u64,
    pub candidate_limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from(&SolveParams::default())
    }
}

impl From<&SolveParams> for SearchConfig {
    fn from(p: &SolveParams) -> Self {
        Self {
            partial_solution_mode: p.partial_solution_mode,
            debug_mode: p.debug_mode,
            max_attempts_per_variable: p.max_attempts_per_variable,
            random_seed: p.random_seed,
            candidate_limit: p.candidate_limit.map(|n| n as usize),
        }
    }
}

/// Why forward checking removed values from a neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Prune {
    SameDay,
    Teacher,
    Section,
    Room,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct WipeoutTally {
    same_day: u32,
    teacher: u32,
    section: u32,
    room: u32,
}

impl WipeoutTally {
    fn bump(&mut self, kind: Prune) {
        match kind {
            Prune::SameDay => self.same_day += 1,
            Prune::Teacher => self.teacher += 1,
            Prune::Section => self.section += 1,
            Prune::Room => self.room += 1,
        }
    }

    fn add(&mut self, other: &WipeoutTally) {
        self.same_day += other.same_day;
        self.teacher += other.teacher;
        self.section += other.section;
        self.room += other.room;
    }

    fn total(&self) -> u32 {
        self.same_day + self.teacher + self.section + self.room
    }
}

/// Unwinds the whole search to the top-level loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Halt {
    Exhausted(OccId),
    Cancelled,
}

/// Result of a finished search.
#[derive(Debug)]
pub struct Outcome {
    /// Placements of every occurrence of every scheduled requirement, by
    /// occurrence id.
    pub placed: Vec<(OccId, Value)>,
    pub report: UnscheduledReport,
    pub stats: SolveStats,
    pub cancelled: bool,
}

pub struct SearchContext<'m, 'p> {
    model: &'m Model<'p>,
    domains: &'m [StaticDomain],
    config: &'m SearchConfig,
    cancel: &'m CancelFlag,
    tracker: ConflictTracker,
    trail: Trail,
    live: Vec<DynamicDomain>,
    /// Index into the requirement's static domain.
    assigned: Vec<Option<u32>>,
    active: Vec<bool>,
    placed_count: Vec<u32>,
    committed_minutes: Vec<u32>,
    /// Distinct values tried so far.
    attempts: Vec<u32>,
    /// Values of each occurrence already counted in `attempts`.
    tried: Vec<Vec<bool>>,
    wipeouts: Vec<WipeoutTally>,
    /// MRV tie-break order.
    rank: Vec<usize>,
    rng: ChaCha8Rng,
    report: UnscheduledReport,
    stats: SolveStats,
}

impl<'m, 'p> SearchContext<'m, 'p> {
    pub fn new(
        model: &'m Model<'p>,
        domains: &'m [StaticDomain],
        config: &'m SearchConfig,
        cancel: &'m CancelFlag,
    ) -> Self {
        let n = model.occs.len();
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
        let mut order: Vec<OccId> = (0..n).collect();
        order.shuffle(&mut rng);
        let mut rank = vec![0; n];
        for (pos, &occ) in order.iter().enumerate() {
            rank[occ] = pos;
        }
        let live = model
            .occs
            .iter()
            .map(|o| DynamicDomain::full(domains[o.req].len()))
            .collect();
        let tried = model
            .occs
            .iter()
            .map(|o| vec![false; domains[o.req].len()])
            .collect();

        Self {
            model,
            domains,
            config,
            cancel,
            tracker: ConflictTracker::new(model.rooms.virtual_flags()),
            trail: Trail::with_capacity(n * 8, n),
            live,
            assigned: vec![None; n],
            active: vec![true; model.reqs.len()],
            placed_count: vec![0; model.reqs.len()],
            committed_minutes: vec![0; model.reqs.len()],
            attempts: vec![0; n],
            tried,
            wipeouts: vec![WipeoutTally::default(); n],
            rank,
            rng,
            report: UnscheduledReport::new(),
            stats: SolveStats::default(),
        }
    }

    pub fn run(mut self) -> Result<Outcome, SolveError> {
        self.screen()?;
        loop {
            let halted = match self.descend() {
                Ok(true) => break,
                Ok(false) => match self.root_culprit() {
                    Some(occ) => Halt::Exhausted(occ),
                    None => break,
                },
                Err(h) => h,
            };
            debug_assert!(self.trail.is_empty() && self.tracker.is_empty(), "unbalanced unwind");
            match halted {
                Halt::Exhausted(occ) => {
                    let req = self.model.occs[occ].req;
                    let reason = self.classify(req);
                    let detail = self.exhaustion_detail(occ);
                    self.drop_requirement(req, reason, detail)?;
                    self.stats.restarts += 1;
                }
                Halt::Cancelled => return self.cancelled(),
            }
        }

        let placed: Vec<(OccId, Value)> = self
            .assigned
            .iter()
            .enumerate()
            .filter(|(occ, _)| self.active[self.model.occs[*occ].req])
            .filter_map(|(occ, v)| {
                let req = self.model.occs[occ].req;
                v.map(|v| (occ, self.domains[req].values[v as usize]))
            })
            .collect();
        Ok(Outcome {
            placed,
            report: self.report,
            stats: self.stats,
            cancelled: false,
        })
    }

    /// Drops requirements that cannot be placed regardless of what the other
    /// requirements do.
    fn screen(&mut self) -> Result<(), SolveError> {
        for r in 0..self.model.reqs.len() {
            let dom = &self.domains[r];
            let info = &self.model.reqs[r];
            let req = &self.model.problem.requirements[r];
            let need = info.slots_required as usize;

            let verdict = if dom.teacher_open_cells == 0 {
                Some((
                    UnscheduledReason::TeacherUnavailable,
                    format!("teacher {} has no available slot in the week", req.teacher),
                ))
            } else if dom.is_empty() {
                Some((
                    UnscheduledReason::SectionConflict,
                    format!("every slot open to {} falls in a break of {}", req.teacher, req.section),
                ))
            } else if dom.open_days < need {
                let week = self.model.grid.days;
                let reason = if dom.teacher_open_days < need && dom.teacher_open_days < week {
                    UnscheduledReason::TeacherUnavailable
                } else if dom.open_days < week {
                    UnscheduledReason::SectionConflict
                } else {
                    UnscheduledReason::AttemptsExhausted
                };
                Some((
                    reason,
                    format!("{} meetings need distinct days but only {} days are open", need, dom.open_days),
                ))
            } else if u64::from(info.slots_required) * u64::from(dom.max_minutes)
                < u64::from(info.min_minutes)
            {
                Some((
                    UnscheduledReason::InsufficientHours,
                    format!(
                        "{} meetings of at most {} min cannot reach {} min",
                        need, dom.max_minutes, info.min_minutes
                    ),
                ))
            } else {
                None
            };
            if let Some((reason, detail)) = verdict {
                self.drop_requirement(r, reason, detail)?;
            }
        }
        Ok(())
    }

    fn drop_requirement(&mut self, r: usize, reason: UnscheduledReason, detail: String) -> Result<(), SolveError> {
        let req = &self.model.problem.requirements[r];
        if !self.config.partial_solution_mode {
            info!(requirement = %req.label(), %reason, %detail, "requirement cannot be scheduled");
            return Err(SolveError::Infeasible {
                requirement: req.label(),
                reason,
            });
        }
        info!(requirement = %req.label(), %reason, %detail, "dropping requirement");
        self.active[r] = false;
        self.report.record(r, req, reason, detail);
        Ok(())
    }

    fn cancelled(mut self) -> Result<Outcome, SolveError> {
        if !self.config.partial_solution_mode {
            return Err(SolveError::Cancelled);
        }
        for r in 0..self.model.reqs.len() {
            if self.active[r] {
                let req = &self.model.problem.requirements[r];
                self.report.record(
                    r,
                    req,
                    UnscheduledReason::Cancelled,
                    "generation stopped before this requirement was placed".into(),
                );
            }
        }
        info!(unscheduled = self.report.len(), "search cancelled");
        Ok(Outcome {
            placed: Vec::new(),
            report: self.report,
            stats: self.stats,
            cancelled: true,
        })
    }

    fn descend(&mut self) -> Result<bool, Halt> {
        if self.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        self.stats.nodes += 1;
        let Some(occ) = self.select_variable() else {
            return Ok(true);
        };

        for value in self.order_values(occ) {
            if !self.tried[occ][value as usize] {
                if self.attempts[occ] >= self.config.max_attempts_per_variable {
                    return Err(Halt::Exhausted(occ));
                }
                self.tried[occ][value as usize] = true;
                self.attempts[occ] += 1;
                self.note_attempt(occ);
            }
            self.stats.attempts += 1;

            self.trail.push_frame();
            if self.assign(occ, value) {
                match self.descend() {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(halt) => {
                        self.undo_frame();
                        return Err(halt);
                    }
                }
            }
            self.undo_frame();
            self.stats.backtracks += 1;
        }
        Ok(false)
    }

    /// MRV: the unassigned active occurrence with the fewest live values.
    fn select_variable(&self) -> Option<OccId> {
        (0..self.model.occs.len())
            .filter(|&o| self.assigned[o].is_none() && self.active[self.model.occs[o].req])
            .min_by_key(|&o| (self.live[o].len(), self.rank[o]))
    }

    /// LCV: live, hour-admissible values ordered by how many other
    /// occurrences they would constrain.
    fn order_values(&mut self, occ: OccId) -> Vec<u32> {
        let r = self.model.occs[occ].req;
        let domains = self.domains;
        let dom = &domains[r];
        let values: Vec<u32> = self
            .live[occ]
            .values()
            .filter(|&v| self.hours_admissible(r, dom.values[v as usize]))
            .collect();

        let mut scored = Vec::with_capacity(values.len());
        for v in values {
            let score = self.constrained_count(occ, dom.values[v as usize]);
            let tie: u64 = self.rng.gen();
            scored.push((score, tie, v));
        }
        scored.sort_unstable();

        if let Some(limit) = self.config.candidate_limit {
            if scored.len() > limit {
                diag!(
                    self.config.debug_mode,
                    occurrence = %self.occ_label(occ),
                    candidates = scored.len(),
                    limit,
                    "truncating candidates"
                );
                scored.truncate(limit);
            }
        }
        scored.into_iter().map(|(_, _, v)| v).collect()
    }

    fn hours_admissible(&self, r: usize, value: Value) -> bool {
        let info = &self.model.reqs[r];
        if info.min_minutes == 0 {
            return true;
        }
        let remaining = info
            .slots_required
            .saturating_sub(self.placed_count[r])
            .saturating_sub(1);
        u64::from(self.committed_minutes[r])
            + u64::from(self.model.cell_minutes(value.cell))
            + u64::from(remaining) * u64::from(self.domains[r].max_minutes)
            >= u64::from(info.min_minutes)
    }

    /// Values of requirement `nr` that placing `value` for requirement `r`
    /// rules out, with an optional room filter.
    fn conflicting(&self, r: usize, nr: usize, value: Value) -> Option<(Prune, &'m [u32], Option<usize>)> {
        let domains: &'m [StaticDomain] = self.domains;
        let dom = &domains[nr];
        let (a, b) = (&self.model.reqs[r], &self.model.reqs[nr]);
        if r == nr {
            return Some((Prune::SameDay, dom.on_day(self.model.grid.day_of(value.cell)), None));
        }
        if a.teacher == b.teacher {
            return Some((Prune::Teacher, dom.at_cell(value.cell), None));
        }
        if a.section == b.section {
            return Some((Prune::Section, dom.at_cell(value.cell), None));
        }
        match value.room {
            Some(room) if !self.model.rooms.is_virtual(room) && b.rooms.contains(&room) => {
                Some((Prune::Room, dom.at_cell(value.cell), Some(room)))
            }
            _ => None,
        }
    }

    #[inline]
    fn hits(&self, nr: usize, index: u32, room: Option<usize>) -> bool {
        room.map_or(true, |room| self.domains[nr].values[index as usize].room == Some(room))
    }

    /// Number of other unassigned active occurrences that would lose at least
    /// one live value.
    fn constrained_count(&self, occ: OccId, value: Value) -> u32 {
        let r = self.model.occs[occ].req;
        let mut count = 0;
        for &nr in &self.model.reqs[r].neighbors {
            if !self.active[nr] {
                continue;
            }
            let Some((_, indices, room)) = self.conflicting(r, nr, value) else {
                continue;
            };
            for &o in &self.model.reqs[nr].occurrences {
                if o == occ || self.assigned[o].is_some() {
                    continue;
                }
                if indices
                    .iter()
                    .any(|&i| self.live[o].contains(i) && self.hits(nr, i, room))
                {
                    count += 1;
                }
            }
        }
        count
    }

    /// Commits `occ := v` inside the current trail frame and forward-checks
    /// its neighbours. Returns `false` when some neighbour is left without
    /// values; the caller undoes the frame.
    fn assign(&mut self, occ: OccId, v: u32) -> bool {
        let model = self.model;
        let r = model.occs[occ].req;
        let info = &model.reqs[r];
        let value = self.domains[r].values[v as usize];
        if !self.tracker.can_place(value.cell, value.room, info.teacher, info.section) {
            return false;
        }
        self.tracker
            .commit(occ, value.cell, value.room, info.teacher, info.section);
        self.assigned[occ] = Some(v);
        self.placed_count[r] += 1;
        self.committed_minutes[r] += model.cell_minutes(value.cell);
        self.trail.record(TrailEntry::Committed { occ });

        for &nr in &info.neighbors {
            if !self.active[nr] {
                continue;
            }
            let Some((kind, indices, room)) = self.conflicting(r, nr, value) else {
                continue;
            };
            for &o in &model.reqs[nr].occurrences {
                if o == occ || self.assigned[o].is_some() {
                    continue;
                }
                for &i in indices {
                    if self.hits(nr, i, room) && self.live[o].remove(i) {
                        self.trail.record(TrailEntry::Pruned { occ: o, value: i });
                    }
                }
                if self.live[o].is_empty() {
                    self.wipeouts[o].bump(kind);
                    self.stats.wipeouts += 1;
                    return false;
                }
            }
        }
        true
    }

    fn undo_frame(&mut self) {
        let start = self.trail.pop_frame();
        while let Some(entry) = self.trail.pop_above(start) {
            match entry {
                TrailEntry::Pruned { occ, value } => self.live[occ].restore(value),
                TrailEntry::Committed { occ } => {
                    let r = self.model.occs[occ].req;
                    let info = &self.model.reqs[r];
                    if let Some(v) = self.assigned[occ].take() {
                        let value = self.domains[r].values[v as usize];
                        self.tracker
                            .retract(occ, value.cell, value.room, info.teacher, info.section);
                        self.placed_count[r] -= 1;
                        self.committed_minutes[r] -= self.model.cell_minutes(value.cell);
                    }
                }
            }
        }
    }

    /// The occurrence blamed for an exhausted tree: most wipeouts, then most
    /// attempts, then earliest tie rank.
    fn root_culprit(&self) -> Option<OccId> {
        (0..self.model.occs.len())
            .filter(|&o| self.active[self.model.occs[o].req])
            .max_by_key(|&o| (self.wipeouts[o].total(), self.attempts[o], Reverse(self.rank[o])))
    }

    fn classify(&self, r: usize) -> UnscheduledReason {
        let mut tally = WipeoutTally::default();
        for &o in &self.model.reqs[r].occurrences {
            tally.add(&self.wipeouts[o]);
        }
        if tally.total() == 0 {
            return UnscheduledReason::AttemptsExhausted;
        }
        let dominant = [
            (tally.room, Prune::Room),
            (tally.section, Prune::Section),
            (tally.teacher, Prune::Teacher),
            (tally.same_day, Prune::SameDay),
        ]
        .into_iter()
        .fold((0, Prune::Room), |best, cur| if cur.0 > best.0 { cur } else { best })
        .1;
        match dominant {
            Prune::Room => UnscheduledReason::NoAvailableRoom,
            Prune::Section => UnscheduledReason::SectionConflict,
            Prune::Teacher | Prune::SameDay => UnscheduledReason::AttemptsExhausted,
        }
    }

    fn exhaustion_detail(&self, occ: OccId) -> String {
        let r = self.model.occs[occ].req;
        let mut tally = WipeoutTally::default();
        for &o in &self.model.reqs[r].occurrences {
            tally.add(&self.wipeouts[o]);
        }
        format!(
            "occurrence {}/{} exhausted after {} attempts (budget {}); wipeouts room={} section={} teacher={} same_day={}",
            self.model.occs[occ].index,
            self.model.reqs[r].slots_required,
            self.attempts[occ],
            self.config.max_attempts_per_variable,
            tally.room,
            tally.section,
            tally.teacher,
            tally.same_day,
        )
    }

    fn occ_label(&self, occ: OccId) -> String {
        let o = self.model.occs[occ];
        format!("{}#{}", self.model.problem.requirements[o.req].label(), o.index)
    }

    fn note_attempt(&self, occ: OccId) {
        let n = self.attempts[occ];
        if n == 1 {
            diag!(
                self.config.debug_mode,
                occurrence = %self.occ_label(occ),
                domain = self.live[occ].len(),
                "processing"
            );
        } else if STRUGGLE_MARKS.contains(&n) {
            diag!(
                self.config.debug_mode,
                occurrence = %self.occ_label(occ),
                attempts = n,
                budget = self.config.max_attempts_per_variable,
                "struggling"
            );
        }
    }
}

use crate::availability::AvailabilityIndex;
use crate::model::Model;
use sched_core::Problem;
use tracing::warn;
use types::{Diagnostic, DiagnosticKind};

/// Pre-solve findings: everything the loader reported plus supply/demand
/// checks over teachers, sections and minimum hours. Never fails.
pub fn diagnose(problem: &Problem) -> Vec<Diagnostic> {
    let model = Model::new(problem);
    let index = AvailabilityIndex::build(&model);
    let mut out = problem.diagnostics.clone();
    let mut push = |kind: DiagnosticKind, message: String| {
        warn!(?kind, %message, "pre-solve diagnostic");
        out.push(Diagnostic { kind, message });
    };

    for (t, teacher) in model.teachers.iter().enumerate() {
        let (mut slots, mut minutes) = (0u64, 0u64);
        for info in model.reqs.iter().filter(|r| r.teacher == t) {
            slots += u64::from(info.slots_required);
            minutes += u64::from(info.min_minutes);
        }
        let open: Vec<usize> = index.teacher_open_cells(t).collect();
        let open_minutes: u64 = open.iter().map(|&c| u64::from(model.cell_minutes(c))).sum();
        if slots > open.len() as u64 || minutes > open_minutes {
            push(
                DiagnosticKind::TeacherOversubscribed,
                format!(
                    "teacher {teacher} needs {slots} slots / {minutes} min but has {} slots / {open_minutes} min available",
                    open.len()
                ),
            );
        }
    }

    let week = model.grid.len();
    for (s, section) in model.sections.iter().enumerate() {
        let demand: u64 = model
            .reqs
            .iter()
            .filter(|r| r.section == s)
            .map(|r| u64::from(r.slots_required))
            .sum();
        if demand > week as u64 {
            push(
                DiagnosticKind::SectionOversubscribed,
                format!(
                    "section {section} needs {demand} meetings but the week has {week} slots ({} closed by breaks)",
                    index.section_blocked_count(s)
                ),
            );
        }
    }

    let longest = problem.max_slot_minutes();
    for (req, info) in problem.requirements.iter().zip(&model.reqs) {
        if index.teacher_open_cells(info.teacher).next().is_none() {
            push(
                DiagnosticKind::NoAvailabilityFit,
                format!("{}: no timeslot fits the availability of {}", req.label(), req.teacher),
            );
        }
        if u64::from(info.slots_required) * u64::from(longest) < u64::from(info.min_minutes) {
            push(
                DiagnosticKind::InsufficientHours,
                format!(
                    "{}: {} x {longest} min cannot reach {} min",
                    req.label(),
                    info.slots_required,
                    info.min_minutes
                ),
            );
        }
    }
    out
}

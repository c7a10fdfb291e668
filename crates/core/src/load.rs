use crate::error::LoadError;
use crate::problem::{AvailabilityWindow, Break, Problem, Requirement, SectionKey, Slot};
use crate::time::{split_range, ClockTime};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;
use types::{DayId, Diagnostic, DiagnosticKind, RoomId, TimetableInput};

/// Validates `input` and normalises it into a [`Problem`]. All data errors are
/// collected before failing.
pub fn load(input: &TimetableInput) -> Result<Problem, LoadError> {
    let mut errors: Vec<String> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let days: Vec<DayId> = input
        .days
        .iter()
        .map(|d| DayId(d.0.trim().to_string()))
        .collect();
    if days.is_empty() {
        errors.push("days is empty".into());
    }
    chk_unique("day", days.iter().map(|d| d.0.as_str()), &mut errors);
    if days.iter().any(|d| d.0.is_empty()) {
        errors.push("days contains a blank entry".into());
    }
    let day_index = |name: &str| days.iter().position(|d| d.0 == name);

    if input.timeslots.is_empty() {
        errors.push("timeslots is empty".into());
    }
    let mut slots = Vec::with_capacity(input.timeslots.len());
    for row in &input.timeslots {
        let what = format!("timeslot {}", row.slot_id);
        if let Some((start, end)) = parse_range(&row.start_time, &row.end_time, &what, &mut errors) {
            slots.push(Slot {
                id: row.slot_id.clone(),
                start,
                end,
            });
        }
    }
    chk_unique("timeslot", input.timeslots.iter().map(|t| t.slot_id.0.as_str()), &mut errors);

    if input.requirements.is_empty() {
        errors.push("requirements is empty".into());
    }
    let mut requirements = Vec::with_capacity(input.requirements.len());
    let mut identities = HashSet::new();
    for row in &input.requirements {
        let section = SectionKey {
            curriculum: row.curriculum.trim().to_string(),
            semester: row.semester.trim().to_string(),
            section_id: row.section_id.trim().to_string(),
        };
        let req = Requirement {
            course_code: row.course_code.trim().to_string(),
            section,
            teacher: row.teacher.0.trim().into(),
            slots_required: row.slots_required,
            min_total_hours: row.min_total_hours,
            rooms: split_rooms(&row.available_rooms),
        };
        let label = req.label();
        if req.course_code.is_empty() || req.section.section_id.is_empty() {
            errors.push(format!("requirement {label:?} is missing course_code or section_id"));
        }
        if req.teacher.0.is_empty() {
            errors.push(format!("requirement {label} has no teacher"));
        }
        if req.slots_required == 0 {
            errors.push(format!("requirement {label} has slots_required=0"));
        }
        if !req.min_total_hours.is_finite() || req.min_total_hours < 0.0 {
            errors.push(format!(
                "requirement {label} has invalid min_total_hours {}",
                req.min_total_hours
            ));
        }
        if !identities.insert((req.course_code.clone(), req.section.clone())) {
            errors.push(format!("duplicate requirement: {label}"));
        }
        requirements.push(req);
    }

    let mut breaks = Vec::with_capacity(input.breaks.len());
    for row in &input.breaks {
        let section = SectionKey {
            curriculum: row.curriculum.trim().to_string(),
            semester: row.semester.trim().to_string(),
            section_id: row.section_id.trim().to_string(),
        };
        let what = format!("break for {section} on {}", row.day);
        let Some((from, to)) = parse_range(&row.break_from, &row.break_to, &what, &mut errors) else {
            continue;
        };
        let day = row.day.0.trim();
        match day_index(day) {
            Some(day) => breaks.push(Break {
                section,
                day,
                from,
                to,
            }),
            None => diagnostics.push(Diagnostic {
                kind: DiagnosticKind::SkippedBreak,
                message: format!("{what}: day '{day}' not found in days; skipping this break"),
            }),
        }
    }

    let mut availability: BTreeMap<_, Vec<AvailabilityWindow>> = BTreeMap::new();
    for row in &input.teacher_availability {
        let teacher: types::TeacherId = row.teacher.0.trim().into();
        let what = format!("availability of teacher {teacher} on {}", row.day.trim());
        let windows = availability.entry(teacher.clone()).or_default();
        let Some((from, to)) =
            parse_range(&row.available_from, &row.available_to, &what, &mut errors)
        else {
            continue;
        };
        for day in split_days(&row.day) {
            match day_index(day) {
                Some(day) => windows.push(AvailabilityWindow { day, from, to }),
                None => diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::SkippedAvailability,
                    message: format!(
                        "teacher={teacher}: day '{day}' not found in days; skipping this availability window"
                    ),
                }),
            }
        }
    }

    if !errors.is_empty() {
        return Err(LoadError::Invalid(errors));
    }

    for d in &diagnostics {
        warn!(kind = ?d.kind, "{}", d.message);
    }

    Ok(Problem {
        window: input.window.clone(),
        days,
        slots,
        requirements,
        breaks,
        availability,
        diagnostics,
    })
}

/// Parses a `(from, to)` pair, splitting `from` when `to` is blank and `from`
/// carries both bounds. Errors are pushed, not returned.
fn parse_range(
    from: &str,
    to: &str,
    what: &str,
    errors: &mut Vec<String>,
) -> Option<(ClockTime, ClockTime)> {
    let (from, to) = if to.trim().is_empty() {
        split_range(from).unwrap_or_else(|| (from.to_string(), to.to_string()))
    } else {
        (from.to_string(), to.to_string())
    };
    let start = ClockTime::parse(&from);
    let end = ClockTime::parse(&to);
    match (start, end) {
        (Ok(start), Ok(end)) if end > start => Some((start, end)),
        (Ok(start), Ok(end)) => {
            errors.push(format!("{what} has non-positive duration ({start} to {end})"));
            None
        }
        (Err(e), _) | (_, Err(e)) => {
            errors.push(format!("{what}: {e}"));
            None
        }
    }
}

fn chk_unique<'a>(name: &str, ids: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(format!("duplicate {name} id: {id}"));
        }
    }
}

fn split_rooms(cells: &[String]) -> Vec<RoomId> {
    let mut rooms: Vec<RoomId> = Vec::new();
    for name in cells.iter().flat_map(|c| c.split(',')).map(str::trim) {
        if !name.is_empty() && !rooms.iter().any(|r| r.0 == name) {
            rooms.push(name.into());
        }
    }
    rooms
}

fn split_days(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(['/', '\\']).map(str::trim).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BreakRow, RequirementRow, TeacherAvailabilityRow, TimeslotRow, Window};

    fn input() -> TimetableInput {
        TimetableInput {
            window: Window {
                start_date: "2025-01-06".into(),
                end_date: "2025-05-30".into(),
            },
            timeslots: vec![
                TimeslotRow {
                    slot_id: "S1".into(),
                    start_time: "08:00".into(),
                    end_time: "09:30".into(),
                },
                TimeslotRow {
                    slot_id: "S2".into(),
                    start_time: "01:30 PM 03:00 PM".into(),
                    end_time: String::new(),
                },
            ],
            requirements: vec![RequirementRow {
                course_code: " CS101 ".into(),
                curriculum: "BSCS".into(),
                semester: "3".into(),
                section_id: "A".into(),
                teacher: "Smith".into(),
                slots_required: 2,
                min_total_hours: 3.0,
                available_rooms: vec!["R1, R2".into(), "R1".into(), " ".into()],
            }],
            days: vec!["Mon".into(), "Tue".into()],
            breaks: vec![],
            teacher_availability: vec![],
        }
    }

    #[test]
    fn normalises_rows() {
        let p = load(&input()).unwrap();
        assert_eq!(p.slots.len(), 2);
        assert_eq!(p.slots[1].start, ClockTime::parse("13:30").unwrap());
        assert_eq!(p.slots[1].minutes(), 90);
        let r = &p.requirements[0];
        assert_eq!(r.course_code, "CS101");
        assert_eq!(r.rooms, vec![RoomId::from("R1"), RoomId::from("R2")]);
        assert_eq!(r.min_minutes(), 180);
        assert_eq!(r.label(), "CS101 BSCS/3/A");
        assert_eq!(p.max_slot_minutes(), 90);
    }

    #[test]
    fn collects_every_validation_error() {
        let mut inp = input();
        inp.timeslots[0].end_time = "07:00".into();
        inp.timeslots.push(TimeslotRow {
            slot_id: "S1".into(),
            start_time: "10:00".into(),
            end_time: "lunch".into(),
        });
        inp.requirements[0].slots_required = 0;
        let err = load(&inp).unwrap_err();
        let msgs = err.messages();
        assert!(msgs.iter().any(|m| m.contains("timeslot S1 has non-positive duration")));
        assert!(msgs.iter().any(|m| m.contains("invalid time format")));
        assert!(msgs.iter().any(|m| m.contains("duplicate timeslot id: S1")));
        assert!(msgs.iter().any(|m| m.contains("slots_required=0")));
    }

    #[test]
    fn rejects_duplicate_requirements_and_empty_tables() {
        let mut inp = input();
        inp.requirements.push(inp.requirements[0].clone());
        inp.days.clear();
        let msgs = load(&inp).unwrap_err().messages().to_vec();
        assert!(msgs.iter().any(|m| m == "duplicate requirement: CS101 BSCS/3/A"));
        assert!(msgs.iter().any(|m| m == "days is empty"));
    }

    #[test]
    fn rejects_inverted_break_and_availability_windows() {
        let mut inp = input();
        inp.breaks.push(BreakRow {
            curriculum: "BSCS".into(),
            semester: "3".into(),
            section_id: "A".into(),
            day: "Mon".into(),
            break_from: "13:00".into(),
            break_to: "12:00".into(),
        });
        inp.teacher_availability.push(TeacherAvailabilityRow {
            teacher: "Smith".into(),
            day: "Mon".into(),
            available_from: "11:00".into(),
            available_to: "11:00".into(),
        });
        let msgs = load(&inp).unwrap_err().messages().to_vec();
        assert_eq!(msgs.len(), 2, "{msgs:?}");
    }

    #[test]
    fn expands_multi_day_availability_and_skips_unknown_days() {
        let mut inp = input();
        inp.teacher_availability.push(TeacherAvailabilityRow {
            teacher: "Smith".into(),
            day: "Mon / Tue \\ Sat".into(),
            available_from: "09:00 AM 11:00 AM".into(),
            available_to: String::new(),
        });
        inp.teacher_availability.push(TeacherAvailabilityRow {
            teacher: "Jones".into(),
            day: "Sun".into(),
            available_from: "09:00".into(),
            available_to: "17:00".into(),
        });
        let p = load(&inp).unwrap();
        let smith = &p.availability[&types::TeacherId::from("Smith")];
        assert_eq!(smith.iter().map(|w| w.day).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(smith[0].from, ClockTime::parse("09:00").unwrap());
        // Jones keeps an entry with no windows: closed world.
        assert!(p.availability[&types::TeacherId::from("Jones")].is_empty());
        assert_eq!(
            p.diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::SkippedAvailability)
                .count(),
            2
        );
    }
}

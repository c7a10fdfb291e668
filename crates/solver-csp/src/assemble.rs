use crate::Assignment;
use sched_core::Problem;
use types::{DayBlock, ScheduledRow};

/// Groups assignments into one row per fully scheduled requirement.
///
/// Rows follow requirement input order. A requirement with fewer assignments
/// than `slots_required` produces no row.
pub fn assemble(problem: &Problem, assignments: &[Assignment]) -> Vec<ScheduledRow> {
    let mut by_req: Vec<Vec<&Assignment>> = vec![Vec::new(); problem.requirements.len()];
    for a in assignments {
        if let Some(group) = by_req.get_mut(a.requirement) {
            group.push(a);
        }
    }

    problem
        .requirements
        .iter()
        .zip(by_req)
        .filter(|(req, group)| group.len() == req.slots_required as usize)
        .map(|(req, group)| {
            let mut blocks: Vec<(usize, u32, DayBlock)> = group
                .into_iter()
                .filter_map(|a| {
                    let day = problem.day_index(&a.day)?;
                    let slot = problem.slots.iter().find(|s| s.id == a.slot)?;
                    Some((
                        day,
                        slot.start.seconds(),
                        DayBlock {
                            day: a.day.clone(),
                            time_from: slot.start.to_string(),
                            time_to: slot.end.to_string(),
                            room: a.room.clone(),
                        },
                    ))
                })
                .collect();
            blocks.sort_by_key(|(day, start, _)| (*day, *start));

            ScheduledRow {
                start_date: problem.window.start_date.clone(),
                end_date: problem.window.end_date.clone(),
                course_code: req.course_code.clone(),
                curriculum: req.section.curriculum.clone(),
                semester: req.section.semester.clone(),
                section_id: req.section.section_id.clone(),
                teacher: req.teacher.clone(),
                blocks: blocks.into_iter().map(|(_, _, b)| b).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{problem, req};

    fn at(requirement: usize, index: u32, day: &str, slot: &str, room: Option<&str>) -> Assignment {
        Assignment {
            requirement,
            occurrence_index: index,
            day: day.into(),
            slot: slot.into(),
            room: room.map(Into::into),
        }
    }

    #[test]
    fn blocks_are_sorted_by_day_then_start() {
        let mut p = problem(&["Mon", "Tue", "Wed"], &[("13:00", "14:30"), ("08:00", "09:30")]);
        p.requirements.push(req("CS1", "A", "T", 3, &["R1"]));
        let rows = assemble(
            &p,
            &[
                at(0, 1, "Wed", "S2", Some("R1")),
                at(0, 2, "Mon", "S1", Some("R1")),
                at(0, 3, "Tue", "S2", None),
            ],
        );
        assert_eq!(rows.len(), 1);
        let b = &rows[0].blocks;
        assert_eq!(b.iter().map(|b| b.day.0.as_str()).collect::<Vec<_>>(), ["Mon", "Tue", "Wed"]);
        assert_eq!(b[0].time_from, "13:00:00");
        assert_eq!(b[1].time_to, "09:30:00");
        assert_eq!(b[1].room, None);
        assert_eq!(rows[0].start_date, "2025-01-06");
    }

    #[test]
    fn incomplete_requirements_are_not_emitted() {
        let mut p = problem(&["Mon", "Tue"], &[("08:00", "09:00")]);
        p.requirements.push(req("CS1", "A", "T", 2, &[]));
        p.requirements.push(req("CS2", "A", "U", 1, &[]));
        let rows = assemble(&p, &[at(0, 1, "Mon", "S1", None), at(1, 1, "Tue", "S1", None)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_code, "CS2");
    }
}

//! Builders for hand-written problems in unit tests.

use sched_core::{ClockTime, Problem, Requirement, SectionKey, Slot};
use std::collections::BTreeMap;
use types::Window;

pub fn problem(days: &[&str], slots: &[(&str, &str)]) -> Problem {
    Problem {
        window: Window {
            start_date: "2025-01-06".into(),
            end_date: "2025-05-30".into(),
        },
        days: days.iter().map(|d| (*d).into()).collect(),
        slots: slots
            .iter()
            .enumerate()
            .map(|(i, (from, to))| Slot {
                id: format!("S{}", i + 1).as_str().into(),
                start: ClockTime::parse(from).unwrap(),
                end: ClockTime::parse(to).unwrap(),
            })
            .collect(),
        requirements: Vec::new(),
        breaks: Vec::new(),
        availability: BTreeMap::new(),
        diagnostics: Vec::new(),
    }
}

pub fn req(course: &str, section: &str, teacher: &str, slots_required: u32, rooms: &[&str]) -> Requirement {
    Requirement {
        course_code: course.into(),
        section: SectionKey {
            curriculum: "BSCS".into(),
            semester: "1".into(),
            section_id: section.into(),
        },
        teacher: teacher.into(),
        slots_required,
        min_total_hours: 0.0,
        rooms: rooms.iter().map(|r| (*r).into()).collect(),
    }
}

#![allow(dead_code)]

use types::{BreakRow, RequirementRow, TeacherAvailabilityRow, TimeslotRow, TimetableInput, Window};

pub fn input(days: &[&str], slots: &[(&str, &str)]) -> TimetableInput {
    TimetableInput {
        window: Window {
            start_date: "2025-01-06".into(),
            end_date: "2025-05-30".into(),
        },
        timeslots: slots
            .iter()
            .enumerate()
            .map(|(i, (from, to))| TimeslotRow {
                slot_id: format!("S{}", i + 1).as_str().into(),
                start_time: (*from).into(),
                end_time: (*to).into(),
            })
            .collect(),
        requirements: Vec::new(),
        days: days.iter().map(|d| (*d).into()).collect(),
        breaks: Vec::new(),
        teacher_availability: Vec::new(),
    }
}

pub fn requirement(course: &str, section: (&str, &str, &str), teacher: &str, slots: u32, rooms: &[&str]) -> RequirementRow {
    RequirementRow {
        course_code: course.into(),
        curriculum: section.0.into(),
        semester: section.1.into(),
        section_id: section.2.into(),
        teacher: teacher.into(),
        slots_required: slots,
        min_total_hours: 0.0,
        available_rooms: rooms.iter().map(|r| (*r).to_string()).collect(),
    }
}

pub fn availability(teacher: &str, day: &str, from: &str, to: &str) -> TeacherAvailabilityRow {
    TeacherAvailabilityRow {
        teacher: teacher.into(),
        day: day.into(),
        available_from: from.into(),
        available_to: to.into(),
    }
}

pub fn break_row(section: (&str, &str, &str), day: &str, from: &str, to: &str) -> BreakRow {
    BreakRow {
        curriculum: section.0.into(),
        semester: section.1.into(),
        section_id: section.2.into(),
        day: day.into(),
        break_from: from.into(),
        break_to: to.into(),
    }
}

pub const WEEK: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

use crate::time::ClockTime;
use std::collections::BTreeMap;
use std::fmt;
use types::{DayId, Diagnostic, RoomId, SlotId, TeacherId, Window};

/// `(curriculum, semester, section_id)`. Two requirements with the same key
/// are taught to the same students.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionKey {
    pub curriculum: String,
    pub semester: String,
    pub section_id: String,
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.curriculum, self.semester, self.section_id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub id: SlotId,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Slot {
    pub fn minutes(&self) -> u32 {
        (self.end.seconds() - self.start.seconds()) / 60
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Requirement {
    pub course_code: String,
    pub section: SectionKey,
    pub teacher: TeacherId,
    pub slots_required: u32,
    pub min_total_hours: f64,
    /// An empty list means the meetings take place without a room.
    pub rooms: Vec<RoomId>,
}

impl Requirement {
    pub fn min_minutes(&self) -> u32 {
        (self.min_total_hours * 60.0).round() as u32
    }

    /// Human-readable identity, `CS101 BSCS/3/A`.
    pub fn label(&self) -> String {
        format!("{} {}", self.course_code, self.section)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Break {
    pub section: SectionKey,
    pub day: usize,
    pub from: ClockTime,
    pub to: ClockTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AvailabilityWindow {
    pub day: usize,
    pub from: ClockTime,
    pub to: ClockTime,
}

/// Normalised, validated input. Read-only for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub window: Window,
    pub days: Vec<DayId>,
    pub slots: Vec<Slot>,
    pub requirements: Vec<Requirement>,
    pub breaks: Vec<Break>,
    /// Teachers with at least one availability row, kept even when every row
    /// was skipped: such a teacher is unavailable everywhere.
    pub availability: BTreeMap<TeacherId, Vec<AvailabilityWindow>>,
    /// Non-fatal findings from loading.
    pub diagnostics: Vec<Diagnostic>,
}

impl Problem {
    pub fn day_index(&self, day: &DayId) -> Option<usize> {
        self.days.iter().position(|d| d == day)
    }

    pub fn max_slot_minutes(&self) -> u32 {
        self.slots.iter().map(Slot::minutes).max().unwrap_or(0)
    }
}

use sched_core::Requirement;
use std::collections::HashSet;
use types::{UnscheduledReason, UnscheduledRow};

/// Requirements removed from the active set, in the order they were dropped.
#[derive(Clone, Debug, Default)]
pub struct UnscheduledReport {
    rows: Vec<UnscheduledRow>,
    recorded: HashSet<usize>,
}

impl UnscheduledReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records requirement `index`. A requirement is reported at most once;
    /// later calls for it are ignored.
    pub fn record(&mut self, index: usize, req: &Requirement, reason: UnscheduledReason, detail: String) {
        if !self.recorded.insert(index) {
            return;
        }
        self.rows.push(UnscheduledRow {
            course_code: req.course_code.clone(),
            curriculum: req.section.curriculum.clone(),
            semester: req.section.semester.clone(),
            section_id: req.section.section_id.clone(),
            teacher: req.teacher.clone(),
            slots_required: req.slots_required,
            min_total_hours: req.min_total_hours,
            available_rooms: req.rooms.clone(),
            reason,
            detail,
        });
    }

    #[cfg(test)]
    pub fn contains(&self, index: usize) -> bool {
        self.recorded.contains(&index)
    }

    pub fn rows(&self) -> &[UnscheduledRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<UnscheduledRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::req;

    #[test]
    fn records_each_requirement_once() {
        let r = req("CS1", "A", "T", 2, &["R1", "Zoom"]);
        let mut report = UnscheduledReport::new();
        report.record(0, &r, UnscheduledReason::NoAvailableRoom, "rooms full".into());
        report.record(0, &r, UnscheduledReason::Cancelled, String::new());
        assert_eq!(report.len(), 1);
        assert!(report.contains(0));
        let row = &report.rows()[0];
        assert_eq!(row.reason, UnscheduledReason::NoAvailableRoom);
        assert_eq!(row.slots_required, 2);
        assert_eq!(row.available_rooms.len(), 2);
        assert_eq!(row.section_id, "A");
    }
}

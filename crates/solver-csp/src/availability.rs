use crate::model::{Cell, Grid, Model};
use sched_core::time::overlaps;

/// A set of blocked cells, stored as a dense mask over the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockedCells(Vec<bool>);

impl BlockedCells {
    fn none(grid: Grid) -> Self {
        Self(vec![false; grid.len()])
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.0[cell]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }
}

/// Blocked `(day, slot)` cells per teacher and per section, derived once from
/// availability windows and breaks.
#[derive(Clone, Debug)]
pub struct AvailabilityIndex {
    grid: Grid,
    teacher: Vec<BlockedCells>,
    section: Vec<BlockedCells>,
}

impl AvailabilityIndex {
    pub fn build(model: &Model<'_>) -> Self {
        let grid = model.grid;
        let problem = model.problem;

        // A teacher with any availability rows is open only inside them.
        let teacher = model
            .teachers
            .iter()
            .map(|t| {
                let mut blocked = BlockedCells::none(grid);
                if let Some(windows) = problem.availability.get(t) {
                    for day in 0..grid.days {
                        for (si, slot) in problem.slots.iter().enumerate() {
                            let fits = windows
                                .iter()
                                .any(|w| w.day == day && w.from <= slot.start && slot.end <= w.to);
                            blocked.0[grid.cell(day, si)] = !fits;
                        }
                    }
                }
                blocked
            })
            .collect();

        let section = model
            .sections
            .iter()
            .map(|s| {
                let mut blocked = BlockedCells::none(grid);
                for b in problem.breaks.iter().filter(|b| &b.section == s) {
                    for (si, slot) in problem.slots.iter().enumerate() {
                        if overlaps(slot.start, slot.end, b.from, b.to) {
                            blocked.0[grid.cell(b.day, si)] = true;
                        }
                    }
                }
                blocked
            })
            .collect();

        Self {
            grid,
            teacher,
            section,
        }
    }

    #[inline]
    pub fn teacher_blocked(&self, teacher: usize, cell: Cell) -> bool {
        self.teacher[teacher].contains(cell)
    }

    #[inline]
    pub fn section_blocked(&self, section: usize, cell: Cell) -> bool {
        self.section[section].contains(cell)
    }

    pub fn teacher_open_cells(&self, teacher: usize) -> impl Iterator<Item = Cell> + '_ {
        (0..self.grid.len()).filter(move |&c| !self.teacher_blocked(teacher, c))
    }

    pub fn section_blocked_count(&self, section: usize) -> usize {
        self.section[section].count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{problem, req};

    #[test]
    fn teacher_windows_must_contain_the_whole_slot() {
        // slots: 08-09, 09-10, 10-12
        let mut p = problem(&["Mon", "Tue"], &[("08:00", "09:00"), ("09:00", "10:00"), ("10:00", "12:00")]);
        p.requirements.push(req("CS1", "A", "T", 1, &["R1"]));
        p.availability.insert(
            "T".into(),
            vec![sched_core::AvailabilityWindow {
                day: 0,
                from: sched_core::ClockTime::parse("09:00").unwrap(),
                to: sched_core::ClockTime::parse("11:00").unwrap(),
            }],
        );
        let m = Model::new(&p);
        let idx = AvailabilityIndex::build(&m);
        let g = m.grid;
        assert!(idx.teacher_blocked(0, g.cell(0, 0)));
        assert!(!idx.teacher_blocked(0, g.cell(0, 1)));
        // partial overlap is not enough
        assert!(idx.teacher_blocked(0, g.cell(0, 2)));
        // closed world on days without windows
        assert!((0..3).all(|s| idx.teacher_blocked(0, g.cell(1, s))));
        assert_eq!(idx.teacher_open_cells(0).collect::<Vec<_>>(), vec![g.cell(0, 1)]);
    }

    #[test]
    fn teachers_without_rows_are_open_everywhere() {
        let mut p = problem(&["Mon", "Tue"], &[("08:00", "09:00")]);
        p.requirements.push(req("CS1", "A", "T", 1, &["R1"]));
        let m = Model::new(&p);
        let idx = AvailabilityIndex::build(&m);
        assert_eq!(idx.teacher_open_cells(0).count(), 2);
    }

    #[test]
    fn breaks_block_overlapping_slots_of_their_section_only() {
        let mut p = problem(&["Mon", "Tue"], &[("11:00", "12:00"), ("11:30", "12:30"), ("13:00", "14:00")]);
        p.requirements.push(req("CS1", "A", "T", 1, &["R1"]));
        p.requirements.push(req("CS2", "B", "U", 1, &["R1"]));
        p.breaks.push(sched_core::Break {
            section: p.requirements[0].section.clone(),
            day: 1,
            from: sched_core::ClockTime::parse("12:00").unwrap(),
            to: sched_core::ClockTime::parse("13:00").unwrap(),
        });
        let m = Model::new(&p);
        let idx = AvailabilityIndex::build(&m);
        let g = m.grid;
        assert!(!idx.section_blocked(0, g.cell(1, 0)));
        assert!(idx.section_blocked(0, g.cell(1, 1)));
        assert!(!idx.section_blocked(0, g.cell(1, 2)));
        assert!(!idx.section_blocked(0, g.cell(0, 1)));
        assert_eq!(idx.section_blocked_count(0), 1);
        assert_eq!(idx.section_blocked_count(1), 0);
    }
}

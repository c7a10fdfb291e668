use sched_core::{Problem, SectionKey};
use std::collections::{BTreeSet, HashMap};
use types::{RoomId, TeacherId};

/// Index of a `(day, slot)` pair in a [`Grid`].
pub type Cell = usize;

/// Index of an occurrence in [`Model::occs`].
pub type OccId = usize;

const VIRTUAL_ROOM_KEYWORDS: [&str; 7] =
    ["online", "virtual", "zoom", "teams", "meet", "webex", "remote"];

/// Rooms that can host any number of meetings at once.
pub fn is_virtual_room(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    !lower.is_empty() && VIRTUAL_ROOM_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// The repeating week as a dense `days × slots` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub days: usize,
    pub slots: usize,
}

impl Grid {
    #[inline]
    pub fn cell(&self, day: usize, slot: usize) -> Cell {
        day * self.slots + slot
    }

    #[inline]
    pub fn day_of(&self, cell: Cell) -> usize {
        cell / self.slots
    }

    #[inline]
    pub fn slot_of(&self, cell: Cell) -> usize {
        cell % self.slots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.days * self.slots
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoomTable {
    names: Vec<RoomId>,
    virtual_flags: Vec<bool>,
    by_name: HashMap<RoomId, usize>,
}

impl RoomTable {
    fn intern(&mut self, name: &RoomId) -> usize {
        if let Some(&i) = self.by_name.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.clone());
        self.virtual_flags.push(is_virtual_room(&name.0));
        self.by_name.insert(name.clone(), i);
        i
    }

    pub fn name(&self, room: usize) -> &RoomId {
        &self.names[room]
    }

    pub fn is_virtual(&self, room: usize) -> bool {
        self.virtual_flags[room]
    }

    pub fn virtual_flags(&self) -> &[bool] {
        &self.virtual_flags
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Interned view of one requirement.
#[derive(Clone, Debug)]
pub struct ReqInfo {
    pub teacher: usize,
    pub section: usize,
    pub rooms: Vec<usize>,
    pub slots_required: u32,
    pub min_minutes: u32,
    pub occurrences: Vec<OccId>,
    /// Requirements sharing the teacher, the section or a physical room,
    /// including this one. Ascending.
    pub neighbors: Vec<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub req: usize,
    /// 1-based.
    pub index: u32,
}

/// Integer-indexed form of a [`Problem`] used by every search component.
pub struct Model<'p> {
    pub problem: &'p Problem,
    pub grid: Grid,
    pub rooms: RoomTable,
    pub teachers: Vec<TeacherId>,
    pub sections: Vec<SectionKey>,
    pub reqs: Vec<ReqInfo>,
    pub occs: Vec<Occurrence>,
    pub slot_minutes: Vec<u32>,
}

impl<'p> Model<'p> {
    pub fn new(problem: &'p Problem) -> Self {
        let grid = Grid {
            days: problem.days.len(),
            slots: problem.slots.len(),
        };
        let mut rooms = RoomTable::default();
        let mut teachers: Vec<TeacherId> = Vec::new();
        let mut teacher_idx: HashMap<&TeacherId, usize> = HashMap::new();
        let mut sections: Vec<SectionKey> = Vec::new();
        let mut section_idx: HashMap<&SectionKey, usize> = HashMap::new();

        let mut reqs = Vec::with_capacity(problem.requirements.len());
        let mut occs = Vec::new();
        for (ri, req) in problem.requirements.iter().enumerate() {
            let teacher = *teacher_idx.entry(&req.teacher).or_insert_with(|| {
                teachers.push(req.teacher.clone());
                teachers.len() - 1
            });
            let section = *section_idx.entry(&req.section).or_insert_with(|| {
                sections.push(req.section.clone());
                sections.len() - 1
            });
            let room_ids = req.rooms.iter().map(|r| rooms.intern(r)).collect();
            // Occurrences take distinct days, so a requirement with more
            // meetings than days gets none and is screened out before search.
            let count = if req.slots_required as usize > grid.days {
                0
            } else {
                req.slots_required
            };
            let occurrences = (1..=count)
                .map(|index| {
                    occs.push(Occurrence { req: ri, index });
                    occs.len() - 1
                })
                .collect();
            reqs.push(ReqInfo {
                teacher,
                section,
                rooms: room_ids,
                slots_required: req.slots_required,
                min_minutes: req.min_minutes(),
                occurrences,
                neighbors: Vec::new(),
            });
        }

        let mut by_teacher: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut by_section: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut by_room: HashMap<usize, Vec<usize>> = HashMap::new();
        for (ri, info) in reqs.iter().enumerate() {
            by_teacher.entry(info.teacher).or_default().push(ri);
            by_section.entry(info.section).or_default().push(ri);
            for &room in &info.rooms {
                if !rooms.is_virtual(room) {
                    by_room.entry(room).or_default().push(ri);
                }
            }
        }
        for ri in 0..reqs.len() {
            let mut set = BTreeSet::from([ri]);
            set.extend(by_teacher[&reqs[ri].teacher].iter().copied());
            set.extend(by_section[&reqs[ri].section].iter().copied());
            for room in &reqs[ri].rooms {
                if let Some(others) = by_room.get(room) {
                    set.extend(others.iter().copied());
                }
            }
            reqs[ri].neighbors = set.into_iter().collect();
        }

        Self {
            problem,
            grid,
            rooms,
            teachers,
            sections,
            reqs,
            occs,
            slot_minutes: problem.slots.iter().map(|s| s.minutes()).collect(),
        }
    }

    pub fn cell_minutes(&self, cell: Cell) -> u32 {
        self.slot_minutes[self.grid.slot_of(cell)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_rooms_match_keywords_case_insensitively() {
        for name in ["Zoom A", "ONLINE", "MS Teams 2", "Google Meet", "Webex-1", "Remote Lab", "virtual"] {
            assert!(is_virtual_room(name), "{name}");
        }
        for name in ["R101", "Lab 3", "", "   "] {
            assert!(!is_virtual_room(name), "{name}");
        }
    }

    #[test]
    fn grid_round_trips_cells() {
        let g = Grid { days: 5, slots: 4 };
        assert_eq!(g.len(), 20);
        let c = g.cell(3, 2);
        assert_eq!((g.day_of(c), g.slot_of(c)), (3, 2));
    }

    #[test]
    fn more_meetings_than_days_builds_no_occurrences() {
        let mut p = crate::testing::problem(&["Mon", "Tue"], &[("08:00", "09:00")]);
        p.requirements.push(crate::testing::req("CS1", "A", "T", 2, &[]));
        p.requirements.push(crate::testing::req("CS2", "B", "U", 4_000_000_000, &[]));
        let m = Model::new(&p);
        assert_eq!(m.occs.len(), 2);
        assert_eq!(m.reqs[0].occurrences, vec![0, 1]);
        assert!(m.reqs[1].occurrences.is_empty());
        assert_eq!(m.reqs[1].slots_required, 4_000_000_000);
    }
}

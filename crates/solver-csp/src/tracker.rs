use crate::model::{Cell, OccId};
use std::collections::HashMap;

/// Live occupancy of teachers, sections and physical rooms per cell.
///
/// Every `commit` must be paired with exactly one `retract` of the same
/// placement; the search engine is the only writer.
#[derive(Clone, Debug)]
pub struct ConflictTracker {
    teacher: HashMap<(usize, Cell), OccId>,
    section: HashMap<(usize, Cell), OccId>,
    room: HashMap<(usize, Cell), OccId>,
    virtual_rooms: Vec<bool>,
}

impl ConflictTracker {
    pub fn new(virtual_rooms: &[bool]) -> Self {
        Self {
            teacher: HashMap::new(),
            section: HashMap::new(),
            room: HashMap::new(),
            virtual_rooms: virtual_rooms.to_vec(),
        }
    }

    #[inline]
    fn physical(&self, room: Option<usize>) -> Option<usize> {
        room.filter(|&r| !self.virtual_rooms[r])
    }

    pub fn can_place(&self, cell: Cell, room: Option<usize>, teacher: usize, section: usize) -> bool {
        if self.teacher.contains_key(&(teacher, cell)) || self.section.contains_key(&(section, cell)) {
            return false;
        }
        match self.physical(room) {
            Some(r) => !self.room.contains_key(&(r, cell)),
            None => true,
        }
    }

    pub fn commit(&mut self, occ: OccId, cell: Cell, room: Option<usize>, teacher: usize, section: usize) {
        debug_assert!(self.can_place(cell, room, teacher, section), "commit over a conflict");
        self.teacher.insert((teacher, cell), occ);
        self.section.insert((section, cell), occ);
        if let Some(r) = self.physical(room) {
            self.room.insert((r, cell), occ);
        }
    }

    pub fn retract(&mut self, occ: OccId, cell: Cell, room: Option<usize>, teacher: usize, section: usize) {
        let t = self.teacher.remove(&(teacher, cell));
        let s = self.section.remove(&(section, cell));
        debug_assert_eq!(t, Some(occ), "teacher retract without matching commit");
        debug_assert_eq!(s, Some(occ), "section retract without matching commit");
        if let Some(r) = self.physical(room) {
            let prev = self.room.remove(&(r, cell));
            debug_assert_eq!(prev, Some(occ), "room retract without matching commit");
        }
    }

    /// Number of committed placements.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.teacher.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teacher.is_empty() && self.section.is_empty() && self.room.is_empty()
    }
}

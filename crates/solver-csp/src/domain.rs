use crate::availability::AvailabilityIndex;
use crate::model::{Cell, Model};

/// One candidate placement of an occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    pub cell: Cell,
    /// `None` for requirements that meet without a room.
    pub room: Option<usize>,
}

/// Candidate values of a requirement's occurrences before any search
/// decision, with lookup tables used by forward checking.
#[derive(Clone, Debug)]
pub struct StaticDomain {
    pub values: Vec<Value>,
    by_cell: Vec<Vec<u32>>,
    by_day: Vec<Vec<u32>>,
    /// Cells not blocked by the teacher's availability.
    pub teacher_open_cells: usize,
    pub teacher_open_days: usize,
    /// Distinct days with at least one value.
    pub open_days: usize,
    /// Longest slot among the values, in minutes.
    pub max_minutes: u32,
}

impl StaticDomain {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn at_cell(&self, cell: Cell) -> &[u32] {
        &self.by_cell[cell]
    }

    #[inline]
    pub fn on_day(&self, day: usize) -> &[u32] {
        &self.by_day[day]
    }
}

/// Builds one static domain per requirement: `rooms × days × slots` minus the
/// cells blocked for its teacher or its section. Values are ordered day, slot,
/// then room in listed order.
pub fn build_domains(model: &Model<'_>, index: &AvailabilityIndex) -> Vec<StaticDomain> {
    let grid = model.grid;
    model
        .reqs
        .iter()
        .map(|info| {
            let rooms: Vec<Option<usize>> = if info.rooms.is_empty() {
                vec![None]
            } else {
                info.rooms.iter().copied().map(Some).collect()
            };

            let mut values = Vec::new();
            let mut by_cell = vec![Vec::new(); grid.len()];
            let mut by_day = vec![Vec::new(); grid.days];
            let mut teacher_open_cells = 0;
            let mut teacher_days = vec![false; grid.days];
            let mut max_minutes = 0;
            for day in 0..grid.days {
                for slot in 0..grid.slots {
                    let cell = grid.cell(day, slot);
                    if index.teacher_blocked(info.teacher, cell) {
                        continue;
                    }
                    teacher_open_cells += 1;
                    teacher_days[day] = true;
                    if index.section_blocked(info.section, cell) {
                        continue;
                    }
                    max_minutes = max_minutes.max(model.slot_minutes[slot]);
                    for &room in &rooms {
                        let i = values.len() as u32;
                        values.push(Value { cell, room });
                        by_cell[cell].push(i);
                        by_day[day].push(i);
                    }
                }
            }
            let open_days = by_day.iter().filter(|d| !d.is_empty()).count();
            StaticDomain {
                values,
                by_cell,
                by_day,
                teacher_open_cells,
                teacher_open_days: teacher_days.iter().filter(|d| **d).count(),
                open_days,
                max_minutes,
            }
        })
        .collect()
}

/// The live subset of a [`StaticDomain`] for one occurrence. Reductions are
/// undone through the search trail.
#[derive(Clone, Debug)]
pub struct DynamicDomain {
    alive: Vec<bool>,
    len: usize,
}

impl DynamicDomain {
    pub fn full(size: usize) -> Self {
        Self {
            alive: vec![true; size],
            len: size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        self.alive[value as usize]
    }

    /// Returns `true` if the value was alive.
    #[inline]
    pub fn remove(&mut self, value: u32) -> bool {
        let slot = &mut self.alive[value as usize];
        if *slot {
            *slot = false;
            self.len -= 1;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn restore(&mut self, value: u32) {
        let slot = &mut self.alive[value as usize];
        debug_assert!(!*slot, "restoring a live value");
        if !*slot {
            *slot = true;
            self.len += 1;
        }
    }

    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| i as u32)
    }
}

use crate::model::OccId;

/// One reversible mutation of the search state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrailEntry {
    /// `value` was removed from the dynamic domain of `occ`.
    Pruned { occ: OccId, value: u32 },
    /// `occ` was assigned and committed to the conflict tracker.
    Committed { occ: OccId },
}

/// A linear undo log with frame markers.
///
/// A frame is pushed before a tentative assignment and everything recorded
/// after it belongs to that search node. Backtracking pops the frame and
/// replays its entries in reverse.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    entries: Vec<TrailEntry>,
    /// `frames[i]` is the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl Trail {
    pub fn with_capacity(entries: usize, depth: usize) -> Self {
        Self {
            entries: Vec::with_capacity(entries),
            frames: Vec::with_capacity(depth),
        }
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    #[inline]
    pub fn record(&mut self, entry: TrailEntry) {
        debug_assert!(!self.frames.is_empty(), "recording outside of a frame");
        self.entries.push(entry);
    }

    /// Closes the innermost frame and returns its start index. Entries above
    /// the start must then be drained with [`Trail::pop_above`].
    #[inline]
    pub fn pop_frame(&mut self) -> usize {
        self.frames.pop().unwrap_or(0)
    }

    #[inline]
    pub fn pop_above(&mut self, start: usize) -> Option<TrailEntry> {
        if self.entries.len() > start {
            self.entries.pop()
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_unwind_in_lifo_order() {
        let mut t = Trail::default();
        t.push_frame();
        t.record(TrailEntry::Committed { occ: 0 });
        t.push_frame();
        t.record(TrailEntry::Committed { occ: 1 });
        t.record(TrailEntry::Pruned { occ: 2, value: 9 });
        assert_eq!(t.depth(), 2);

        let start = t.pop_frame();
        let mut undone = Vec::new();
        while let Some(e) = t.pop_above(start) {
            undone.push(e);
        }
        assert_eq!(
            undone,
            vec![TrailEntry::Pruned { occ: 2, value: 9 }, TrailEntry::Committed { occ: 1 }]
        );
        assert_eq!(t.len(), 1);

        let start = t.pop_frame();
        assert_eq!(t.pop_above(start), Some(TrailEntry::Committed { occ: 0 }));
        assert_eq!(t.pop_above(start), None);
        assert!(t.is_empty());
    }
}

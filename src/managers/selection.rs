//! Multi-select state for bulk bookmark actions.
//!
//! Selection mode is not stored separately: it is on exactly while at least
//! one id is selected, so emptying the set (one toggle at a time or via
//! `clear`) always leaves selection mode.

/// Ordered set of selected bookmark ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`. Returns whether `id` is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        match self.ids.iter().position(|&s| s == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        }
    }

    /// Removes `id` if present. Returns whether anything changed.
    pub fn deselect(&mut self, id: i64) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&s| s != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// True while selection mode is on.
    pub fn is_active(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in the order they were selected.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

use std::collections::HashSet;

use crate::types::Photo;

/// Photos marked for deletion. Nothing reaches the overlay until a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: HashSet<i64>,
}

impl SelectionTracker {
    /// Flip `id` in or out of the selection. Returns true when now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids, sorted ascending.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.selected.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn as_set(&self) -> &HashSet<i64> {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that are no longer on the displayed page.
    pub fn retain_displayed(&mut self, photos: &[Photo]) {
        let displayed: HashSet<i64> = photos.iter().map(|photo| photo.id).collect();
        self.selected.retain(|id| displayed.contains(id));
    }
}

//! Recently played catalog tracks.

use std::collections::VecDeque;

/// Most-recent-first list of catalog indices without duplicates.
///
/// Replaying a track moves it to the front; once `limit` is reached the
/// oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<usize>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, index: usize) {
        self.entries.retain(|&i| i != index);
        self.entries.push_front(index);
        self.entries.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(20)
    }
}

//! Manual play queue: FIFO, consumed before shuffle/sequential selection.

use std::collections::VecDeque;

use super::types::QueueEntry;

#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    entries: VecDeque<QueueEntry>,
}

impl PlayQueue {
    pub fn push(&mut self, entry: QueueEntry) {
        self.entries.push_back(entry);
    }

    /// Remove and return the head entry.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }
}

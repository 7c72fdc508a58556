use std::collections::VecDeque;

use banker_core::Feedback;
use chrono::{DateTime, Local};

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Local wall-clock stamp, `HH:MM:SS`.
    pub stamp: String,
    pub message: String,
    pub success: bool,
}

/// Newest-first feed of command outcomes, capped at a fixed size.
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl ActivityFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, feedback: &Feedback) {
        self.record_at(Local::now(), feedback);
    }

    pub fn record_at(&mut self, at: DateTime<Local>, feedback: &Feedback) {
        self.entries.push_front(ActivityEntry {
            stamp: at.format("%H:%M:%S").to_string(),
            message: feedback.message.clone(),
            success: feedback.success,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }
}

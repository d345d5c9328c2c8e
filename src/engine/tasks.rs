//! Deferred Tasks - Zero-delay follow-up work.
//!
//! A task queued while an event is being handled runs only after every
//! synchronous event of the same turn has been processed. The keyboard uses
//! this for its focus-out check, which must observe focus after a press on
//! one of its own buttons has settled.

use std::collections::VecDeque;

/// FIFO queue of deferred tasks.
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    pending: VecDeque<T>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self { pending: VecDeque::new() }
    }

    /// Schedule a task for after the current turn.
    pub fn defer(&mut self, task: T) {
        self.pending.push_back(task);
    }

    /// Take every task queued so far. Tasks deferred while these run land in
    /// the next batch.
    pub fn take_batch(&mut self) -> Vec<T> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

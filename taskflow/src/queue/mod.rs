//! Criticality-ordered ready queue.
//!
//! A min-priority queue keyed by `(priority, sequence)` so that jobs of
//! equal priority dequeue in submission order.

use crate::task::Criticality;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A job waiting in the ready queue.
///
/// Lives only inside the queue; the sequence number provides a stable
/// FIFO tie-break between equal priorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    /// The task this job schedules.
    pub task_name: String,
    /// Effective priority; lower runs first.
    pub priority: u8,
    /// Monotonically increasing insertion sequence.
    pub sequence: u64,
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the std max-heap pops the smallest key first.
        (other.priority, other.sequence).cmp(&(self.priority, self.sequence))
    }
}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The set of tasks whose dependencies are all satisfied, ordered by
/// criticality.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    heap: BinaryHeap<QueuedJob>,
    next_sequence: u64,
}

impl ReadyQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a task at its criticality rank. O(log n).
    pub fn push_task(&mut self, task_name: impl Into<String>, criticality: Criticality) {
        self.push_with_priority(task_name, criticality.rank());
    }

    /// Enqueues a task with an explicit priority override. O(log n).
    pub fn push_with_priority(&mut self, task_name: impl Into<String>, priority: u8) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedJob {
            task_name: task_name.into(),
            priority,
            sequence,
        });
    }

    /// Removes and returns the highest-priority job. O(log n).
    pub fn pop(&mut self) -> Option<QueuedJob> {
        self.heap.pop()
    }

    /// Removes and returns the highest-priority job.
    ///
    /// # Panics
    ///
    /// Panics when the queue is empty; callers must check `is_empty` first.
    pub fn dequeue(&mut self) -> QueuedJob {
        self.pop()
            .unwrap_or_else(|| panic!("dequeue called on an empty ready queue"))
    }

    /// Returns the number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no jobs are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Discards all queued jobs, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }
}

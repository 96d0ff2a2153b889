// src/sched/queue.rs

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use super::task::ScheduledTask;
use crate::errors::{HostError, Result};

/// Heap entry. `seq` is the insertion counter used to keep equal target
/// times in FIFO order.
struct Entry {
    seq: u64,
    task: ScheduledTask,
}

impl Entry {
    fn key(&self) -> (u64, u64) {
        (self.task.target_time_nanos(), self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap yields the earliest (time, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Pending tasks ordered by target time, then by insertion order.
///
/// Semantics:
/// - `pop_earliest` always returns the smallest `target_time_nanos`; among
///   equal times, the one pushed first.
/// - A popped task is gone; nothing is ever re-enqueued behind the caller's
///   back.
/// - Dropping the queue drops every pending callback without running it.
///
/// Not synchronized. [`HostContext`](super::HostContext) owns the lock.
#[derive(Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    max_depth: Option<usize>,
}

impl TaskQueue {
    /// Unbounded queue; only allocation failure stops it growing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that refuses to hold more than `max_depth` pending tasks.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Insert a task.
    ///
    /// If the queue is at its depth limit or the backing storage cannot grow,
    /// the task is dropped, a warning is logged and `HostError::QueueGrowth`
    /// is returned. That is the only way this queue loses work.
    pub fn push(&mut self, task: ScheduledTask) -> Result<()> {
        let depth = self.heap.len();
        if self.max_depth.is_some_and(|max| depth >= max) {
            warn!(
                target_time_nanos = task.target_time_nanos(),
                depth,
                "task queue full; dropping task"
            );
            return Err(HostError::QueueGrowth {
                depth,
                source: None,
            });
        }

        if let Err(err) = self.heap.try_reserve(1) {
            warn!(
                target_time_nanos = task.target_time_nanos(),
                depth,
                error = %err,
                "failed to grow task queue; dropping task"
            );
            return Err(HostError::QueueGrowth {
                depth,
                source: Some(err),
            });
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Entry { seq, task });
        Ok(())
    }

    /// Remove and return the earliest task, or `None` when empty.
    pub fn pop_earliest(&mut self) -> Option<ScheduledTask> {
        self.heap.pop().map(|entry| entry.task)
    }

    /// Target time of the earliest pending task, without removing it.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.task.target_time_nanos())
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Drop every pending task without running it. Returns how many were
    /// discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.heap.len();
        self.heap.clear();
        if discarded > 0 {
            debug!(discarded, "discarded pending tasks");
        }
        discarded
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("depth", &self.heap.len())
            .field("next_deadline", &self.next_deadline())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Debouncing delay queue.
//!
//! A min-heap of fire times plus a map of the pending action per key. At most
//! one job per key is pending. Scheduling a key that is already pending swaps
//! in the new action but keeps the first deadline, so a burst of events fires
//! once, at the end of the first window, with the latest action.
//!
//! Heap entries are never removed in place. A cancelled or replaced entry is
//! recognized by its sequence number and discarded when it reaches the top.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tokio::time::Instant;

use gs_core::EntityType;

use super::event::{JobAction, JobKey, SyncJob};

struct Pending {
    seq: u64,
    action: JobAction,
}

#[derive(Default)]
pub struct DelayQueue {
    heap: BinaryHeap<Reverse<(Instant, u64, JobKey)>>,
    pending: HashMap<JobKey, Pending>,
    next_seq: u64,
}

impl DelayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job to fire at `deadline`. Returns false when the key was
    /// already pending and only its action was replaced.
    pub fn schedule(&mut self, job: SyncJob, deadline: Instant) -> bool {
        if let Some(pending) = self.pending.get_mut(&job.key) {
            pending.action = job.action;
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq, job.key)));
        self.pending.insert(
            job.key,
            Pending {
                seq,
                action: job.action,
            },
        );
        true
    }

    /// Drop the pending job for a key.
    #[cfg(test)]
    pub fn cancel(&mut self, key: &JobKey) -> Option<JobAction> {
        self.pending.remove(key).map(|p| p.action)
    }

    /// Drop every pending job on a group, members included. Returns how many.
    pub fn cancel_group(&mut self, group_id: i64) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|key, _| !(key.entity_type == EntityType::Group && key.entity_id == group_id));
        before - self.pending.len()
    }

    /// Earliest live deadline.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Remove and return every job due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<SyncJob> {
        let mut due = Vec::new();
        while let Some(deadline) = self.next_deadline() {
            if deadline > now {
                break;
            }
            if let Some(job) = self.pop() {
                due.push(job);
            }
        }
        due
    }

    /// Remove and return everything still pending, earliest first.
    pub fn drain(&mut self) -> Vec<SyncJob> {
        let mut jobs = Vec::with_capacity(self.pending.len());
        while let Some(job) = self.pop() {
            jobs.push(job);
        }
        self.heap.clear();
        jobs
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of a pending key.
    #[cfg(test)]
    pub fn deadline(&self, key: &JobKey) -> Option<Instant> {
        let seq = self.pending.get(key)?.seq;
        self.heap
            .iter()
            .find(|Reverse((_, s, k))| *s == seq && k == key)
            .map(|Reverse((deadline, _, _))| *deadline)
    }

    fn pop(&mut self) -> Option<SyncJob> {
        while let Some(Reverse((_, seq, key))) = self.heap.pop() {
            if self.pending.get(&key).is_some_and(|p| p.seq == seq) {
                if let Some(pending) = self.pending.remove(&key) {
                    return Some(SyncJob {
                        key,
                        action: pending.action,
                    });
                }
            }
        }
        None
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse((_, seq, key))) = self.heap.peek() {
            if self.pending.get(key).is_some_and(|p| p.seq == *seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

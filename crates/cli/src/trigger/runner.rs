// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The trigger loop.
//!
//! Producers hand events to a [`TriggerHandle`]. [`TriggerLayer::run`] is the
//! single consumer: it gates each event, schedules its job in the
//! [`DelayQueue`], and spawns due jobs onto the runtime. When every handle is
//! dropped the loop fires what is still pending and waits for running jobs.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

use gs_core::EntityType;

use super::event::{EventSubscriber, JobAction, LocalEvent, SyncJob};
use super::queue::DelayQueue;
use crate::remote::{HttpTransport, Transport};
use crate::sync::{SyncEngine, SyncOutcome};

/// Sending side of the trigger layer.
#[derive(Clone)]
pub struct TriggerHandle {
    tx: mpsc::UnboundedSender<LocalEvent>,
}

impl EventSubscriber for TriggerHandle {
    fn on_event(&self, event: LocalEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(event = event.name(), "trigger layer stopped, event dropped");
        }
    }
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    pub received: usize,
    pub dropped: usize,
    /// Events folded into an already pending job.
    pub coalesced: usize,
    pub fired: usize,
}

pub struct TriggerLayer<T: Transport = HttpTransport> {
    engine: SyncEngine<T>,
    rx: mpsc::UnboundedReceiver<LocalEvent>,
    queue: DelayQueue,
    tasks: JoinSet<()>,
    stats: TriggerStats,
}

impl<T: Transport + 'static> TriggerLayer<T> {
    pub fn new(engine: SyncEngine<T>) -> (Self, TriggerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let layer = TriggerLayer {
            engine,
            rx,
            queue: DelayQueue::new(),
            tasks: JoinSet::new(),
            stats: TriggerStats::default(),
        };
        (layer, TriggerHandle { tx })
    }

    /// Consume events until every handle is gone.
    pub async fn run(mut self) -> TriggerStats {
        tracing::info!("trigger layer started");
        loop {
            let deadline = self.queue.next_deadline();
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.accept(event).await,
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    for job in self.queue.pop_due(Instant::now()) {
                        self.spawn(job);
                    }
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "sync job failed to complete");
                    }
                }
            }
        }

        let pending = self.queue.drain();
        if !pending.is_empty() {
            tracing::info!(count = pending.len(), "event stream closed, firing pending jobs");
        }
        for job in pending {
            self.spawn(job);
        }
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "sync job failed to complete");
            }
        }

        tracing::info!(
            received = self.stats.received,
            dropped = self.stats.dropped,
            fired = self.stats.fired,
            "trigger layer stopped"
        );
        self.stats
    }

    async fn accept(&mut self, event: LocalEvent) {
        self.stats.received += 1;
        if let Some(reason) = refusal(&self.engine, &event).await {
            tracing::debug!(event = event.name(), reason, "event dropped");
            self.stats.dropped += 1;
            return;
        }

        let job = event.job();
        if job.action == JobAction::Delete {
            let cancelled = self.queue.cancel_group(job.key.entity_id);
            tracing::debug!(group_id = job.key.entity_id, cancelled, "group deleted, running now");
            self.spawn(job);
            return;
        }

        let deadline = Instant::now() + job.delay(&self.engine.config().trigger);
        if self.queue.schedule(job, deadline) {
            tracing::debug!(event = event.name(), key = ?job.key, "job scheduled");
        } else {
            tracing::debug!(event = event.name(), key = ?job.key, "pending job replaced");
            self.stats.coalesced += 1;
        }
    }

    fn spawn(&mut self, job: SyncJob) {
        self.stats.fired += 1;
        let engine = self.engine.clone();
        self.tasks.spawn(async move {
            let outcome = run_job(&engine, job).await;
            tracing::debug!(key = ?job.key, kind = %outcome.kind, "job finished");
        });
    }
}

/// Why an event should not become a job, if it should not.
async fn refusal<T: Transport>(engine: &SyncEngine<T>, event: &LocalEvent) -> Option<&'static str> {
    if !engine.config().sync.realtime {
        return Some("real-time sync is disabled");
    }
    let job = event.job();
    if !engine.can_sync(job.key.entity_type) {
        return Some("sync is disabled for this kind");
    }

    match *event {
        LocalEvent::GroupDeleted { .. } => None,
        LocalEvent::ThreadSaved { thread_id } => {
            match engine
                .with_db(|db| db.get_remote_id(EntityType::Thread, thread_id))
                .await
            {
                Ok(Some(_)) => None,
                Ok(None) => Some("thread is not synced yet"),
                Err(e) => {
                    tracing::warn!(thread_id, error = %e, "failed to read thread mapping");
                    Some("mapping lookup failed")
                }
            }
        }
        _ => match event.group_id() {
            Some(group_id) => match engine.platform().get_group(group_id) {
                Ok(Some(group)) if engine.should_sync_group(&group) => None,
                Ok(Some(_)) => Some("group privacy is outside the tier"),
                Ok(None) => Some("group does not exist"),
                Err(e) => {
                    tracing::warn!(group_id, error = %e, "failed to read group");
                    Some("group lookup failed")
                }
            },
            None => None,
        },
    }
}

/// Execute one fired job against the engine.
pub async fn run_job<T: Transport>(engine: &SyncEngine<T>, job: SyncJob) -> SyncOutcome {
    let id = job.key.entity_id;
    match job.action {
        JobAction::Upsert => engine.sync_entity(job.key.entity_type, id).await,
        JobAction::Delete => engine.delete_group(id).await,
        JobAction::Membership { user_id, change } => engine.sync_membership(id, user_id, change).await,
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

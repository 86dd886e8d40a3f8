// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event-driven, debounced sync.
//!
//! Local mutations arrive as [`LocalEvent`]s. Each one that passes the gate
//! becomes a deferred [`SyncJob`] keyed by entity; repeated events for the
//! same key inside the delay window collapse into one job that reads the
//! entity when it fires.

mod event;
mod queue;
mod runner;

pub use event::{EventSubscriber, JobAction, JobKey, LocalEvent, SyncJob};
pub use queue::DelayQueue;
pub use runner::{run_job, TriggerHandle, TriggerLayer, TriggerStats};

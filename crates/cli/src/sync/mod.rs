// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pushing local entities to the remote backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Triggers   │────►│  SyncEngine  │────►│ RemoteClient │
//! │ bulk / CLI  │◄────│ (per entity) │◄────│              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐
//!                     │ mapping/audit│
//!                     │  (gs-core)   │
//!                     └──────────────┘
//! ```
//!
//! # Features
//!
//! - One entity per call, with members or participants as upserts
//! - Dependency ordering: a message's thread is created before the message
//! - Per-entity locks so concurrent triggers never double-create
//! - Outcomes as values, audited and broadcast
//! - Bulk batches and a connectivity self-test on top

mod bulk;
mod connectivity;
mod engine;
mod locks;
mod outcome;

pub use bulk::{BulkAllSummary, BulkItem, BulkKind, BulkReport, BulkSummary};
pub use connectivity::{CheckResult, ConnectivityReport};
pub use engine::{MembershipChange, SyncEngine};
pub use locks::{EntityGuard, EntityLocks};
pub use outcome::{MemberTally, OutcomeKind, SyncCompleted, SyncOutcome};

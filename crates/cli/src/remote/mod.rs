// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote REST backend access.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Client    │────►│  Transport  │────►│   Remote    │
//! │(RemoteClient)│◄────│   (trait)   │◄────│  REST API   │
//! └──────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The client turns entities into resource writes and decodes rows; the
//! transport carries requests and is injectable for tests.

mod client;
mod transport;

pub use client::{RemoteClient, Resource};
pub use transport::{
    HttpTransport, Method, RemoteError, RemoteRequest, RemoteResponse, RemoteResult, Transport,
};

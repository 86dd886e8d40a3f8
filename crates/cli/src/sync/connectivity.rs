// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Self-test of configuration, remote reachability, and platform state.

use serde::Serialize;

use super::engine::SyncEngine;
use crate::platform::Component;
use crate::remote::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub success: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        CheckResult {
            name,
            success: true,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        CheckResult {
            name,
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    /// True only when every check passed.
    pub success: bool,
    pub checks: Vec<CheckResult>,
}

impl ConnectivityReport {
    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|c| !c.success).count()
    }
}

impl<T: Transport> SyncEngine<T> {
    pub async fn test_connectivity(&self) -> ConnectivityReport {
        let mut checks = Vec::new();
        let configured = self.config().is_configured();

        checks.push(if configured {
            CheckResult::pass("configuration", "remote url and service key are set")
        } else {
            CheckResult::fail("configuration", "remote url or service key is missing")
        });

        checks.push(if !configured {
            CheckResult::fail("remote_api", "not attempted without configuration")
        } else {
            match self.client().ping().await {
                Ok(()) => CheckResult::pass("remote_api", "remote API is reachable"),
                Err(e) => CheckResult::fail("remote_api", e.to_string()),
            }
        });

        for (name, component) in [
            ("groups_component", Component::Groups),
            ("messages_component", Component::Messages),
        ] {
            checks.push(if self.platform().is_active(component) {
                CheckResult::pass(name, format!("{} component is active", component.as_str()))
            } else {
                CheckResult::fail(name, format!("{} component is not active", component.as_str()))
            });
        }

        // A user without an identity is fine; only a failed lookup counts
        match self.platform().sample_user() {
            Ok(Some(user_id)) => checks.push(match self.platform().remote_user_id(user_id) {
                Ok(Some(remote_id)) => CheckResult::pass(
                    "user_identity",
                    format!("user {user_id} maps to remote identity {remote_id}"),
                ),
                Ok(None) => CheckResult::pass(
                    "user_identity",
                    format!("user {user_id} has no remote identity yet"),
                ),
                Err(e) => CheckResult::fail("user_identity", format!("identity lookup failed: {e}")),
            }),
            Ok(None) => {}
            Err(e) => checks.push(CheckResult::fail(
                "user_identity",
                format!("failed to read users: {e}"),
            )),
        }

        let success = checks.iter().all(|c| c.success);
        tracing::info!(success, checks = checks.len(), "connectivity test finished");
        ConnectivityReport { success, checks }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;

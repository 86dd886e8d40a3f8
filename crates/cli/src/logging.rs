// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup. Logs go to stderr so stdout stays parseable.

use tracing_subscriber::EnvFilter;

use crate::env;

/// Pick the filter directive: `GSYNC_LOG` wins, then `-v`, then the
/// per-command default.
pub fn filter_directive(verbose: bool, long_running: bool) -> String {
    if let Some(directive) = env::log_filter() {
        return directive;
    }
    let level = if verbose {
        "debug"
    } else if long_running {
        "info"
    } else {
        "warn"
    };
    level.to_string()
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool, long_running: bool) {
    let directive = filter_directive(verbose, long_running);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `GSYNC_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::GSYNC_CONFIG).map(PathBuf::from)
}

/// Returns the value of `GSYNC_SERVICE_KEY` if set and non-empty.
pub fn service_key() -> Option<String> {
    non_empty(vars::GSYNC_SERVICE_KEY)
}

/// Returns the value of `GSYNC_API_KEY` if set and non-empty.
pub fn api_key() -> Option<String> {
    non_empty(vars::GSYNC_API_KEY)
}

/// Returns the log filter directive from `GSYNC_LOG` if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::GSYNC_LOG)
}

/// Returns the value of `XDG_CONFIG_HOME` if set.
pub fn xdg_config_home() -> Option<PathBuf> {
    non_empty(vars::XDG_CONFIG_HOME).map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

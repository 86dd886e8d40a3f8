// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    quiet = { false, false, "warn" },
    watch = { false, true, "info" },
    verbose = { true, false, "debug" },
    verbose_watch = { true, true, "debug" },
)]
fn default_levels(verbose: bool, long_running: bool, expected: &str) {
    if env::log_filter().is_some() {
        return;
    }
    assert_eq!(filter_directive(verbose, long_running), expected);
}

#[test]
fn init_twice_is_harmless() {
    init(false, false);
    init(true, false);
}

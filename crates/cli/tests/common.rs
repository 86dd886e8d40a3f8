// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The binary with inherited gsync settings cleared.
pub fn gsync() -> Command {
    let mut cmd = cargo_bin_cmd!("gsync");
    for var in ["GSYNC_CONFIG", "GSYNC_SERVICE_KEY", "GSYNC_API_KEY", "GSYNC_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// A temp directory holding a config file and a seeded platform database.
pub struct Setup {
    pub temp: TempDir,
    pub config: PathBuf,
}

impl Setup {
    /// `extra` is appended to the generated config.
    pub fn new(extra: &str) -> Self {
        let temp = TempDir::new().unwrap();
        seed_platform(&temp.path().join("platform.db"));

        let config = temp.path().join("config.toml");
        fs::write(
            &config,
            format!("database = \"state/gsync.db\"\nplatform_database = \"platform.db\"\n{extra}"),
        )
        .unwrap();
        Setup { temp, config }
    }

    /// Remote left unconfigured, so no command reaches the network.
    pub fn offline() -> Self {
        Self::new("")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = gsync();
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

fn seed_platform(path: &Path) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(gsrs::platform::PLATFORM_SCHEMA).unwrap();
    conn.execute_batch(
        "INSERT INTO users (id, display_name, remote_id) VALUES (1, 'Ada', 'u-1');
         INSERT INTO groups (id, name, privacy, creator_id) VALUES (1, 'Gardeners', 'public', 1);
         INSERT INTO group_members (group_id, user_id, role) VALUES (1, 1, 'admin');",
    )
    .unwrap();
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod bulk;
pub mod cleanup;
pub mod inspect;
pub mod logs;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use gs_core::Database;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::SqlitePlatform;
use crate::remote::RemoteClient;
use crate::sync::SyncEngine;

/// Locate and load the configuration file.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = Config::locate(explicit)?;
    tracing::debug!(path = %path.display(), "loading config");
    Config::load(&path)
}

/// Open the state database named by the config.
pub fn open_db(config: &Config) -> Result<Database> {
    Ok(Database::open(&config.database)?)
}

/// Wire a [`SyncEngine`] over the real platform database and HTTP transport.
pub fn open_engine(config: Config) -> Result<SyncEngine> {
    let platform_path = config
        .platform_database
        .clone()
        .ok_or_else(|| Error::Config("platform_database is not set".to_string()))?;
    let platform = SqlitePlatform::open(&platform_path)?;
    let client = RemoteClient::from_config(&config.remote)?;
    let db = open_db(&config)?;
    Ok(SyncEngine::new(config, Arc::new(platform), client, db))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync configuration.
//!
//! Configuration is read once from a TOML file and handed to every component
//! as an immutable snapshot. The file is located by, in order:
//! - the `--config` flag
//! - `GSYNC_CONFIG`
//! - `$XDG_CONFIG_HOME/gsync/config.toml` (or the platform config dir)
//!
//! Relative `database` and `platform_database` paths resolve against the
//! directory containing the config file.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::platform::Privacy;

const CONFIG_DIR_NAME: &str = "gsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "gsync.db";

const MIN_BATCH_SIZE: usize = 5;
const MAX_BATCH_SIZE: usize = 100;

/// Longest debounce window a trigger delay may ask for.
const MAX_DELAY_MS: u64 = 3_600_000;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// State database holding mappings and the sync log.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// The community platform's SQLite database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_database: Option<PathBuf>,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// Remote REST backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the backend, e.g. `https://project.example.co`.
    #[serde(default)]
    pub url: String,
    /// Path prefix of the REST API under `url`.
    #[serde(default = "default_rest_path")]
    pub rest_path: String,
    /// Service credential sent as a bearer token. `GSYNC_SERVICE_KEY` overrides it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_key: String,
    /// Value of the `apikey` header. Falls back to the service key when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Stamped on every pushed record so the backend can tell writers apart.
    #[serde(default = "default_platform_source")]
    pub platform_source: String,
}

/// Which kinds are synced and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Push groups and their members.
    #[serde(default)]
    pub groups: bool,
    /// Push threads, participants, and messages.
    #[serde(default)]
    pub messages: bool,
    /// React to local events (the `watch` command).
    #[serde(default = "default_true")]
    pub realtime: bool,
    #[serde(default)]
    pub group_privacy: PrivacyTier,
    /// Default group count for bulk runs (clamped to 5..=100).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Default message count for bulk runs.
    #[serde(default = "default_message_batch_size")]
    pub message_batch_size: usize,
}

/// Debounce windows for deferred jobs, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_group_delay_ms")]
    pub group_delay_ms: u64,
    #[serde(default = "default_membership_delay_ms")]
    pub membership_delay_ms: u64,
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
}

/// Audit log retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Sync log rows older than this many days are purged.
    #[serde(default = "default_retention_days")]
    pub days: u32,
}

/// Which group privacy levels are eligible for sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyTier {
    /// Public groups only.
    #[default]
    PublicOnly,
    /// Public and private groups.
    PublicPrivate,
    /// Public, private, and hidden groups.
    All,
}

impl PrivacyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyTier::PublicOnly => "public_only",
            PrivacyTier::PublicPrivate => "public_private",
            PrivacyTier::All => "all",
        }
    }

    /// Whether a group with the given privacy passes this tier.
    pub fn allows(&self, privacy: Privacy) -> bool {
        match self {
            PrivacyTier::PublicOnly => privacy == Privacy::Public,
            PrivacyTier::PublicPrivate => matches!(privacy, Privacy::Public | Privacy::Private),
            PrivacyTier::All => true,
        }
    }
}

impl fmt::Display for PrivacyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrivacyTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public_only" => Ok(PrivacyTier::PublicOnly),
            "public_private" => Ok(PrivacyTier::PublicPrivate),
            "all" => Ok(PrivacyTier::All),
            _ => Err(Error::Config(format!(
                "invalid group privacy tier '{s}': expected public_only, public_private, or all"
            ))),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from(DB_FILE_NAME)
}

fn default_rest_path() -> String {
    "/rest/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_platform_source() -> String {
    "community".to_string()
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    20
}

fn default_message_batch_size() -> usize {
    50
}

fn default_group_delay_ms() -> u64 {
    5_000
}

fn default_membership_delay_ms() -> u64 {
    3_000
}

fn default_message_delay_ms() -> u64 {
    2_000
}

fn default_retention_days() -> u32 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: String::new(),
            rest_path: default_rest_path(),
            service_key: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            platform_source: default_platform_source(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            groups: false,
            messages: false,
            realtime: default_true(),
            group_privacy: PrivacyTier::default(),
            batch_size: default_batch_size(),
            message_batch_size: default_message_batch_size(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            group_delay_ms: default_group_delay_ms(),
            membership_delay_ms: default_membership_delay_ms(),
            message_delay_ms: default_message_delay_ms(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        RetentionConfig {
            days: default_retention_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: default_database(),
            platform_database: None,
            remote: RemoteConfig::default(),
            sync: SyncConfig::default(),
            trigger: TriggerConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

impl RemoteConfig {
    /// Base URL for REST resources, e.g. `https://host/rest/v1`.
    pub fn rest_base(&self) -> String {
        let url = self.url.trim_end_matches('/');
        let path = self.rest_path.trim_end_matches('/');
        if path.is_empty() || path.starts_with('/') {
            format!("{url}{path}")
        } else {
            format!("{url}/{path}")
        }
    }

    /// Value of the `apikey` header.
    pub fn api_key(&self) -> &str {
        if self.api_key.is_empty() {
            &self.service_key
        } else {
            &self.api_key
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SyncConfig {
    /// Group batch size clamped to the supported range.
    pub fn group_batch(&self) -> usize {
        self.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE)
    }
}

impl TriggerConfig {
    pub fn group_delay(&self) -> Duration {
        Duration::from_millis(self.group_delay_ms.min(MAX_DELAY_MS))
    }

    pub fn membership_delay(&self) -> Duration {
        Duration::from_millis(self.membership_delay_ms.min(MAX_DELAY_MS))
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms.min(MAX_DELAY_MS))
    }
}

/// Instant `days` before `now`, the oldest audit row a purge keeps.
///
/// `None` when the horizon reaches past the representable date range, in
/// which case nothing is old enough to purge.
pub fn retention_cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(i64::from(days)).and_then(|horizon| now.checked_sub_signed(horizon))
}

impl Config {
    /// Find the config file to use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the chosen path does not exist.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match env::config_path() {
                Some(p) => p,
                None => default_config_path()?,
            },
        };
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.display().to_string()));
        }
        Ok(path)
    }

    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let mut config = Self::parse(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.apply_env();
        Ok(config)
    }

    /// Parse configuration text without touching the filesystem or environment.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Make relative paths absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.database.is_relative() {
            self.database = base.join(&self.database);
        }
        if let Some(platform) = &self.platform_database {
            if platform.is_relative() {
                self.platform_database = Some(base.join(platform));
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(key) = env::service_key() {
            self.remote.service_key = key;
        }
        if let Some(key) = env::api_key() {
            self.remote.api_key = key;
        }
    }

    /// True when the remote URL and service credential are both present.
    pub fn is_configured(&self) -> bool {
        !self.remote.url.trim().is_empty() && !self.remote.service_key.trim().is_empty()
    }

    /// Directory used for the watch lock file.
    pub fn state_dir(&self) -> PathBuf {
        self.database
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = env::xdg_config_home()
        .or_else(dirs::config_dir)
        .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?;
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

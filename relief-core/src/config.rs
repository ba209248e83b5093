//! Configuration for the relief registry.
//!
//! Maps directly to `relief.toml`. Every field has a default, so an empty
//! file is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Deadline;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReliefConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Store location and call limits.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Allocation rules.
    #[serde(default)]
    pub allocation: AllocationConfig,
}

impl ReliefConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ReliefError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::ReliefError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Use WAL journaling.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// How long SQLite waits on a locked database (ms).
    #[serde(default = "default_5000")]
    pub busy_timeout_ms: u64,
    /// Deadline for each storage call made without an explicit one (ms).
    /// Zero disables the bound.
    #[serde(default = "default_2000")]
    pub call_timeout_ms: u64,
}

impl PersistenceConfig {
    /// A fresh deadline for one storage call.
    #[must_use]
    pub fn call_deadline(&self) -> Deadline {
        if self.call_timeout_ms == 0 {
            Deadline::none()
        } else {
            Deadline::after(Duration::from_millis(self.call_timeout_ms))
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            wal_mode: true,
            busy_timeout_ms: 5000,
            call_timeout_ms: 2000,
        }
    }
}

/// Allocation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Lifetime of person-held water, in hours.
    #[serde(default = "default_24")]
    pub water_ttl_hours: u32,
    /// Remove expired water right after every successful load.
    #[serde(default = "default_true")]
    pub sweep_on_load: bool,
}

impl AllocationConfig {
    /// The water TTL as a duration.
    #[must_use]
    pub fn water_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.water_ttl_hours))
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            water_ttl_hours: 24,
            sweep_on_load: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_db_path() -> PathBuf { PathBuf::from("relief.db") }
fn default_24() -> u32 { 24 }
fn default_2000() -> u64 { 2000 }
fn default_5000() -> u64 { 5000 }

//! Configuration resolution for Estia.
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. Settings file (`settings.json`)
//! 3. Environment variables (`ESTIA_*`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete Estia configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database location and store-call deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path. `None` selects the in-memory store (tests only).
    pub path: Option<PathBuf>,
    /// Deadline applied to every store call, in seconds.
    pub store_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            store_timeout_secs: 10,
        }
    }
}

/// Credit-ledger tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Credits granted by the daily sign-in bonus.
    pub sign_in_bonus: i64,
    /// Rolling cooldown between two bonus grants, in hours.
    pub bonus_cooldown_hours: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            sign_in_bonus: 2,
            bonus_cooldown_hours: 24,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Emit structured JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Load configuration from an optional settings file plus environment.
pub fn load_config(settings_path: Option<&Path>) -> Result<Config> {
    let mut config = match settings_path {
        Some(path) if path.exists() => load_config_file(path)?,
        _ => Config::default(),
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidArgument(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::InvalidArgument(format!("cannot parse {}: {e}", path.display())))
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = std::env::var("ESTIA_DATABASE_PATH") {
        config.database.path = Some(PathBuf::from(path));
    }
    if let Some(secs) = env_u64("ESTIA_STORE_TIMEOUT_SECS") {
        config.database.store_timeout_secs = secs;
    }
    if let Some(bonus) = env_i64("ESTIA_SIGN_IN_BONUS") {
        config.ledger.sign_in_bonus = bonus;
    }
    if let Some(hours) = env_u64("ESTIA_BONUS_COOLDOWN_HOURS") {
        config.ledger.bonus_cooldown_hours = hours;
    }
    if let Ok(level) = std::env::var("ESTIA_LOG_LEVEL") {
        config.logging.log_level = level;
    }
    if let Ok(json) = std::env::var("ESTIA_LOG_JSON") {
        config.logging.log_json = json == "1" || json.eq_ignore_ascii_case("true");
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok()?.parse().ok()
}

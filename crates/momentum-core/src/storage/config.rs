//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and rest durations
//! - Points awarded per action
//! - Usage quota defaults and history window
//! - Reward poll cadence and catalog override
//!
//! Configuration is stored at `~/.config/momentum/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::reward::RewardCatalogEntry;
use crate::usage::MAX_HISTORY_DAYS;

/// Focus/rest timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_focus_secs")]
    pub focus_secs: u32,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,
    /// Tick cadence used by long-running drivers, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Points credited for each rewarded action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_task_created_points")]
    pub task_created: u64,
    #[serde(default = "default_task_completed_points")]
    pub task_completed: u64,
    #[serde(default = "default_focus_completed_points")]
    pub focus_completed: u64,
}

/// Daily usage quota configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Limit used until the user sets one.
    #[serde(default = "default_limit_minutes")]
    pub default_limit_minutes: u32,
    /// Percentage of the limit above which usage is flagged as a warning.
    #[serde(default = "default_warning_pct")]
    pub warning_pct: u32,
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

/// Reward ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Seconds between pending-unlock sweeps.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    /// Catalog override. When absent the built-in catalog is seeded.
    #[serde(default)]
    pub catalog: Option<Vec<RewardCatalogEntry>>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/momentum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub usage: UsageConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
}

// Default functions
fn default_focus_secs() -> u32 {
    25 * 60
}
fn default_rest_secs() -> u32 {
    5 * 60
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_task_created_points() -> u64 {
    5
}
fn default_task_completed_points() -> u64 {
    10
}
fn default_focus_completed_points() -> u64 {
    25
}
fn default_limit_minutes() -> u32 {
    60
}
fn default_warning_pct() -> u32 {
    80
}
fn default_history_days() -> u32 {
    7
}
fn default_poll_secs() -> u64 {
    5
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            rest_secs: default_rest_secs(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            task_created: default_task_created_points(),
            task_completed: default_task_completed_points(),
            focus_completed: default_focus_completed_points(),
        }
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            default_limit_minutes: default_limit_minutes(),
            warning_pct: default_warning_pct(),
            history_days: default_history_days(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
            catalog: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus: FocusConfig::default(),
            points: PointsConfig::default(),
            usage: UsageConfig::default(),
            rewards: RewardsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_)
                    | serde_json::Value::Array(_)
                    | serde_json::Value::Null => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    ///
    /// A file that parses but fails [`Config::validate`] is rejected.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("focus.focus_secs", self.focus.focus_secs as u64),
            ("focus.rest_secs", self.focus.rest_secs as u64),
            ("focus.tick_ms", self.focus.tick_ms),
            ("usage.default_limit_minutes", self.usage.default_limit_minutes as u64),
            ("usage.history_days", self.usage.history_days as u64),
            ("rewards.poll_secs", self.rewards.poll_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        if self.usage.history_days > MAX_HISTORY_DAYS {
            return Err(ConfigError::InvalidValue {
                key: "usage.history_days".to_string(),
                message: format!("must be at most {MAX_HISTORY_DAYS}"),
            });
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

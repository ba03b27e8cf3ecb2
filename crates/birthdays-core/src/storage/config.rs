//! TOML-based application configuration.
//!
//! Holds the alert preferences (which lead times are on, when alerts fire,
//! how Feb 29 is handled) and an optional contacts file override.
//!
//! Configuration is stored at `~/.config/birthdays/config.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::alerts::{default_alert_time, AlertOffsets, AlertPlanner};
use crate::anniversary::{AnniversaryResolver, LeapDayPolicy};
use crate::error::{ConfigError, Result};

/// Alert preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub same_day: bool,
    #[serde(default)]
    pub three_day: bool,
    #[serde(default)]
    pub seven_day: bool,
    /// Local time of day alerts fire at.
    #[serde(default = "default_alert_time")]
    pub alert_time: NaiveTime,
    #[serde(default)]
    pub leap_day_policy: LeapDayPolicy,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/birthdays/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Contacts file; `contacts.toml` in the data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Top-level keys that may be unset. They are omitted from the file when
/// unset, and an empty value given to [`Config::set`] unsets them.
const OPTIONAL_KEYS: &[&str] = &["contacts_file"];

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            same_day: true,
            three_day: false,
            seven_day: false,
            alert_time: default_alert_time(),
            leap_day_policy: LeapDayPolicy::default(),
        }
    }
}

impl AlertsConfig {
    pub fn offsets(&self) -> AlertOffsets {
        AlertOffsets {
            same_day: self.same_day,
            three_day: self.three_day,
            seven_day: self.seven_day,
        }
    }

    pub fn planner(&self) -> AlertPlanner {
        AlertPlanner::new(self.alert_time)
    }

    pub fn resolver(&self) -> AnniversaryResolver {
        AnniversaryResolver::new(self.leap_day_policy)
    }
}

impl Config {
    /// The serialized form with every optional key present, `null` when unset.
    fn to_json(&self) -> Result<serde_json::Value> {
        let mut json = serde_json::to_value(self)?;
        if let Some(obj) = json.as_object_mut() {
            for key in OPTIONAL_KEYS {
                obj.entry(*key).or_insert(serde_json::Value::Null);
            }
        }
        Ok(json)
    }

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
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let optional = OPTIONAL_KEYS.contains(&key);
                let new_value = match existing {
                    _ if optional && value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("'{value}': {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|e| invalid(format!("'{value}': {e}")))?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing and returning defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from the default location.
    ///
    /// # Errors
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// See [`Config::save_to`].
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default config: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = self.to_json().ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// An empty value clears an optional key such as `contacts_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field (e.g. a malformed time or an unknown leap-day policy).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = self.to_json()?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Contacts file to read, honouring the override.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn contacts_path(&self) -> Result<PathBuf> {
        match &self.contacts_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("contacts.toml")),
        }
    }
}

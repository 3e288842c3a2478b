//! Environment-driven configuration
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. Everything has a default so a bare install runs.

use std::env;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use crate::notifications::SchedulePolicy;

const DEFAULT_DATABASE_URL: &str = "sqlite://fit-tracker.db?mode=rwc";
const DEFAULT_SETTINGS_PATH: &str = "notification_settings.json";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MIN_LEAD_SECS: i64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub settings_path: PathBuf,
  pub log_level: String,
  pub min_lead_secs: i64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
      log_level: DEFAULT_LOG_LEVEL.to_string(),
      min_lead_secs: DEFAULT_MIN_LEAD_SECS,
    }
  }
}

impl AppConfig {
  /// Load `.env` (if present) and read configuration from the environment
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_current_env()
  }

  /// Read configuration from the environment as it is now
  pub fn from_current_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let min_lead_secs = match env::var("FIT_TRACKER_MIN_LEAD_SECS") {
      Ok(raw) => raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| *secs >= 0)
        .ok_or(ConfigError::InvalidValue {
          key: "FIT_TRACKER_MIN_LEAD_SECS".into(),
          value: raw,
        })?,
      Err(_) => defaults.min_lead_secs,
    };

    Ok(Self {
      database_url: env::var("FIT_TRACKER_DATABASE_URL").unwrap_or(defaults.database_url),
      settings_path: env::var("FIT_TRACKER_SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.settings_path),
      log_level: env::var("FIT_TRACKER_LOG").unwrap_or(defaults.log_level),
      min_lead_secs,
    })
  }

  pub fn schedule_policy(&self) -> SchedulePolicy {
    SchedulePolicy {
      min_lead: Duration::seconds(self.min_lead_secs),
      ..SchedulePolicy::default()
    }
  }
}

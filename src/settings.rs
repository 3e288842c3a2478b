//! Persisted notification settings
//!
//! Stored as a flat JSON object: two toggles plus the last day the user
//! opened the app.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationScheduleState {
  pub weekly_summary: bool,
  pub motivation_reminder: bool,
  pub last_login_date: Option<NaiveDate>,
}

impl Default for NotificationScheduleState {
  fn default() -> Self {
    Self {
      weekly_summary: true,
      motivation_reminder: true,
      last_login_date: None,
    }
  }
}

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("Settings I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("Settings file is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),
}

pub trait SettingsStore {
  fn load(&self) -> Result<NotificationScheduleState, SettingsError>;
  fn save(&mut self, state: &NotificationScheduleState) -> Result<(), SettingsError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
  fn load(&self) -> Result<NotificationScheduleState, SettingsError> {
    (**self).load()
  }

  fn save(&mut self, state: &NotificationScheduleState) -> Result<(), SettingsError> {
    (**self).save(state)
  }
}

/// Settings kept in a JSON file; a missing file reads as the defaults
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
  path: PathBuf,
}

impl JsonFileSettingsStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl SettingsStore for JsonFileSettingsStore {
  fn load(&self) -> Result<NotificationScheduleState, SettingsError> {
    match fs::read_to_string(&self.path) {
      Ok(raw) => Ok(serde_json::from_str(&raw)?),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %self.path.display(), "no settings file, using defaults");
        Ok(NotificationScheduleState::default())
      }
      Err(e) => Err(e.into()),
    }
  }

  fn save(&mut self, state: &NotificationScheduleState) -> Result<(), SettingsError> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
  state: NotificationScheduleState,
}

impl MemorySettingsStore {
  pub fn new(state: NotificationScheduleState) -> Self {
    Self { state }
  }
}

impl SettingsStore for MemorySettingsStore {
  fn load(&self) -> Result<NotificationScheduleState, SettingsError> {
    Ok(self.state.clone())
  }

  fn save(&mut self, state: &NotificationScheduleState) -> Result<(), SettingsError> {
    self.state = state.clone();
    Ok(())
  }
}

pub mod analysis;
pub mod calendar;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod records;
pub mod settings;
pub mod streak;
pub mod time_window;
pub mod volume;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use tracing::{error, info};

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use db::{AppState, DbError};
pub use notifications::{NotificationDelivery, NotificationScheduler, SchedulePolicy};
pub use settings::{NotificationScheduleState, SettingsStore};

/// Start-up sequence for a shell: read configuration, install logging, open
/// the database and wire the scheduler to the platform's delivery port
pub async fn init_app(delivery: Box<dyn NotificationDelivery + Send>) -> Result<AppState, DbError> {
  let config = AppConfig::from_env()?;
  init_app_with_config(&config, delivery, Arc::new(SystemClock)).await
}

pub async fn init_app_with_config(
  config: &AppConfig,
  delivery: Box<dyn NotificationDelivery + Send>,
  clock: Arc<dyn Clock>,
) -> Result<AppState, DbError> {
  logging::init_tracing(&config.log_level);

  match AppState::from_config(config, delivery, clock).await {
    Ok(state) => {
      info!("Database ready");
      Ok(state)
    }
    Err(e) => {
      error!(error = %e, "Failed to initialize database");
      Err(e)
    }
  }
}

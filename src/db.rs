use std::sync::Arc;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::Mutex;
use tracing::info;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::notifications::{NotificationDelivery, NotificationScheduler};
use crate::settings::{JsonFileSettingsStore, SettingsStore};

pub type DbPool = SqlitePool;

pub type DbError = Box<dyn std::error::Error + Send + Sync>;

/// Scheduler as held by the command layer: platform delivery and settings
/// storage are chosen by the shell at startup
pub type SharedScheduler =
  NotificationScheduler<Box<dyn NotificationDelivery + Send>, Box<dyn SettingsStore + Send>>;

/// Application state shared by every command
pub struct AppState {
  pub db: DbPool,
  pub scheduler: Mutex<SharedScheduler>,
  pub clock: Arc<dyn Clock>,
}

impl AppState {
  pub fn new(db: DbPool, scheduler: SharedScheduler, clock: Arc<dyn Clock>) -> Self {
    Self {
      db,
      scheduler: Mutex::new(scheduler),
      clock,
    }
  }

  /// Open the database and build the scheduler from configuration
  pub async fn from_config(
    config: &AppConfig,
    delivery: Box<dyn NotificationDelivery + Send>,
    clock: Arc<dyn Clock>,
  ) -> Result<Self, DbError> {
    let db = initialize_db(&config.database_url).await?;
    let settings: Box<dyn SettingsStore + Send> = Box::new(JsonFileSettingsStore::new(&config.settings_path));
    let scheduler = NotificationScheduler::new(delivery, settings, config.schedule_policy());
    Ok(Self::new(db, scheduler, clock))
  }
}

/// Connect to the database and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, DbError> {
  info!(url = database_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("database initialized");

  Ok(pool)
}

//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seeders for workout history, plans, progress and body weight
//! - An `AppState` wired to in-memory collaborators

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use crate::clock::FixedClock;
use crate::db::{AppState, SharedScheduler};
use crate::models::{NewExerciseProgress, NewWorkoutRecord};
use crate::notifications::{InMemoryDelivery, NotificationDelivery, NotificationScheduler, SchedulePolicy};
use crate::settings::{MemorySettingsStore, NotificationScheduleState, SettingsStore};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed completed 45-minute sessions on the given dates
/// Returns the IDs of created rows
pub async fn seed_completed_workouts(pool: &SqlitePool, user_id: &str, dates: &[NaiveDate]) -> Vec<i64> {
  let mut ids = Vec::new();
  for date in dates {
    let id = crate::history::add_workout_history(pool, &NewWorkoutRecord::completed(user_id, *date, Some(45)))
      .await
      .expect("Failed to insert test workout");
    ids.push(id);
  }
  ids
}

/// Seed plans on the given dates
pub async fn seed_planned_workouts(pool: &SqlitePool, user_id: &str, dates: &[NaiveDate]) -> Vec<i64> {
  let mut ids = Vec::new();
  for date in dates {
    let id = crate::history::add_planned_workout(pool, user_id, *date, None, None)
      .await
      .expect("Failed to insert test plan");
    ids.push(id);
  }
  ids
}

/// Seed progress rows as `(exercise, weight, date)` with 10 reps x 3 sets
pub async fn seed_progress(pool: &SqlitePool, user_id: &str, rows: &[(&str, f64, NaiveDate)]) {
  for (name, weight, date) in rows {
    let entry = NewExerciseProgress {
      user_id: user_id.to_string(),
      exercise_name: name.to_string(),
      weight: *weight,
      reps: 10,
      sets: 3,
      date: *date,
    };
    crate::history::add_exercise_progress(pool, &entry)
      .await
      .expect("Failed to insert test progress");
  }
}

/// ---------------------------------------------------------------------------
/// App State Fixtures
/// ---------------------------------------------------------------------------

/// Scheduler over in-memory delivery (permission granted) and settings
pub fn test_scheduler(state: NotificationScheduleState) -> SharedScheduler {
  let delivery: Box<dyn NotificationDelivery + Send> = Box::new(InMemoryDelivery::new(true));
  let settings: Box<dyn SettingsStore + Send> = Box::new(MemorySettingsStore::new(state));
  NotificationScheduler::new(delivery, settings, SchedulePolicy::default())
}

/// Fresh database plus default settings, with the clock frozen at `now`
pub async fn setup_test_state(now: NaiveDateTime) -> AppState {
  let pool = setup_test_db().await;
  AppState::new(pool, test_scheduler(NotificationScheduleState::default()), Arc::new(FixedClock(now)))
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
  date.and_hms_opt(hour, minute, 0).expect("valid test time")
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('workout_programs', 'workout_history', 'exercise_progress', 'weight_history')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seeders_return_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_completed_workouts(&pool, "u1", &[d(2024, 1, 1), d(2024, 1, 2)]).await;
    assert_eq!(ids.len(), 2);
    seed_planned_workouts(&pool, "u1", &[d(2024, 1, 5)]).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_history")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");
    assert_eq!(count, 3);

    teardown_test_db(pool).await;
  }
}

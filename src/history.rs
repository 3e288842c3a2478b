//! Workout history data feed over SQLite
//!
//! Every function takes the user id explicitly. Dates are stored as text and
//! read back through `normalize_date`; a row whose date cannot be parsed is an
//! error rather than being silently skipped.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::models::{ExerciseProgressEntry, NewExerciseProgress, NewWorkoutRecord, WeightEntry, WorkoutRecord};
use crate::time_window::{normalize_date, InvalidDateError};

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HistoryError {
  #[error("Database error: {0}")]
  Database(String),

  #[error(transparent)]
  InvalidDate(#[from] InvalidDateError),
}

impl From<sqlx::Error> for HistoryError {
  fn from(e: sqlx::Error) -> Self {
    HistoryError::Database(e.to_string())
  }
}

pub type HistoryResult<T> = Result<T, HistoryError>;

const WORKOUT_COLUMNS: &str = r#"
  wh.id, wh.user_id, wh.date, wh.completed, wh.duration_minutes, wh.notes,
  wh.workout_program_id, wp.name AS program_name
"#;

fn workout_from_row(row: &SqliteRow) -> HistoryResult<WorkoutRecord> {
  let raw_date: String = row.try_get("date")?;
  Ok(WorkoutRecord {
    id: row.try_get("id")?,
    user_id: row.try_get("user_id")?,
    date: normalize_date(&raw_date)?,
    completed: row.try_get("completed")?,
    duration_minutes: row.try_get("duration_minutes")?,
    notes: row.try_get("notes")?,
    program_id: row.try_get("workout_program_id")?,
    program_name: row.try_get("program_name")?,
  })
}

fn progress_from_row(row: &SqliteRow) -> HistoryResult<ExerciseProgressEntry> {
  let raw_date: String = row.try_get("date")?;
  Ok(ExerciseProgressEntry {
    id: row.try_get("id")?,
    user_id: row.try_get("user_id")?,
    exercise_name: row.try_get("exercise_name")?,
    weight: row.try_get("weight")?,
    reps: row.try_get("reps")?,
    sets: row.try_get("sets")?,
    date: normalize_date(&raw_date)?,
  })
}

fn date_param(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// ---------------------------------------------------------------------------
/// Workout History
/// ---------------------------------------------------------------------------

/// Distinct dates with a completed workout within `start..=end`, ascending
pub async fn fetch_completed_workout_dates(
  pool: &SqlitePool,
  user_id: &str,
  start: NaiveDate,
  end: NaiveDate,
) -> HistoryResult<Vec<NaiveDate>> {
  // Compare on the date prefix so rows stored with a time part still match
  let rows = sqlx::query(
    r#"
    SELECT DISTINCT substr(date, 1, 10) AS day
    FROM workout_history
    WHERE user_id = ?1
      AND completed = 1
      AND substr(date, 1, 10) >= ?2
      AND substr(date, 1, 10) <= ?3
    ORDER BY day ASC
    "#,
  )
  .bind(user_id)
  .bind(date_param(start))
  .bind(date_param(end))
  .fetch_all(pool)
  .await?;

  let dates = rows
    .iter()
    .map(|row| -> HistoryResult<NaiveDate> {
      let raw: String = row.try_get("day")?;
      Ok(normalize_date(&raw)?)
    })
    .collect::<HistoryResult<Vec<_>>>()?;

  debug!(user_id, count = dates.len(), "fetched completed workout dates");
  Ok(dates)
}

/// Most recent workout history rows (completed and planned), newest first
pub async fn fetch_workout_history(pool: &SqlitePool, user_id: &str, limit: i64) -> HistoryResult<Vec<WorkoutRecord>> {
  let rows = sqlx::query(&format!(
    r#"
    SELECT {WORKOUT_COLUMNS}
    FROM workout_history wh
    LEFT JOIN workout_programs wp ON wp.id = wh.workout_program_id
    WHERE wh.user_id = ?1
    ORDER BY wh.date DESC, wh.id DESC
    LIMIT ?2
    "#
  ))
  .bind(user_id)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  rows.iter().map(workout_from_row).collect()
}

/// Workout history rows within `start..=end`, oldest first
pub async fn fetch_workout_history_in_range(
  pool: &SqlitePool,
  user_id: &str,
  start: NaiveDate,
  end: NaiveDate,
) -> HistoryResult<Vec<WorkoutRecord>> {
  let rows = sqlx::query(&format!(
    r#"
    SELECT {WORKOUT_COLUMNS}
    FROM workout_history wh
    LEFT JOIN workout_programs wp ON wp.id = wh.workout_program_id
    WHERE wh.user_id = ?1
      AND substr(wh.date, 1, 10) >= ?2
      AND substr(wh.date, 1, 10) <= ?3
    ORDER BY wh.date ASC, wh.id ASC
    "#
  ))
  .bind(user_id)
  .bind(date_param(start))
  .bind(date_param(end))
  .fetch_all(pool)
  .await?;

  rows.iter().map(workout_from_row).collect()
}

/// Plans (completed = false), soonest first
pub async fn fetch_planned_workouts(pool: &SqlitePool, user_id: &str) -> HistoryResult<Vec<WorkoutRecord>> {
  let rows = sqlx::query(&format!(
    r#"
    SELECT {WORKOUT_COLUMNS}
    FROM workout_history wh
    LEFT JOIN workout_programs wp ON wp.id = wh.workout_program_id
    WHERE wh.user_id = ?1 AND wh.completed = 0
    ORDER BY wh.date ASC, wh.id ASC
    "#
  ))
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  rows.iter().map(workout_from_row).collect()
}

pub async fn count_completed_workouts(pool: &SqlitePool, user_id: &str) -> HistoryResult<i64> {
  let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workout_history WHERE user_id = ?1 AND completed = 1")
    .bind(user_id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

/// Insert a history row; takes a pool or an open transaction
pub async fn add_workout_history<'e, E>(executor: E, record: &NewWorkoutRecord) -> HistoryResult<i64>
where
  E: SqliteExecutor<'e>,
{
  let result = sqlx::query(
    r#"
    INSERT INTO workout_history (user_id, date, completed, duration_minutes, notes, workout_program_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(&record.user_id)
  .bind(date_param(record.date))
  .bind(record.completed)
  .bind(record.duration_minutes)
  .bind(&record.notes)
  .bind(record.program_id)
  .execute(executor)
  .await?;

  Ok(result.last_insert_rowid())
}

pub async fn add_planned_workout(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  program_id: Option<i64>,
  notes: Option<String>,
) -> HistoryResult<i64> {
  add_workout_history(pool, &NewWorkoutRecord::planned(user_id, date, program_id, notes)).await
}

/// Delete a plan. Completed rows are never touched; returns whether a row
/// was removed.
pub async fn delete_planned_workout(pool: &SqlitePool, user_id: &str, workout_id: i64) -> HistoryResult<bool> {
  let result = sqlx::query("DELETE FROM workout_history WHERE id = ?1 AND user_id = ?2 AND completed = 0")
    .bind(workout_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  Ok(result.rows_affected() > 0)
}

/// ---------------------------------------------------------------------------
/// Exercise Progress
/// ---------------------------------------------------------------------------

/// Progress entries, newest first, optionally for one exercise.
///
/// Numeric columns are cast on read so text left in them by older clients
/// comes back as 0 instead of failing the whole query.
pub async fn fetch_exercise_progress(
  pool: &SqlitePool,
  user_id: &str,
  exercise_name: Option<&str>,
  limit: i64,
) -> HistoryResult<Vec<ExerciseProgressEntry>> {
  let rows = sqlx::query(
    r#"
    SELECT id, user_id, exercise_name,
           CAST(weight AS REAL) AS weight,
           CAST(reps AS INTEGER) AS reps,
           CAST(sets AS INTEGER) AS sets,
           date
    FROM exercise_progress
    WHERE user_id = ?1
      AND (?2 IS NULL OR exercise_name = ?2)
    ORDER BY date DESC, id DESC
    LIMIT ?3
    "#,
  )
  .bind(user_id)
  .bind(exercise_name)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  let entries = rows.iter().map(progress_from_row).collect::<HistoryResult<Vec<_>>>()?;
  debug!(user_id, exercise = exercise_name, count = entries.len(), "fetched exercise progress");
  Ok(entries)
}

/// Progress entries dated within `start..=end`, oldest first
pub async fn fetch_exercise_progress_in_range(
  pool: &SqlitePool,
  user_id: &str,
  start: NaiveDate,
  end: NaiveDate,
) -> HistoryResult<Vec<ExerciseProgressEntry>> {
  let rows = sqlx::query(
    r#"
    SELECT id, user_id, exercise_name,
           CAST(weight AS REAL) AS weight,
           CAST(reps AS INTEGER) AS reps,
           CAST(sets AS INTEGER) AS sets,
           date
    FROM exercise_progress
    WHERE user_id = ?1
      AND substr(date, 1, 10) >= ?2
      AND substr(date, 1, 10) <= ?3
    ORDER BY date ASC, id ASC
    "#,
  )
  .bind(user_id)
  .bind(date_param(start))
  .bind(date_param(end))
  .fetch_all(pool)
  .await?;

  rows.iter().map(progress_from_row).collect()
}

/// Distinct exercise names the user has logged, sorted
pub async fn fetch_user_exercises(pool: &SqlitePool, user_id: &str) -> HistoryResult<Vec<String>> {
  let rows: Vec<(String,)> = sqlx::query_as(
    "SELECT DISTINCT exercise_name FROM exercise_progress WHERE user_id = ?1 ORDER BY exercise_name ASC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  Ok(rows.into_iter().map(|(name,)| name).collect())
}

pub async fn add_exercise_progress<'e, E>(executor: E, entry: &NewExerciseProgress) -> HistoryResult<i64>
where
  E: SqliteExecutor<'e>,
{
  let result = sqlx::query(
    r#"
    INSERT INTO exercise_progress (user_id, exercise_name, weight, reps, sets, date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(&entry.user_id)
  .bind(&entry.exercise_name)
  .bind(entry.weight)
  .bind(entry.reps)
  .bind(entry.sets)
  .bind(date_param(entry.date))
  .execute(executor)
  .await?;

  Ok(result.last_insert_rowid())
}

/// ---------------------------------------------------------------------------
/// Body Weight
/// ---------------------------------------------------------------------------

pub async fn fetch_latest_weight(pool: &SqlitePool, user_id: &str) -> HistoryResult<Option<WeightEntry>> {
  let row = sqlx::query(
    r#"
    SELECT id, user_id, weight, date
    FROM weight_history
    WHERE user_id = ?1
    ORDER BY date DESC, id DESC
    LIMIT 1
    "#,
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  row
    .map(|row| -> HistoryResult<WeightEntry> {
      let raw_date: String = row.try_get("date")?;
      Ok(WeightEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        weight: row.try_get("weight")?,
        date: normalize_date(&raw_date)?,
      })
    })
    .transpose()
}

pub async fn add_weight_entry(pool: &SqlitePool, user_id: &str, weight: f64, date: NaiveDate) -> HistoryResult<i64> {
  let result = sqlx::query("INSERT INTO weight_history (user_id, weight, date) VALUES (?1, ?2, ?3)")
    .bind(user_id)
    .bind(weight)
    .bind(date_param(date))
    .execute(pool)
    .await?;

  Ok(result.last_insert_rowid())
}

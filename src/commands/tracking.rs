//! Tracking screen commands: calendar, plans, per-exercise progress and
//! finishing a session

use std::collections::BTreeSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{monthly_minutes, progress_entries_for_session, progress_series, SessionExercise};
use crate::calendar::{build_month, dispatch_day_click, CalendarMonth, DayClickAction};
use crate::commands::notifications::completed_this_week;
use crate::db::AppState;
use crate::history::{
  add_exercise_progress, add_planned_workout, add_workout_history, delete_planned_workout as delete_plan,
  fetch_exercise_progress, fetch_user_exercises, fetch_workout_history_in_range,
};
use crate::models::{ExerciseProgressEntry, NewWorkoutRecord};
use crate::notifications::{NotScheduledReason, ScheduleResult};
use crate::streak::completed_date_set;
use crate::time_window::{month_bounds, normalize_date};

/// Progress chart shows this many sessions by default
pub const DEFAULT_SERIES_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedWorkout {
  pub workout_id: i64,
  pub progress_rows: usize,
  pub weekly_summary: ScheduleResult,
}

/// Minutes trained in the given month (current month when not given)
pub async fn get_monthly_minutes(
  state: &AppState,
  user_id: &str,
  year: Option<i32>,
  month: Option<u32>,
) -> Result<i64, String> {
  let today = state.clock.today();
  let (year, month) = (year.unwrap_or(today.year()), month.unwrap_or(today.month()));
  let (first, last) = month_bounds(year, month).map_err(|e| e.to_string())?;

  let records = fetch_workout_history_in_range(&state.db, user_id, first, last)
    .await
    .map_err(|e| format!("Failed to fetch workout history: {}", e))?;

  Ok(monthly_minutes(&records, year, month))
}

/// Build the month grid with completed / planned markers
pub async fn get_calendar_month(
  state: &AppState,
  user_id: &str,
  year: i32,
  month: u32,
) -> Result<CalendarMonth, String> {
  let (first, last) = month_bounds(year, month).map_err(|e| e.to_string())?;

  let records = fetch_workout_history_in_range(&state.db, user_id, first, last)
    .await
    .map_err(|e| format!("Failed to fetch workout history: {}", e))?;

  let completed = completed_date_set(&records);
  let planned: BTreeSet<_> = records.iter().filter(|r| !r.completed).map(|r| r.date).collect();

  build_month(year, month, &completed, &planned, state.clock.today()).map_err(|e| e.to_string())
}

/// Decide what a tap on a calendar day opens
pub async fn handle_day_click(state: &AppState, user_id: &str, date: String) -> Result<DayClickAction, String> {
  let date = normalize_date(&date).map_err(|e| e.to_string())?;

  let records = fetch_workout_history_in_range(&state.db, user_id, date, date)
    .await
    .map_err(|e| format!("Failed to fetch workout history: {}", e))?;

  Ok(dispatch_day_click(date, &records))
}

/// Plan a workout on a calendar day
pub async fn plan_workout(
  state: &AppState,
  user_id: &str,
  date: String,
  program_id: Option<i64>,
  notes: Option<String>,
) -> Result<i64, String> {
  let date = normalize_date(&date).map_err(|e| e.to_string())?;

  let id = add_planned_workout(&state.db, user_id, date, program_id, notes)
    .await
    .map_err(|e| format!("Failed to plan workout: {}", e))?;

  info!(user_id, %date, id, "planned workout");
  Ok(id)
}

/// Remove a plan; completed sessions are refused
pub async fn delete_planned_workout(state: &AppState, user_id: &str, workout_id: i64) -> Result<(), String> {
  let removed = delete_plan(&state.db, user_id, workout_id)
    .await
    .map_err(|e| format!("Failed to delete planned workout: {}", e))?;

  if !removed {
    return Err(format!("No planned workout with id {}", workout_id));
  }
  Ok(())
}

pub async fn get_user_exercises(state: &AppState, user_id: &str) -> Result<Vec<String>, String> {
  fetch_user_exercises(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch exercises: {}", e))
}

/// Most recent entries of one exercise in chart order (oldest first)
pub async fn get_exercise_progress_series(
  state: &AppState,
  user_id: &str,
  exercise_name: &str,
  limit: Option<usize>,
) -> Result<Vec<ExerciseProgressEntry>, String> {
  let limit = limit.unwrap_or(DEFAULT_SERIES_LENGTH);

  let entries = fetch_exercise_progress(&state.db, user_id, Some(exercise_name), limit as i64)
    .await
    .map_err(|e| format!("Failed to fetch exercise progress: {}", e))?;

  Ok(progress_series(&entries, limit))
}

/// Store a finished session and its per-exercise progress, then re-arm the
/// weekly summary with the new count
pub async fn finish_workout(
  state: &AppState,
  user_id: &str,
  duration_minutes: i64,
  exercises: Vec<SessionExercise>,
) -> Result<FinishedWorkout, String> {
  let now = state.clock.now();
  let today = now.date();

  let rows = progress_entries_for_session(user_id, today, &exercises);

  // The session and its progress rows are stored together or not at all
  let mut tx = state
    .db
    .begin()
    .await
    .map_err(|e| format!("Failed to start transaction: {}", e))?;

  let workout_id = add_workout_history(&mut *tx, &NewWorkoutRecord::completed(user_id, today, Some(duration_minutes)))
    .await
    .map_err(|e| format!("Failed to save workout: {}", e))?;

  for row in &rows {
    add_exercise_progress(&mut *tx, row)
      .await
      .map_err(|e| format!("Failed to save progress for {}: {}", row.exercise_name, e))?;
  }

  tx.commit()
    .await
    .map_err(|e| format!("Failed to save workout: {}", e))?;

  info!(user_id, workout_id, progress_rows = rows.len(), "workout finished");

  // The workout is stored; a reminder problem degrades instead of failing
  let refreshed = match completed_this_week(state, user_id, today).await {
    Ok(count) => state
      .scheduler
      .lock()
      .await
      .refresh_weekly_summary(count, now)
      .map_err(|e| e.to_string()),
    Err(e) => Err(e),
  };
  let weekly_summary = refreshed.unwrap_or_else(|e| {
    warn!(user_id, error = %e, "weekly summary not refreshed");
    ScheduleResult::not_scheduled(NotScheduledReason::SettingsUnavailable)
  });

  Ok(FinishedWorkout {
    workout_id,
    progress_rows: rows.len(),
    weekly_summary,
  })
}

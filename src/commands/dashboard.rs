//! Home screen commands: totals, streak, this week's strip, volume and PRs

use chrono::{Duration, NaiveDate};

use crate::analysis::{quote_of_the_day, WeekOverview, WorkoutStats};
use crate::db::AppState;
use crate::history::{
  add_weight_entry, count_completed_workouts, fetch_completed_workout_dates, fetch_exercise_progress,
  fetch_exercise_progress_in_range, fetch_latest_weight,
};
use crate::records::{latest_pr, personal_records, LatestPr};
use crate::streak::compute_streak;
use crate::time_window::{normalize_date, week_bounds};
use crate::volume::{weekly_volume_stats, VolumeStats};

/// PR detection scans the whole progress log
const ALL_ROWS: i64 = -1;

/// Get total workouts, latest body weight and the current streak
pub async fn get_workout_stats(state: &AppState, user_id: &str) -> Result<WorkoutStats, String> {
  let today = state.clock.today();

  let total = count_completed_workouts(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to count workouts: {}", e))?;

  let weight = fetch_latest_weight(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch latest weight: {}", e))?
    .map(|w| w.weight);

  let dates = fetch_completed_workout_dates(&state.db, user_id, NaiveDate::MIN, today)
    .await
    .map_err(|e| format!("Failed to fetch workout dates: {}", e))?;

  Ok(WorkoutStats::compute(total, weight, &dates.into_iter().collect(), today))
}

/// Get just the streak (tracking screen header)
pub async fn get_workout_streak(state: &AppState, user_id: &str) -> Result<u32, String> {
  let today = state.clock.today();
  let dates = fetch_completed_workout_dates(&state.db, user_id, NaiveDate::MIN, today)
    .await
    .map_err(|e| format!("Failed to fetch workout dates: {}", e))?;

  Ok(compute_streak(&dates.into_iter().collect(), today))
}

/// Get Monday..Sunday of the current week with completed flags
pub async fn get_week_overview(state: &AppState, user_id: &str) -> Result<WeekOverview, String> {
  let today = state.clock.today();
  let (monday, sunday) = week_bounds(today);

  let dates = fetch_completed_workout_dates(&state.db, user_id, monday, sunday)
    .await
    .map_err(|e| format!("Failed to fetch workout dates: {}", e))?;

  Ok(WeekOverview::compute(&dates.into_iter().collect(), today))
}

/// Compare this week's training volume with last week's
pub async fn get_weekly_volume_stats(state: &AppState, user_id: &str) -> Result<VolumeStats, String> {
  let today = state.clock.today();
  let (monday, sunday) = week_bounds(today);

  let entries = fetch_exercise_progress_in_range(&state.db, user_id, monday - Duration::days(7), sunday)
    .await
    .map_err(|e| format!("Failed to fetch exercise progress: {}", e))?;

  Ok(weekly_volume_stats(&entries, today))
}

/// Get the most recently set personal record, if any
pub async fn get_latest_pr(state: &AppState, user_id: &str) -> Result<Option<LatestPr>, String> {
  let entries = fetch_exercise_progress(&state.db, user_id, None, ALL_ROWS)
    .await
    .map_err(|e| format!("Failed to fetch exercise progress: {}", e))?;

  Ok(latest_pr(&entries))
}

/// Get every exercise's PR, most recent first
pub async fn get_personal_records(state: &AppState, user_id: &str) -> Result<Vec<LatestPr>, String> {
  let entries = fetch_exercise_progress(&state.db, user_id, None, ALL_ROWS)
    .await
    .map_err(|e| format!("Failed to fetch exercise progress: {}", e))?;

  Ok(personal_records(&entries))
}

/// Log a body-weight measurement
pub async fn log_body_weight(state: &AppState, user_id: &str, weight: f64, date: String) -> Result<i64, String> {
  if !weight.is_finite() || weight <= 0.0 {
    return Err(format!("Invalid body weight: {}", weight));
  }
  let date = normalize_date(&date).map_err(|e| e.to_string())?;

  add_weight_entry(&state.db, user_id, weight, date)
    .await
    .map_err(|e| format!("Failed to save body weight: {}", e))
}

pub fn get_quote_of_the_day() -> String {
  quote_of_the_day(&mut rand::rng()).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::MOTIVATIONAL_QUOTES;
  use crate::test_utils::{at, d, seed_completed_workouts, seed_progress, setup_test_state, teardown_test_db};

  #[tokio::test]
  async fn test_workout_stats_end_to_end() {
    // Saturday
    let state = setup_test_state(at(d(2024, 6, 15), 9, 0)).await;
    seed_completed_workouts(&state.db, "u1", &[d(2024, 6, 10), d(2024, 6, 13), d(2024, 6, 14), d(2024, 6, 15)]).await;
    log_body_weight(&state, "u1", 80.0, "2024-06-01".into()).await.unwrap();
    log_body_weight(&state, "u1", 79.4, "2024-06-14T07:00:00".into()).await.unwrap();

    let stats = get_workout_stats(&state, "u1").await.unwrap();
    assert_eq!(stats.total_workouts, 4);
    assert_eq!(stats.current_weight, Some(79.4));
    assert_eq!(stats.workout_streak, 3);
    assert_eq!(get_workout_streak(&state, "u1").await.unwrap(), 3);

    let week = get_week_overview(&state, "u1").await.unwrap();
    assert_eq!(week.completed_count, 4);
    assert_eq!(week.days[0].date, d(2024, 6, 10));

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_empty_history() {
    let state = setup_test_state(at(d(2024, 6, 15), 9, 0)).await;

    let stats = get_workout_stats(&state, "u1").await.unwrap();
    assert_eq!(stats.total_workouts, 0);
    assert_eq!(stats.current_weight, None);
    assert_eq!(stats.workout_streak, 0);
    assert_eq!(get_latest_pr(&state, "u1").await.unwrap(), None);

    let volume = get_weekly_volume_stats(&state, "u1").await.unwrap();
    assert_eq!(volume.percentage_change, 0);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_weekly_volume_and_prs() {
    // Wednesday
    let state = setup_test_state(at(d(2024, 6, 12), 20, 0)).await;
    seed_progress(
      &state.db,
      "u1",
      &[
        // previous week: 100 * 10 * 3
        ("Squat", 100.0, d(2024, 6, 4)),
        // current week: 50 * 10 * 3 twice
        ("Bench", 50.0, d(2024, 6, 10)),
        ("Bench", 50.0, d(2024, 6, 11)),
        // two weeks back, outside both windows
        ("Squat", 120.0, d(2024, 5, 28)),
      ],
    )
    .await;

    let volume = get_weekly_volume_stats(&state, "u1").await.unwrap();
    assert_eq!(volume.current_volume, 3000.0);
    assert_eq!(volume.previous_volume, 3000.0);
    assert_eq!(volume.percentage_change, 0);

    let pr = get_latest_pr(&state, "u1").await.unwrap().unwrap();
    assert_eq!(pr.exercise_name, "Bench");
    assert_eq!(pr.date, d(2024, 6, 11));

    let prs = get_personal_records(&state, "u1").await.unwrap();
    assert_eq!(prs.len(), 2);
    assert_eq!(prs[1].exercise_name, "Squat");
    assert_eq!(prs[1].weight, 120.0);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_log_body_weight_validates_input() {
    let state = setup_test_state(at(d(2024, 6, 12), 20, 0)).await;

    assert!(log_body_weight(&state, "u1", -1.0, "2024-06-12".into()).await.is_err());
    assert!(log_body_weight(&state, "u1", 70.0, "yesterday".into()).await.is_err());

    teardown_test_db(state.db).await;
  }

  #[test]
  fn test_quote_comes_from_pool() {
    assert!(MOTIVATIONAL_QUOTES.contains(&get_quote_of_the_day().as_str()));
  }
}

//! Notification commands: app foreground, settings toggles, weekly summary

use chrono::NaiveDate;

use crate::analysis::WeekOverview;
use crate::db::AppState;
use crate::history::fetch_completed_workout_dates;
use crate::notifications::{ForegroundOutcome, ScheduleResult, SettingsOutcome};
use crate::settings::NotificationScheduleState;
use crate::time_window::week_bounds;

/// Completed workout days in the Monday-Sunday week containing `today`
pub(crate) async fn completed_this_week(state: &AppState, user_id: &str, today: NaiveDate) -> Result<u32, String> {
  let (monday, sunday) = week_bounds(today);
  let dates = fetch_completed_workout_dates(&state.db, user_id, monday, sunday)
    .await
    .map_err(|e| format!("Failed to fetch workout dates: {}", e))?;

  Ok(WeekOverview::compute(&dates.into_iter().collect(), today).completed_count)
}

/// Record the visit and restart the absence reminder
pub async fn on_app_foreground(state: &AppState) -> Result<ForegroundOutcome, String> {
  let now = state.clock.now();
  state
    .scheduler
    .lock()
    .await
    .on_app_foreground(now)
    .map_err(|e| format!("Failed to handle app foreground: {}", e))
}

pub async fn get_notification_settings(state: &AppState) -> Result<NotificationScheduleState, String> {
  state
    .scheduler
    .lock()
    .await
    .settings()
    .map_err(|e| format!("Failed to load notification settings: {}", e))
}

/// Persist both toggles and arm or cancel each notification to match
pub async fn update_notification_settings(
  state: &AppState,
  user_id: &str,
  weekly_summary: bool,
  motivation_reminder: bool,
) -> Result<SettingsOutcome, String> {
  let now = state.clock.now();
  let count = completed_this_week(state, user_id, now.date()).await?;

  state
    .scheduler
    .lock()
    .await
    .apply_settings(weekly_summary, motivation_reminder, count, now)
    .map_err(|e| format!("Failed to update notification settings: {}", e))
}

/// Re-arm the weekly summary with this week's count (home screen focus)
pub async fn refresh_weekly_summary(state: &AppState, user_id: &str) -> Result<ScheduleResult, String> {
  let now = state.clock.now();
  let count = completed_this_week(state, user_id, now.date()).await?;

  state
    .scheduler
    .lock()
    .await
    .refresh_weekly_summary(count, now)
    .map_err(|e| format!("Failed to refresh weekly summary: {}", e))
}

pub async fn get_days_since_last_login(state: &AppState) -> Result<Option<i64>, String> {
  let today = state.clock.today();
  state
    .scheduler
    .lock()
    .await
    .days_since_last_login(today)
    .map_err(|e| format!("Failed to load notification settings: {}", e))
}

//! Local reminder scheduling
//!
//! Two notification kinds are managed: the Sunday-night weekly summary and a
//! motivation reminder that fires after three days without opening the app.
//! Every schedule call cancels pending notifications of the same kind first,
//! so at most one per kind is ever pending.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::settings::{NotificationScheduleState, SettingsError, SettingsStore};
use crate::time_window::days_between;

/// ---------------------------------------------------------------------------
/// Policy
/// ---------------------------------------------------------------------------

const WEEKLY_SUMMARY_TITLE: &str = "📊 Your Weekly Summary";
const MOTIVATION_TITLE: &str = "🔥 We Miss You!";

pub const MOTIVATION_MESSAGES: &[&str] = &[
  "We missed you! 💪 Ready to get back to training?",
  "Hey champion! 🏆 It's been 3 days. Today is a great day for a workout!",
  "Keep going to reach your goals! 🎯 We're waiting for you!",
  "Your muscles are calling! 💪 Let's start today!",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePolicy {
  pub weekly_weekday: Weekday,
  pub weekly_time: NaiveTime,
  pub motivation_delay_days: i64,
  pub motivation_time: NaiveTime,
  /// Schedules closer than this to `now` are skipped
  pub min_lead: Duration,
}

impl Default for SchedulePolicy {
  fn default() -> Self {
    Self {
      weekly_weekday: Weekday::Sun,
      weekly_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
      motivation_delay_days: 3,
      motivation_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
      min_lead: Duration::hours(1),
    }
  }
}

impl SchedulePolicy {
  /// Next weekly-summary slot strictly after `now`
  pub fn next_weekly_summary_at(&self, now: NaiveDateTime) -> NaiveDateTime {
    let target_day = self.weekly_weekday.num_days_from_monday() as i64;
    let current_day = now.weekday().num_days_from_monday() as i64;
    let days_ahead = (target_day - current_day).rem_euclid(7);

    let candidate = (now.date() + Duration::days(days_ahead)).and_time(self.weekly_time);
    if candidate <= now {
      candidate + Duration::days(7)
    } else {
      candidate
    }
  }

  pub fn motivation_reminder_at(&self, now: NaiveDateTime) -> NaiveDateTime {
    (now.date() + Duration::days(self.motivation_delay_days)).and_time(self.motivation_time)
  }
}

pub fn weekly_summary_message(workout_count: u32) -> String {
  match workout_count {
    0 => "You haven't trained yet this week. Let's get started! 💪".to_string(),
    1 => "You trained 1 day this week. Good start, next week you can do even more! 🎯".to_string(),
    n if n >= 5 => format!("You trained {} days this week, great job! You're a champion! 🏆", n),
    n => format!("You trained {} days this week, great job! 💪", n),
  }
}

pub fn pick_motivation_message<R: rand::Rng + ?Sized>(rng: &mut R) -> &'static str {
  MOTIVATION_MESSAGES.choose(rng).copied().unwrap_or(MOTIVATION_MESSAGES[0])
}

/// ---------------------------------------------------------------------------
/// Delivery Port
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
  WeeklySummary,
  MotivationReminder,
}

impl NotificationKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NotificationKind::WeeklySummary => "weekly-summary",
      NotificationKind::MotivationReminder => "motivation",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationHandle(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
  #[error("Notification permission not granted")]
  PermissionDenied,

  #[error("Notification delivery unavailable: {0}")]
  Unavailable(String),
}

/// Platform notification API as seen by the scheduler
pub trait NotificationDelivery {
  fn schedule(
    &mut self,
    kind: NotificationKind,
    fire_at: NaiveDateTime,
    title: &str,
    body: &str,
  ) -> Result<NotificationHandle, DeliveryError>;

  fn cancel_all_of_kind(&mut self, kind: NotificationKind) -> Result<(), DeliveryError>;
}

impl<T: NotificationDelivery + ?Sized> NotificationDelivery for Box<T> {
  fn schedule(
    &mut self,
    kind: NotificationKind,
    fire_at: NaiveDateTime,
    title: &str,
    body: &str,
  ) -> Result<NotificationHandle, DeliveryError> {
    (**self).schedule(kind, fire_at, title, body)
  }

  fn cancel_all_of_kind(&mut self, kind: NotificationKind) -> Result<(), DeliveryError> {
    (**self).cancel_all_of_kind(kind)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingNotification {
  pub handle: NotificationHandle,
  pub kind: NotificationKind,
  pub fire_at: NaiveDateTime,
  pub title: String,
  pub body: String,
}

/// Delivery collaborator that keeps pending notifications in memory
#[derive(Debug, Clone)]
pub struct InMemoryDelivery {
  permission_granted: bool,
  pending: Vec<PendingNotification>,
  next_id: u64,
}

impl Default for InMemoryDelivery {
  fn default() -> Self {
    Self::new(true)
  }
}

impl InMemoryDelivery {
  pub fn new(permission_granted: bool) -> Self {
    Self {
      permission_granted,
      pending: Vec::new(),
      next_id: 1,
    }
  }

  pub fn set_permission(&mut self, granted: bool) {
    self.permission_granted = granted;
  }

  pub fn pending(&self) -> &[PendingNotification] {
    &self.pending
  }

  pub fn pending_of_kind(&self, kind: NotificationKind) -> Vec<&PendingNotification> {
    self.pending.iter().filter(|p| p.kind == kind).collect()
  }

  /// Remove and return notifications due at `now`
  pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<PendingNotification> {
    let (due, later): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.fire_at <= now);
    self.pending = later;
    due
  }
}

impl NotificationDelivery for InMemoryDelivery {
  fn schedule(
    &mut self,
    kind: NotificationKind,
    fire_at: NaiveDateTime,
    title: &str,
    body: &str,
  ) -> Result<NotificationHandle, DeliveryError> {
    if !self.permission_granted {
      return Err(DeliveryError::PermissionDenied);
    }

    let handle = NotificationHandle(format!("{}-{}", kind.as_str(), self.next_id));
    self.next_id += 1;
    self.pending.push(PendingNotification {
      handle: handle.clone(),
      kind,
      fire_at,
      title: title.to_string(),
      body: body.to_string(),
    });
    Ok(handle)
  }

  fn cancel_all_of_kind(&mut self, kind: NotificationKind) -> Result<(), DeliveryError> {
    self.pending.retain(|p| p.kind != kind);
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Scheduler
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotScheduledReason {
  TooSoon,
  NoPermission,
  DeliveryUnavailable,
  Disabled,
  SettingsUnavailable,
}

impl From<&DeliveryError> for NotScheduledReason {
  fn from(e: &DeliveryError) -> Self {
    match e {
      DeliveryError::PermissionDenied => NotScheduledReason::NoPermission,
      DeliveryError::Unavailable(_) => NotScheduledReason::DeliveryUnavailable,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleResult {
  Scheduled { fire_at: NaiveDateTime },
  NotScheduled { reason: NotScheduledReason },
}

impl ScheduleResult {
  pub fn not_scheduled(reason: NotScheduledReason) -> Self {
    ScheduleResult::NotScheduled { reason }
  }

  pub fn is_scheduled(&self) -> bool {
    matches!(self, ScheduleResult::Scheduled { .. })
  }
}

/// Lifecycle of one notification kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KindState {
  #[default]
  Unscheduled,
  Scheduled {
    fire_at: NaiveDateTime,
    handle: NotificationHandle,
  },
  Fired,
  Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForegroundOutcome {
  pub last_login_date: NaiveDate,
  pub motivation_reminder: ScheduleResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsOutcome {
  pub weekly_summary: ScheduleResult,
  pub motivation_reminder: ScheduleResult,
}

pub struct NotificationScheduler<D, S> {
  delivery: D,
  settings: S,
  policy: SchedulePolicy,
  states: HashMap<NotificationKind, KindState>,
}

impl<D: NotificationDelivery, S: SettingsStore> NotificationScheduler<D, S> {
  pub fn new(delivery: D, settings: S, policy: SchedulePolicy) -> Self {
    Self {
      delivery,
      settings,
      policy,
      states: HashMap::new(),
    }
  }

  pub fn policy(&self) -> &SchedulePolicy {
    &self.policy
  }

  pub fn delivery(&self) -> &D {
    &self.delivery
  }

  pub fn delivery_mut(&mut self) -> &mut D {
    &mut self.delivery
  }

  pub fn settings(&self) -> Result<NotificationScheduleState, SettingsError> {
    self.settings.load()
  }

  pub fn state(&self, kind: NotificationKind) -> KindState {
    self.states.get(&kind).cloned().unwrap_or_default()
  }

  /// Arm the weekly summary for the next Sunday 22:00 strictly after `now`
  pub fn schedule_weekly_summary(&mut self, workout_count_this_week: u32, now: NaiveDateTime) -> ScheduleResult {
    let target = self.policy.next_weekly_summary_at(now);
    let body = weekly_summary_message(workout_count_this_week);
    self.schedule_kind(NotificationKind::WeeklySummary, target, now, WEEKLY_SUMMARY_TITLE, &body)
  }

  /// Arm the absence reminder three days out at 18:00
  pub fn schedule_motivation_reminder(&mut self, now: NaiveDateTime) -> ScheduleResult {
    let target = self.policy.motivation_reminder_at(now);
    let body = pick_motivation_message(&mut rand::rng());
    self.schedule_kind(NotificationKind::MotivationReminder, target, now, MOTIVATION_TITLE, body)
  }

  pub fn cancel_motivation_reminder(&mut self) {
    self.cancel(NotificationKind::MotivationReminder);
  }

  pub fn cancel_weekly_summary(&mut self) {
    self.cancel(NotificationKind::WeeklySummary);
  }

  /// The user is active again: restart the absence countdown.
  ///
  /// The weekly summary is left alone.
  pub fn on_app_foreground(&mut self, now: NaiveDateTime) -> Result<ForegroundOutcome, SettingsError> {
    self.cancel_motivation_reminder();

    let mut settings = self.settings.load()?;
    let today = now.date();
    settings.last_login_date = Some(today);
    self.settings.save(&settings)?;

    let motivation_reminder = if settings.motivation_reminder {
      self.schedule_motivation_reminder(now)
    } else {
      ScheduleResult::not_scheduled(NotScheduledReason::Disabled)
    };

    Ok(ForegroundOutcome {
      last_login_date: today,
      motivation_reminder,
    })
  }

  /// Persist new toggles and arm or cancel each kind to match.
  ///
  /// The stored last-login date is kept.
  pub fn apply_settings(
    &mut self,
    weekly_summary: bool,
    motivation_reminder: bool,
    workout_count_this_week: u32,
    now: NaiveDateTime,
  ) -> Result<SettingsOutcome, SettingsError> {
    let mut settings = self.settings.load()?;
    settings.weekly_summary = weekly_summary;
    settings.motivation_reminder = motivation_reminder;
    self.settings.save(&settings)?;

    let weekly_summary = if weekly_summary {
      self.schedule_weekly_summary(workout_count_this_week, now)
    } else {
      self.cancel_weekly_summary();
      ScheduleResult::not_scheduled(NotScheduledReason::Disabled)
    };

    let motivation_reminder = if motivation_reminder {
      self.schedule_motivation_reminder(now)
    } else {
      self.cancel_motivation_reminder();
      ScheduleResult::not_scheduled(NotScheduledReason::Disabled)
    };

    Ok(SettingsOutcome {
      weekly_summary,
      motivation_reminder,
    })
  }

  /// Re-arm the weekly summary with a fresh count, if the user wants it
  pub fn refresh_weekly_summary(
    &mut self,
    workout_count_this_week: u32,
    now: NaiveDateTime,
  ) -> Result<ScheduleResult, SettingsError> {
    if !self.settings.load()?.weekly_summary {
      return Ok(ScheduleResult::not_scheduled(NotScheduledReason::Disabled));
    }
    Ok(self.schedule_weekly_summary(workout_count_this_week, now))
  }

  /// Called by the delivery collaborator once a notification was shown
  pub fn mark_fired(&mut self, kind: NotificationKind) {
    if matches!(self.state(kind), KindState::Scheduled { .. }) {
      self.states.insert(kind, KindState::Fired);
    }
  }

  pub fn days_since_last_login(&self, today: NaiveDate) -> Result<Option<i64>, SettingsError> {
    Ok(self.settings.load()?.last_login_date.map(|last| days_between(last, today)))
  }

  fn cancel(&mut self, kind: NotificationKind) {
    // A failed cancel may leave the notification pending, so the state stays
    if let Err(e) = self.delivery.cancel_all_of_kind(kind) {
      warn!(kind = kind.as_str(), error = %e, "failed to cancel pending notifications");
      return;
    }

    let next = match self.state(kind) {
      KindState::Scheduled { .. } => KindState::Cancelled,
      _ => KindState::Unscheduled,
    };
    self.states.insert(kind, next);
  }

  fn schedule_kind(
    &mut self,
    kind: NotificationKind,
    target: NaiveDateTime,
    now: NaiveDateTime,
    title: &str,
    body: &str,
  ) -> ScheduleResult {
    let lead = target - now;
    if lead < self.policy.min_lead {
      debug!(kind = kind.as_str(), lead_secs = lead.num_seconds(), "skipping notification, lead time too short");
      return ScheduleResult::not_scheduled(NotScheduledReason::TooSoon);
    }

    if let Err(e) = self.delivery.cancel_all_of_kind(kind) {
      warn!(kind = kind.as_str(), error = %e, "could not clear pending notifications");
      return ScheduleResult::not_scheduled(NotScheduledReason::from(&e));
    }

    match self.delivery.schedule(kind, target, title, body) {
      Ok(handle) => {
        info!(kind = kind.as_str(), fire_at = %target, "notification scheduled");
        self.states.insert(kind, KindState::Scheduled { fire_at: target, handle });
        ScheduleResult::Scheduled { fire_at: target }
      }
      Err(e) => {
        warn!(kind = kind.as_str(), error = %e, "notification not scheduled");
        self.states.insert(kind, KindState::Unscheduled);
        ScheduleResult::not_scheduled(NotScheduledReason::from(&e))
      }
    }
  }
}

//! Training volume (weight x reps x sets) over date windows

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::ExerciseProgressEntry;
use crate::time_window::week_bounds;

/// Current vs previous Monday-Sunday week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
  pub current_volume: f64,
  pub previous_volume: f64,
  /// Rounded week-over-week change; 100 when training resumes from nothing
  pub percentage_change: i64,
}

/// Volume of a single entry, with malformed fields read as 0 / 0 / 1
pub fn entry_volume(entry: &ExerciseProgressEntry) -> f64 {
  entry.weight_or_zero() * entry.reps_or_zero() as f64 * entry.sets_or_one() as f64
}

/// Total volume of entries dated within `start..=end`
pub fn volume_in_range(entries: &[ExerciseProgressEntry], start: NaiveDate, end: NaiveDate) -> f64 {
  entries
    .iter()
    .filter(|e| e.date >= start && e.date <= end)
    .map(entry_volume)
    .sum()
}

/// Per-day totals within `start..=end`, ordered by date
pub fn daily_volume(
  entries: &[ExerciseProgressEntry],
  start: NaiveDate,
  end: NaiveDate,
) -> Vec<(NaiveDate, f64)> {
  let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for entry in entries.iter().filter(|e| e.date >= start && e.date <= end) {
    *by_day.entry(entry.date).or_insert(0.0) += entry_volume(entry);
  }
  by_day.into_iter().collect()
}

pub fn percentage_change(current: f64, previous: f64) -> i64 {
  if previous > 0.0 {
    (((current - previous) / previous) * 100.0).round() as i64
  } else if current > 0.0 {
    100
  } else {
    0
  }
}

/// Compare the week containing `today` with the week before it
pub fn weekly_volume_stats(entries: &[ExerciseProgressEntry], today: NaiveDate) -> VolumeStats {
  let (monday, sunday) = week_bounds(today);
  let current_volume = volume_in_range(entries, monday, sunday);
  let previous_volume = volume_in_range(entries, monday - Duration::days(7), sunday - Duration::days(7));

  VolumeStats {
    current_volume,
    previous_volume,
    percentage_change: percentage_change(current_volume, previous_volume),
  }
}

//! Consecutive-day workout streak

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::models::WorkoutRecord;

/// Dates with at least one completed workout; plans are ignored and
/// several sessions on one day collapse into a single active day.
pub fn completed_date_set(records: &[WorkoutRecord]) -> BTreeSet<NaiveDate> {
  records
    .iter()
    .filter(|r| r.completed)
    .map(|r| r.date)
    .collect()
}

/// Current streak anchored at `today`, or at yesterday when today has no
/// workout yet. Returns 0 when neither day is active.
pub fn compute_streak(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
  let yesterday = today - Duration::days(1);

  let anchor = if completed.contains(&today) {
    today
  } else if completed.contains(&yesterday) {
    yesterday
  } else {
    return 0;
  };

  let mut streak = 0;
  let mut day = anchor;
  while completed.contains(&day) {
    streak += 1;
    day -= Duration::days(1);
  }

  streak
}

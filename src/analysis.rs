//! Dashboard metrics built on top of the streak / volume components
//!
//! Home screen: totals, current weight, streak, the Monday-Sunday week strip.
//! Tracking screen: minutes trained this month, per-exercise progress series.
//! Also turns a finished session into progress entries.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::models::{ExerciseProgressEntry, NewExerciseProgress, WorkoutRecord};
use crate::streak::compute_streak;
use crate::time_window::week_bounds;

/// ---------------------------------------------------------------------------
/// Home Screen Metrics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
  pub total_workouts: i64,
  pub current_weight: Option<f64>,
  pub workout_streak: u32,
}

impl WorkoutStats {
  pub fn compute(
    total_workouts: i64,
    current_weight: Option<f64>,
    completed_dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
  ) -> Self {
    Self {
      total_workouts,
      current_weight,
      workout_streak: compute_streak(completed_dates, today),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDay {
  pub date: NaiveDate,
  pub completed: bool,
}

/// Monday..Sunday of the current week with a completed flag per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekOverview {
  pub days: Vec<WeekDay>,
  pub completed_count: u32,
}

impl WeekOverview {
  pub fn compute(completed_dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Self {
    let (monday, _) = week_bounds(today);
    let days: Vec<WeekDay> = (0..7)
      .map(|offset| {
        let date = monday + Duration::days(offset);
        WeekDay {
          date,
          completed: completed_dates.contains(&date),
        }
      })
      .collect();
    let completed_count = days.iter().filter(|d| d.completed).count() as u32;

    Self { days, completed_count }
  }
}

/// ---------------------------------------------------------------------------
/// Tracking Screen Metrics
/// ---------------------------------------------------------------------------

/// Minutes of completed workouts dated in the given month
pub fn monthly_minutes(records: &[WorkoutRecord], year: i32, month: u32) -> i64 {
  records
    .iter()
    .filter(|r| r.completed && r.date.year() == year && r.date.month() == month)
    .filter_map(|r| r.duration_minutes)
    .sum()
}

/// The `limit` most recent entries, oldest first (chart order)
pub fn progress_series(entries: &[ExerciseProgressEntry], limit: usize) -> Vec<ExerciseProgressEntry> {
  let mut sorted = entries.to_vec();
  sorted.sort_by(|a, b| a.date.cmp(&b.date));
  let skip = sorted.len().saturating_sub(limit);
  sorted.into_iter().skip(skip).collect()
}

/// ---------------------------------------------------------------------------
/// Finished Session -> Progress Entries
/// ---------------------------------------------------------------------------

/// One exercise as logged during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
  pub name: String,
  pub reps: i64,
  pub completed_sets: u32,
  /// Weight typed for each set; blanks and typos are skipped
  pub set_weights: Vec<String>,
}

impl SessionExercise {
  /// Sum of the parseable weights spread over the completed sets
  pub fn average_weight(&self) -> f64 {
    if self.completed_sets == 0 {
      return 0.0;
    }
    let total: f64 = self
      .set_weights
      .iter()
      .filter_map(|w| w.trim().parse::<f64>().ok())
      .filter(|w| w.is_finite())
      .sum();
    total / self.completed_sets as f64
  }
}

/// Progress rows to store for a finished session; exercises without a
/// completed set or without a recorded weight produce nothing.
pub fn progress_entries_for_session(
  user_id: &str,
  date: NaiveDate,
  exercises: &[SessionExercise],
) -> Vec<NewExerciseProgress> {
  exercises
    .iter()
    .filter(|ex| ex.completed_sets > 0)
    .filter_map(|ex| {
      let weight = ex.average_weight();
      (weight > 0.0).then(|| NewExerciseProgress {
        user_id: user_id.to_string(),
        exercise_name: ex.name.clone(),
        weight,
        reps: ex.reps,
        sets: ex.completed_sets as i64,
        date,
      })
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Quote of the Day
/// ---------------------------------------------------------------------------

pub const MOTIVATIONAL_QUOTES: &[&str] = &[
  "Strength comes from overcoming your will.",
  "Success is the sum of daily effort.",
  "There is no limit to what your body can do, you only have to convince your mind.",
  "What you do today is tomorrow's success.",
  "Your biggest rival is who you were yesterday.",
  "Pain is temporary, pride is forever.",
  "No giving up, only progress.",
  "Every rep is one step closer to the goal.",
];

pub fn quote_of_the_day<R: rand::Rng + ?Sized>(rng: &mut R) -> &'static str {
  MOTIVATIONAL_QUOTES.choose(rng).copied().unwrap_or(MOTIVATIONAL_QUOTES[0])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn record(date: NaiveDate, completed: bool, duration: Option<i64>) -> WorkoutRecord {
    WorkoutRecord {
      id: 0,
      user_id: "u1".to_string(),
      date,
      completed,
      duration_minutes: duration,
      notes: None,
      program_id: None,
      program_name: None,
    }
  }

  #[test]
  fn test_workout_stats_uses_streak() {
    let today = d(2024, 6, 15);
    let dates: BTreeSet<_> = [today, d(2024, 6, 14)].into_iter().collect();
    let stats = WorkoutStats::compute(12, Some(81.5), &dates, today);
    assert_eq!(stats.total_workouts, 12);
    assert_eq!(stats.current_weight, Some(81.5));
    assert_eq!(stats.workout_streak, 2);
  }

  #[test]
  fn test_week_overview_monday_to_sunday() {
    // Sunday 2024-06-16
    let today = d(2024, 6, 16);
    let dates: BTreeSet<_> = [d(2024, 6, 10), d(2024, 6, 12), d(2024, 6, 16), d(2024, 6, 9)].into_iter().collect();

    let week = WeekOverview::compute(&dates, today);
    assert_eq!(week.days.len(), 7);
    assert_eq!(week.days[0].date, d(2024, 6, 10));
    assert_eq!(week.days[6].date, d(2024, 6, 16));
    assert_eq!(week.completed_count, 3);
    assert!(week.days[0].completed && !week.days[1].completed && week.days[2].completed);
  }

  #[test]
  fn test_monthly_minutes() {
    let records = vec![
      record(d(2024, 6, 1), true, Some(45)),
      record(d(2024, 6, 20), true, Some(30)),
      record(d(2024, 6, 21), true, None),
      record(d(2024, 6, 22), false, Some(60)),
      record(d(2024, 5, 31), true, Some(90)),
      record(d(2023, 6, 10), true, Some(90)),
    ];
    assert_eq!(monthly_minutes(&records, 2024, 6), 75);
    assert_eq!(monthly_minutes(&[], 2024, 6), 0);
  }

  #[test]
  fn test_progress_series_keeps_most_recent_oldest_first() {
    let entries: Vec<ExerciseProgressEntry> = (1..=12)
      .rev()
      .map(|day| ExerciseProgressEntry {
        id: day as i64,
        user_id: "u1".to_string(),
        exercise_name: "Bench".to_string(),
        weight: Some(50.0 + day as f64),
        reps: Some(8),
        sets: Some(3),
        date: d(2024, 1, day),
      })
      .collect();

    let series = progress_series(&entries, 10);
    assert_eq!(series.len(), 10);
    assert_eq!(series[0].date, d(2024, 1, 3));
    assert_eq!(series[9].date, d(2024, 1, 12));

    assert_eq!(progress_series(&entries[..2], 10).len(), 2);
  }

  #[test]
  fn test_progress_entries_for_session() {
    let exercises = vec![
      SessionExercise {
        name: "Bench".to_string(),
        reps: 10,
        completed_sets: 3,
        set_weights: vec!["60".into(), "60".into(), "".into()],
      },
      SessionExercise {
        name: "Plank".to_string(),
        reps: 1,
        completed_sets: 2,
        set_weights: vec!["".into(), "abc".into()],
      },
      SessionExercise {
        name: "Squat".to_string(),
        reps: 5,
        completed_sets: 0,
        set_weights: vec!["100".into()],
      },
    ];

    let date = d(2024, 6, 15);
    let rows = progress_entries_for_session("u1", date, &exercises);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].exercise_name, "Bench");
    // 120 kg typed across three completed sets
    assert_eq!(rows[0].weight, 40.0);
    assert_eq!(rows[0].sets, 3);
    assert_eq!(rows[0].reps, 10);
    assert_eq!(rows[0].date, date);
  }

  #[test]
  fn test_quote_of_the_day_from_pool() {
    let mut rng = rand::rng();
    for _ in 0..20 {
      assert!(MOTIVATIONAL_QUOTES.contains(&quote_of_the_day(&mut rng)));
    }
  }
}

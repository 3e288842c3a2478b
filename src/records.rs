//! Personal-record detection
//!
//! A PR is the heaviest weight ever logged for an exercise. Detection is a
//! full scan of the user's history on every call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::ExerciseProgressEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPr {
  pub exercise_name: String,
  pub weight: f64,
  pub reps: i64,
  pub date: NaiveDate,
}

impl From<&ExerciseProgressEntry> for LatestPr {
  fn from(entry: &ExerciseProgressEntry) -> Self {
    Self {
      exercise_name: entry.exercise_name.clone(),
      weight: entry.weight_or_zero(),
      reps: entry.reps_or_zero(),
      date: entry.date,
    }
  }
}

/// Heaviest entry per exercise, in order of each exercise's first appearance.
///
/// Equal weights keep the later-dated entry; equal weight and date keep the
/// earlier entry in input order.
fn max_per_exercise(entries: &[ExerciseProgressEntry]) -> Vec<&ExerciseProgressEntry> {
  let mut maxima: Vec<&ExerciseProgressEntry> = Vec::new();

  for entry in entries {
    match maxima.iter_mut().find(|m| m.exercise_name == entry.exercise_name) {
      Some(best) => {
        let heavier = entry.weight_or_zero() > best.weight_or_zero();
        let same_weight_later = entry.weight_or_zero() == best.weight_or_zero() && entry.date > best.date;
        if heavier || same_weight_later {
          *best = entry;
        }
      }
      None => maxima.push(entry),
    }
  }

  maxima
}

/// Every exercise's PR, most recent first
pub fn personal_records(entries: &[ExerciseProgressEntry]) -> Vec<LatestPr> {
  let mut maxima = max_per_exercise(entries);
  // Stable sort keeps first-appearance order among same-day PRs
  maxima.sort_by(|a, b| b.date.cmp(&a.date));
  maxima.into_iter().map(LatestPr::from).collect()
}

/// The most recently set PR across all exercises, `None` without history
pub fn latest_pr(entries: &[ExerciseProgressEntry]) -> Option<LatestPr> {
  max_per_exercise(entries)
    .into_iter()
    .reduce(|latest, candidate| if candidate.date > latest.date { candidate } else { latest })
    .map(LatestPr::from)
}

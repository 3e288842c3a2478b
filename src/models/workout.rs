use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A completed or planned workout session.
///
/// `completed = false` rows are plans for a future date; completed rows are
/// immutable history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
  pub id: i64,
  pub user_id: String,
  pub date: NaiveDate,
  pub completed: bool,
  pub duration_minutes: Option<i64>,
  pub notes: Option<String>,
  pub program_id: Option<i64>,
  /// Name of the referenced program, joined for display
  pub program_name: Option<String>,
}

/// For inserting new workout history rows (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutRecord {
  pub user_id: String,
  pub date: NaiveDate,
  pub completed: bool,
  pub duration_minutes: Option<i64>,
  pub notes: Option<String>,
  pub program_id: Option<i64>,
}

impl NewWorkoutRecord {
  /// A finished session logged on `date`
  pub fn completed(user_id: &str, date: NaiveDate, duration_minutes: Option<i64>) -> Self {
    Self {
      user_id: user_id.to_string(),
      date,
      completed: true,
      duration_minutes,
      notes: None,
      program_id: None,
    }
  }

  /// A plan for `date`
  pub fn planned(user_id: &str, date: NaiveDate, program_id: Option<i64>, notes: Option<String>) -> Self {
    Self {
      user_id: user_id.to_string(),
      date,
      completed: false,
      duration_minutes: None,
      notes,
      program_id,
    }
  }
}

/// Body-weight log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
  pub id: i64,
  pub user_id: String,
  pub weight: f64,
  pub date: NaiveDate,
}

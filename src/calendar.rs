//! Month calendar of completed / planned workouts and day-click dispatch

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::WorkoutRecord;
use crate::time_window::{month_grid, InvalidDateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
  Completed,
  Planned,
  Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
  pub date: NaiveDate,
  pub day: u32,
  pub state: DayState,
  /// Drawn as a ring; independent of `state`
  pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
  pub year: i32,
  pub month: u32,
  /// Monday-first rows; `None` cells are padding before the 1st
  pub weeks: Vec<Vec<Option<DayCell>>>,
}

impl CalendarMonth {
  pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
    self.weeks.iter().flatten().flatten()
  }

  pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
    self.cells().find(|c| c.date == date)
  }
}

/// Completed wins over planned when a date is in both sets
pub fn day_state(date: NaiveDate, completed: &BTreeSet<NaiveDate>, planned: &BTreeSet<NaiveDate>) -> DayState {
  if completed.contains(&date) {
    DayState::Completed
  } else if planned.contains(&date) {
    DayState::Planned
  } else {
    DayState::Empty
  }
}

pub fn build_month(
  year: i32,
  month: u32,
  completed: &BTreeSet<NaiveDate>,
  planned: &BTreeSet<NaiveDate>,
  today: NaiveDate,
) -> Result<CalendarMonth, InvalidDateError> {
  let weeks = month_grid(year, month)?
    .into_iter()
    .map(|row| {
      row
        .into_iter()
        .map(|slot| {
          slot.map(|date| DayCell {
            date,
            day: date.day(),
            state: day_state(date, completed, planned),
            is_today: date == today,
          })
        })
        .collect()
    })
    .collect();

  Ok(CalendarMonth { year, month, weeks })
}

/// ---------------------------------------------------------------------------
/// Day-click dispatch
/// ---------------------------------------------------------------------------

/// What the tracking screen should do when a calendar day is tapped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DayClickAction {
  /// Show the finished sessions; plans on the same day are passed along
  ShowCompleted {
    date: NaiveDate,
    workouts: Vec<WorkoutRecord>,
    planned: Vec<WorkoutRecord>,
  },
  /// Show the plan with a delete affordance
  ShowPlanned { date: NaiveDate, plan: WorkoutRecord },
  /// Nothing on this day: open the plan-creation flow
  CreatePlan { date: NaiveDate },
}

pub fn dispatch_day_click(date: NaiveDate, records: &[WorkoutRecord]) -> DayClickAction {
  let (workouts, planned): (Vec<WorkoutRecord>, Vec<WorkoutRecord>) = records
    .iter()
    .filter(|r| r.date == date)
    .cloned()
    .partition(|r| r.completed);

  if !workouts.is_empty() {
    return DayClickAction::ShowCompleted { date, workouts, planned };
  }

  match planned.into_iter().next() {
    Some(plan) => DayClickAction::ShowPlanned { date, plan },
    None => DayClickAction::CreatePlan { date },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::time_window::days_in_month;
  use chrono::Duration;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn record(id: i64, date: NaiveDate, completed: bool) -> WorkoutRecord {
    WorkoutRecord {
      id,
      user_id: "u1".to_string(),
      date,
      completed,
      duration_minutes: completed.then_some(50),
      notes: None,
      program_id: None,
      program_name: Some("Push Day".to_string()),
    }
  }

  #[test]
  fn test_build_month_geometry() {
    for (year, month) in [(2024, 1), (2024, 2), (2024, 9), (2023, 10), (2025, 6)] {
      let cal = build_month(year, month, &BTreeSet::new(), &BTreeSet::new(), d(2024, 1, 1)).unwrap();
      let first = d(year, month, 1);
      let leading = cal.weeks[0].iter().take_while(|c| c.is_none()).count();
      let expected_leading = (first.weekday().num_days_from_sunday() + 6) % 7;

      assert_eq!(leading as u32, expected_leading, "{}-{}", year, month);
      assert_eq!(cal.cells().count() as u32, days_in_month(year, month).unwrap());
      assert_eq!(cal.weeks.iter().flatten().filter(|c| c.is_none()).count(), leading);
    }
  }

  #[test]
  fn test_build_month_states_and_priority() {
    let completed: BTreeSet<_> = [d(2024, 3, 4), d(2024, 3, 5)].into_iter().collect();
    let planned: BTreeSet<_> = [d(2024, 3, 5), d(2024, 3, 20)].into_iter().collect();
    let today = d(2024, 3, 20);

    let cal = build_month(2024, 3, &completed, &planned, today).unwrap();

    assert_eq!(cal.cell(d(2024, 3, 4)).unwrap().state, DayState::Completed);
    // In both sets: completed wins
    assert_eq!(cal.cell(d(2024, 3, 5)).unwrap().state, DayState::Completed);
    assert_eq!(cal.cell(d(2024, 3, 6)).unwrap().state, DayState::Empty);

    let today_cell = cal.cell(today).unwrap();
    assert_eq!(today_cell.state, DayState::Planned);
    assert!(today_cell.is_today);
    assert_eq!(cal.cells().filter(|c| c.is_today).count(), 1);
  }

  #[test]
  fn test_today_outside_month_marks_nothing() {
    let cal = build_month(2024, 3, &BTreeSet::new(), &BTreeSet::new(), d(2024, 4, 1)).unwrap();
    assert!(cal.cells().all(|c| !c.is_today));
  }

  #[test]
  fn test_build_month_rejects_invalid_month() {
    assert!(build_month(2024, 0, &BTreeSet::new(), &BTreeSet::new(), d(2024, 1, 1)).is_err());
  }

  #[test]
  fn test_dispatch_completed_day() {
    let day = d(2024, 3, 5);
    let records = vec![record(1, day, true), record(2, day, false), record(3, day + Duration::days(1), true)];

    match dispatch_day_click(day, &records) {
      DayClickAction::ShowCompleted { workouts, planned, .. } => {
        assert_eq!(workouts.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(planned.iter().map(|w| w.id).collect::<Vec<_>>(), vec![2]);
      }
      other => panic!("expected completed detail, got {:?}", other),
    }
  }

  #[test]
  fn test_dispatch_planned_day() {
    let day = d(2024, 3, 8);
    let records = vec![record(7, day, false), record(8, day, false)];
    assert_eq!(
      dispatch_day_click(day, &records),
      DayClickAction::ShowPlanned { date: day, plan: record(7, day, false) }
    );
  }

  #[test]
  fn test_dispatch_empty_day_opens_plan_flow() {
    let day = d(2024, 3, 9);
    assert_eq!(dispatch_day_click(day, &[record(1, d(2024, 3, 8), true)]), DayClickAction::CreatePlan { date: day });
  }
}

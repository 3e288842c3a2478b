//! Calendar date arithmetic shared by every analytics component
//!
//! All dates read from storage or the shell go through `normalize_date`, so
//! streaks, volume windows and the calendar agree on a single parsing policy.
//! Weeks always start on Monday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date: {input}")]
pub struct InvalidDateError {
  pub input: String,
}

impl InvalidDateError {
  pub fn new(input: impl Into<String>) -> Self {
    Self { input: input.into() }
  }
}

/// ---------------------------------------------------------------------------
/// Parsing
/// ---------------------------------------------------------------------------

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Strip any time-of-day component and return the calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and naive date-times. For
/// date-times carrying an offset the date is taken as written (in that
/// offset), never converted to UTC.
pub fn normalize_date(raw: &str) -> Result<NaiveDate, InvalidDateError> {
  let trimmed = raw.trim();

  if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
    return Ok(date);
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
    return Ok(dt.date_naive());
  }

  NAIVE_DATE_TIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    .map(|dt| dt.date())
    .ok_or_else(|| InvalidDateError::new(raw))
}

/// ---------------------------------------------------------------------------
/// Week / Month Windows
/// ---------------------------------------------------------------------------

/// Days since Monday (Monday = 0 .. Sunday = 6)
pub fn monday_offset(date: NaiveDate) -> i64 {
  let sunday_based = date.weekday().num_days_from_sunday() as i64;
  (sunday_based + 6) % 7
}

/// Monday and Sunday of the week containing `date`
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
  let monday = date - Duration::days(monday_offset(date));
  (monday, monday + Duration::days(6))
}

/// Whole-day difference `b - a`
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
  (b - a).num_days()
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, InvalidDateError> {
  let (first, last) = month_bounds(year, month)?;
  Ok((days_between(first, last) + 1) as u32)
}

/// First and last calendar day of a month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), InvalidDateError> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| InvalidDateError::new(format!("{:04}-{:02}", year, month)))?;
  let (next_year, next_month) = shift_month(year, month, 1);
  let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
    .ok_or_else(|| InvalidDateError::new(format!("{:04}-{:02}", next_year, next_month)))?;
  Ok((first, next_first - Duration::days(1)))
}

/// Move `delta` months from (year, month), rolling the year as needed
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
  let zero_based = year * 12 + (month as i32 - 1) + delta;
  (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

/// Monday-aligned rows of a month.
///
/// The first row is left-padded with `None` up to the weekday of the 1st;
/// the last row ends at the last day of the month.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<Vec<Option<NaiveDate>>>, InvalidDateError> {
  let (first, last) = month_bounds(year, month)?;

  let mut weeks = Vec::new();
  let mut week: Vec<Option<NaiveDate>> = vec![None; monday_offset(first) as usize];

  let mut day = first;
  while day <= last {
    week.push(Some(day));
    if week.len() == 7 {
      weeks.push(std::mem::take(&mut week));
    }
    day += Duration::days(1);
  }

  if !week.is_empty() {
    weeks.push(week);
  }

  Ok(weeks)
}

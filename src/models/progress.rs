use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One exercise logged in one session: `sets` of `reps` at `weight`.
///
/// Numeric fields come from user input and historical rows, so they are kept
/// as `Option` and read through the accessors, which apply the analytics
/// defaults (weight 0, reps 0, sets 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgressEntry {
  pub id: i64,
  pub user_id: String,
  pub exercise_name: String,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub weight: Option<f64>,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub reps: Option<i64>,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub sets: Option<i64>,
  pub date: NaiveDate,
}

impl ExerciseProgressEntry {
  pub fn weight_or_zero(&self) -> f64 {
    self.weight.filter(|w| w.is_finite()).unwrap_or(0.0)
  }

  pub fn reps_or_zero(&self) -> i64 {
    self.reps.unwrap_or(0)
  }

  /// Missing or zero sets count as a single set
  pub fn sets_or_one(&self) -> i64 {
    match self.sets {
      Some(s) if s != 0 => s,
      _ => 1,
    }
  }
}

/// For inserting new progress entries (without id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExerciseProgress {
  pub user_id: String,
  pub exercise_name: String,
  pub weight: f64,
  pub reps: i64,
  pub sets: i64,
  pub date: NaiveDate,
}

/// ---------------------------------------------------------------------------
/// Lenient numeric fields
/// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
  Int(i64),
  Float(f64),
  Text(String),
  Other(serde::de::IgnoredAny),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
  Ok(match raw {
    Some(RawNumber::Int(i)) => Some(i as f64),
    Some(RawNumber::Float(f)) => Some(f),
    Some(RawNumber::Text(s)) => parse_leading_f64(&s),
    Some(RawNumber::Other(_)) | None => None,
  })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
  Ok(match raw {
    Some(RawNumber::Int(i)) => Some(i),
    Some(RawNumber::Float(f)) if f.is_finite() => Some(f.trunc() as i64),
    Some(RawNumber::Text(s)) => parse_leading_int(&s),
    _ => None,
  })
}

/// Decimal prefix of a string ("62.5kg" -> 62.5), `None` when there is none
fn parse_leading_f64(s: &str) -> Option<f64> {
  let trimmed = s.trim();
  let mut seen_dot = false;
  let end = trimmed
    .char_indices()
    .find(|(i, c)| {
      let accepted = c.is_ascii_digit()
        || (*i == 0 && (*c == '-' || *c == '+'))
        || (*c == '.' && !seen_dot);
      if *c == '.' {
        seen_dot = true;
      }
      !accepted
    })
    .map(|(i, _)| i)
    .unwrap_or(trimmed.len());
  trimmed[..end].parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Integer prefix of a string ("8 reps" -> 8), `None` when there is none
fn parse_leading_int(s: &str) -> Option<i64> {
  let trimmed = s.trim();
  let digits_end = trimmed
    .char_indices()
    .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
    .map(|(i, _)| i)
    .unwrap_or(trimmed.len());
  trimmed[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(json: &str) -> ExerciseProgressEntry {
    serde_json::from_str(json).expect("entry should deserialize")
  }

  #[test]
  fn test_numeric_fields_accept_strings_and_numbers() {
    let entry = parse(
      r#"{"id":1,"user_id":"u1","exercise_name":"Bench","weight":"62.5","reps":"8 reps","sets":3,"date":"2024-01-01"}"#,
    );
    assert_eq!(entry.weight, Some(62.5));
    assert_eq!(entry.reps, Some(8));
    assert_eq!(entry.sets, Some(3));
  }

  #[test]
  fn test_malformed_fields_fall_back_to_defaults() {
    let entry = parse(
      r#"{"id":1,"user_id":"u1","exercise_name":"Bench","weight":"heavy","reps":null,"sets":"x","date":"2024-01-01"}"#,
    );
    assert_eq!(entry.weight_or_zero(), 0.0);
    assert_eq!(entry.reps_or_zero(), 0);
    assert_eq!(entry.sets_or_one(), 1);

    let missing = parse(r#"{"id":2,"user_id":"u1","exercise_name":"Row","date":"2024-01-01"}"#);
    assert_eq!(missing.weight, None);
    assert_eq!(missing.sets_or_one(), 1);
  }

  #[test]
  fn test_zero_sets_read_as_one() {
    let entry = parse(
      r#"{"id":1,"user_id":"u1","exercise_name":"Squat","weight":100,"reps":5,"sets":0,"date":"2024-01-01"}"#,
    );
    assert_eq!(entry.weight_or_zero(), 100.0);
    assert_eq!(entry.sets_or_one(), 1);
  }

  #[test]
  fn test_text_weight_keeps_decimal_prefix() {
    let entry = parse(
      r#"{"id":1,"user_id":"u1","exercise_name":"Bench","weight":"62.5kg","reps":"8","sets":"3 sets","date":"2024-01-01"}"#,
    );
    assert_eq!(entry.weight, Some(62.5));
    assert_eq!(entry.sets, Some(3));

    assert_eq!(parse_leading_f64(" -2.5.1 "), Some(-2.5));
    assert_eq!(parse_leading_f64(".75"), Some(0.75));
    assert_eq!(parse_leading_f64("kg"), None);
  }
}

//! Due-status evaluation for recurring tasks.
//!
//! A task falls due `repeat_interv_hours` after it was last completed. Hours
//! are added as wall-clock time; there is no calendar awareness. Intervals
//! are not validated here, so a zero or negative interval simply yields a
//! task that is always due, and a non-finite one propagates into non-finite
//! results.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::entity::Task;

/// Hours past due after which an incomplete task counts as overdue.
pub const OVERDUE_GRACE_HOURS: f64 = 24.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// When `task` next falls due, or `None` if its interval cannot be
/// represented as a timestamp (non-finite or absurdly large).
pub fn date_due(task: &Task) -> Option<DateTime<Utc>> {
  let ms = task.repeat_interv_hours * MS_PER_HOUR;
  if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
    return None;
  }
  let delta = TimeDelta::try_milliseconds(ms.round() as i64)?;
  task.last_completed.checked_add_signed(delta)
}

/// Hours from `now` until `task` falls due. Negative once it is past due.
pub fn hours_until_due(task: &Task, now: DateTime<Utc>) -> f64 {
  let since_completed = (task.last_completed - now).num_milliseconds() as f64;
  since_completed / MS_PER_HOUR + task.repeat_interv_hours
}

/// Hours `task` has been past due at `now`. Negative while still upcoming.
pub fn hours_since_due(task: &Task, now: DateTime<Utc>) -> f64 {
  -hours_until_due(task, now)
}

/// Coarse classification of where a task sits relative to its due date.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DueState {
  Upcoming,
  Due,
  /// More than [`OVERDUE_GRACE_HOURS`] past due.
  Overdue,
}

/// Classify `task` at `now`. The `complete` flag is not consulted.
pub fn due_state(task: &Task, now: DateTime<Utc>) -> DueState {
  let until = hours_until_due(task, now);
  if -until > OVERDUE_GRACE_HOURS {
    DueState::Overdue
  } else if until <= 0.0 {
    DueState::Due
  } else {
    DueState::Upcoming
  }
}

// ─── Human-readable durations ────────────────────────────────────────────────

const UNITS: [(&str, f64); 5] = [
  ("year", 8760.0),
  ("month", 720.0),
  ("week", 168.0),
  ("day", 24.0),
  ("hour", 1.0),
];

fn round1(value: f64) -> f64 { (value * 10.0).round() / 10.0 }

fn with_unit(value: f64, unit: &str) -> String {
  if value == 1.0 {
    format!("1 {unit}")
  } else {
    format!("{value:.1} {unit}s")
  }
}

/// Render a duration given in hours using the largest unit it fills at least
/// once, e.g. `36.0` → `"1.5 days"`. The sign is ignored.
pub fn readable_time(hours: f64) -> String {
  let hours = hours.abs();
  for (unit, size) in UNITS {
    let value = round1(hours / size);
    if value >= 1.0 {
      return with_unit(value, unit);
    }
  }
  with_unit(round1(hours * 60.0), "minute")
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::entity::TaskOwner;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
  }

  fn task(hours_ago: i64, interval: f64) -> Task {
    Task {
      id:                  1,
      name:                "Feed".into(),
      description:         String::new(),
      complete:            false,
      last_completed:      now() - TimeDelta::hours(hours_ago),
      repeat_interv_hours: interval,
      owner:               Some(TaskOwner::Animal(1)),
    }
  }

  #[test]
  fn due_date_adds_interval() {
    let t = task(48, 24.0);
    assert_eq!(date_due(&t), Some(now() - TimeDelta::hours(24)));
  }

  #[test]
  fn hours_until_and_since_are_negations() {
    let t = task(48, 24.0);
    assert_eq!(hours_until_due(&t, now()), -24.0);
    assert_eq!(hours_since_due(&t, now()), 24.0);

    let fresh = task(2, 12.0);
    assert_eq!(hours_until_due(&fresh, now()), 10.0);
    assert_eq!(hours_since_due(&fresh, now()), -10.0);
  }

  #[test]
  fn overdue_boundary_is_exclusive() {
    assert_eq!(due_state(&task(48, 24.0), now()), DueState::Due);
    assert_eq!(due_state(&task(49, 24.0), now()), DueState::Overdue);
    assert_eq!(due_state(&task(24, 24.0), now()), DueState::Due);
    assert_eq!(due_state(&task(1, 24.0), now()), DueState::Upcoming);
  }

  #[test]
  fn non_positive_interval_is_always_due() {
    assert_eq!(due_state(&task(0, 0.0), now()), DueState::Due);
    assert_eq!(due_state(&task(0, -30.0), now()), DueState::Overdue);
  }

  #[test]
  fn non_finite_interval_propagates() {
    let t = task(1, f64::NAN);
    assert!(hours_until_due(&t, now()).is_nan());
    assert_eq!(date_due(&t), None);

    let forever = task(1, f64::INFINITY);
    assert_eq!(hours_until_due(&forever, now()), f64::INFINITY);
    assert_eq!(due_state(&forever, now()), DueState::Upcoming);
  }

  #[test]
  fn readable_time_picks_largest_unit() {
    assert_eq!(readable_time(24.0), "1 day");
    assert_eq!(readable_time(36.0), "1.5 days");
    assert_eq!(readable_time(0.5), "30.0 minutes");
    assert_eq!(readable_time(1.0), "1 hour");
    assert_eq!(readable_time(5.0), "5.0 hours");
    assert_eq!(readable_time(168.0), "1 week");
    assert_eq!(readable_time(720.0), "1 month");
    assert_eq!(readable_time(8760.0), "1 year");
    assert_eq!(readable_time(17520.0), "2.0 years");
  }

  #[test]
  fn readable_time_promotes_on_rounded_value() {
    // 23.9 hours rounds to 1.0 day.
    assert_eq!(readable_time(23.9), "1 day");
    assert_eq!(readable_time(1.0 / 60.0), "1 minute");
    assert_eq!(readable_time(-36.0), "1.5 days");
  }
}

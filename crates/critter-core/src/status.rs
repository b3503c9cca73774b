//! Aggregate task status for badge rendering.
//!
//! An enclosure's status covers its own tasks and those of the animals
//! nested in it. Nesting is one level deep, so there is nothing further to
//! walk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  due::{OVERDUE_GRACE_HOURS, hours_since_due},
  entity::Task,
  subject::Subject,
};

fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
  !task.complete && hours_since_due(task, now) > OVERDUE_GRACE_HOURS
}

/// Whether the subject, or any animal nested in it, has an incomplete task.
pub fn has_incomplete_tasks(subject: &Subject) -> bool {
  subject.all_tasks().any(|t| !t.complete)
}

/// Whether the subject, or any animal nested in it, has an incomplete task
/// more than [`OVERDUE_GRACE_HOURS`] past due at `now`.
pub fn has_overdue_tasks(subject: &Subject, now: DateTime<Utc>) -> bool {
  subject.all_tasks().any(|t| is_overdue(t, now))
}

/// Both badge flags for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectStatus {
  pub incomplete: bool,
  pub overdue:    bool,
}

pub fn subject_status(subject: &Subject, now: DateTime<Utc>) -> SubjectStatus {
  SubjectStatus {
    incomplete: has_incomplete_tasks(subject),
    overdue:    has_overdue_tasks(subject, now),
  }
}

/// Badge flags over an arbitrary set of tasks, e.g. one nested animal's.
pub fn tasks_status<'a>(
  tasks: impl IntoIterator<Item = &'a Task>,
  now: DateTime<Utc>,
) -> SubjectStatus {
  tasks
    .into_iter()
    .fold(SubjectStatus::default(), |acc, t| SubjectStatus {
      incomplete: acc.incomplete || !t.complete,
      overdue:    acc.overdue || is_overdue(t, now),
    })
}

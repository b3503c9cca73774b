//! Display rows derived from the family list.
//!
//! Shared by the `list` command and the terminal UI so both show the same
//! order, nesting and badges.

use chrono::{DateTime, Utc};
use critter_client::FamilyEntry;
use critter_core::{
  due::{DueState, due_state, hours_until_due, readable_time},
  entity::Task,
  status::{SubjectStatus, tasks_status},
  subject::{AnimalSubject, Subject, SubjectKey},
};

/// One line of the subject list. Enclosures are followed by their animals at
/// `depth` 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
  pub key:    SubjectKey,
  pub depth:  usize,
  pub name:   String,
  /// Species for animals, habitat for enclosures.
  pub kind:   String,
  pub status: SubjectStatus,
  /// Tasks owned directly by this row's subject.
  pub tasks:  Vec<Task>,
}

fn animal_row(animal: &AnimalSubject, depth: usize, status: SubjectStatus) -> Row {
  Row {
    key: SubjectKey::Animal(animal.animal_id),
    depth,
    name: animal.name.clone(),
    kind: animal.species.name.clone(),
    status,
    tasks: animal.tasks.clone(),
  }
}

/// Flatten `entries` into rows, keeping family order.
pub fn rows(entries: &[FamilyEntry], now: DateTime<Utc>) -> Vec<Row> {
  let mut rows = Vec::new();
  for entry in entries {
    match &entry.subject {
      Subject::Animal(animal) => rows.push(animal_row(animal, 0, entry.status)),
      Subject::Enclosure(enclosure) => {
        rows.push(Row {
          key:    SubjectKey::Enclosure(enclosure.enclosure_id),
          depth:  0,
          name:   enclosure.name.clone(),
          kind:   enclosure.habitat.name.clone(),
          status: entry.status,
          tasks:  enclosure.tasks.clone(),
        });
        rows.extend(
          enclosure
            .animals
            .iter()
            .map(|a| animal_row(a, 1, tasks_status(&a.tasks, now))),
        );
      }
    }
  }
  rows
}

pub fn badge(status: SubjectStatus) -> char {
  if status.overdue {
    '!'
  } else if status.incomplete {
    '•'
  } else {
    ' '
  }
}

/// Short due description for one task, e.g. `"due in 2.0 days"`.
pub fn due_text(task: &Task, now: DateTime<Utc>) -> String {
  let until = hours_until_due(task, now);
  if !until.is_finite() {
    return "no schedule".into();
  }
  if task.complete {
    return if until > 0.0 {
      format!("done, next in {}", readable_time(until))
    } else {
      "done".into()
    };
  }
  match due_state(task, now) {
    DueState::Upcoming => format!("due in {}", readable_time(until)),
    DueState::Due => format!("due {} ago", readable_time(until)),
    DueState::Overdue => format!("overdue by {}", readable_time(until)),
  }
}

/// Plain-text rendering of `rows` for the `list` command.
pub fn render(rows: &[Row], now: DateTime<Utc>) -> String {
  let mut out = String::new();
  for row in rows {
    let indent = "    ".repeat(row.depth);
    out.push_str(&format!(
      "{indent}{} {}  ({})\n",
      badge(row.status),
      row.name,
      row.kind
    ));
    for task in &row.tasks {
      out.push_str(&format!(
        "{indent}    #{:<4} {}  {}\n",
        task.id,
        task.name,
        due_text(task, now)
      ));
    }
  }
  out
}

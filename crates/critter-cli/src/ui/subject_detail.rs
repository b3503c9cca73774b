//! Subject detail pane, right panel: record fields followed by tasks.

use chrono::{DateTime, Utc};
use critter_core::{
  clock::Clock,
  due::{DueState, due_state},
  entity::Task,
  source::CritterSource,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
  app::{App, Detail, Screen},
  view::due_text,
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw<S: CritterSource, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let Some(detail) = &app.detail else {
    return;
  };

  let border = if app.screen == Screen::SubjectDetail {
    Color::Gray
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(format!(" {} ", detail.name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines = match detail {
    Detail::Animal(d) => {
      let mut lines = vec![
        field("species", format!("{} ({})", d.species.common_name, d.species.scientific_name)),
        field(
          "enclosure",
          d.enclosure.as_ref().map_or("none".to_owned(), |e| e.name.clone()),
        ),
      ];
      if let Some(habitat) = &d.habitat {
        lines.push(field("habitat", habitat.name.clone()));
      }
      push_text(&mut lines, "image", d.animal.display_image(&d.species));
      push_text(&mut lines, "gender", &d.animal.gender);
      if let Some(dob) = d.animal.dob {
        lines.push(field("born", dob.format("%Y-%m-%d").to_string()));
      }
      push_text(&mut lines, "personality", &d.animal.personality);
      push_text(&mut lines, "diet", &d.animal.diet);
      push_text(&mut lines, "routine", &d.animal.routine);
      push_text(&mut lines, "notes", &d.animal.extra_notes);
      if d.animal.is_memorialized {
        let date = d
          .animal
          .memorial_date
          .map(|date| date.format("%Y-%m-%d").to_string())
          .unwrap_or_default();
        lines.push(field("memorial", date));
      }
      lines
    }
    Detail::Enclosure(d) => {
      let mut lines = vec![field("habitat", d.habitat.name.clone())];
      push_text(&mut lines, "humidity", &d.habitat.humidity);
      push_text(&mut lines, "day temp", &d.habitat.temp_day);
      push_text(&mut lines, "night temp", &d.habitat.temp_night);
      let residents: Vec<_> = d.animals.iter().map(|a| a.animal.name.as_str()).collect();
      lines.push(field(
        "residents",
        if residents.is_empty() {
          "none".to_owned()
        } else {
          residents.join(", ")
        },
      ));
      push_text(&mut lines, "notes", &d.enclosure.notes);
      lines
    }
  };

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "Tasks",
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )));

  let tasks = detail.tasks();
  if tasks.is_empty() {
    lines.push(Line::from(Span::styled(
      "  No tasks.",
      Style::default().fg(Color::DarkGray),
    )));
  }
  let focused = app.screen == Screen::SubjectDetail;
  let nested = matches!(detail, Detail::Enclosure(_));
  for (i, (owner, task)) in tasks.iter().enumerate() {
    lines.push(task_line(
      task,
      nested.then_some(*owner),
      focused && i == app.task_cursor,
      app.now,
    ));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Line helpers ─────────────────────────────────────────────────────────────

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<12}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn push_text(lines: &mut Vec<Line<'static>>, label: &str, value: &str) {
  if !value.is_empty() {
    lines.push(field(label, value.to_owned()));
  }
}

fn task_line(
  task: &Task,
  owner: Option<&str>,
  selected: bool,
  now: DateTime<Utc>,
) -> Line<'static> {
  let due_style = if task.complete {
    Style::default().fg(Color::Green)
  } else {
    match due_state(task, now) {
      DueState::Upcoming => Style::default().fg(Color::Gray),
      DueState::Due => Style::default().fg(Color::Yellow),
      DueState::Overdue => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
  };
  let name_style = if selected {
    Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };

  let mut spans = vec![
    Span::raw(if selected { "> " } else { "  " }),
    Span::styled(if task.complete { "[x] " } else { "[ ] " }, due_style),
    Span::styled(task.name.clone(), name_style),
  ];
  if let Some(owner) = owner {
    spans.push(Span::styled(
      format!("  {owner}"),
      Style::default().fg(Color::DarkGray),
    ));
  }
  spans.push(Span::styled(format!("  {}", due_text(task, now)), due_style));
  Line::from(spans)
}

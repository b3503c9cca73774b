//! TUI rendering, orchestrating all panes.

pub mod family_list;
pub mod subject_detail;

use critter_core::{clock::Clock, source::CritterSource};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

/// Main draw function called each frame.
pub fn draw<S: CritterSource, C: Clock>(f: &mut Frame, app: &App<S, C>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S, C>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let left = Span::styled(
    " critter  [/] search  [r] refresh  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} ", app.now.format("%Y-%m-%d %H:%M UTC")),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S: CritterSource, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  family_list::draw(f, cols[0], app);

  if app.detail.is_some() {
    subject_detail::draw(f, cols[1], app);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select an animal or enclosure and press Enter.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S, C>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let (mode_label, hints) = match app.screen {
    Screen::FamilyList if app.filter_active => {
      ("SEARCH", "Type to filter  Esc cancel  Enter select")
    }
    Screen::FamilyList => ("NORMAL", "↑↓/jk navigate  / search  Enter detail  r refresh  q quit"),
    Screen::SubjectDetail => ("TASKS", "↑↓/jk select  c complete  Esc back  r refresh  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints
  } else {
    app.status_msg.as_str()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

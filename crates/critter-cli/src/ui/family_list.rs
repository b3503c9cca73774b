//! Family list pane, left panel.

use critter_core::{clock::Clock, source::CritterSource, status::SubjectStatus};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
  app::{App, Screen},
  view::badge,
};

fn badge_style(status: SubjectStatus) -> Style {
  if status.overdue {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Yellow)
  }
}

/// Render the subject list into `area`.
pub fn draw<S: CritterSource, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let filtered = app.filtered_rows();
  let total = app.rows.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Family ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Family ({total}) ")
  };

  let border = if app.screen == Screen::FamilyList {
    Color::Gray
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|row| {
      let indent = "  ".repeat(row.depth);
      let name_style = if row.depth == 0 {
        Style::default().add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(vec![
        Span::raw(indent),
        Span::styled(format!("{} ", badge(row.status)), badge_style(row.status)),
        Span::styled(row.name.clone(), name_style),
        Span::styled(format!("  {}", row.kind), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;

    let cursor = if app.filter_active { "_" } else { "" };
    f.render_widget(
      Paragraph::new(format!("/{}{cursor}", app.filter))
        .style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if filtered.is_empty() {
    f.render_widget(
      Paragraph::new("Nothing to show.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

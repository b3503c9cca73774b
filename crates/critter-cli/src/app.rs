//! Application state machine and event dispatcher.

use anyhow::Result;
use chrono::{DateTime, Utc};
use critter_client::{CacheError, Context};
use critter_core::{
  clock::{Clock, SystemClock},
  entity::Task,
  source::CritterSource,
  subject::{AnimalDetail, EnclosureDetail, SubjectKey},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::view::{self, Row};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the subject list.
  FamilyList,
  /// Focus on the task list of the selected subject.
  SubjectDetail,
}

// ─── Detail ───────────────────────────────────────────────────────────────────

/// The fully resolved subject shown in the right pane.
#[derive(Debug, Clone)]
pub enum Detail {
  Animal(AnimalDetail),
  Enclosure(EnclosureDetail),
}

impl Detail {
  pub fn name(&self) -> &str {
    match self {
      Self::Animal(d) => &d.animal.name,
      Self::Enclosure(d) => &d.enclosure.name,
    }
  }

  /// Every task shown in the pane, paired with its owner's name. An
  /// enclosure lists its own tasks before those of its animals.
  pub fn tasks(&self) -> Vec<(&str, &Task)> {
    match self {
      Self::Animal(d) => d.tasks.iter().map(|t| (d.animal.name.as_str(), t)).collect(),
      Self::Enclosure(d) => {
        let own = d.tasks.iter().map(|t| (d.enclosure.name.as_str(), t));
        let nested = d
          .animals
          .iter()
          .flat_map(|a| a.tasks.iter().map(|t| (a.animal.name.as_str(), t)));
        own.chain(nested).collect()
      }
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S, C = SystemClock> {
  /// Current keyboard focus.
  pub screen: Screen,

  /// Flattened family list, rebuilt on every load.
  pub rows: Vec<Row>,

  /// Current fuzzy-filter string (only edited while `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* rows.
  pub list_cursor: usize,

  /// Cursor position within the detail task list.
  pub task_cursor: usize,

  /// Key of the subject in the detail pane.
  pub selected: Option<SubjectKey>,

  pub detail: Option<Detail>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Instant the current rows were evaluated at.
  pub now: DateTime<Utc>,

  ctx: Context<S, C>,
}

impl<S: CritterSource, C: Clock> App<S, C> {
  pub fn new(ctx: Context<S, C>) -> Self {
    Self {
      screen: Screen::FamilyList,
      rows: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      task_cursor: 0,
      selected: None,
      detail: None,
      status_msg: String::new(),
      now: ctx.now(),
      ctx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Rebuild the rows, and the open detail if any, from the cache.
  ///
  /// A dangling reference leaves the list empty with a notice instead of
  /// failing; the next refresh retries.
  pub async fn load(&mut self) -> Result<()> {
    self.now = self.ctx.now();
    match self.ctx.family().await {
      Ok(entries) => {
        self.rows = view::rows(&entries, self.now);
        self.status_msg.clear();
      }
      Err(CacheError::Derive(e)) if e.is_referential() => {
        tracing::warn!(error = %e, "family not ready");
        self.rows.clear();
        self.detail = None;
        self.status_msg = format!("Reference data still loading ({e}), press r");
        return Ok(());
      }
      Err(e) => return Err(e.into()),
    }

    let len = self.filtered_rows().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
    self.load_detail().await
  }

  async fn load_detail(&mut self) -> Result<()> {
    let Some(key) = self.selected else {
      self.detail = None;
      return Ok(());
    };
    let snapshot = self.ctx.snapshot().await?;
    self.detail = match key {
      SubjectKey::Animal(id) => snapshot.animal_detail(id)?.map(Detail::Animal),
      SubjectKey::Enclosure(id) => {
        snapshot.enclosure_detail(id)?.map(Detail::Enclosure)
      }
    };
    match &self.detail {
      Some(detail) => {
        let len = detail.tasks().len();
        self.task_cursor = self.task_cursor.min(len.saturating_sub(1));
      }
      None => {
        self.selected = None;
        self.screen = Screen::FamilyList;
      }
    }
    Ok(())
  }

  async fn refresh(&mut self) -> Result<()> {
    self.ctx.refresh().await;
    self.load().await
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Rows whose name or species/habitat matches the current filter.
  pub fn filtered_rows(&self) -> Vec<&Row> {
    if self.filter.is_empty() {
      return self.rows.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .rows
      .iter()
      .filter(|r| {
        matcher.fuzzy_match(&r.name, &self.filter).is_some()
          || matcher.fuzzy_match(&r.kind, &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_row(&self) -> Option<&Row> {
    self.filtered_rows().get(self.list_cursor).copied()
  }

  /// The task under the detail cursor.
  pub fn cursor_task(&self) -> Option<&Task> {
    let detail = self.detail.as_ref()?;
    detail.tasks().get(self.task_cursor).map(|(_, t)| *t)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.filter_active {
      return self.handle_filter_key(key).await;
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('r') => {
        self.status_msg = "Refreshing…".into();
        if let Err(e) = self.refresh().await {
          self.status_msg = format!("Error: {e}");
        }
        return Ok(true);
      }
      _ => {}
    }

    match self.screen {
      Screen::FamilyList => self.handle_list_key(key).await,
      Screen::SubjectDetail => self.handle_detail_key(key).await,
    }
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        let single = match self.filtered_rows().as_slice() {
          [only] => Some(only.key),
          _ => None,
        };
        if let Some(key) = single {
          self.open_detail(key).await?;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.filtered_rows().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(key) = self.cursor_row().map(|r| r.key) {
          self.open_detail(key).await?;
        }
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::FamilyList;
        self.selected = None;
        self.detail = None;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.detail.as_ref().map_or(0, |d| d.tasks().len());
        if self.task_cursor + 1 < len {
          self.task_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.task_cursor = self.task_cursor.saturating_sub(1);
      }
      KeyCode::Char('c') => self.complete_selected().await?,
      _ => {}
    }
    Ok(true)
  }

  /// Transition to `SubjectDetail` for `key`.
  async fn open_detail(&mut self, key: SubjectKey) -> Result<()> {
    self.selected = Some(key);
    self.task_cursor = 0;
    self.load_detail().await?;
    if self.detail.is_some() {
      self.screen = Screen::SubjectDetail;
    }
    Ok(())
  }

  async fn complete_selected(&mut self) -> Result<()> {
    let Some((id, name)) = self.cursor_task().map(|t| (t.id, t.name.clone())) else {
      return Ok(());
    };
    let msg = match self.ctx.complete_task(id).await {
      Ok(_) => format!("Completed {name}"),
      Err(e) => format!("Could not complete {name}: {e}"),
    };
    self.load().await?;
    self.status_msg = msg;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use critter_client::MemorySource;
  use critter_core::clock::FixedClock;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
  }

  async fn demo_app() -> App<MemorySource, FixedClock> {
    let ctx = Context::with_clock(MemorySource::demo(FixedClock(now())), FixedClock(now()));
    let mut app = App::new(ctx);
    app.load().await.unwrap();
    app
  }

  fn press(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn type_keys(app: &mut App<MemorySource, FixedClock>, keys: &str) {
    for c in keys.chars() {
      assert!(app.handle_key(press(KeyCode::Char(c))).await.unwrap());
    }
  }

  #[tokio::test]
  async fn cursor_stays_in_bounds() {
    let mut app = demo_app().await;
    app.handle_key(press(KeyCode::Char('k'))).await.unwrap();
    assert_eq!(app.list_cursor, 0);

    type_keys(&mut app, &"j".repeat(20)).await;
    assert_eq!(app.list_cursor, app.rows.len() - 1);
  }

  #[tokio::test]
  async fn filter_then_enter_opens_the_single_match() {
    let mut app = demo_app().await;
    type_keys(&mut app, "/kermit").await;
    assert_eq!(app.filtered_rows().len(), 1);

    app.handle_key(press(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::SubjectDetail);
    assert_eq!(app.selected, Some(SubjectKey::Animal(33)));
    assert_eq!(app.detail.as_ref().map(Detail::name), Some("Kermit"));
  }

  #[tokio::test]
  async fn enclosure_detail_lists_nested_tasks() {
    let mut app = demo_app().await;
    let index = app
      .rows
      .iter()
      .position(|r| r.key == SubjectKey::Enclosure(20))
      .unwrap();
    app.list_cursor = index;
    app.handle_key(press(KeyCode::Enter)).await.unwrap();

    let tasks: Vec<_> = app
      .detail
      .as_ref()
      .unwrap()
      .tasks()
      .into_iter()
      .map(|(owner, t)| (owner.to_owned(), t.id))
      .collect();
    assert_eq!(tasks, [
      ("Sand Tank".to_owned(), 43),
      ("Basil".to_owned(), 40),
      ("Sage".to_owned(), 41),
    ]);
  }

  #[tokio::test]
  async fn complete_clears_the_badge() {
    let mut app = demo_app().await;
    // Clover is first and has a single due task.
    assert!(app.rows[0].status.incomplete);
    app.handle_key(press(KeyCode::Enter)).await.unwrap();
    app.handle_key(press(KeyCode::Char('c'))).await.unwrap();

    assert_eq!(app.status_msg, "Completed Fresh hay");
    assert!(!app.rows[0].status.incomplete);
    assert!(app.cursor_task().unwrap().complete);
  }

  #[tokio::test]
  async fn failed_complete_is_reported_and_rolled_back() {
    let mut app = demo_app().await;
    app.handle_key(press(KeyCode::Enter)).await.unwrap();
    app.ctx.source().set_offline(true);
    app.handle_key(press(KeyCode::Char('c'))).await.unwrap();

    assert!(app.status_msg.starts_with("Could not complete Fresh hay"));
    assert!(!app.cursor_task().unwrap().complete);
  }

  #[tokio::test]
  async fn escape_returns_to_the_list() {
    let mut app = demo_app().await;
    app.handle_key(press(KeyCode::Enter)).await.unwrap();
    app.handle_key(press(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::FamilyList);
    assert!(app.detail.is_none());
    assert!(!app.handle_key(press(KeyCode::Char('q'))).await.unwrap());
  }
}

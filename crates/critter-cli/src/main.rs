//! `critter` — terminal UI for keeping up with animal care tasks.
//!
//! # Usage
//!
//! ```
//! critter --url http://localhost:8000/api --token s3cret
//! critter --config ~/.config/critter/config.toml list
//! critter --demo complete 42
//! ```

mod app;
mod settings;
mod ui;
mod view;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context as _, Result};
use app::App;
use clap::{Parser, Subcommand};
use critter_client::{ApiClient, ApiConfig, Context, MemorySource};
use critter_core::{
  clock::{Clock, SystemClock},
  entity::Id,
  source::CritterSource,
};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{DEFAULT_URL, Settings};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "critter", about = "Terminal UI for animal care tasks")]
struct Args {
  /// Path to a TOML config file (url, token, log_file, log_filter).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the critter API.
  #[arg(long)]
  url: Option<String>,

  /// Session bearer token.
  #[arg(long)]
  token: Option<String>,

  /// Use built-in sample data instead of a server.
  #[arg(long)]
  demo: bool,

  /// Append logs to this file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
  /// Print the family list with status badges and task ids.
  List,
  /// Mark a task complete.
  Complete {
    /// Id of the task, as printed by `list`.
    task_id: Id,
  },
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Logs go to `log_file` when set. Without one, one-shot commands log to
/// stderr and the terminal UI does not log at all.
fn init_tracing(log_file: Option<&Path>, directives: Option<&str>, tui: bool) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .parse_lossy(
      std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .or_else(|| directives.map(str::to_owned))
        .unwrap_or_default(),
    );

  match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None if !tui => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
    None => {}
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(args.config.as_deref())?;

  // Flags override the environment, which overrides the config file.
  let log_file = args.log_file.or(settings.log_file);
  init_tracing(
    log_file.as_deref(),
    settings.log_filter.as_deref(),
    args.command.is_none(),
  )?;

  if args.demo {
    tracing::info!("using demo data");
    return run(Context::new(MemorySource::demo(SystemClock)), args.command).await;
  }

  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!settings.url.is_empty()).then(|| settings.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_owned()),
    token:    args
      .token
      .or_else(|| (!settings.token.is_empty()).then(|| settings.token.clone())),
  };
  let client = ApiClient::new(api_config).context("building http client")?;
  tracing::info!(url = %client.config().base_url, "connecting");
  run(Context::new(client), args.command).await
}

async fn run<S, C>(ctx: Context<S, C>, command: Option<Command>) -> Result<()>
where
  S: CritterSource,
  C: Clock,
{
  match command {
    None => run_tui(App::new(ctx)).await,
    Some(Command::List) => {
      let family = ctx.family().await.context("loading family")?;
      print!("{}", view::render(&view::rows(&family, ctx.now()), ctx.now()));
      Ok(())
    }
    Some(Command::Complete { task_id }) => {
      let task = ctx
        .complete_task(task_id)
        .await
        .with_context(|| format!("completing task {task_id}"))?;
      println!("Completed #{} {}", task.id, task.name);
      Ok(())
    }
  }
}

// ─── Terminal UI ──────────────────────────────────────────────────────────────

async fn run_tui<S: CritterSource, C: Clock>(mut app: App<S, C>) -> Result<()> {
  app.load().await.context("loading family")?;

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore the terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop<S: CritterSource, C: Clock>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S, C>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(250))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}

//! `symtrack`: terminal client for the symptom tracker API.
//!
//! # Usage
//!
//! ```
//! symtrack --url http://localhost:5000
//! symtrack --config ~/.config/symtrack/config.toml --log-file /tmp/symtrack.log
//! ```

mod app;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Overrides, Settings};
use symtrack_client::{ApiClient, ApiConfig, Tracker};
use symtrack_core::storage::KeyValueStore;
use symtrack_store_file::FileStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "symtrack", version, about = "Terminal client for the symptom tracker")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "SYMTRACK_CONFIG")]
  config: Option<PathBuf>,

  /// Base URL of the API (default: http://localhost:5000).
  #[arg(long)]
  url: Option<String>,

  /// Where to keep the login session between runs.
  #[arg(long, value_name = "FILE")]
  session_file: Option<PathBuf>,

  /// Request timeout in seconds; 0 waits forever.
  #[arg(long, value_name = "SECS")]
  timeout: Option<u64>,

  /// Write logs to this file (filtered by RUST_LOG).
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl Args {
  fn overrides(&self) -> Overrides {
    Overrides {
      base_url:     self.url.clone(),
      session_path: self.session_file.clone(),
      timeout_secs: self.timeout,
      log_file:     self.log_file.clone(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(args.config.as_deref(), args.overrides())?;

  if let Some(path) = &settings.log_file {
    init_tracing(path)?;
  }

  let session_path = settings.session_path();
  let store = FileStore::open_or_reset(&session_path)
    .with_context(|| format!("opening session file {}", session_path.display()))?;

  let client = ApiClient::new(ApiConfig {
    base_url: settings.base_url.clone(),
    timeout:  (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs)),
  })?;
  tracing::info!(base_url = %settings.base_url, session = %session_path.display(), "starting");

  let mut app = App::new(Tracker::new(client, store));

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Resume a stored session, if any.
  app.tracker.restore().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Install a subscriber writing to `path`; the terminal itself is owned by
/// the UI.
fn init_tracing(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating log directory {}", parent.display()))?;
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<S: KeyValueStore>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
    {
      if !app.handle_key(key).await? {
        break;
      }
      // Keys pressed while a request was in flight must not submit again.
      if app.take_sent_request() {
        discard_pending_input()?;
      }
    }
    // Resize and other events: the next iteration redraws.
  }

  Ok(())
}

fn discard_pending_input() -> Result<()> {
  tokio::task::block_in_place(|| {
    while event::poll(Duration::ZERO)? {
      event::read()?;
    }
    Ok::<_, io::Error>(())
  })
  .context("discarding queued input")
}

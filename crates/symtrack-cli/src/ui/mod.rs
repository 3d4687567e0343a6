//! TUI rendering for all panes.

pub mod auth_form;
pub mod patterns;
pub mod symptom_editor;
pub mod symptom_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use symtrack_client::{AuthMode, View};
use symtrack_core::storage::KeyValueStore;

use crate::app::{App, Focus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tracker.view() {
    View::Unauthenticated => auth_form::draw(f, rows[1], app),
    View::Authenticated => draw_dashboard(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let title = match app.tracker.session() {
    Some(session) => format!(" Symptom Tracker  Welcome, {}!", session.user.username),
    None => " Symptom Tracker".to_string(),
  };
  let left = Span::styled(
    title,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

fn draw_dashboard<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  // Left: symptom list. Right: editor above patterns.
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  symptom_list::draw(f, cols[0], app);

  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(8), Constraint::Min(0)])
    .split(cols[1]);

  symptom_editor::draw(f, right[0], app);
  patterns::draw(f, right[1], app.tracker.patterns());
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match (app.tracker.view(), app.focus) {
    (View::Unauthenticated, _) => match app.tracker.auth_mode {
      AuthMode::Login => (
        "LOGIN",
        "Tab next field  Enter log in  Ctrl-R register instead  Esc quit",
      ),
      AuthMode::Register => (
        "REGISTER",
        "Tab next field  Enter register  Ctrl-R log in instead  Esc quit",
      ),
    },
    (View::Authenticated, Focus::List) => (
      "NORMAL",
      "↑↓/jk navigate  a add  e edit  d delete  / search  r refresh  L logout  q quit",
    ),
    (View::Authenticated, Focus::Editor) => (
      "EDIT",
      "Tab switch field  Enter save  Esc cancel",
    ),
    (View::Authenticated, Focus::Filter) => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter done",
    ),
  };

  let message = if let Some(id) = app.confirm_delete {
    let label = app
      .tracker
      .symptoms()
      .iter()
      .find(|s| s.id == id)
      .map(|s| s.label.as_str())
      .unwrap_or("symptom");
    Span::styled(
      format!("  Delete \"{label}\"? y/n"),
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    )
  } else if let Some(err) = app.tracker.error() {
    Span::styled(
      format!("  {err}"),
      Style::default()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD),
    )
  } else {
    Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray))
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let line = Line::from(vec![mode_span, message]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// Style for a form field, highlighted when it has focus.
pub(crate) fn field_style(focused: bool) -> Style {
  if focused {
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  }
}

/// Field text with a trailing cursor when focused.
pub(crate) fn field_text(value: &str, focused: bool) -> String {
  if focused {
    format!("{value}_")
  } else {
    value.to_string()
  }
}

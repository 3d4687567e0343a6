//! Login / registration form, centred in the body.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use symtrack_client::AuthMode;
use symtrack_core::storage::KeyValueStore;

use super::{field_style, field_text};
use crate::app::{App, AuthField};

const FORM_WIDTH: u16 = 50;

/// Render the auth form for whichever mode is active.
pub fn draw<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let fields = app.auth_fields();
  // Two lines per field, a blank line and the mode hint, plus borders.
  let height = fields.len() as u16 * 2 + 4;
  let area = centre(area, FORM_WIDTH, height);

  let (title, hint) = match app.tracker.auth_mode {
    AuthMode::Login => (" Login ", "Need an account? Ctrl-R to register"),
    AuthMode::Register => (" Register ", "Already have an account? Ctrl-R to log in"),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let focused = app.focused_auth_field();
  let mut lines: Vec<Line> = Vec::new();
  for &field in fields {
    let is_focused = field == focused;
    let raw = app.auth_value(field);
    let shown = if field == AuthField::Password {
      "•".repeat(raw.chars().count())
    } else {
      raw.to_string()
    };

    lines.push(Line::from(Span::styled(
      field.label(),
      Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(Span::styled(
      format!("  {}", field_text(&shown, is_focused)),
      field_style(is_focused),
    )));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    hint,
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Paragraph::new(lines), inner);
}

/// A `width` × `height` rectangle centred in `area`, clipped to fit.
fn centre(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
    .flex(Flex::Center)
    .areas(row);
  cell
}

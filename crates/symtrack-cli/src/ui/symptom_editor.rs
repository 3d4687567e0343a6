//! Add / edit form, top of the right column.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use symtrack_core::{form::EditorMode, storage::KeyValueStore};

use super::{field_style, field_text};
use crate::app::{App, EditorField, Focus};

pub fn draw<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let form = &app.tracker.symptom_form;
  let title = match &form.mode {
    EditorMode::Creating => " Add New Symptom ".to_string(),
    EditorMode::Editing(original) => format!(" Edit Symptom: {} ", original.label),
  };

  let active = app.focus == Focus::Editor;
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if active { Color::Cyan } else { Color::DarkGray }));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if !active && form.label.is_empty() && form.description.is_empty() {
    f.render_widget(
      Paragraph::new("Press a to record a symptom.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let label_focus = active && app.editor_field == EditorField::Label;
  let desc_focus = active && app.editor_field == EditorField::Description;

  let lines = vec![
    Line::from(Span::styled("Label", Style::default().fg(Color::Cyan))),
    Line::from(Span::styled(
      format!("  {}", field_text(&form.label, label_focus)),
      field_style(label_focus),
    )),
    Line::from(Span::styled("Description", Style::default().fg(Color::Cyan))),
    Line::from(Span::styled(
      format!("  {}", field_text(&form.description, desc_focus)),
      field_style(desc_focus),
    )),
  ];

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

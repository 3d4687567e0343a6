//! Symptom list pane (left panel).

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use symtrack_core::storage::KeyValueStore;

use crate::app::{App, Focus};

/// Render the symptom list into `area`.
pub fn draw<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let filtered = app.filtered_symptoms();
  let total = app.tracker.symptoms().len();
  let filtering = app.focus == Focus::Filter || !app.filter.is_empty();

  // Title with count.
  let title = if filtering {
    format!(" Your Symptoms ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Your Symptoms ({}) ", total)
  };

  let border = if app.focus == Focus::Editor {
    Color::DarkGray
  } else {
    Color::Cyan
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar along the bottom edge.
  if filtering && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.focus == Focus::Filter {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if total == 0 {
    f.render_widget(
      Paragraph::new("No symptoms recorded yet").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let editing = app.tracker.symptom_form.editing_id();
  let items: Vec<ListItem> = filtered
    .iter()
    .map(|symptom| {
      let when = symptom
        .timestamp
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string());

      let mut title = vec![
        Span::styled(
          symptom.label.clone(),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {when}"), Style::default().fg(Color::DarkGray)),
      ];
      if editing == Some(symptom.id) {
        title.push(Span::styled("  (editing)", Style::default().fg(Color::Yellow)));
      }

      ListItem::new(vec![
        Line::from(title),
        Line::from(Span::styled(
          format!("  {}", symptom.description),
          Style::default().fg(Color::Gray),
        )),
      ])
    })
    .collect();

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White),
    ),
    inner_area,
    &mut state,
  );
}

//! Common symptom patterns, bottom of the right column. Read-only.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use symtrack_core::symptom::Pattern;

pub fn draw(f: &mut Frame, area: Rect, patterns: &[Pattern]) {
  let block = Block::default()
    .title(" Common Symptom Patterns ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if patterns.is_empty() {
    f.render_widget(
      Paragraph::new("No common patterns yet.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let lines: Vec<Line> = patterns
    .iter()
    .map(|p| {
      Line::from(vec![
        Span::styled(
          format!("×{:<4}", p.count),
          Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        ),
        Span::raw(p.joined()),
      ])
    })
    .collect();

  f.render_widget(Paragraph::new(lines), inner);
}

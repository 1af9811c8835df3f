//! Viewer pane — right panel.

use certa_core::viewer::{CertificateView, ViewerState, viewer_link};
use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render `state` into `area`; `origin` is used for the shareable link.
pub fn draw(f: &mut Frame, area: Rect, state: &ViewerState, origin: &str) {
  let block = Block::default()
    .title(" Viewer ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let dim = Style::default().fg(Color::DarkGray);
  let lines = match state {
    ViewerState::Loading => vec![Line::from(Span::styled("Loading…", dim))],
    ViewerState::NotFound => vec![
      Line::from(Span::styled(
        "Certificate Not Found",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
      )),
      Line::from(""),
      Line::from(Span::styled(
        "The certificate does not exist or has been removed.",
        dim,
      )),
    ],
    ViewerState::Found(view) => found_lines(view, origin),
  };

  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: false }),
    inner,
  );
}

fn found_lines<'a>(view: &'a CertificateView, origin: &str) -> Vec<Line<'a>> {
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![
    Line::from(Span::styled("CERTIFICATE OF COMPLETION", dim)),
    Line::from(""),
    Line::from(Span::styled(
      view.candidate_name.as_str(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(view.role.as_str()),
  ];
  if !view.duration.is_empty() {
    lines.push(Line::from(Span::styled(view.duration.as_str(), dim)));
  }
  lines.extend([
    Line::from(""),
    Line::from(vec![Span::styled("Issued  ", label), Span::raw(view.issued.as_str())]),
    Line::from(vec![
      Span::styled("Code  ", label),
      Span::raw(view.access_code.as_str()),
    ]),
    Line::from(vec![
      Span::styled("Link  ", label),
      Span::raw(viewer_link(origin, &view.access_code)),
    ]),
  ]);
  lines
}

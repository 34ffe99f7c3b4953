//! Season summary screen.

use paddock_core::stats::RankingEntry;
use ratatui::{Frame, layout::Rect, text::Line, widgets::Paragraph};

use super::{dimmed, heading, pane};
use crate::app::App;

fn ranking(lines: &mut Vec<Line<'static>>, title: &str, unit: &str, entries: &[RankingEntry]) {
  lines.push(heading(title));
  if entries.is_empty() {
    lines.push(dimmed("  No data."));
  }
  for e in entries {
    lines.push(Line::from(format!(
      "  {}. #{:<3} {:<24} {} {unit}",
      e.position, e.driver_number, e.driver, e.count
    )));
  }
  lines.push(Line::from(""));
}

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(summary) = &app.season else {
    f.render_widget(Paragraph::new(dimmed("Nothing loaded.")).block(pane("Season")), area);
    return;
  };

  let mut lines = Vec::new();
  ranking(&mut lines, "Most wins", "wins", &summary.top_3_winners);
  ranking(&mut lines, "Most fastest laps", "fastest laps", &summary.top_3_fastest_laps);
  ranking(&mut lines, "Most pole positions", "poles", &summary.top_3_pole_positions);
  lines.push(dimmed("Pole positions are counted from race wins."));

  let para = Paragraph::new(lines)
    .block(pane(format!("Season {}", summary.season)))
    .scroll((app.scroll_offset(), 0));
  f.render_widget(para, area);
}

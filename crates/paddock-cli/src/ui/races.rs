//! Race list and race detail screens.

use paddock_core::store::ClassifiedEntry;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  text::Line,
  widgets::{Paragraph, Row, Table, TableState},
};

use super::{
  dimmed,
  drivers::{header_row, highlight},
  heading, lap_time, optional_time, pane,
};
use crate::app::App;

pub fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let rows: Vec<Row> = app
    .races
    .iter()
    .map(|r| {
      Row::new(vec![
        r.session_key.to_string(),
        r.date_start.get(..10).unwrap_or(r.date_start.as_str()).to_string(),
        r.circuit_short_name.clone(),
        r.country_name.clone(),
      ])
    })
    .collect();

  let mut state = TableState::default();
  state.select(if app.races.is_empty() { None } else { Some(app.list_cursor) });

  let table = Table::new(rows, [
    Constraint::Length(7),
    Constraint::Length(11),
    Constraint::Percentage(40),
    Constraint::Percentage(40),
  ])
  .header(header_row(["Key", "Date", "Circuit", "Country"]))
  .block(pane(format!("Races ({})", app.races.len())))
  .row_highlight_style(highlight());

  f.render_stateful_widget(table, area, &mut state);
}

fn entry_line(e: &ClassifiedEntry) -> Line<'static> {
  Line::from(format!(
    "  P{:<3} #{:<3} {:<24} {:<20} {}",
    e.position, e.driver_number, e.driver, e.team, e.country
  ))
}

/// Podium, last place, fastest lap and top speed of one race.
pub fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let Some(detail) = &app.race_detail else {
    f.render_widget(Paragraph::new(dimmed("Nothing loaded.")).block(pane("Race")), area);
    return;
  };

  let Some(race) = &detail.race else {
    let para = Paragraph::new(Line::from(format!(
      "No results available for session {}.",
      detail.race_id
    )))
    .block(pane(format!("Race {}", detail.race_id)));
    f.render_widget(para, area);
    return;
  };

  let title = format!(
    "{} · {} · {}",
    race.circuit_short_name,
    race.country_name,
    race.date_start.get(..10).unwrap_or(race.date_start.as_str())
  );

  let mut lines = vec![heading("Podium")];
  if detail.results.is_empty() {
    lines.push(dimmed("  No classification recorded."));
  }
  lines.extend(detail.results.iter().map(entry_line));

  lines.push(Line::from(""));
  lines.push(heading(&format!("Last place ({} classified)", detail.classified)));
  match &detail.last_place {
    Some(e) => lines.push(entry_line(e)),
    None => lines.push(dimmed("  —")),
  }

  lines.push(Line::from(""));
  lines.push(heading("Fastest lap"));
  match &detail.fastest_lap {
    Some(l) => {
      lines.push(Line::from(format!(
        "  #{} {}  lap {}  {}",
        l.driver_number,
        l.driver,
        l.lap_number,
        lap_time(l.total_time)
      )));
      lines.push(dimmed(format!(
        "  S1 {}  S2 {}  S3 {}",
        optional_time(l.sector_1),
        optional_time(l.sector_2),
        optional_time(l.sector_3)
      )));
    }
    None => lines.push(dimmed("  —")),
  }

  lines.push(Line::from(""));
  lines.push(heading("Top speed"));
  match &detail.max_speed {
    Some(s) => lines.push(Line::from(format!(
      "  #{} {}  {:.1} km/h",
      s.driver_number, s.driver, s.speed_kmh
    ))),
    None => lines.push(dimmed("  —")),
  }

  let para = Paragraph::new(lines)
    .block(pane(title))
    .scroll((app.scroll_offset(), 0));
  f.render_widget(para, area);
}

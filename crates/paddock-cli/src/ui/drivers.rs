//! Driver list and driver detail screens.

use paddock_core::stats::DriverDetail;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Row, Table, TableState},
};

use super::{dimmed, heading, optional_time, pane, speed};
use crate::app::App;

/// Render the (filtered) driver roster.
pub fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_drivers();
  let total = app.drivers.len();

  // Title with count.
  let title = if app.filter_active || !app.filter.is_empty() {
    format!("Drivers ({}/{})", filtered.len(), total)
  } else {
    format!("Drivers ({total})")
  };

  let block = pane(title);
  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let rows: Vec<Row> = filtered
    .iter()
    .map(|d| {
      Row::new(vec![
        format!("{:>3}", d.driver_number),
        d.name_acronym.clone(),
        d.full_name(),
        d.team_name.clone(),
        d.country_code.clone(),
      ])
    })
    .collect();

  let mut state = TableState::default();
  state.select(if filtered.is_empty() { None } else { Some(app.list_cursor) });

  let table = Table::new(rows, [
    Constraint::Length(4),
    Constraint::Length(4),
    Constraint::Percentage(40),
    Constraint::Percentage(40),
    Constraint::Length(4),
  ])
  .header(header_row(["#", "", "Driver", "Team", ""]))
  .row_highlight_style(highlight());

  f.render_stateful_widget(table, inner_area, &mut state);
}

/// Render a driver's race history and performance summary.
pub fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let Some(detail) = &app.driver_detail else {
    f.render_widget(Paragraph::new(dimmed("Nothing loaded.")).block(pane("Driver")), area);
    return;
  };

  match detail {
    DriverDetail::NoResults { driver_id, driver_known } => {
      let mut lines = vec![Line::from(format!("No results available for driver #{driver_id}."))];
      if !driver_known {
        lines.push(dimmed("This number is not in the imported roster."));
      }
      f.render_widget(Paragraph::new(lines).block(pane(format!("Driver #{driver_id}"))), area);
    }
    DriverDetail::Results { driver_id, driver, performance_summary, race_results } => {
      let title = match driver {
        Some(d) => format!("#{driver_id} {} · {}", d.full_name(), d.team_name),
        None => format!("Driver #{driver_id}"),
      };

      let mut lines = vec![
        heading("Performance"),
        Line::from(format!("  Wins            {}", performance_summary.wins)),
        Line::from(format!("  Top 3 finishes  {}", performance_summary.top_3_finishes)),
        Line::from(format!("  Top speed       {}", speed(performance_summary.max_speed))),
        Line::from(""),
        heading("Races"),
        dimmed(format!(
          "  {:<6} {:<18} {:>4} {:>10} {:>12}",
          "Key", "Circuit", "Pos", "Best lap", "Top speed"
        )),
      ];

      for r in race_results {
        let mut spans = vec![Span::raw(format!(
          "  {:<6} {:<18} {:>4} {:>10} {:>12}",
          r.session_key,
          r.circuit_short_name,
          r.position,
          optional_time(r.best_lap_duration),
          speed(r.max_speed),
        ))];
        if r.fastest_lap {
          spans.push(Span::styled(
            "  fastest lap",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
          ));
        }
        lines.push(Line::from(spans));
      }

      let para = Paragraph::new(lines)
        .block(pane(title))
        .scroll((app.scroll_offset(), 0));
      f.render_widget(para, area);
    }
  }
}

pub(crate) fn header_row<const N: usize>(cells: [&'static str; N]) -> Row<'static> {
  Row::new(cells).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

pub(crate) fn highlight() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

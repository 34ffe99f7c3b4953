//! TUI rendering — orchestrates all panes.

pub mod drivers;
pub mod races;
pub mod season;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, MENU, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
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
  match app.screen {
    Screen::Menu => draw_menu(f, rows[1], app),
    Screen::Drivers => drivers::draw_list(f, rows[1], app),
    Screen::DriverDetail => drivers::draw_detail(f, rows[1], app),
    Screen::Races => races::draw_list(f, rows[1], app),
    Screen::RaceDetail => races::draw_detail(f, rows[1], app),
    Screen::Season => season::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);

  if app.prompt.is_some() {
    draw_prompt(f, rows[1], app);
  }
}

// ─── Formatting ───────────────────────────────────────────────────────────────

/// Render a lap or sector duration in seconds as `m:ss.mmm`.
pub fn lap_time(seconds: f64) -> String {
  let millis = (seconds * 1000.0).round() as u64;
  let minutes = millis / 60_000;
  let rest = millis % 60_000;
  if minutes == 0 {
    format!("{}.{:03}", rest / 1000, rest % 1000)
  } else {
    format!("{minutes}:{:02}.{:03}", rest / 1000, rest % 1000)
  }
}

pub fn optional_time(seconds: Option<f64>) -> String {
  seconds.map(lap_time).unwrap_or_else(|| "—".into())
}

pub fn speed(kmh: Option<f64>) -> String {
  kmh.map(|v| format!("{v:.1} km/h")).unwrap_or_else(|| "—".into())
}

pub(crate) fn pane(title: impl Into<String>) -> Block<'static> {
  Block::default()
    .title(format!(" {} ", title.into()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

pub(crate) fn heading(text: &str) -> Line<'static> {
  Line::from(Span::styled(
    text.to_string(),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  ))
}

pub(crate) fn dimmed(text: impl Into<String>) -> Line<'static> {
  Line::from(Span::styled(text.into(), Style::default().fg(Color::DarkGray)))
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " paddock  [Esc] back  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{}  {date} ", app.client.base_url()),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

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

// ─── Menu ─────────────────────────────────────────────────────────────────────

fn draw_menu(f: &mut Frame, area: Rect, app: &App) {
  let items: Vec<ListItem> = MENU
    .iter()
    .enumerate()
    .map(|(i, item)| ListItem::new(format!(" {}. {}", i + 1, item.label())))
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.menu_cursor));

  f.render_stateful_widget(
    List::new(items).block(pane("Menu")).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

// ─── Prompt ───────────────────────────────────────────────────────────────────

fn draw_prompt(f: &mut Frame, area: Rect, app: &App) {
  let Some(prompt) = &app.prompt else {
    return;
  };
  let width = area.width.min(40);
  let popup = Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + area.height.saturating_sub(3) / 2,
    width,
    height: 3.min(area.height),
  };
  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(format!("{}_", prompt.input))
      .style(Style::default().fg(Color::Yellow))
      .block(pane(prompt.label())),
    popup,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.prompt.is_some() {
    ("INPUT", "Type a number  Enter open  Esc cancel")
  } else {
    match app.screen {
      Screen::Drivers if app.filter_active => (
        "SEARCH",
        "Type to filter  Esc cancel  Enter select",
      ),
      Screen::Menu => ("MENU", "↑↓/jk navigate  Enter select  q quit"),
      Screen::Drivers => (
        "DRIVERS",
        "↑↓/jk navigate  / search  Enter detail  r reload  Esc back",
      ),
      Screen::Races => ("RACES", "↑↓/jk navigate  Enter detail  r reload  Esc back"),
      Screen::DriverDetail | Screen::RaceDetail | Screen::Season => {
        ("DETAIL", "↑↓/jk scroll  Esc back  q quit")
      }
    }
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

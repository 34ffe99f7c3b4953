//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use paddock_core::{
  driver::Driver,
  stats::{DriverDetail, RaceDetail, RaceSummary, SeasonSummary},
};

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Menu,
  Drivers,
  DriverDetail,
  Races,
  RaceDetail,
  Season,
}

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
  Drivers,
  DriverLookup,
  Races,
  RaceLookup,
  Season,
  Quit,
}

pub const MENU: [MenuItem; 6] = [
  MenuItem::Drivers,
  MenuItem::DriverLookup,
  MenuItem::Races,
  MenuItem::RaceLookup,
  MenuItem::Season,
  MenuItem::Quit,
];

impl MenuItem {
  pub fn label(self) -> &'static str {
    match self {
      MenuItem::Drivers => "Drivers",
      MenuItem::DriverLookup => "Driver detail by number",
      MenuItem::Races => "Races",
      MenuItem::RaceLookup => "Race detail by session key",
      MenuItem::Season => "Season summary",
      MenuItem::Quit => "Quit",
    }
  }
}

/// What a number typed into the prompt refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
  Driver,
  Race,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
  pub target: Lookup,
  pub input:  String,
}

impl Prompt {
  pub fn label(&self) -> &'static str {
    match self.target {
      Lookup::Driver => "Driver number",
      Lookup::Race => "Session key",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Where `Esc` leads from a detail screen.
  pub back: Screen,

  pub menu_cursor: usize,

  /// Driver roster, loaded on startup.
  pub drivers: Vec<Driver>,

  /// Race list, loaded on first visit.
  pub races: Vec<RaceSummary>,

  pub driver_detail: Option<DriverDetail>,
  pub race_detail:   Option<RaceDetail>,
  pub season:        Option<SeasonSummary>,

  /// Current fuzzy-filter string for the driver list.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* driver list or the race list.
  pub list_cursor: usize,

  /// Scroll offset within detail screens.
  pub detail_scroll: usize,

  /// Number prompt, when open.
  pub prompt: Option<Prompt>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Menu,
      back: Screen::Menu,
      menu_cursor: 0,
      drivers: Vec::new(),
      races: Vec::new(),
      driver_detail: None,
      race_detail: None,
      season: None,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      prompt: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the driver roster.
  pub async fn load_drivers(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading drivers…".into();
    match self.client.list_drivers().await {
      Ok(drivers) => {
        self.drivers = drivers;
        self.list_cursor = 0;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  async fn load_races(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading races…".into();
    let races = self.client.list_races().await?;
    self.races = races;
    self.status_msg = String::new();
    Ok(())
  }

  async fn open_driver(&mut self, driver_number: u32) -> anyhow::Result<()> {
    let detail = self.client.driver_detail(driver_number).await?;
    self.driver_detail = Some(detail);
    self.detail_scroll = 0;
    self.screen = Screen::DriverDetail;
    Ok(())
  }

  async fn open_race(&mut self, session_key: u32) -> anyhow::Result<()> {
    let detail = self.client.race_detail(session_key).await?;
    self.race_detail = Some(detail);
    self.detail_scroll = 0;
    self.screen = Screen::RaceDetail;
    Ok(())
  }

  async fn open_season(&mut self) -> anyhow::Result<()> {
    let summary = self.client.season_summary().await?;
    self.season = Some(summary);
    self.detail_scroll = 0;
    self.screen = Screen::Season;
    Ok(())
  }

  /// Record a failed request in the status bar; the screen stays put.
  fn report(&mut self, result: anyhow::Result<()>) {
    match result {
      Ok(()) => self.status_msg.clear(),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Drivers matching the current filter by name, acronym, team or number.
  pub fn filtered_drivers(&self) -> Vec<&Driver> {
    if self.filter.is_empty() {
      return self.drivers.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .drivers
      .iter()
      .filter(|d| {
        let haystack = format!(
          "{} {} {} {}",
          d.driver_number,
          d.full_name(),
          d.name_acronym,
          d.team_name
        );
        matcher.fuzzy_match(&haystack, &self.filter).is_some()
      })
      .collect()
  }

  fn list_len(&self) -> usize {
    match self.screen {
      Screen::Drivers => self.filtered_drivers().len(),
      Screen::Races => self.races.len(),
      _ => 0,
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.prompt.is_some() {
      return Ok(self.handle_prompt_key(key).await);
    }
    if self.filter_active {
      return Ok(self.handle_filter_key(key).await);
    }

    match self.screen {
      Screen::Menu => Ok(self.handle_menu_key(key).await),
      Screen::Drivers | Screen::Races => Ok(self.handle_list_key(key).await),
      Screen::DriverDetail | Screen::RaceDetail | Screen::Season => Ok(self.handle_detail_key(key)),
    }
  }

  async fn handle_prompt_key(&mut self, key: KeyEvent) -> bool {
    let Some(prompt) = self.prompt.as_mut() else {
      return true;
    };
    match key.code {
      KeyCode::Esc => self.prompt = None,
      KeyCode::Backspace => {
        prompt.input.pop();
      }
      KeyCode::Char(c) if c.is_ascii_digit() => prompt.input.push(c),
      KeyCode::Enter => {
        let target = prompt.target;
        let Ok(number) = prompt.input.parse::<u32>() else {
          self.status_msg = "Enter a number".into();
          return true;
        };
        self.prompt = None;
        self.back = Screen::Menu;
        let result = match target {
          Lookup::Driver => self.open_driver(number).await,
          Lookup::Race => self.open_race(number).await,
        };
        self.report(result);
      }
      _ => {}
    }
    true
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let only = match self.filtered_drivers().as_slice() {
          [d] => Some(d.driver_number),
          _ => None,
        };
        if let Some(number) = only {
          self.back = Screen::Drivers;
          let result = self.open_driver(number).await;
          self.report(result);
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }

  async fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.menu_cursor + 1 < MENU.len() {
          self.menu_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.menu_cursor = self.menu_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        return self.activate(MENU[self.menu_cursor]).await;
      }
      _ => {}
    }
    true
  }

  /// Run a menu entry. Returns `false` for quit.
  async fn activate(&mut self, item: MenuItem) -> bool {
    self.status_msg.clear();
    match item {
      MenuItem::Drivers => {
        self.filter.clear();
        self.list_cursor = 0;
        self.screen = Screen::Drivers;
        if self.drivers.is_empty() {
          let result = self.load_drivers().await;
          self.report(result);
        }
      }
      MenuItem::Races => {
        self.list_cursor = 0;
        self.screen = Screen::Races;
        if self.races.is_empty() {
          let result = self.load_races().await;
          self.report(result);
        }
      }
      MenuItem::DriverLookup => {
        self.prompt = Some(Prompt { target: Lookup::Driver, input: String::new() });
      }
      MenuItem::RaceLookup => {
        self.prompt = Some(Prompt { target: Lookup::Race, input: String::new() });
      }
      MenuItem::Season => {
        self.back = Screen::Menu;
        let result = self.open_season().await;
        self.report(result);
      }
      MenuItem::Quit => return false,
    }
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.filter.clear();
        self.screen = Screen::Menu;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.list_len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') if self.screen == Screen::Drivers => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => {
        let result = match self.screen {
          Screen::Drivers => self.load_drivers().await,
          _ => self.load_races().await,
        };
        self.report(result);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        self.back = self.screen;
        let result = if self.screen == Screen::Drivers {
          let number = self.filtered_drivers().get(self.list_cursor).map(|d| d.driver_number);
          match number {
            Some(number) => self.open_driver(number).await,
            None => Ok(()),
          }
        } else {
          let key = self.races.get(self.list_cursor).map(|r| r.session_key);
          match key {
            Some(key) => self.open_race(key).await,
            None => Ok(()),
          }
        };
        self.report(result);
      }

      _ => {}
    }
    true
  }

  /// Detail scroll offset as a paragraph scroll row.
  pub fn scroll_offset(&self) -> u16 { u16::try_from(self.detail_scroll).unwrap_or(u16::MAX) }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = self.back;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }
      _ => {}
    }
    true
  }
}

use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};
use velo_core::{
    catalog::{CatalogFetcher, CatalogStore, LoadStatus, LoadToken, StoreEvent},
    config::AppConfig,
    models::CatalogItem,
};

use crate::block_font;

const TICK_RATE: Duration = Duration::from_millis(250);
const GRID_COLS: usize = 2;
const CARD_HEIGHT: u16 = 4;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

/// The linear screen stack: Intro → List → Detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Intro,
    List,
    Detail,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end for the storefront.
pub struct VeloApp {
    store: CatalogStore,
    fetcher: CatalogFetcher,
    config: AppConfig,
    screen: Screen,
    ui: UiState,
    /// Route parameter carried from List to Detail.
    selected_id: Option<String>,
    /// Token of the in-flight load, cancelled when the list unmounts.
    load_token: Option<LoadToken>,
    theme: Theme,
}

impl VeloApp {
    pub fn new(store: CatalogStore, fetcher: CatalogFetcher, config: AppConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
            screen: Screen::Intro,
            ui: UiState::default(),
            selected_id: None,
            load_token: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);
        let mut store_rx = self.store.subscribe();

        self.ui.set_status(format!(
            "Welcome to {} • catalog at {}",
            self.config.shop_name,
            self.fetcher.endpoint()
        ));

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.ui.should_quit {
                break;
            }

            tokio::select! {
                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(AppEvent::Input(event)) => {
                            if let Err(err) = self.handle_input(event) {
                                self.ui.set_status(format!("Error: {err}"));
                            }
                        }
                        Some(AppEvent::Tick) => {}
                        None => break,
                    }
                }
                maybe_change = store_rx.recv() => {
                    match maybe_change {
                        Some(event) => self.handle_store_event(event),
                        None => break,
                    }
                }
            }

            if self.ui.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn handle_store_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::StatusChanged(LoadStatus::Loading) => {
                self.ui.set_status("Loading catalog…".to_string());
            }
            StoreEvent::StatusChanged(LoadStatus::Failed) => {
                let message = self.store.error().unwrap_or_default();
                error!(error = %message, "catalog load failed");
                self.ui.set_status(format!("Catalog load failed: {message}"));
                self.load_token = None;
            }
            StoreEvent::StatusChanged(LoadStatus::Idle) => {
                self.ui.set_status("Catalog load cancelled".to_string());
            }
            StoreEvent::StatusChanged(LoadStatus::Succeeded) => {
                self.load_token = None;
            }
            StoreEvent::CatalogReplaced(count) => {
                info!(count, "catalog rendered");
                self.ui.set_status(format!("Loaded {count} bikes"));
                self.ui.clamp_cursor(count);
            }
            StoreEvent::CartChanged(len) => {
                self.ui.set_status(format!("Added to cart • {len} in cart"));
            }
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.code == KeyCode::Char('q') {
            self.ui.should_quit = true;
            return Ok(());
        }
        match self.screen {
            Screen::Intro => self.handle_intro_key(key),
            Screen::List => self.handle_list_key(key),
            Screen::Detail => self.handle_detail_key(key),
        }
        Ok(())
    }

    fn handle_intro_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.enter_list(),
            KeyCode::Esc => self.ui.should_quit = true,
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let total = self.store.items().len();
        match key.code {
            KeyCode::Esc => self.leave_list(),
            KeyCode::Char('j') | KeyCode::Down => self.ui.move_cursor(GRID_COLS as isize, total),
            KeyCode::Char('k') | KeyCode::Up => self.ui.move_cursor(-(GRID_COLS as isize), total),
            KeyCode::Char('h') | KeyCode::Left => self.ui.move_within_row(-1, total),
            KeyCode::Char('l') | KeyCode::Right => self.ui.move_within_row(1, total),
            KeyCode::Enter => {
                if let Some(item) = self.store.items().get(self.ui.cursor) {
                    info!(id = %item.id, name = %item.name, "opening detail");
                    self.selected_id = Some(item.id.clone());
                    self.screen = Screen::Detail;
                    self.ui.set_status(format!("{} • {}", item.name, item.price_label()));
                }
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = Screen::List;
                self.ui.set_status("Back to the bike list".to_string());
            }
            KeyCode::Char('a') | KeyCode::Enter => {
                let item = self
                    .selected_id
                    .as_deref()
                    .and_then(|id| self.store.select_by_id(id));
                if let Some(item) = item {
                    self.store.add_to_cart(item);
                }
            }
            _ => {}
        }
    }

    /// List screen mount: trigger the one catalog load if nothing has
    /// been fetched yet.
    fn enter_list(&mut self) {
        self.screen = Screen::List;
        if self.store.status() == LoadStatus::Idle {
            self.start_catalog_load();
        }
    }

    /// List screen unmount: an in-flight load must not outlive the view.
    fn leave_list(&mut self) {
        if let Some(token) = self.load_token.take() {
            self.store.cancel_load(&token);
        }
        self.screen = Screen::Intro;
    }

    fn start_catalog_load(&mut self) {
        let Some(token) = self.store.begin_load() else {
            return;
        };
        self.load_token = Some(token.clone());
        let store = self.store.clone();
        let fetcher = self.fetcher.clone();
        spawn(async move {
            let result = fetcher.fetch().await;
            store.complete_load(&token, result);
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Intro => self.draw_intro(frame),
            Screen::List => self.draw_list(frame),
            Screen::Detail => self.draw_detail(frame),
        }
    }

    fn draw_intro(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let banner_lines = block_font::render("VELO");
        let banner_height = banner_lines.len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((banner_height + 2).min(area.height)),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let banner_content: Vec<Line> = banner_lines
            .into_iter()
            .map(|line| {
                Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        let banner = Paragraph::new(banner_content).alignment(Alignment::Center);
        frame.render_widget(banner, chunks[0]);

        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                self.config.shop_name.to_uppercase(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                self.config.tagline.clone(),
                Style::default().fg(self.theme.muted),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: get started  •  q: quit",
                Style::default().fg(self.theme.accent),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(body, centered_rect(chunks[1].width.min(60), 7, chunks[1]));

        self.render_status(frame, chunks[2]);
    }

    fn draw_list(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let loaded_note = self
            .store
            .loaded_at()
            .map(|at| format!("fetched {}", at.format("%H:%M:%S")))
            .unwrap_or_else(|| "not fetched yet".to_string());
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Bike List",
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({loaded_note})"), Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match list_notice(self.store.status(), self.store.error().as_deref()) {
            Some(notice) => {
                let style = if self.store.status() == LoadStatus::Failed {
                    Style::default().fg(self.theme.danger)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                let placeholder = Paragraph::new(Line::from(Span::styled(notice, style)))
                    .alignment(Alignment::Center);
                frame.render_widget(placeholder, centered_rect(chunks[1].width, 1, chunks[1]));
            }
            None => self.render_grid(frame, chunks[1]),
        }

        self.render_status(frame, chunks[2]);
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
        let items = self.store.items();
        if items.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "The catalog is empty",
                Style::default().fg(self.theme.muted),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(empty, centered_rect(area.width, 1, area));
            return;
        }

        let rows_visible = (area.height / CARD_HEIGHT).max(1) as usize;
        self.ui.rows_visible = rows_visible;
        self.ui.ensure_cursor_visible(items.len());

        let first = self.ui.offset_row * GRID_COLS;
        let last = (first + rows_visible * GRID_COLS).min(items.len());

        let row_constraints = vec![Constraint::Length(CARD_HEIGHT); rows_visible];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        for (row_idx, chunk) in rows.iter().enumerate() {
            let row_start = first + row_idx * GRID_COLS;
            if row_start >= last {
                break;
            }
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*chunk);
            for col_idx in 0..GRID_COLS {
                let item_idx = row_start + col_idx;
                if item_idx >= last {
                    break;
                }
                self.render_card(frame, cols[col_idx], &items[item_idx], item_idx == self.ui.cursor);
            }
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, item: &CatalogItem, selected: bool) {
        let border_style = if selected {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let [name_line, price_line] = card_lines(item);
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                name_line,
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(price_line, Style::default().fg(self.theme.success))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(card, area);
    }

    fn draw_detail(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let item = self
            .selected_id
            .as_deref()
            .and_then(|id| self.store.select_by_id(id));

        match item {
            Some(item) => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title("Bike Details");
                let mut lines = vec![
                    Line::from(Span::styled(
                        item.name.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        item.price_label(),
                        Style::default()
                            .fg(self.theme.success)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(item.description.clone()),
                ];
                if !item.image.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        format!("image: {}", item.image),
                        Style::default().fg(self.theme.muted),
                    )));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "a: add to cart  •  Esc: back",
                    Style::default().fg(self.theme.accent),
                )));
                let detail = Paragraph::new(lines)
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(detail, chunks[0]);
            }
            None => {
                let missing = Paragraph::new(Line::from(Span::styled(
                    "Bike not found",
                    Style::default().fg(self.theme.danger),
                )))
                .block(Block::default().borders(Borders::ALL).title("Bike Details"))
                .alignment(Alignment::Center);
                frame.render_widget(missing, chunks[0]);
            }
        }

        self.render_status(frame, chunks[1]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::raw(self.ui.status.clone()),
            Span::styled(
                format!("  •  Cart: {}", self.store.cart_len()),
                Style::default().fg(self.theme.accent),
            ),
        ]);
        let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

/// Body text for the list screen while no catalog is on screen.
fn list_notice(status: LoadStatus, error: Option<&str>) -> Option<String> {
    match status {
        LoadStatus::Loading => Some("Loading...".to_string()),
        LoadStatus::Failed => Some(format!("Error: {}", error.unwrap_or("unknown"))),
        LoadStatus::Idle => Some("Press Esc and Enter to fetch the catalog".to_string()),
        LoadStatus::Succeeded => None,
    }
}

fn card_lines(item: &CatalogItem) -> [String; 2] {
    [item.name.clone(), item.price_label()]
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    /// Index into the catalog of the highlighted card.
    cursor: usize,
    /// First grid row currently on screen.
    offset_row: usize,
    rows_visible: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset_row: 0,
            rows_visible: 1,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    /// Vertical movement: jump a whole grid row, clamped to the catalog.
    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            return;
        }
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = self.cursor as isize % GRID_COLS as isize;
        } else if idx >= total as isize {
            idx = (total as isize) - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible(total);
    }

    /// Horizontal movement stays within the current grid row.
    fn move_within_row(&mut self, delta: isize, total: usize) {
        if total == 0 {
            return;
        }
        let col = self.cursor % GRID_COLS;
        let target_col = col as isize + delta;
        if target_col < 0 || target_col >= GRID_COLS as isize {
            return;
        }
        let idx = (self.cursor - col) as isize + target_col;
        if idx < total as isize {
            self.cursor = idx as usize;
        }
    }

    fn clamp_cursor(&mut self, total: usize) {
        if total == 0 {
            self.cursor = 0;
            self.offset_row = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    fn ensure_cursor_visible(&mut self, total: usize) {
        if total == 0 || self.rows_visible == 0 {
            self.offset_row = 0;
            return;
        }
        let row = self.cursor / GRID_COLS;
        let total_rows = total.div_ceil(GRID_COLS);
        let max_offset = total_rows.saturating_sub(self.rows_visible);

        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + self.rows_visible {
            self.offset_row = row + 1 - self.rows_visible;
        }
        if self.offset_row > max_offset {
            self.offset_row = max_offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, price: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            price,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn list_notice_matches_load_status() {
        assert_eq!(
            list_notice(LoadStatus::Loading, None).as_deref(),
            Some("Loading...")
        );
        assert_eq!(
            list_notice(LoadStatus::Failed, Some("Network Error")).as_deref(),
            Some("Error: Network Error")
        );
        assert!(list_notice(LoadStatus::Succeeded, None).is_none());
    }

    #[test]
    fn card_shows_name_and_price() {
        let [name, price] = card_lines(&item("1", "Roadster", 500.0));
        assert_eq!(name, "Roadster");
        assert_eq!(price, "$500");
    }

    #[test]
    fn grid_cursor_moves_by_rows_and_columns() {
        let mut ui = UiState::default();
        ui.rows_visible = 2;
        let total = 5; // three grid rows, last one half full

        ui.move_within_row(1, total);
        assert_eq!(ui.cursor, 1);
        ui.move_cursor(GRID_COLS as isize, total);
        assert_eq!(ui.cursor, 3);
        ui.move_within_row(-1, total);
        assert_eq!(ui.cursor, 2);
        ui.move_cursor(GRID_COLS as isize, total);
        assert_eq!(ui.cursor, 4);

        // Down from the last row clamps to the final item.
        ui.move_cursor(GRID_COLS as isize, total);
        assert_eq!(ui.cursor, 4);
        // Right past a missing second cell stays put.
        ui.move_within_row(1, total);
        assert_eq!(ui.cursor, 4);
    }

    #[test]
    fn grid_offset_follows_cursor() {
        let mut ui = UiState::default();
        ui.rows_visible = 2;
        let total = 10; // five grid rows

        for _ in 0..4 {
            ui.move_cursor(GRID_COLS as isize, total);
        }
        assert_eq!(ui.cursor, 8);
        assert_eq!(ui.offset_row, 3);

        for _ in 0..4 {
            ui.move_cursor(-(GRID_COLS as isize), total);
        }
        assert_eq!(ui.cursor, 0);
        assert_eq!(ui.offset_row, 0);
    }

    #[test]
    fn clamp_cursor_handles_shrunk_catalog() {
        let mut ui = UiState::default();
        ui.cursor = 7;
        ui.clamp_cursor(3);
        assert_eq!(ui.cursor, 2);
        ui.clamp_cursor(0);
        assert_eq!(ui.cursor, 0);
        assert_eq!(ui.offset_row, 0);
    }
}

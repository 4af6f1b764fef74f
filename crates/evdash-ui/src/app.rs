//! Main application state and TUI event loop for the EV dashboard.
//!
//! [`App`] owns the theme, the view mode, the filter controls and the last
//! received snapshot.  Key presses mutate the filter through
//! [`FilterController`]; every change is forwarded to the background
//! orchestrator, whose answers arrive on the snapshot channel.

use std::cell::Cell;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;

use evdash_core::formatting::format_count;
use evdash_core::models::FilterState;
use evdash_runtime::filter_controller::FilterController;
use evdash_runtime::orchestrator::{DashboardHandle, DashboardSnapshot};

use crate::charts_view;
use crate::components::header::Header;
use crate::components::kpi;
use crate::map_view;
use crate::table_view;
use crate::themes::Theme;

/// Rows moved by PageUp / PageDown in the table view.
const PAGE_ROWS: usize = 10;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// KPI cards plus the yearly, top-makes and capacity charts.
    Dashboard,
    /// Hotspot map.
    Map,
    /// Scrollable point table.
    Table,
}

impl ViewMode {
    /// Parse a `--view` value; unknown names open the dashboard.
    pub fn from_name(name: &str) -> Self {
        match name {
            "map" => ViewMode::Map,
            "table" => ViewMode::Table,
            _ => ViewMode::Dashboard,
        }
    }

    /// The view `Tab` switches to.
    pub fn next(self) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Map,
            ViewMode::Map => ViewMode::Table,
            ViewMode::Table => ViewMode::Dashboard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Dashboard => "dashboard",
            ViewMode::Map => "map",
            ViewMode::Table => "table",
        }
    }
}

// ── AppAction ─────────────────────────────────────────────────────────────────

/// What the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Nothing beyond a redraw.
    None,
    /// The filter changed and new views must be requested.
    FilterChanged,
    /// Leave the event loop.
    Quit,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub filter: FilterController,
    /// First visible row of the table view.
    pub table_scroll: usize,
    /// Height of the table area at the last draw; 0 before the first one.
    table_height: Cell<u16>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent snapshot, `None` until the dataset finished loading.
    pub last_snapshot: Option<DashboardSnapshot>,
}

impl App {
    pub fn new(theme_name: &str, view_mode: ViewMode, initial_filter: FilterState) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            filter: FilterController::new(initial_filter, Default::default()),
            table_scroll: 0,
            table_height: Cell::new(0),
            should_quit: false,
            last_snapshot: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the interactive dashboard until the user quits or the orchestrator
    /// goes away.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while
    /// snapshots arrive on the async channel via `try_recv`.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<DashboardSnapshot>,
        handle: DashboardHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, &mut rx, &handle);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        handle.abort();

        result
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let changed = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppAction::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Tab => {
                self.view_mode = self.view_mode.next();
                false
            }
            KeyCode::Char('m') => self.filter.next_make(),
            KeyCode::Char('M') => self.filter.prev_make(),
            KeyCode::Char('[') => self.filter.shift_min_year(-1),
            KeyCode::Char(']') => self.filter.shift_min_year(1),
            KeyCode::Char('{') => self.filter.shift_max_year(-1),
            KeyCode::Char('}') => self.filter.shift_max_year(1),
            KeyCode::Char('r') | KeyCode::Char('R') => self.filter.reset(),
            KeyCode::Up => {
                self.scroll_by(-1);
                false
            }
            KeyCode::Down => {
                self.scroll_by(1);
                false
            }
            KeyCode::PageUp => {
                self.scroll_by(-(PAGE_ROWS as isize));
                false
            }
            KeyCode::PageDown => {
                self.scroll_by(PAGE_ROWS as isize);
                false
            }
            KeyCode::Home => {
                self.table_scroll = 0;
                false
            }
            _ => false,
        };

        if changed {
            self.table_scroll = 0;
            AppAction::FilterChanged
        } else {
            AppAction::None
        }
    }

    /// Store a snapshot received from the orchestrator.
    pub fn update_from_snapshot(&mut self, snapshot: DashboardSnapshot) {
        debug!(
            matched = snapshot.analysis.metadata.records_matched,
            make = snapshot.analysis.filter.make_label(),
            "Snapshot received"
        );
        if self.filter.options() != &snapshot.options {
            self.filter.set_options(snapshot.options.clone());
        }
        self.last_snapshot = Some(snapshot);
    }

    /// `true` while the shown views belong to an older filter than the
    /// selected one.
    pub fn is_stale(&self) -> bool {
        self.last_snapshot
            .as_ref()
            .is_some_and(|s| &s.analysis.filter != self.filter.state())
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        rx: &mut mpsc::Receiver<DashboardSnapshot>,
        handle: &DashboardHandle,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| self.render(frame))?;
            // A resize can shrink the last page.
            self.scroll_by(0);

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.handle_key(key) {
                            AppAction::Quit => return Ok(()),
                            AppAction::FilterChanged => {
                                handle.request(self.filter.state().clone());
                            }
                            AppAction::None => {}
                        }
                    }
                }
            }

            // Drain any pending snapshots (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.update_from_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Move the table offset, never past the start of the last page.
    fn scroll_by(&mut self, delta: isize) {
        let len = self
            .last_snapshot
            .as_ref()
            .map_or(0, |s| s.analysis.views.points.len());
        let next = self.table_scroll.saturating_add_signed(delta);
        self.table_scroll = next.min(table_view::max_scroll(len, self.table_height.get()));
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let [header_area, kpi_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Header::new(self.filter.state(), &self.theme).to_lines()),
            header_area,
        );
        self.render_footer(frame, footer_area);

        let Some(snapshot) = &self.last_snapshot else {
            render_loading(frame, kpi_area.union(body_area), &self.theme);
            return;
        };

        if snapshot.analysis.metadata.records_loaded == 0 {
            table_view::render_no_data(frame, kpi_area.union(body_area), &self.theme);
            return;
        }

        let views = &snapshot.analysis.views;
        kpi::render_kpi_row(frame, kpi_area, &views.summary, &self.theme);

        match self.view_mode {
            ViewMode::Dashboard => {
                charts_view::render_dashboard_view(frame, body_area, views, &self.theme)
            }
            ViewMode::Map => map_view::render_map_view(frame, body_area, &views.points, &self.theme),
            ViewMode::Table => {
                self.table_height.set(body_area.height);
                table_view::render_table_view(
                    frame,
                    body_area,
                    &views.points,
                    self.table_scroll,
                    &self.theme,
                )
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(format!(" {} ", self.view_mode.name()), self.theme.value),
            Span::styled(
                "q quit · Tab view · m/M make · [ ] from · { } to · r reset · ↑↓ scroll",
                self.theme.dim,
            ),
        ];

        if let Some(snapshot) = &self.last_snapshot {
            let meta = &snapshot.analysis.metadata;
            spans.push(Span::styled(
                format!(
                    "  {} of {} records",
                    format_count(meta.records_matched as u64),
                    format_count(meta.records_loaded as u64)
                ),
                self.theme.label,
            ));
        }
        if self.is_stale() {
            spans.push(Span::styled("  updating…", self.theme.warning));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading dataset...", theme.info)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Main application state and TUI event loop for the ground-station console.
//!
//! [`App`] owns the theme, the active page, and, while the Dashboard page is
//! shown, the [`DashboardMount`]. Page navigation is the mount signal:
//! entering the Dashboard opens a fresh telemetry session and leaving it
//! closes that session before anything else happens.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use url::Url;

use console_runtime::{DashboardMount, DashboardSnapshot, SessionOptions};

use crate::components::header::{key_hints, Sidebar};
use crate::components::status::ConnectionIndicator;
use crate::dashboard_view;
use crate::pages::Page;
use crate::themes::Theme;

/// Sidebar column width.
const SIDEBAR_WIDTH: u16 = 28;

/// Leave raw mode and the alternate screen.
///
/// Safe to call when the terminal was never switched.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the console TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Page currently shown.
    page: Page,
    /// Telemetry stream the dashboard connects to.
    endpoint: Url,
    session_options: SessionOptions,
    /// Present exactly while the Dashboard page is shown.
    dashboard: Option<DashboardMount>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Construct the application. Nothing is mounted until
    /// [`App::activate`] is called from within a tokio runtime.
    pub fn new(theme_name: &str, page: Page, endpoint: Url, session_options: SessionOptions) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            page,
            endpoint,
            session_options,
            dashboard: None,
            should_quit: false,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_dashboard_mounted(&self) -> bool {
        self.dashboard.is_some()
    }

    /// Current dashboard state, `None` unless the Dashboard is mounted.
    pub fn dashboard_snapshot(&self) -> Option<DashboardSnapshot> {
        self.dashboard.as_ref().map(DashboardMount::snapshot)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Mount the start page.
    pub fn activate(&mut self) {
        if self.page == Page::Dashboard && self.dashboard.is_none() {
            self.mount_dashboard();
        }
    }

    /// Switch pages, unmounting and mounting the dashboard as needed.
    /// Navigating to the current page is a no-op.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        tracing::debug!(from = self.page.slug(), to = page.slug(), "navigate");

        if self.page == Page::Dashboard {
            self.unmount_dashboard();
        }
        self.page = page;
        if page == Page::Dashboard {
            self.mount_dashboard();
        }
    }

    /// Apply buffered telemetry events. Returns how many were applied.
    pub fn tick(&mut self) -> usize {
        self.dashboard.as_mut().map_or(0, DashboardMount::pump)
    }

    /// Release the dashboard, if mounted.
    pub fn shutdown(&mut self) {
        self.unmount_dashboard();
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.navigate(self.page.next()),
            KeyCode::BackTab | KeyCode::Left => self.navigate(self.page.previous()),
            KeyCode::Char(c) => {
                if let Some(page) = c.to_digit(10).and_then(Page::from_number) {
                    self.navigate(page);
                }
            }
            _ => {}
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the console until `q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a short timeout so the terminal
    /// loop stays on the current thread while telemetry arrives through the
    /// dashboard's session channel.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(100);
        self.activate();

        let result = loop {
            self.tick();
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        self.shutdown();

        // Restore terminal state unconditionally.
        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn mount_dashboard(&mut self) {
        tracing::info!(endpoint = %self.endpoint, "dashboard mounted");
        self.dashboard = Some(DashboardMount::mount(
            self.endpoint.clone(),
            self.session_options.clone(),
        ));
    }

    fn unmount_dashboard(&mut self) {
        if let Some(mount) = self.dashboard.take() {
            mount.unmount();
            tracing::info!("dashboard unmounted");
        }
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .areas(frame.area());

        let nav = Paragraph::new(Text::from(Sidebar::new(self.page, &self.theme).to_lines()))
            .block(
                Block::default()
                    .borders(Borders::RIGHT)
                    .border_style(self.theme.separator),
            );
        frame.render_widget(nav, sidebar);

        let [title, content, hints] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(main);

        frame.render_widget(Paragraph::new(self.title_line()), title);
        match &self.dashboard {
            Some(mount) => {
                dashboard_view::render_dashboard(frame, content, &mount.snapshot(), &self.theme)
            }
            None => self.render_placeholder(frame, content),
        }
        frame.render_widget(Paragraph::new(key_hints(&self.theme)), hints);
    }

    fn title_line(&self) -> Line<'_> {
        let mut spans = vec![Span::styled(self.page.label(), self.theme.header)];
        if let Some(mount) = &self.dashboard {
            spans.push(Span::raw("   "));
            spans.extend(
                ConnectionIndicator::new(mount.connection(), &self.theme)
                    .to_line()
                    .spans,
            );
            spans.push(Span::styled(format!("  {}", self.endpoint), self.theme.dim));
        }
        Line::from(spans)
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let text = self.page.placeholder().unwrap_or_default();
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(text, self.theme.dim)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border)
                .title(Span::styled(
                    format!(" {} ", self.page.label()),
                    self.theme.card_title,
                )),
        );
        frame.render_widget(paragraph, area);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use ratatui::style::{Color, Modifier, Style};

use console_core::{ConnectionState, ValueSource};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Absent or unparseable means dark.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style the console draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Chrome ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,
    pub border: Style,
    pub card_title: Style,

    // ── Navigation ───────────────────────────────────────────────────────────
    pub nav_item: Style,
    pub nav_active: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,

    // ── Telemetry values ─────────────────────────────────────────────────────
    /// A value received on the current session.
    pub live: Style,
    /// A fallback shown until the first live value.
    pub fallback: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub success: Style,
    pub warning: Style,
    pub error: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::DarkGray),
            card_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            nav_item: Style::default().fg(Color::Gray),
            nav_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            live: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            fallback: Style::default().fg(Color::DarkGray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),
            border: Style::default().fg(Color::Gray),
            card_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            nav_item: Style::default().fg(Color::DarkGray),
            nav_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),

            live: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            fallback: Style::default().fg(Color::Gray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
        }
    }

    /// Basic 8-colour ANSI palette without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::White),
            card_title: Style::default().fg(Color::Cyan),

            nav_item: Style::default().fg(Color::White),
            nav_active: Style::default().fg(Color::Black).bg(Color::White),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            live: Style::default().fg(Color::Green),
            fallback: Style::default().fg(Color::DarkGray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Green when connected, yellow while connecting, red otherwise.
    pub fn connection_style(&self, state: ConnectionState) -> Style {
        match state {
            ConnectionState::Connected => self.success,
            ConnectionState::Connecting => self.warning,
            ConnectionState::Disconnected => self.error,
        }
    }

    pub fn value_style(&self, source: ValueSource) -> Style {
        match source {
            ValueSource::Live => self.live,
            ValueSource::Fallback => self.fallback,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

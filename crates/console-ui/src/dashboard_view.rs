//! Dashboard page: the live telemetry cards.
//!
//! Every card is built as a `Vec<Line>` from a [`DashboardSnapshot`] so the
//! content can be tested without a terminal; [`render_dashboard`] only lays
//! the cards out.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use console_core::formatting::{format_clock, format_unix_time};
use console_core::{FieldId, Subsystem};
use console_runtime::DashboardSnapshot;

use crate::components::status::ConnectionIndicator;
use crate::themes::Theme;

/// Width of the label column inside a card.
const LABEL_WIDTH: usize = 16;

/// Shown for link metadata that has not been received yet.
const UNKNOWN: &str = "--";

// ── Card builders ─────────────────────────────────────────────────────────────

/// One line per field of `subsystem`: label, then the live or fallback value.
pub fn build_subsystem_lines<'a>(
    subsystem: Subsystem,
    snapshot: &DashboardSnapshot,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    subsystem
        .fields()
        .iter()
        .map(|&field| field_line(field, snapshot, theme))
        .collect()
}

fn field_line<'a>(field: FieldId, snapshot: &DashboardSnapshot, theme: &'a Theme) -> Line<'a> {
    let value = snapshot.telemetry.get(field);
    Line::from(vec![
        label_span(field.label(), theme),
        Span::styled(
            snapshot.telemetry.render(field),
            theme.value_style(value.source),
        ),
    ])
}

fn label_span(label: &str, theme: &Theme) -> Span<'static> {
    Span::styled(format!("{label:<width$}", width = LABEL_WIDTH), theme.label)
}

/// Static orbit placeholder plus the connection indicator.
pub fn build_position_lines<'a>(snapshot: &DashboardSnapshot, theme: &'a Theme) -> Vec<Line<'a>> {
    let row = |label: &str, value: &'static str| {
        Line::from(vec![
            label_span(label, theme),
            Span::styled(value, theme.text),
        ])
    };
    vec![
        Line::from(Span::styled("Orbital visualization placeholder", theme.dim)),
        Line::from(""),
        row("Latitude", "34.2° N"),
        row("Longitude", "118.5° W"),
        row("Altitude", "412 km"),
        row("Velocity", "7.6 km/s"),
        Line::from(""),
        ConnectionIndicator::new(snapshot.connection, theme).to_line(),
    ]
}

/// Packet metadata and frame counters.
pub fn build_link_lines<'a>(snapshot: &DashboardSnapshot, theme: &'a Theme) -> Vec<Line<'a>> {
    let link = &snapshot.link;
    let stats = &snapshot.stats;

    let row = |label: &str, value: Option<String>| {
        let (text, style) = match value {
            Some(v) => (v, theme.text),
            None => (UNKNOWN.to_string(), theme.dim),
        };
        Line::from(vec![
            label_span(label, theme),
            Span::styled(text, style),
        ])
    };

    let errors_style = if stats.decode_errors > 0 {
        theme.warning
    } else {
        theme.text
    };

    vec![
        row("Mode", link.mode.clone()),
        row("Ground station", link.ground_station.clone()),
        row("Packet time", link.timestamp.and_then(format_unix_time)),
        row("Sequence", link.seq.map(|s| s.to_string())),
        Line::from(""),
        row(
            "Frames",
            Some(format!("{} merged / {} received", stats.frames_merged, stats.frames_received)),
        ),
        Line::from(vec![
            label_span("Decode errors", theme),
            Span::styled(stats.decode_errors.to_string(), errors_style),
        ]),
        row("Last frame", stats.last_frame_at.as_ref().map(format_clock)),
    ]
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Three columns: position and link on the left, power and orientation in
/// the middle, radio on the right.
pub fn render_dashboard(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let [left, middle, right] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    let [position, link] =
        Layout::vertical([Constraint::Length(10), Constraint::Min(0)]).areas(left);
    render_card(frame, position, "Satellite Position", build_position_lines(snapshot, theme), theme);
    render_card(frame, link, "Link", build_link_lines(snapshot, theme), theme);

    let [power, orientation] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(middle);
    for (subsystem, area) in [(Subsystem::Power, power), (Subsystem::Orientation, orientation)] {
        render_card(
            frame,
            area,
            subsystem.title(),
            build_subsystem_lines(subsystem, snapshot, theme),
            theme,
        );
    }

    render_card(
        frame,
        right,
        Subsystem::Radio.title(),
        build_subsystem_lines(Subsystem::Radio, snapshot, theme),
        theme,
    );
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(format!(" {title} "), theme.card_title));
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

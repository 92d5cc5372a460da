use crate::pages::Page;
use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Station name shown above the console title.
pub const BRAND: &str = "UCI CubeSat";

pub const TITLE: &str = "Ground Station Console";

/// Sidebar with the brand, one numbered entry per page, and the operator
/// footer. The active page is highlighted.
pub struct Sidebar<'a> {
    pub active: Page,
    pub theme: &'a Theme,
}

impl<'a> Sidebar<'a> {
    pub fn new(active: Page, theme: &'a Theme) -> Self {
        Self { active, theme }
    }

    /// Brand (two lines), a blank line, the navigation entries, a blank
    /// line, then the two-line footer.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(Page::ALL.len() + 6);

        lines.push(Line::from(Span::styled(BRAND, self.theme.dim)));
        lines.push(Line::from(Span::styled(TITLE, self.theme.header)));
        lines.push(Line::from(""));

        for (i, page) in Page::ALL.iter().enumerate() {
            let style = if *page == self.active {
                self.theme.nav_active
            } else {
                self.theme.nav_item
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {} ", i + 1), self.theme.dim),
                Span::styled(format!(" {} ", page.label()), style),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Operator", self.theme.dim)));
        lines.push(Line::from(Span::styled("Mission Control", self.theme.text)));
        lines
    }
}

/// Key hints shown under the active page.
pub fn key_hints(theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        "Tab/→ next  Shift-Tab/← previous  1-7 jump  q quit",
        theme.dim,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use console_core::ConnectionState;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// `WebSocket: <state>` with the state coloured by
/// [`Theme::connection_style`].
pub struct ConnectionIndicator<'a> {
    pub state: ConnectionState,
    pub theme: &'a Theme,
}

impl<'a> ConnectionIndicator<'a> {
    pub fn new(state: ConnectionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::styled("WebSocket: ", self.theme.dim),
            Span::styled(
                self.state.as_str(),
                self.theme.connection_style(self.state),
            ),
        ])
    }
}

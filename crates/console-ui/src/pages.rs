//! Console pages and their navigation order.

/// One entry in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Telemetry,
    RfLink,
    PassPlanner,
    AntennaControl,
    Logs,
    Settings,
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Telemetry,
        Page::RfLink,
        Page::PassPlanner,
        Page::AntennaControl,
        Page::Logs,
        Page::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Telemetry => "Telemetry",
            Page::RfLink => "RF & Link",
            Page::PassPlanner => "Pass Planner",
            Page::AntennaControl => "Antenna Control",
            Page::Logs => "Logs",
            Page::Settings => "Settings",
        }
    }

    /// Command-line name, as accepted by `--page`.
    pub fn slug(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Telemetry => "telemetry",
            Page::RfLink => "rf-link",
            Page::PassPlanner => "pass-planner",
            Page::AntennaControl => "antenna-control",
            Page::Logs => "logs",
            Page::Settings => "settings",
        }
    }

    /// Unknown slugs map to the dashboard.
    pub fn from_slug(slug: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == slug)
            .unwrap_or_default()
    }

    /// Page for a 1-based sidebar number key.
    pub fn from_number(n: u32) -> Option<Self> {
        let index = usize::try_from(n.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// One-line description shown on pages without live content.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Page::Dashboard => None,
            Page::Telemetry => Some("Detailed telemetry view will go here."),
            Page::RfLink => Some("Link metrics (RSSI, SNR, frequency, modulation) will go here."),
            Page::PassPlanner => Some("Next AOS/LOS, pass schedule, and TLE selection will go here."),
            Page::AntennaControl => Some("Rotor/pointing controls will go here."),
            Page::Logs => Some("Command + telemetry logs will go here."),
            Page::Settings => Some("Station config, network, and preferences will go here."),
        }
    }

    pub fn next(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }
}

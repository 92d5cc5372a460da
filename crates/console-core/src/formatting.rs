use chrono::{DateTime, Utc};

/// Physical unit a telemetry field is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Volts,
    Amps,
    Celsius,
    Degrees,
    Megahertz,
    Dbm,
    Decibels,
}

impl Unit {
    /// Suffix appended to the number, including any separating space.
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Volts => " V",
            Unit::Amps => " A",
            Unit::Celsius => " °C",
            Unit::Degrees => "°",
            Unit::Megahertz => " MHz",
            Unit::Dbm => " dBm",
            Unit::Decibels => " dB",
        }
    }
}

/// Format a reading with its unit using the shortest decimal form of the
/// number.
///
/// # Examples
///
/// ```
/// use console_core::formatting::{format_reading, Unit};
///
/// assert_eq!(format_reading(7.6, Unit::Volts), "7.6 V");
/// assert_eq!(format_reading(-90.0, Unit::Dbm), "-90 dBm");
/// assert_eq!(format_reading(-2.3, Unit::Degrees), "-2.3°");
/// assert_eq!(format_reading(18.0, Unit::Celsius), "18 °C");
/// ```
pub fn format_reading(value: f64, unit: Unit) -> String {
    format!("{}{}", value, unit.suffix())
}

/// Format a unix timestamp (seconds, fractional allowed) as `HH:MM:SS UTC`.
///
/// Returns `None` for values chrono cannot represent.
pub fn format_unix_time(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos).map(|dt| format_clock(&dt))
}

/// Format a wall-clock instant as `HH:MM:SS UTC`.
pub fn format_clock(at: &DateTime<Utc>) -> String {
    at.format("%H:%M:%S UTC").to_string()
}

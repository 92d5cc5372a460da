//! Per-field display resolution with fallback values.
//!
//! [`ResolvedTelemetry`] holds one [`DisplayValue`] per known leaf. Merging a
//! packet only touches the leaves the packet carries; every other leaf keeps
//! its last live value, or its fallback if none has ever arrived. Once a
//! leaf turns live it never reverts to the fallback.

use crate::formatting::{format_reading, Unit};
use crate::telemetry::TelemetryPacket;

// ── Subsystem / FieldId ───────────────────────────────────────────────────────

/// Spacecraft subsystem a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Power,
    Orientation,
    Radio,
}

impl Subsystem {
    /// Card title used by the dashboard.
    pub fn title(&self) -> &'static str {
        match self {
            Subsystem::Power => "Power",
            Subsystem::Orientation => "Orientation (ADCS)",
            Subsystem::Radio => "Radio Link Status",
        }
    }

    /// Fields of this subsystem in display order.
    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            Subsystem::Power => &[
                FieldId::BatteryVoltage,
                FieldId::SolarCurrent,
                FieldId::BatteryTemp,
            ],
            Subsystem::Orientation => &[FieldId::Roll, FieldId::Pitch, FieldId::Yaw],
            Subsystem::Radio => &[FieldId::Frequency, FieldId::Rssi, FieldId::Snr],
        }
    }
}

/// Every leaf field of the telemetry packet the console knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    BatteryVoltage,
    SolarCurrent,
    BatteryTemp,
    Roll,
    Pitch,
    Yaw,
    Frequency,
    Rssi,
    Snr,
}

impl FieldId {
    /// Number of known fields.
    pub const COUNT: usize = 9;

    /// All fields, grouped by subsystem in display order.
    pub const ALL: [FieldId; FieldId::COUNT] = [
        FieldId::BatteryVoltage,
        FieldId::SolarCurrent,
        FieldId::BatteryTemp,
        FieldId::Roll,
        FieldId::Pitch,
        FieldId::Yaw,
        FieldId::Frequency,
        FieldId::Rssi,
        FieldId::Snr,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn subsystem(&self) -> Subsystem {
        match self {
            FieldId::BatteryVoltage | FieldId::SolarCurrent | FieldId::BatteryTemp => {
                Subsystem::Power
            }
            FieldId::Roll | FieldId::Pitch | FieldId::Yaw => Subsystem::Orientation,
            FieldId::Frequency | FieldId::Rssi | FieldId::Snr => Subsystem::Radio,
        }
    }

    /// Dotted wire path, e.g. `"radio.rssi_dbm"`.
    pub fn path(&self) -> &'static str {
        match self {
            FieldId::BatteryVoltage => "power.battery_voltage",
            FieldId::SolarCurrent => "power.solar_current",
            FieldId::BatteryTemp => "power.battery_temp_c",
            FieldId::Roll => "orientation.roll_deg",
            FieldId::Pitch => "orientation.pitch_deg",
            FieldId::Yaw => "orientation.yaw_deg",
            FieldId::Frequency => "radio.frequency_mhz",
            FieldId::Rssi => "radio.rssi_dbm",
            FieldId::Snr => "radio.snr_db",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldId::BatteryVoltage => "Battery Voltage",
            FieldId::SolarCurrent => "Solar Current",
            FieldId::BatteryTemp => "Battery Temp",
            FieldId::Roll => "Roll",
            FieldId::Pitch => "Pitch",
            FieldId::Yaw => "Yaw",
            FieldId::Frequency => "Frequency",
            FieldId::Rssi => "RSSI",
            FieldId::Snr => "SNR",
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            FieldId::BatteryVoltage => Unit::Volts,
            FieldId::SolarCurrent => Unit::Amps,
            FieldId::BatteryTemp => Unit::Celsius,
            FieldId::Roll | FieldId::Pitch | FieldId::Yaw => Unit::Degrees,
            FieldId::Frequency => Unit::Megahertz,
            FieldId::Rssi => Unit::Dbm,
            FieldId::Snr => Unit::Decibels,
        }
    }

    /// Placeholder shown until the first live value for this field arrives.
    pub fn fallback(&self) -> f64 {
        match self {
            FieldId::BatteryVoltage => 7.4,
            FieldId::SolarCurrent => 1.2,
            FieldId::BatteryTemp => 18.0,
            FieldId::Roll => -2.3,
            FieldId::Pitch => 1.8,
            FieldId::Yaw => 0.5,
            FieldId::Frequency => 437.1,
            FieldId::Rssi => -87.0,
            FieldId::Snr => 12.3,
        }
    }

    /// Extract this field's value from a packet, if present.
    pub fn read(&self, packet: &TelemetryPacket) -> Option<f64> {
        match self {
            FieldId::BatteryVoltage => packet.power.as_ref()?.battery_voltage,
            FieldId::SolarCurrent => packet.power.as_ref()?.solar_current,
            FieldId::BatteryTemp => packet.power.as_ref()?.battery_temp_c,
            FieldId::Roll => packet.orientation.as_ref()?.roll_deg,
            FieldId::Pitch => packet.orientation.as_ref()?.pitch_deg,
            FieldId::Yaw => packet.orientation.as_ref()?.yaw_deg,
            FieldId::Frequency => packet.radio.as_ref()?.frequency_mhz,
            FieldId::Rssi => packet.radio.as_ref()?.rssi_dbm,
            FieldId::Snr => packet.radio.as_ref()?.snr_db,
        }
    }
}

// ── DisplayValue ──────────────────────────────────────────────────────────────

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Live,
    Fallback,
}

/// Resolved value for one leaf field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayValue<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> DisplayValue<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: ValueSource::Live,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: ValueSource::Fallback,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == ValueSource::Live
    }
}

impl DisplayValue<f64> {
    /// Format the value with the given unit, e.g. `"-87 dBm"`.
    pub fn render(&self, unit: Unit) -> String {
        format_reading(self.value, unit)
    }
}

// ── ResolvedTelemetry ─────────────────────────────────────────────────────────

/// Complete set of per-field display values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTelemetry {
    values: [DisplayValue<f64>; FieldId::COUNT],
}

impl ResolvedTelemetry {
    /// Every field at its fallback value.
    pub fn new() -> Self {
        Self {
            values: FieldId::ALL.map(|field| DisplayValue::fallback(field.fallback())),
        }
    }

    pub fn get(&self, field: FieldId) -> DisplayValue<f64> {
        self.values[field.index()]
    }

    /// Formatted value of `field` with its unit.
    pub fn render(&self, field: FieldId) -> String {
        self.get(field).render(field.unit())
    }

    /// Merge `packet` in place and return how many fields it updated.
    ///
    /// Fields the packet does not carry are left untouched.
    pub fn apply(&mut self, packet: &TelemetryPacket) -> usize {
        let mut updated = 0;
        for field in FieldId::ALL {
            if let Some(value) = field.read(packet) {
                self.values[field.index()] = DisplayValue::live(value);
                updated += 1;
            }
        }
        updated
    }

    /// Return a new resolution with `packet` merged on top of `self`.
    pub fn merge(&self, packet: &TelemetryPacket) -> Self {
        let mut next = self.clone();
        next.apply(packet);
        next
    }

    /// Number of fields that have received a live value.
    pub fn live_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_live()).count()
    }

    /// Iterate `(field, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, DisplayValue<f64>)> + '_ {
        FieldId::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

impl Default for ResolvedTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

// ── LinkMetadata ──────────────────────────────────────────────────────────────

/// Last known packet metadata, retained per field like the readings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkMetadata {
    pub timestamp: Option<f64>,
    pub mode: Option<String>,
    pub ground_station: Option<String>,
    pub seq: Option<u64>,
}

impl LinkMetadata {
    pub fn apply(&mut self, packet: &TelemetryPacket) {
        if let Some(ts) = packet.timestamp {
            self.timestamp = Some(ts);
        }
        if let Some(mode) = &packet.mode {
            self.mode = Some(mode.clone());
        }
        if let Some(station) = &packet.ground_station {
            self.ground_station = Some(station.clone());
        }
        if let Some(seq) = packet.seq {
            self.seq = Some(seq);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{decode, OrientationTelemetry, PowerTelemetry, RadioTelemetry};

    fn power(v: f64) -> TelemetryPacket {
        TelemetryPacket {
            power: Some(PowerTelemetry {
                battery_voltage: Some(v),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn rssi(v: f64) -> TelemetryPacket {
        TelemetryPacket {
            radio: Some(RadioTelemetry {
                rssi_dbm: Some(v),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // ── FieldId ───────────────────────────────────────────────────────────

    #[test]
    fn test_field_index_matches_all_order() {
        for (i, field) in FieldId::ALL.iter().enumerate() {
            assert_eq!(field.index(), i, "{field:?}");
        }
    }

    #[test]
    fn test_subsystem_fields_cover_all() {
        let mut seen = Vec::new();
        for subsystem in [Subsystem::Power, Subsystem::Orientation, Subsystem::Radio] {
            for field in subsystem.fields() {
                assert_eq!(field.subsystem(), subsystem);
                seen.push(*field);
            }
        }
        assert_eq!(seen, FieldId::ALL.to_vec());
    }

    #[test]
    fn test_read_missing_subsystem_is_none() {
        let packet = power(7.6);
        assert_eq!(FieldId::BatteryVoltage.read(&packet), Some(7.6));
        assert_eq!(FieldId::Rssi.read(&packet), None);
        assert_eq!(FieldId::Roll.read(&packet), None);
    }

    // ── fallback resolution ───────────────────────────────────────────────

    #[test]
    fn test_new_resolution_is_all_fallback() {
        let resolved = ResolvedTelemetry::new();
        assert_eq!(resolved.live_count(), 0);
        for (field, value) in resolved.iter() {
            assert_eq!(value, DisplayValue::fallback(field.fallback()));
        }
    }

    #[test]
    fn test_fallback_rendering_matches_placeholders() {
        let resolved = ResolvedTelemetry::new();
        let rendered: Vec<String> = FieldId::ALL.iter().map(|f| resolved.render(*f)).collect();
        assert_eq!(
            rendered,
            vec![
                "7.4 V", "1.2 A", "18 °C", "-2.3°", "1.8°", "0.5°", "437.1 MHz", "-87 dBm",
                "12.3 dB",
            ]
        );
    }

    // ── merge ─────────────────────────────────────────────────────────────

    #[test]
    fn test_merge_updates_only_present_fields() {
        let mut resolved = ResolvedTelemetry::new();
        assert_eq!(resolved.apply(&power(7.6)), 1);

        assert_eq!(resolved.get(FieldId::BatteryVoltage), DisplayValue::live(7.6));
        assert_eq!(resolved.render(FieldId::BatteryVoltage), "7.6 V");
        assert_eq!(resolved.render(FieldId::Rssi), "-87 dBm");
        assert!(!resolved.get(FieldId::Rssi).is_live());
    }

    #[test]
    fn test_later_packet_does_not_reset_earlier_field() {
        let mut resolved = ResolvedTelemetry::new();
        resolved.apply(&power(7.6));
        resolved.apply(&rssi(-90.0));

        assert_eq!(resolved.render(FieldId::Rssi), "-90 dBm");
        assert_eq!(resolved.render(FieldId::BatteryVoltage), "7.6 V");
        assert!(resolved.get(FieldId::BatteryVoltage).is_live());
    }

    #[test]
    fn test_empty_packet_is_noop() {
        let mut resolved = ResolvedTelemetry::new();
        resolved.apply(&power(8.1));
        let before = resolved.clone();

        assert_eq!(resolved.apply(&TelemetryPacket::default()), 0);
        assert_eq!(resolved, before);
    }

    #[test]
    fn test_live_value_never_reverts_to_fallback() {
        let mut resolved = ResolvedTelemetry::new();
        resolved.apply(&rssi(-101.0));
        for _ in 0..5 {
            resolved.apply(&power(7.9));
            resolved.apply(&TelemetryPacket::default());
        }
        assert_eq!(resolved.get(FieldId::Rssi), DisplayValue::live(-101.0));
    }

    #[test]
    fn test_live_value_equal_to_fallback_is_still_live() {
        let mut resolved = ResolvedTelemetry::new();
        resolved.apply(&rssi(-87.0));
        assert!(resolved.get(FieldId::Rssi).is_live());
    }

    #[test]
    fn test_disjoint_packets_merge_to_union_in_any_order() {
        let a = power(7.7);
        let b = rssi(-66.0);
        let c = TelemetryPacket {
            orientation: Some(OrientationTelemetry {
                yaw_deg: Some(-170.2),
                ..Default::default()
            }),
            ..Default::default()
        };

        let forward = ResolvedTelemetry::new().merge(&a).merge(&b).merge(&c);
        let reverse = ResolvedTelemetry::new().merge(&c).merge(&b).merge(&a);

        assert_eq!(forward, reverse);
        assert_eq!(forward.live_count(), 3);
        assert_eq!(forward.get(FieldId::Yaw), DisplayValue::live(-170.2));
        assert_eq!(forward.get(FieldId::Pitch), DisplayValue::fallback(1.8));
    }

    #[test]
    fn test_merge_is_pure() {
        let base = ResolvedTelemetry::new();
        let merged = base.merge(&power(7.6));
        assert_eq!(base.live_count(), 0);
        assert_eq!(merged.live_count(), 1);
    }

    #[test]
    fn test_merge_decoded_scenario_frames() {
        let mut resolved = ResolvedTelemetry::new();
        resolved.apply(&decode(r#"{"power":{"battery_voltage":7.6}}"#).unwrap());
        resolved.apply(&decode(r#"{"radio":{"rssi_dbm":-90}}"#).unwrap());

        assert_eq!(resolved.render(FieldId::BatteryVoltage), "7.6 V");
        assert_eq!(resolved.render(FieldId::Rssi), "-90 dBm");
        assert_eq!(resolved.live_count(), 2);
    }

    // ── LinkMetadata ──────────────────────────────────────────────────────

    #[test]
    fn test_link_metadata_retains_last_known() {
        let mut meta = LinkMetadata::default();
        meta.apply(&TelemetryPacket {
            mode: Some("downlink".to_string()),
            ground_station: Some("UCI".to_string()),
            seq: Some(4),
            ..Default::default()
        });
        meta.apply(&TelemetryPacket {
            seq: Some(5),
            ..Default::default()
        });

        assert_eq!(meta.mode.as_deref(), Some("downlink"));
        assert_eq!(meta.ground_station.as_deref(), Some("UCI"));
        assert_eq!(meta.seq, Some(5));
        assert!(meta.timestamp.is_none());
    }
}

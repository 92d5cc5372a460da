//! Telemetry presentation model.
//!
//! [`TelemetryPresenter`] folds decoded frames into a [`ResolvedTelemetry`]
//! and mirrors the session's [`ConnectionState`]. A frame that fails to
//! decode is logged and counted; it never changes what is displayed.

use chrono::{DateTime, Utc};

use console_core::{decode, ConnectionState, DecodeError, LinkMetadata, ResolvedTelemetry};

/// Frame counters for the diagnostics card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Every frame handed to the presenter.
    pub frames_received: u64,
    /// Frames that decoded successfully (including empty packets).
    pub frames_merged: u64,
    pub decode_errors: u64,
    /// Wall-clock time of the last merged frame.
    pub last_frame_at: Option<DateTime<Utc>>,
    /// Message of the most recent decode failure.
    pub last_error: Option<String>,
}

/// Everything the dashboard needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub telemetry: ResolvedTelemetry,
    pub link: LinkMetadata,
    pub connection: ConnectionState,
    pub stats: FrameStats,
}

/// Accumulated display state for one mounted dashboard.
#[derive(Debug, Default)]
pub struct TelemetryPresenter {
    telemetry: ResolvedTelemetry,
    link: LinkMetadata,
    connection: ConnectionState,
    stats: FrameStats,
}

impl TelemetryPresenter {
    /// Fresh presenter: every field at its fallback, `Disconnected`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the session's connection state.
    pub fn on_state(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    /// Decode one frame and merge it.
    ///
    /// Returns the number of display fields that received a live value. On
    /// error the resolved telemetry and connection state are left untouched.
    pub fn on_frame(&mut self, frame: &str) -> Result<usize, DecodeError> {
        self.stats.frames_received += 1;

        match decode(frame) {
            Ok(packet) => {
                let updated = self.telemetry.apply(&packet);
                self.link.apply(&packet);
                self.stats.frames_merged += 1;
                self.stats.last_frame_at = Some(Utc::now());
                tracing::trace!(updated, seq = ?packet.seq, "telemetry frame merged");
                Ok(updated)
            }
            Err(e) => {
                self.stats.decode_errors += 1;
                self.stats.last_error = Some(e.to_string());
                tracing::warn!(error = %e, bytes = frame.len(), "discarding undecodable telemetry frame");
                Err(e)
            }
        }
    }

    /// Copy of the current display state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            telemetry: self.telemetry.clone(),
            link: self.link.clone(),
            connection: self.connection,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::FieldId;

    // ── initial state ─────────────────────────────────────────────────────

    #[test]
    fn test_new_presenter_shows_fallbacks() {
        let presenter = TelemetryPresenter::new();
        let snap = presenter.snapshot();
        assert_eq!(snap.connection, ConnectionState::Disconnected);
        assert_eq!(snap.telemetry.live_count(), 0);
        assert_eq!(snap.telemetry.render(FieldId::BatteryVoltage), "7.4 V");
        assert_eq!(snap.stats, FrameStats::default());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn test_partial_frames_accumulate() {
        let mut presenter = TelemetryPresenter::new();
        presenter.on_state(ConnectionState::Connected);

        assert_eq!(
            presenter
                .on_frame(r#"{"power":{"battery_voltage":7.6}}"#)
                .unwrap(),
            1
        );
        assert_eq!(presenter.on_frame(r#"{"radio":{"rssi_dbm":-90}}"#).unwrap(), 1);

        let snap = presenter.snapshot();
        assert_eq!(snap.telemetry.render(FieldId::BatteryVoltage), "7.6 V");
        assert_eq!(snap.telemetry.render(FieldId::Rssi), "-90 dBm");
        assert_eq!(snap.telemetry.render(FieldId::Snr), "12.3 dB");
        assert_eq!(snap.stats.frames_received, 2);
        assert_eq!(snap.stats.frames_merged, 2);
        assert!(snap.stats.last_frame_at.is_some());
    }

    #[test]
    fn test_malformed_frame_changes_nothing_visible() {
        let mut presenter = TelemetryPresenter::new();
        presenter.on_state(ConnectionState::Connected);
        presenter
            .on_frame(r#"{"orientation":{"roll_deg":-1.5},"seq":4}"#)
            .unwrap();
        let before = presenter.snapshot();

        assert!(presenter.on_frame("{not json").is_err());
        assert!(presenter.on_frame("[1, 2, 3]").is_err());

        let after = presenter.snapshot();
        assert_eq!(after.telemetry, before.telemetry);
        assert_eq!(after.link, before.link);
        assert_eq!(after.connection, ConnectionState::Connected);
        assert_eq!(after.stats.decode_errors, 2);
        assert_eq!(after.stats.frames_received, 3);
        assert!(after.stats.last_error.is_some());
        assert_eq!(after.stats.last_frame_at, before.stats.last_frame_at);
    }

    #[test]
    fn test_empty_object_is_a_no_op_merge() {
        let mut presenter = TelemetryPresenter::new();
        presenter
            .on_frame(r#"{"power":{"solar_current":0.9}}"#)
            .unwrap();
        let before = presenter.snapshot().telemetry;

        assert_eq!(presenter.on_frame("{}").unwrap(), 0);
        assert_eq!(presenter.snapshot().telemetry, before);
    }

    #[test]
    fn test_link_metadata_tracks_latest_packet() {
        let mut presenter = TelemetryPresenter::new();
        presenter
            .on_frame(r#"{"timestamp":1700000000.0,"mode":"NOMINAL","seq":1}"#)
            .unwrap();
        presenter.on_frame(r#"{"seq":2}"#).unwrap();

        let link = presenter.snapshot().link;
        assert_eq!(link.seq, Some(2));
        assert_eq!(link.mode.as_deref(), Some("NOMINAL"));
    }

    #[test]
    fn test_wrong_typed_metadata_still_merges_telemetry() {
        let mut presenter = TelemetryPresenter::new();
        presenter
            .on_frame(r#"{"power":{"battery_voltage":7.6},"timestamp":"2025-01-01T00:00:00Z"}"#)
            .unwrap();
        presenter
            .on_frame(r#"{"radio":{"rssi_dbm":-90},"mode":3}"#)
            .unwrap();
        presenter
            .on_frame(r#"{"orientation":{"roll_deg":1.5},"seq":-1}"#)
            .unwrap();

        let snap = presenter.snapshot();
        assert_eq!(snap.telemetry.render(FieldId::BatteryVoltage), "7.6 V");
        assert_eq!(snap.telemetry.render(FieldId::Rssi), "-90 dBm");
        assert_eq!(snap.telemetry.render(FieldId::Roll), "1.5°");
        assert_eq!(snap.stats.decode_errors, 0);
        assert_eq!(snap.link, LinkMetadata::default());
    }

    // ── connection ────────────────────────────────────────────────────────

    #[test]
    fn test_state_change_keeps_last_values() {
        let mut presenter = TelemetryPresenter::new();
        presenter.on_state(ConnectionState::Connected);
        presenter
            .on_frame(r#"{"radio":{"frequency_mhz":437.5}}"#)
            .unwrap();

        presenter.on_state(ConnectionState::Disconnected);
        let snap = presenter.snapshot();
        assert_eq!(snap.connection, ConnectionState::Disconnected);
        assert_eq!(snap.telemetry.render(FieldId::Frequency), "437.5 MHz");
    }
}

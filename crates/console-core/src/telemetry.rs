//! Wire-level telemetry packet and tolerant frame decoding.
//!
//! The spacecraft schema is only partially known, so every leaf is optional
//! and unknown keys are ignored. Link metadata next to the subsystems is read
//! leniently: a value of the wrong type is dropped, not fatal. A frame either
//! decodes into a [`TelemetryPacket`] or yields a [`DecodeError`]; it never
//! panics.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Top-level keys that mark an object as a telemetry packet body.
pub const SUBSYSTEM_KEYS: [&str; 3] = ["power", "orientation", "radio"];

/// Envelope `kind` / `type` values that carry a telemetry payload.
const TELEMETRY_KINDS: [&str; 4] = ["telem", "telem.decoded", "telemetry", "decoded_telem"];

/// Electrical power subsystem readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_temp_c: Option<f64>,
}

/// Attitude determination readings, in degrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw_deg: Option<f64>,
}

/// Downlink radio readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi_dbm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snr_db: Option<f64>,
}

/// One decoded telemetry frame.
///
/// Absence of any field means "unknown", never zero. An empty object is a
/// valid packet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryPacket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerTelemetry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationTelemetry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<RadioTelemetry>,
    /// Unix time in seconds at which the spacecraft sampled the packet.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub timestamp: Option<f64>,
    /// Radio mode reported alongside the packet (e.g. `"downlink"`).
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub mode: Option<String>,
    /// Receiving ground station identifier.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub ground_station: Option<String>,
    /// Sequence number assigned by the upstream decoder or message bus.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub seq: Option<u64>,
}

/// Deserialize an optional metadata value, mapping a wrong-typed value to
/// `None`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode one text frame into a [`TelemetryPacket`].
///
/// Accepts either a bare packet object or a message-bus envelope whose
/// `payload` is a packet. Envelopes of any other kind decode to an empty
/// packet so that they merge as a no-op.
pub fn decode(frame: &str) -> Result<TelemetryPacket, DecodeError> {
    let value: Value = serde_json::from_str(frame).map_err(DecodeError::InvalidJson)?;
    let map = match value {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(json_kind(&other))),
    };

    let body = match unwrap_envelope(map) {
        Some(body) => body,
        None => return Ok(TelemetryPacket::default()),
    };

    serde_json::from_value(Value::Object(body)).map_err(DecodeError::Shape)
}

/// Return the object to decode as a packet, or `None` for a non-telemetry
/// envelope.
fn unwrap_envelope(mut map: Map<String, Value>) -> Option<Map<String, Value>> {
    if SUBSYSTEM_KEYS.iter().any(|k| map.contains_key(*k)) {
        return Some(map);
    }
    if !matches!(map.get("payload"), Some(Value::Object(_))) {
        return Some(map);
    }

    let kind = envelope_kind(&map);
    match kind {
        Some(kind) if TELEMETRY_KINDS.contains(&kind.as_str()) => {
            let Some(Value::Object(mut payload)) = map.remove("payload") else {
                return Some(map);
            };
            if let Some(seq) = map.remove("seq") {
                payload.entry("seq").or_insert(seq);
            }
            Some(payload)
        }
        Some(kind) => {
            tracing::debug!(kind = %kind, "skipping non-telemetry envelope");
            None
        }
        None => Some(map),
    }
}

fn envelope_kind(map: &Map<String, Value>) -> Option<String> {
    map.get("kind")
        .or_else(|| map.get("type"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

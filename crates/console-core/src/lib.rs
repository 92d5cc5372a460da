//! Domain layer for the ground-station console.
//!
//! Telemetry packet decoding, per-field display resolution with fallback
//! values, connection state, reconnect policy, formatting, settings and the
//! shared error types. Nothing in this crate performs I/O on the stream.

pub mod connection;
pub mod display;
pub mod error;
pub mod formatting;
pub mod reconnect;
pub mod settings;
pub mod telemetry;

pub use connection::ConnectionState;
pub use display::{DisplayValue, FieldId, LinkMetadata, ResolvedTelemetry, Subsystem, ValueSource};
pub use error::{ConsoleError, DecodeError, Result};
pub use reconnect::ReconnectPolicy;
pub use telemetry::{decode, TelemetryPacket};

//! Runtime layer for the ground-station console.
//!
//! Owns the telemetry stream connection and everything asynchronous around
//! it: the [`session::StreamSession`] WebSocket client, the presentation
//! model that folds frames into display values, the view-scoped
//! [`dashboard::DashboardMount`], and the bench telemetry simulator.

pub mod dashboard;
pub mod presentation;
pub mod session;
pub mod simulator;

pub use console_core as core;
pub use dashboard::DashboardMount;
pub use presentation::{DashboardSnapshot, FrameStats, TelemetryPresenter};
pub use session::{SessionEvent, SessionOptions, StreamSession, TransportError};

use thiserror::Error;

/// All errors produced by the ground-station console.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The configured telemetry endpoint is not a usable stream address.
    #[error("Invalid telemetry endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Why a received frame was discarded instead of merged.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame text is not a JSON document.
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The frame is JSON but its top level is not an object.
    #[error("frame top level is {0}, expected an object")]
    NotAnObject(&'static str),

    /// A known field carries a value of the wrong type.
    #[error("frame does not match the telemetry shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Convenience alias used throughout the console crates.
pub type Result<T> = std::result::Result<T, ConsoleError>;

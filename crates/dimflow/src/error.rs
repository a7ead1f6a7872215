//! Error types for the bridge daemon
use thiserror::Error;

/// Bridge daemon errors
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Serial port could not be opened. Fatal: the daemon is useless
    /// without the panel link.
    #[error("failed to open serial port {path}: {source}")]
    SerialOpen {
        /// Device path that was attempted.
        path: String,
        /// Underlying serial error.
        #[source]
        source: serialport::Error,
    },

    /// A single serial write failed. Non-fatal; the next resync pass
    /// repairs whatever the panel missed.
    #[error("serial write failed: {0}")]
    SerialWrite(#[source] std::io::Error),

    /// MQTT client error
    #[error("MQTT error: {0}")]
    Mqtt(String),

    /// Configuration file error
    #[error("invalid config: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

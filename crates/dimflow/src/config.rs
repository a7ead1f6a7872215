//! Daemon configuration
//!
//! Loaded once at startup from a TOML file; nothing here mutates at
//! runtime. Every field has a default matching the hardware this was
//! written for, so an empty (or absent) file yields a working config for
//! the reference installation.

use std::path::Path;

use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link to the QSE network interface.
    pub serial: SerialConfig,
    /// Panel topology.
    pub panel: PanelConfig,
    /// Art-Net ingest.
    pub dmx: DmxConfig,
    /// MQTT broker and topics.
    pub mqtt: MqttConfig,
    /// Logging.
    pub log: LogConfig,
}

/// Serial port settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the QSE network interface.
    pub device: String,
    /// Baud rate.
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud: 115_200,
        }
    }
}

/// Panel topology settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Number of dimmable zones on the panel.
    pub zones: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { zones: 6 }
    }
}

/// Art-Net ingest settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DmxConfig {
    /// Art-Net universe to listen for.
    pub universe: u16,
    /// First channel of the frame mapped to zone 1.
    pub start_address: u16,
    /// UDP bind address for Art-Net packets.
    pub bind_addr: String,
}

impl Default for DmxConfig {
    fn default() -> Self {
        Self {
            universe: 3,
            start_address: 0,
            bind_addr: "0.0.0.0:6454".to_string(),
        }
    }
}

/// MQTT settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Optional username.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Client ID presented to the broker.
    pub client_id: String,
    /// Base topic; state goes to `<base>/state`, commands arrive on
    /// `<base>/set`, availability on `<base>/availability`.
    pub base_topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            client_id: "dimflow".to_string(),
            base_topic: "dimflow/light".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level directive (`RUST_LOG` overrides it).
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`. A missing file is not an error:
    /// the defaults describe the reference installation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| BridgeError::Config(e.to_string()))
    }
}

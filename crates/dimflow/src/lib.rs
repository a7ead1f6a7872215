//! DimFlow - DMX to GRAFIK Eye Bridge Daemon
//!
//! Reconciles three control sources into one authoritative brightness per
//! zone and drives a serial-attached dimming panel:
//! - **Art-Net**: periodic full-frame DMX input ([`dmx`])
//! - **Panel**: the panel's own buttons and brightness reports ([`panel`])
//! - **MQTT**: a remote light abstraction with ON/OFF + brightness ([`mqtt`])
//!
//! The [`dispatcher`] diffs the shared state against what was last sent
//! and emits de-duplicated commands; a periodic resync re-sends everything
//! to heal commands the panel dropped.

#![allow(missing_docs)]

/// Configuration loading
pub mod config;
/// Shared daemon context
pub mod context;
/// Write loop, resync scheduler, panel event handling
pub mod dispatcher;
/// Art-Net DMX ingest
pub mod dmx;
/// Error types
pub mod error;
/// MQTT remote control bridge
pub mod mqtt;
/// Serial panel link
pub mod panel;

pub use config::Config;
pub use context::BridgeContext;
pub use error::{BridgeError, Result};

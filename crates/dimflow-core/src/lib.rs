//! DimFlow Core - Zone Arbitration Domain Model
//!
//! This crate contains the core domain model for DimFlow, including:
//! - Per-zone brightness table (target vs. last-sent values)
//! - GRAFIK Eye command encoding and response line parsing
//! - Remote light state with duplicate-suppressed publishing
//! - Arbitration between DMX activity and remote intent
//! - Dispatch planning (diff against sent state plus forced resync)
//!
//! Everything here is pure and synchronous; serial, UDP and MQTT I/O live
//! in the `dimflow` daemon crate.

#![warn(missing_docs)]

/// Command encoding and panel response parsing
pub mod codec;
/// Dispatch planning (which zones need a write)
pub mod dispatch;
/// Remote light state and MQTT payload types
pub mod remote;
/// Combined arbitration state (zones + remote + DMX activity)
pub mod state;
/// Per-zone brightness table
pub mod zones;

pub use codec::{decode_line, encode_set_zone, level_to_percent, percent_to_level, PanelEvent};
pub use dispatch::{plan_writes, ZoneWrite};
pub use remote::{LightPower, RemoteState, SetPayload, StatePayload};
pub use state::{LightState, DEFAULT_ON_BRIGHTNESS, DMX_QUIET_WINDOW};
pub use zones::{Zone, ZoneTable};

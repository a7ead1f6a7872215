//! Remote light state and MQTT payload types
//!
//! The remote side sees the panel as a single logical light with an ON/OFF
//! state and a 0-255 brightness. Outbound state messages are duplicate
//! suppressed: a payload is only handed out when the (state, brightness)
//! pair differs from the last one published.

use serde::{Deserialize, Serialize};

/// ON/OFF state of the logical light, serialized as `"ON"`/`"OFF"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightPower {
    /// Light is on.
    On,
    /// Light is off.
    Off,
}

/// State message published to the status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    /// ON/OFF state.
    pub state: LightPower,
    /// Brightness, 0-255.
    pub brightness: u8,
}

/// Command received on the `set` topic; both fields optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SetPayload {
    /// Requested ON/OFF state, if any.
    pub state: Option<LightPower>,
    /// Requested brightness, if any.
    pub brightness: Option<u8>,
}

/// Last-known remote light semantics plus the publish dedup markers.
#[derive(Debug, Clone)]
pub struct RemoteState {
    /// Current ON/OFF state.
    pub power: LightPower,
    /// Current brightness, 0-255.
    pub brightness: u8,
    published: Option<StatePayload>,
}

impl Default for RemoteState {
    fn default() -> Self {
        Self {
            power: LightPower::Off,
            brightness: 0,
            published: None,
        }
    }
}

impl RemoteState {
    /// Overwrite state and brightness.
    pub fn set(&mut self, power: LightPower, brightness: u8) {
        self.power = power;
        self.brightness = brightness;
    }

    /// Forget what was last published so the current state goes out again.
    pub fn force_republish(&mut self) {
        self.published = None;
    }

    /// Return the current state as a payload if it differs from the last
    /// published one. The marker is updated before the payload is handed
    /// out, so callers publishing outside the lock cannot double-send.
    pub fn take_publish(&mut self) -> Option<StatePayload> {
        let current = StatePayload {
            state: self.power,
            brightness: self.brightness,
        };
        if self.published == Some(current) {
            return None;
        }
        self.published = Some(current);
        Some(current)
    }
}

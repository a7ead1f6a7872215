//! Combined arbitration state
//!
//! [`LightState`] groups the zone table, the remote light state and the
//! timestamp of the last applied DMX frame. The daemon keeps the whole
//! struct behind one mutex: the remote arbitration has to read the DMX
//! timestamp and write zone targets in the same critical section, or a
//! frame landing between the staleness check and the write could be
//! silently clobbered.
//!
//! All methods take `now` as a parameter so the arbitration rules can be
//! tested without sleeping.

use std::time::{Duration, Instant};

use crate::remote::{LightPower, RemoteState, SetPayload, StatePayload};
use crate::zones::ZoneTable;

/// How long after the last DMX frame the stream counts as active. While
/// active, DMX owns the zones and remote intent is rejected.
pub const DMX_QUIET_WINDOW: Duration = Duration::from_secs(5);

/// Brightness substituted when a remote turn-on arrives with brightness 0.
/// Switching the light on to nothing is never what the sender meant.
pub const DEFAULT_ON_BRIGHTNESS: u8 = 127;

/// Shared state of the whole light: zones, remote mirror, DMX activity.
#[derive(Debug, Clone)]
pub struct LightState {
    zones: ZoneTable,
    remote: RemoteState,
    last_dmx: Option<Instant>,
}

impl LightState {
    /// Create state for `zone_count` zones, everything at rest.
    pub fn new(zone_count: usize) -> Self {
        Self {
            zones: ZoneTable::new(zone_count),
            remote: RemoteState::default(),
            last_dmx: None,
        }
    }

    /// The zone table.
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Mutable access to the zone table (dispatcher bookkeeping).
    pub fn zones_mut(&mut self) -> &mut ZoneTable {
        &mut self.zones
    }

    /// The remote light state.
    pub fn remote(&self) -> &RemoteState {
        &self.remote
    }

    /// When the last DMX frame was applied, if any.
    pub fn last_dmx(&self) -> Option<Instant> {
        self.last_dmx
    }

    fn dmx_idle(&self, now: Instant) -> bool {
        match self.last_dmx {
            Some(at) => now.duration_since(at) > DMX_QUIET_WINDOW,
            None => true,
        }
    }

    /// Apply one DMX frame: copy the channel values into the zone targets
    /// and stamp the DMX activity clock. Last write wins; frames are never
    /// queued.
    pub fn apply_frame(&mut self, values: &[u8], now: Instant) {
        for (i, &value) in values.iter().enumerate().take(self.zones.len()) {
            self.zones.set_target(i as u16 + 1, value);
        }
        self.last_dmx = Some(now);
    }

    /// Apply a remote `set` command, arbitrating against DMX activity.
    ///
    /// When DMX has been quiet for [`DMX_QUIET_WINDOW`], the remote intent
    /// wins and is written into every zone target. While DMX is active the
    /// intent is rejected: the remote state is overwritten to mirror zone
    /// 1's current target and flagged for republishing, so the sender sees
    /// the real state instead of the one it asked for.
    pub fn apply_remote_set(&mut self, cmd: SetPayload, now: Instant) {
        let power = cmd.state.unwrap_or(self.remote.power);
        let mut brightness = cmd.brightness.unwrap_or(self.remote.brightness);
        if power == LightPower::On && power != self.remote.power && brightness == 0 {
            brightness = DEFAULT_ON_BRIGHTNESS;
        }

        if self.dmx_idle(now) {
            let level = match power {
                LightPower::On => brightness,
                LightPower::Off => 0,
            };
            self.zones.set_all_targets(level);
            self.remote.set(power, brightness);
        } else {
            let mirrored = self
                .zones
                .zone(1)
                .map(|z| z.target)
                .unwrap_or_default();
            let power = if mirrored > 0 {
                LightPower::On
            } else {
                LightPower::Off
            };
            self.remote.set(power, mirrored);
            self.remote.force_republish();
        }
    }

    /// Fold a zone-1 brightness feedback report from the panel into the
    /// remote state (0 means OFF).
    pub fn apply_panel_report(&mut self, level: u8) {
        let power = if level == 0 {
            LightPower::Off
        } else {
            LightPower::On
        };
        self.remote.set(power, level);
    }

    /// Duplicate-suppressed state payload, see [`RemoteState::take_publish`].
    pub fn take_publish(&mut self) -> Option<StatePayload> {
        self.remote.take_publish()
    }
}

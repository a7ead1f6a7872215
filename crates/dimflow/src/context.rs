//! Shared daemon context
//!
//! One owned object passed to every task instead of process globals. Two
//! exclusion domains: the light state (zones + remote + DMX clock) behind
//! a mutex, and the two flags as atomics. Critical sections stay short;
//! serial and network I/O always happen outside the lock on snapshots.

use std::sync::atomic::{AtomicBool, Ordering};

use dimflow_core::LightState;
use parking_lot::Mutex;

/// State shared between the ingest, bridge, panel and dispatcher tasks.
pub struct BridgeContext {
    /// Zones, remote mirror and DMX activity clock.
    pub light: Mutex<LightState>,
    resend: AtomicBool,
    disabled: AtomicBool,
}

impl BridgeContext {
    /// Create the context for `zone_count` zones. The resend flag starts
    /// true so the first dispatcher pass pushes every zone to the panel.
    pub fn new(zone_count: usize) -> Self {
        Self {
            light: Mutex::new(LightState::new(zone_count)),
            resend: AtomicBool::new(true),
            disabled: AtomicBool::new(false),
        }
    }

    /// Force the next dispatcher pass to write all zones.
    pub fn request_resend(&self) {
        self.resend.store(true, Ordering::SeqCst);
    }

    /// Consume the resend flag for one pass.
    pub fn take_resend(&self) -> bool {
        self.resend.swap(false, Ordering::SeqCst)
    }

    /// Whether a resend is currently pending.
    pub fn resend_pending(&self) -> bool {
        self.resend.load(Ordering::SeqCst)
    }

    /// Whether programmatic control is disabled (panel override).
    pub fn disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Set or clear the panel control override.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_starts_true_and_is_consumed() {
        let ctx = BridgeContext::new(6);
        assert!(ctx.resend_pending());
        assert!(ctx.take_resend());
        assert!(!ctx.take_resend());

        ctx.request_resend();
        assert!(ctx.take_resend());
    }

    #[test]
    fn test_control_disable_flag() {
        let ctx = BridgeContext::new(6);
        assert!(!ctx.disabled());
        ctx.set_disabled(true);
        assert!(ctx.disabled());
        ctx.set_disabled(false);
        assert!(!ctx.disabled());
    }
}

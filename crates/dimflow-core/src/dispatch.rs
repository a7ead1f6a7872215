//! Dispatch planning
//!
//! Decides which zones need a command on the next write pass: a zone is
//! written when its target differs from what was last sent, or when a full
//! resync is forced. The plan is computed from a locked snapshot; the
//! actual serial writes happen outside the lock.

use crate::zones::ZoneTable;

/// One pending zone write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneWrite {
    /// 1-based zone number.
    pub zone: u16,
    /// Brightness to send, 0-255.
    pub level: u8,
}

/// Plan the writes for one dispatcher pass.
pub fn plan_writes(zones: &ZoneTable, resend_all: bool) -> Vec<ZoneWrite> {
    zones
        .iter()
        .filter(|(_, z)| resend_all || z.target != z.last_sent)
        .map(|(zone, z)| ZoneWrite {
            zone,
            level: z.target,
        })
        .collect()
}

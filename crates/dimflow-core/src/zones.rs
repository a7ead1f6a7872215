//! Per-zone brightness table
//!
//! The table tracks two values per zone: the brightness we want the panel
//! to show (`target`) and the brightness we last wrote to it (`last_sent`).
//! `last_sent` is only touched after a write attempt succeeded, so the
//! difference between the two is exactly the set of pending commands.

/// A single dimmable output zone on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zone {
    /// Brightness the zone should be at (0-255).
    pub target: u8,
    /// Brightness last written to the panel for this zone (0-255).
    pub last_sent: u8,
}

/// Fixed-size table of zones, numbered 1..=N externally.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl ZoneTable {
    /// Create a table of `count` zones, all at 0 / nothing sent.
    pub fn new(count: usize) -> Self {
        Self {
            zones: vec![Zone::default(); count],
        }
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the table holds no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Look up a zone by its 1-based panel number.
    pub fn zone(&self, zone: u16) -> Option<&Zone> {
        self.zones.get(usize::from(zone).checked_sub(1)?)
    }

    /// Set the target brightness of one zone. Out-of-range zones are ignored.
    pub fn set_target(&mut self, zone: u16, level: u8) {
        if let Some(z) = usize::from(zone)
            .checked_sub(1)
            .and_then(|i| self.zones.get_mut(i))
        {
            z.target = level;
        }
    }

    /// Set every zone's target brightness to the same level.
    pub fn set_all_targets(&mut self, level: u8) {
        for z in &mut self.zones {
            z.target = level;
        }
    }

    /// Record that `level` was successfully written to `zone`.
    pub fn mark_sent(&mut self, zone: u16, level: u8) {
        if let Some(z) = usize::from(zone)
            .checked_sub(1)
            .and_then(|i| self.zones.get_mut(i))
        {
            z.last_sent = level;
        }
    }

    /// Iterate zones with their 1-based panel numbers.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Zone)> {
        self.zones
            .iter()
            .enumerate()
            .map(|(i, z)| (i as u16 + 1, z))
    }

    /// Snapshot of all target values, in zone order.
    pub fn targets(&self) -> Vec<u8> {
        self.zones.iter().map(|z| z.target).collect()
    }
}

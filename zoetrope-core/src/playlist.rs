//! The ordered panel registry
//!
//! Insertion order is display order. The list is built once at boot and
//! never mutated afterwards; the rotation scheduler only walks it.

use heapless::Vec;

/// Maximum slots in a playlist
pub const MAX_PANELS: usize = 8;

/// One renderable unit of the slideshow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelKind {
    /// Pi-hole DNS counters
    NetworkStats,
    /// Random photo from the card
    Photo,
    /// Close-price chart for the configured ticker
    Market,
    /// Astronomy picture of the day
    DailyImage,
    /// Birthday reminders
    Reminder,
}

impl PanelKind {
    /// Short name for logs
    pub fn name(self) -> &'static str {
        match self {
            PanelKind::NetworkStats => "netstats",
            PanelKind::Photo => "photo",
            PanelKind::Market => "market",
            PanelKind::DailyImage => "daily",
            PanelKind::Reminder => "reminder",
        }
    }
}

/// Ordered sequence of panels
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    slots: Vec<PanelKind, MAX_PANELS>,
}

impl Playlist {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// The full rotation in its classic order
    pub fn standard() -> Self {
        let mut list = Self::new();
        for kind in [
            PanelKind::NetworkStats,
            PanelKind::Photo,
            PanelKind::Market,
            PanelKind::DailyImage,
            PanelKind::Reminder,
        ] {
            let _ = list.push(kind);
        }
        list
    }

    /// Append a slot; returns the rejected kind when the list is full
    pub fn push(&mut self, kind: PanelKind) -> Result<(), PanelKind> {
        self.slots.push(kind)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PanelKind> {
        self.slots.get(index).copied()
    }

    pub fn as_slice(&self) -> &[PanelKind] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let list = Playlist::standard();
        assert_eq!(
            list.as_slice(),
            [
                PanelKind::NetworkStats,
                PanelKind::Photo,
                PanelKind::Market,
                PanelKind::DailyImage,
                PanelKind::Reminder,
            ]
        );
    }

    #[test]
    fn test_push_caps_at_capacity() {
        let mut list = Playlist::new();
        for _ in 0..MAX_PANELS {
            assert!(list.push(PanelKind::Photo).is_ok());
        }
        assert_eq!(list.push(PanelKind::Photo), Err(PanelKind::Photo));
        assert_eq!(list.len(), MAX_PANELS);
    }
}

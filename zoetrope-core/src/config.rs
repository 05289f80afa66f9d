//! Frame configuration types
//!
//! The configuration ships compiled in as `frame.toml` and may be
//! overridden by a copy stored in flash as a postcard blob. Secrets
//! (Pi-hole password, image-service API key) live here too; a panel whose
//! secret is empty degrades to a logged skip rather than failing the boot.

use heapless::{String, Vec};

/// Maximum reminder-name length
pub const MAX_NAME_LEN: usize = 24;
/// Maximum reminder-date length ("DD-MM-YYYY")
pub const MAX_DATE_LEN: usize = 12;
/// Maximum endpoint URL length
pub const MAX_URL_LEN: usize = 96;
/// Maximum secret/password length
pub const MAX_SECRET_LEN: usize = 64;
/// Maximum SSID length per 802.11
pub const MAX_SSID_LEN: usize = 32;
/// Maximum reminder entries
pub const MAX_REMINDERS: usize = 16;

pub use crate::market::MAX_SYMBOL_LEN;

/// Display border colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Border {
    #[default]
    White,
    Black,
}

/// Wi-Fi credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_SECRET_LEN>,
}

/// Pi-hole statistics source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsConfig {
    /// Base URL, e.g. `http://192.168.7.213`
    pub endpoint: String<MAX_URL_LEN>,
    /// App password for the v6 API
    pub password: String<MAX_SECRET_LEN>,
}

/// Quote-service source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketConfig {
    /// Close-series endpoint
    pub endpoint: String<MAX_URL_LEN>,
    /// Ticker symbol, e.g. `IGG.L`
    pub symbol: String<MAX_SYMBOL_LEN>,
}

/// Picture-of-the-day source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyImageConfig {
    /// Metadata endpoint
    pub endpoint: String<MAX_URL_LEN>,
    /// API key appended as a query parameter
    pub api_key: String<MAX_SECRET_LEN>,
}

/// One name -> anniversary mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReminderEntry {
    pub name: String<MAX_NAME_LEN>,
    /// `DD-MM` or `DD-MM-YYYY`
    pub date: String<MAX_DATE_LEN>,
}

/// Everything the frame needs to run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameConfig {
    /// Seconds a panel stays up before auto-advancing
    pub dwell_secs: u32,
    pub border: Border,
    pub wifi: WifiConfig,
    pub stats: StatsConfig,
    pub market: MarketConfig,
    pub daily: DailyImageConfig,
    pub reminders: Vec<ReminderEntry, MAX_REMINDERS>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            dwell_secs: crate::rotation::DEFAULT_DWELL_SECS,
            border: Border::default(),
            wifi: WifiConfig::default(),
            stats: StatsConfig::default(),
            market: MarketConfig::default(),
            daily: DailyImageConfig::default(),
            reminders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.dwell_secs, 900);
        assert_eq!(cfg.border, Border::White);
        assert!(cfg.stats.password.is_empty());
        assert!(cfg.reminders.is_empty());
    }
}

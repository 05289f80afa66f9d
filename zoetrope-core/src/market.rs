//! Market-day staleness for the quote cache
//!
//! The market panel keeps the last fetched close pair so a frame that
//! redraws every few minutes does not hammer the quote service. A cached
//! entry survives until the next market-day boundary (09:00 UTC, when the
//! London session has opened and yesterday's close is final), after which a
//! fresh fetch is attempted.

use heapless::String;

use crate::calendar::SECS_PER_DAY;

/// UTC hour at which a new market day begins
pub const MARKET_DAY_BOUNDARY_HOUR: u64 = 9;

/// Maximum ticker symbol length
pub const MAX_SYMBOL_LEN: usize = 12;

/// Unix timestamp of today's boundary (09:00 UTC on the civil day of `now`)
///
/// Before 09:00 the boundary lies in the future, so nothing fetched earlier
/// the same morning counts as fresh yet. That mirrors the reference cache
/// behaviour rather than a calendar-day TTL.
pub fn market_day_boundary(now_unix: u64) -> u64 {
    now_unix / SECS_PER_DAY * SECS_PER_DAY + MARKET_DAY_BOUNDARY_HOUR * 3600
}

/// A cached close pair for one ticker
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CachedQuote {
    pub symbol: String<MAX_SYMBOL_LEN>,
    pub latest_close: f32,
    pub previous_close: f32,
    /// Unix seconds at which the pair was fetched
    pub fetched_at: u64,
}

impl CachedQuote {
    /// Day-over-day change
    pub fn change(&self) -> f32 {
        self.latest_close - self.previous_close
    }

    /// True while the entry may be served without touching the network
    pub fn is_fresh(&self, now_unix: u64) -> bool {
        self.fetched_at >= market_day_boundary(now_unix)
    }

    /// True when the entry belongs to the configured ticker
    pub fn matches(&self, symbol: &str) -> bool {
        self.symbol.as_str() == symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-08-06T00:00:00Z
    const MIDNIGHT: u64 = 1_785_542_400;
    const HOUR: u64 = 3600;

    fn quote(fetched_at: u64) -> CachedQuote {
        let mut symbol = String::new();
        let _ = symbol.push_str("IGG.L");
        CachedQuote {
            symbol,
            latest_close: 123.45,
            previous_close: 120.00,
            fetched_at,
        }
    }

    #[test]
    fn test_boundary_is_nine_utc() {
        assert_eq!(market_day_boundary(MIDNIGHT), MIDNIGHT + 9 * HOUR);
        assert_eq!(market_day_boundary(MIDNIGHT + 23 * HOUR), MIDNIGHT + 9 * HOUR);
    }

    #[test]
    fn test_fetched_after_boundary_is_fresh() {
        let q = quote(MIDNIGHT + 10 * HOUR);
        assert!(q.is_fresh(MIDNIGHT + 11 * HOUR));
        assert!(q.is_fresh(MIDNIGHT + 23 * HOUR));
    }

    #[test]
    fn test_fetched_yesterday_is_stale() {
        let q = quote(MIDNIGHT - 14 * HOUR); // yesterday 10:00
        assert!(!q.is_fresh(MIDNIGHT + 10 * HOUR));
    }

    #[test]
    fn test_same_morning_before_boundary_is_stale() {
        // Fetched 08:00, checked 08:30: the boundary is still ahead, so the
        // entry does not count as fresh. Reference-implementation quirk.
        let q = quote(MIDNIGHT + 8 * HOUR);
        assert!(!q.is_fresh(MIDNIGHT + 8 * HOUR + 1800));
    }

    #[test]
    fn test_change() {
        let q = quote(0);
        let delta = q.change() - 3.45;
        assert!(delta > -1e-3 && delta < 1e-3);
    }

    #[test]
    fn test_symbol_match() {
        let q = quote(0);
        assert!(q.matches("IGG.L"));
        assert!(!q.matches("VOD.L"));
    }
}

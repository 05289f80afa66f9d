//! Stock chart panel
//!
//! Cache-first: a quote fetched since the last market-day boundary is
//! served without touching the network. A stale cache triggers a fresh
//! fetch of the six-month close series - three attempts with a pause
//! between, falling back to the stale quote when the service stays down.

use core::fmt::Write as _;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;
use heapless::{String, Vec};
use serde::Deserialize;
use zoetrope_core::config::MarketConfig;
use zoetrope_core::error::PanelError;
use zoetrope_core::market::CachedQuote;
use zoetrope_core::traits::{Fetch, ServiceError};
use zoetrope_display::Spectrum;

use crate::{chart, layout, Outcome};

/// Attempts before giving up on the quote service
pub const FETCH_ATTEMPTS: u32 = 3;
/// Pause between attempts
pub const RETRY_PAUSE_MS: u32 = 5_000;

/// Roughly six months of daily closes
const MAX_POINTS: usize = 192;

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    closes: Vec<f32, MAX_POINTS>,
}

/// Fetch (or reuse) the quote and draw the market card
///
/// `cache` is read and updated in place; the caller persists it.
pub async fn render<D, F, DL>(
    target: &mut D,
    fetch: &mut F,
    cfg: &MarketConfig,
    cache: &mut Option<CachedQuote>,
    now_unix: u64,
    delay: &mut DL,
    scratch: &mut [u8],
) -> Result<Outcome, PanelError>
where
    D: DrawTarget<Color = Spectrum>,
    F: Fetch,
    DL: DelayNs,
{
    if cfg.endpoint.is_empty() || cfg.symbol.is_empty() {
        return Err(PanelError::ConfigMissing);
    }

    // Same market day: the cached pair is authoritative, skip the network.
    if let Some(cached) = cache.as_ref() {
        if cached.matches(&cfg.symbol) && cached.is_fresh(now_unix) {
            draw_card(target, cached).map_err(|_| PanelError::Render)?;
            return Ok(Outcome::Drawn);
        }
    }

    match fetch_series(fetch, cfg, delay, scratch).await {
        Ok(series) => {
            let quote = quote_from_series(&cfg.symbol, &series, now_unix)
                .ok_or(PanelError::Service(ServiceError::Payload))?;
            *cache = Some(quote.clone());
            draw_chart(target, &quote, &series.closes).map_err(|_| PanelError::Render)?;
            Ok(Outcome::Drawn)
        }
        Err(e) => {
            // Service down: a stale quote still beats an empty frame
            if let Some(cached) = cache.as_ref() {
                if cached.matches(&cfg.symbol) {
                    draw_card(target, cached).map_err(|_| PanelError::Render)?;
                    return Ok(Outcome::Drawn);
                }
            }
            Err(e.into())
        }
    }
}

async fn fetch_series<F: Fetch, DL: DelayNs>(
    fetch: &mut F,
    cfg: &MarketConfig,
    delay: &mut DL,
    scratch: &mut [u8],
) -> Result<QuoteSeries, ServiceError> {
    let mut url: String<128> = String::new();
    write!(url, "{}?symbol={}&range=6mo", cfg.endpoint, cfg.symbol)
        .map_err(|_| ServiceError::Overflow)?;

    let mut last_error = ServiceError::Timeout;
    for attempt in 0..FETCH_ATTEMPTS {
        if attempt > 0 {
            delay.delay_ms(RETRY_PAUSE_MS).await;
        }
        match fetch.get(&url, &[], scratch).await {
            Ok(n) => {
                let (series, _): (QuoteSeries, _) =
                    serde_json_core::from_slice(&scratch[..n]).map_err(|_| ServiceError::Payload)?;
                return Ok(series);
            }
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

fn quote_from_series(symbol: &str, series: &QuoteSeries, now_unix: u64) -> Option<CachedQuote> {
    let n = series.closes.len();
    if n < 2 {
        return None;
    }
    let mut sym: String<{ zoetrope_core::market::MAX_SYMBOL_LEN }> = String::new();
    sym.push_str(symbol).ok()?;
    Some(CachedQuote {
        symbol: sym,
        latest_close: series.closes[n - 1],
        previous_close: series.closes[n - 2],
        fetched_at: now_unix,
    })
}

fn title_line(quote: &CachedQuote) -> String<64> {
    let change = quote.change();
    let magnitude = if change < 0.0 { -change } else { change };
    let sign = if change < 0.0 { '-' } else { '+' };
    let mut line: String<64> = String::new();
    let _ = write!(
        line,
        "{} {:.2} ({}{:.2})",
        quote.symbol, quote.latest_close, sign, magnitude
    );
    line
}

fn draw_chart<D>(target: &mut D, quote: &CachedQuote, closes: &[f32]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    layout::backdrop(target, Spectrum::White, Spectrum::Blue, &title_line(quote))?;
    let size = target.bounding_box().size;
    let top = layout::HEADER_HEIGHT as i32 + 24;
    let area = Rectangle::new(
        Point::new(32, top),
        Size::new(
            size.width.saturating_sub(64),
            (size.height as i32 - top - 32) as u32,
        ),
    );
    chart::line_chart(target, area, closes, Spectrum::Blue, Spectrum::Black)
}

fn draw_card<D>(target: &mut D, quote: &CachedQuote) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    layout::backdrop(target, Spectrum::White, Spectrum::Blue, "Markets")?;
    let mut price: String<32> = String::new();
    let _ = write!(price, "{:.2}", quote.latest_close);
    let title = title_line(quote);
    let lines: [&str; 3] = [quote.symbol.as_str(), price.as_str(), title.as_str()];
    layout::centered_block(target, &lines, Spectrum::Black)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use zoetrope_display::FrameBuffer;

    // 2026-08-06T00:00:00Z
    const MIDNIGHT: u64 = 1_785_542_400;
    const HOUR: u64 = 3600;

    const SERIES_JSON: &[u8] =
        br#"{"symbol":"IGG.L","currency":"GBp","closes":[100.0,101.5,99.0,104.0,103.2,108.9]}"#;

    struct CountingFetch {
        calls: usize,
        fail: bool,
    }

    impl Fetch for CountingFetch {
        async fn get(
            &mut self,
            _url: &str,
            _headers: &[(&str, &str)],
            out: &mut [u8],
        ) -> Result<usize, ServiceError> {
            self.calls += 1;
            if self.fail {
                return Err(ServiceError::Connect);
            }
            out[..SERIES_JSON.len()].copy_from_slice(SERIES_JSON);
            Ok(SERIES_JSON.len())
        }

        async fn post_json(
            &mut self,
            _: &str,
            _: &str,
            _: &mut [u8],
        ) -> Result<usize, ServiceError> {
            unreachable!("market panel never posts");
        }
    }

    struct NoopDelay {
        sleeps: u32,
    }

    impl DelayNs for NoopDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        // Count whole pauses, not the chunked delay_ns calls underneath
        async fn delay_ms(&mut self, _ms: u32) {
            self.sleeps += 1;
        }
    }

    fn config() -> MarketConfig {
        let mut cfg = MarketConfig::default();
        cfg.endpoint.push_str("http://quotes.local/history").unwrap();
        cfg.symbol.push_str("IGG.L").unwrap();
        cfg
    }

    fn cached(fetched_at: u64) -> CachedQuote {
        let mut symbol = String::new();
        symbol.push_str("IGG.L").unwrap();
        CachedQuote {
            symbol,
            latest_close: 105.0,
            previous_close: 104.0,
            fetched_at,
        }
    }

    #[test]
    fn test_fresh_cache_bypasses_network() {
        let mut fetch = CountingFetch { calls: 0, fail: false };
        let mut delay = NoopDelay { sleeps: 0 };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 1024];
        // Fetched at 10:00, rendered at 11:00: same market day.
        let mut cache = Some(cached(MIDNIGHT + 10 * HOUR));

        let outcome = block_on(render(
            &mut fb,
            &mut fetch,
            &config(),
            &mut cache,
            MIDNIGHT + 11 * HOUR,
            &mut delay,
            &mut scratch,
        ))
        .unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(fetch.calls, 0);
        assert_eq!(cache.unwrap().fetched_at, MIDNIGHT + 10 * HOUR);
    }

    #[test]
    fn test_stale_cache_refetches_and_updates() {
        let mut fetch = CountingFetch { calls: 0, fail: false };
        let mut delay = NoopDelay { sleeps: 0 };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 1024];
        // Fetched yesterday; today is a new market day.
        let mut cache = Some(cached(MIDNIGHT - 14 * HOUR));
        let now = MIDNIGHT + 10 * HOUR;

        let outcome = block_on(render(
            &mut fb,
            &mut fetch,
            &config(),
            &mut cache,
            now,
            &mut delay,
            &mut scratch,
        ))
        .unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(fetch.calls, 1);
        let updated = cache.unwrap();
        assert_eq!(updated.fetched_at, now);
        assert_eq!(updated.latest_close, 108.9);
        assert_eq!(updated.previous_close, 103.2);
    }

    #[test]
    fn test_three_attempts_then_stale_fallback() {
        let mut fetch = CountingFetch { calls: 0, fail: true };
        let mut delay = NoopDelay { sleeps: 0 };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 1024];
        let stale = cached(MIDNIGHT - 14 * HOUR);
        let mut cache = Some(stale.clone());

        let outcome = block_on(render(
            &mut fb,
            &mut fetch,
            &config(),
            &mut cache,
            MIDNIGHT + 10 * HOUR,
            &mut delay,
            &mut scratch,
        ))
        .unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(fetch.calls, FETCH_ATTEMPTS as usize);
        assert_eq!(delay.sleeps, FETCH_ATTEMPTS - 1);
        // The stale quote survives untouched for the next boundary.
        assert_eq!(cache.unwrap(), stale);
    }

    #[test]
    fn test_no_cache_and_no_service_fails() {
        let mut fetch = CountingFetch { calls: 0, fail: true };
        let mut delay = NoopDelay { sleeps: 0 };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 1024];
        let mut cache = None;

        let err = block_on(render(
            &mut fb,
            &mut fetch,
            &config(),
            &mut cache,
            MIDNIGHT + 10 * HOUR,
            &mut delay,
            &mut scratch,
        ))
        .unwrap_err();
        assert_eq!(err, PanelError::Service(ServiceError::Connect));
        assert!(cache.is_none());
    }

    #[test]
    fn test_missing_symbol_degrades() {
        let mut fetch = CountingFetch { calls: 0, fail: false };
        let mut delay = NoopDelay { sleeps: 0 };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 64];
        let mut cache = None;
        let mut cfg = config();
        cfg.symbol.clear();

        let err = block_on(render(
            &mut fb,
            &mut fetch,
            &cfg,
            &mut cache,
            MIDNIGHT,
            &mut delay,
            &mut scratch,
        ))
        .unwrap_err();
        assert_eq!(err, PanelError::ConfigMissing);
        assert_eq!(fetch.calls, 0);
    }
}

//! Pi-hole DNS statistics panel
//!
//! Speaks the v6 API: `POST /api/auth` with the app password yields a
//! session id, `GET /api/stats/summary` with the `X-FTL-SID` header yields
//! the counters. Rendered as the classic five centred lines.

use core::fmt::Write as _;

use embedded_graphics::prelude::*;
use heapless::String;
use serde::Deserialize;
use zoetrope_core::config::StatsConfig;
use zoetrope_core::error::PanelError;
use zoetrope_core::traits::{Fetch, ServiceError};
use zoetrope_display::Spectrum;

use crate::{layout, Outcome};

const MAX_SID_LEN: usize = 64;

#[derive(Debug, Deserialize)]
struct AuthReply<'a> {
    #[serde(borrow)]
    session: Session<'a>,
}

#[derive(Debug, Deserialize)]
struct Session<'a> {
    sid: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Summary {
    queries: Queries,
    clients: Clients,
    gravity: Gravity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Queries {
    total: u64,
    blocked: u64,
    percent_blocked: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Clients {
    active: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Gravity {
    domains_being_blocked: u64,
}

/// Fetch the counters and draw the stats card
pub async fn render<D, F>(
    target: &mut D,
    fetch: &mut F,
    cfg: &StatsConfig,
    scratch: &mut [u8],
) -> Result<Outcome, PanelError>
where
    D: DrawTarget<Color = Spectrum>,
    F: Fetch,
{
    if cfg.endpoint.is_empty() || cfg.password.is_empty() {
        return Err(PanelError::ConfigMissing);
    }
    let summary = fetch_summary(fetch, cfg, scratch).await?;
    draw(target, &summary).map_err(|_| PanelError::Render)?;
    Ok(Outcome::Drawn)
}

async fn fetch_summary<F: Fetch>(
    fetch: &mut F,
    cfg: &StatsConfig,
    scratch: &mut [u8],
) -> Result<Summary, PanelError> {
    // Session auth first; the sid must be copied out before the scratch
    // buffer is reused for the summary request.
    let mut url: String<128> = String::new();
    write!(url, "{}/api/auth", cfg.endpoint).map_err(|_| ServiceError::Overflow)?;
    let mut body: String<96> = String::new();
    write!(body, "{{\"password\":\"{}\"}}", cfg.password).map_err(|_| ServiceError::Overflow)?;

    let n = fetch.post_json(&url, &body, scratch).await?;
    let (auth, _): (AuthReply, _) =
        serde_json_core::from_slice(&scratch[..n]).map_err(|_| ServiceError::Payload)?;
    let mut sid: String<MAX_SID_LEN> = String::new();
    sid.push_str(auth.session.sid)
        .map_err(|_| ServiceError::Payload)?;

    url.clear();
    write!(url, "{}/api/stats/summary", cfg.endpoint).map_err(|_| ServiceError::Overflow)?;
    let n = fetch
        .get(&url, &[("X-FTL-SID", sid.as_str())], scratch)
        .await?;
    let (summary, _): (Summary, _) =
        serde_json_core::from_slice(&scratch[..n]).map_err(|_| ServiceError::Payload)?;
    Ok(summary)
}

fn draw<D>(target: &mut D, summary: &Summary) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    layout::backdrop(target, Spectrum::White, Spectrum::Red, "Pi-hole")?;

    let mut lines: [String<48>; 5] = Default::default();
    let _ = write!(lines[0], "Unique Clients: {}", summary.clients.active);
    let _ = write!(lines[1], "Ads Blocked: {}", summary.queries.blocked);
    let _ = write!(lines[2], "DNS Queries: {}", summary.queries.total);
    let _ = write!(
        lines[3],
        "Domains Blocked: {}",
        summary.gravity.domains_being_blocked
    );
    let _ = write!(lines[4], "Blocked: {:.1}%", summary.queries.percent_blocked);

    let refs: [&str; 5] = [
        lines[0].as_str(),
        lines[1].as_str(),
        lines[2].as_str(),
        lines[3].as_str(),
        lines[4].as_str(),
    ];
    layout::centered_block(target, &refs, Spectrum::Black)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use zoetrope_display::FrameBuffer;

    const AUTH_JSON: &[u8] =
        br#"{"session":{"valid":true,"totp":false,"sid":"abc123DEF","validity":300}}"#;
    const SUMMARY_JSON: &[u8] = br#"{"queries":{"total":48211,"blocked":9120,"percent_blocked":18.9,"unique_domains":1832,"forwarded":30122,"cached":8969},"clients":{"active":12,"total":19},"gravity":{"domains_being_blocked":131744,"last_update":1754400000}}"#;

    struct CannedFetch {
        gets: usize,
        posts: usize,
        saw_sid_header: bool,
    }

    impl Fetch for CannedFetch {
        async fn get(
            &mut self,
            url: &str,
            headers: &[(&str, &str)],
            out: &mut [u8],
        ) -> Result<usize, ServiceError> {
            assert!(url.ends_with("/api/stats/summary"));
            self.gets += 1;
            self.saw_sid_header = headers
                .iter()
                .any(|&(k, v)| k == "X-FTL-SID" && v == "abc123DEF");
            out[..SUMMARY_JSON.len()].copy_from_slice(SUMMARY_JSON);
            Ok(SUMMARY_JSON.len())
        }

        async fn post_json(
            &mut self,
            url: &str,
            body: &str,
            out: &mut [u8],
        ) -> Result<usize, ServiceError> {
            assert!(url.ends_with("/api/auth"));
            assert_eq!(body, r#"{"password":"hunter2"}"#);
            self.posts += 1;
            out[..AUTH_JSON.len()].copy_from_slice(AUTH_JSON);
            Ok(AUTH_JSON.len())
        }
    }

    fn config() -> StatsConfig {
        let mut cfg = StatsConfig::default();
        cfg.endpoint.push_str("http://192.168.7.213").unwrap();
        cfg.password.push_str("hunter2").unwrap();
        cfg
    }

    #[test]
    fn test_summary_parses_with_extra_fields() {
        let (summary, _): (Summary, _) = serde_json_core::from_slice(SUMMARY_JSON).unwrap();
        assert_eq!(summary.queries.total, 48211);
        assert_eq!(summary.queries.blocked, 9120);
        assert_eq!(summary.clients.active, 12);
        assert_eq!(summary.gravity.domains_being_blocked, 131744);
    }

    #[test]
    fn test_render_authenticates_then_fetches() {
        let mut fetch = CannedFetch {
            gets: 0,
            posts: 0,
            saw_sid_header: false,
        };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 2048];

        let outcome = block_on(render(&mut fb, &mut fetch, &config(), &mut scratch)).unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(fetch.posts, 1);
        assert_eq!(fetch.gets, 1);
        assert!(fetch.saw_sid_header);
    }

    #[test]
    fn test_missing_password_degrades() {
        struct NeverFetch;
        impl Fetch for NeverFetch {
            async fn get(
                &mut self,
                _: &str,
                _: &[(&str, &str)],
                _: &mut [u8],
            ) -> Result<usize, ServiceError> {
                panic!("no network call expected");
            }
            async fn post_json(
                &mut self,
                _: &str,
                _: &str,
                _: &mut [u8],
            ) -> Result<usize, ServiceError> {
                panic!("no network call expected");
            }
        }

        let mut cfg = config();
        cfg.password.clear();
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 64];
        let err = block_on(render(&mut fb, &mut NeverFetch, &cfg, &mut scratch)).unwrap_err();
        assert_eq!(err, PanelError::ConfigMissing);
    }
}

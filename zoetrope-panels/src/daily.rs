//! Astronomy picture of the day panel
//!
//! Two requests: the metadata endpoint (media type, title, image URL), then
//! the image itself. Video days are skipped, the previous frame stays up.

use core::fmt::Write as _;

use embedded_graphics::image::Image;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use heapless::String;
use serde::Deserialize;
use tinybmp::Bmp;
use zoetrope_core::config::DailyImageConfig;
use zoetrope_core::error::PanelError;
use zoetrope_core::traits::{Fetch, ServiceError};
use zoetrope_display::Spectrum;

use crate::{layout, Outcome};

const MAX_TITLE_LEN: usize = 96;
const MAX_IMAGE_URL_LEN: usize = 160;

#[derive(Debug, Deserialize)]
struct Apod<'a> {
    media_type: &'a str,
    title: &'a str,
    url: &'a str,
}

/// Fetch today's picture and draw it with a title caption
pub async fn render<D, F>(
    target: &mut D,
    fetch: &mut F,
    cfg: &DailyImageConfig,
    scratch: &mut [u8],
) -> Result<Outcome, PanelError>
where
    D: DrawTarget<Color = Spectrum>,
    F: Fetch,
{
    if cfg.endpoint.is_empty() || cfg.api_key.is_empty() {
        return Err(PanelError::ConfigMissing);
    }

    let mut url: String<160> = String::new();
    write!(url, "{}?api_key={}", cfg.endpoint, cfg.api_key).map_err(|_| ServiceError::Overflow)?;
    let n = fetch.get(&url, &[], scratch).await?;
    let (apod, _): (Apod, _) =
        serde_json_core::from_slice(&scratch[..n]).map_err(|_| ServiceError::Payload)?;

    if apod.media_type != "image" {
        return Ok(Outcome::Skipped);
    }

    // Copy the borrowed fields out before the image request reuses scratch
    let mut title: String<MAX_TITLE_LEN> = String::new();
    let _ = title.push_str(apod.title);
    let mut image_url: String<MAX_IMAGE_URL_LEN> = String::new();
    image_url
        .push_str(apod.url)
        .map_err(|_| ServiceError::Payload)?;

    let n = fetch.get(&image_url, &[], scratch).await?;
    let bmp = Bmp::<Rgb888>::from_slice(&scratch[..n]).map_err(|_| PanelError::Render)?;

    target.clear(Spectrum::Black).map_err(|_| PanelError::Render)?;
    let bounds = target.bounding_box().size;
    let image_size = bmp.size();
    let offset = Point::new(
        bounds.width.saturating_sub(image_size.width) as i32 / 2,
        bounds.height.saturating_sub(image_size.height) as i32 / 2,
    );
    Image::new(&bmp, offset)
        .draw(&mut target.color_converted())
        .map_err(|_| PanelError::Render)?;

    if !title.is_empty() {
        layout::caption_bar(target, &title).map_err(|_| PanelError::Render)?;
    }
    Ok(Outcome::Drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use zoetrope_display::FrameBuffer;

    const VIDEO_JSON: &[u8] = br#"{"date":"2026-08-06","explanation":"...","media_type":"video","title":"A Total Eclipse","url":"https://www.youtube.com/embed/xyz"}"#;

    struct VideoDay;

    impl Fetch for VideoDay {
        async fn get(
            &mut self,
            url: &str,
            _headers: &[(&str, &str)],
            out: &mut [u8],
        ) -> Result<usize, ServiceError> {
            assert!(url.contains("api_key=demo"));
            out[..VIDEO_JSON.len()].copy_from_slice(VIDEO_JSON);
            Ok(VIDEO_JSON.len())
        }

        async fn post_json(
            &mut self,
            _: &str,
            _: &str,
            _: &mut [u8],
        ) -> Result<usize, ServiceError> {
            unreachable!("daily panel never posts");
        }
    }

    fn config() -> DailyImageConfig {
        let mut cfg = DailyImageConfig::default();
        cfg.endpoint.push_str("http://proxy.local/apod").unwrap();
        cfg.api_key.push_str("demo").unwrap();
        cfg
    }

    #[test]
    fn test_video_day_is_skipped() {
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 1024];
        let outcome = block_on(render(&mut fb, &mut VideoDay, &config(), &mut scratch)).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        // Frame untouched on a skip
        assert!(fb.data().iter().all(|&b| b == 0x11));
    }

    #[test]
    fn test_missing_key_degrades() {
        let mut cfg = config();
        cfg.api_key.clear();
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 64];
        let err = block_on(render(&mut fb, &mut VideoDay, &cfg, &mut scratch)).unwrap_err();
        assert_eq!(err, PanelError::ConfigMissing);
    }
}

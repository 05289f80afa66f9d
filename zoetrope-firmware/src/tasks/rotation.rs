//! The rotation controller task
//!
//! Drives the core scheduler: render the current panel, swallow and log
//! its failures, poll the buttons through the dwell window at 100 ms,
//! apply the resulting slot move. Runs for the life of the process.

use defmt::*;
use embassy_net::Stack;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use rand_core::RngCore;
use static_cell::ConstStaticCell;

use zoetrope_core::config::FrameConfig;
use zoetrope_core::error::PanelError;
use zoetrope_core::market::CachedQuote;
use zoetrope_core::playlist::PanelKind;
use zoetrope_core::rotation::{Followup, Rotation, BUTTON_POLL_MS};
use zoetrope_core::traits::ServiceError;
use zoetrope_display::{FrameBuffer, Spectrum, Uc8159};
use zoetrope_panels::Outcome;

use crate::buttons::Buttons;
use crate::clock;
use crate::flash::{FlashStore, StorageKey};
use crate::net::HttpClient;
use crate::photos::SdPhotoStore;

pub type EpdSpi = ExclusiveDevice<Spi<'static, SPI0, Async>, Output<'static>, NoDelay>;
pub type FramePanel = Uc8159<EpdSpi, Output<'static>, Output<'static>, Input<'static>, Delay>;

/// Scratch for HTTP bodies and photo files. Bounds the largest photo or
/// daily image the frame accepts.
const SCRATCH_BYTES: usize = 64 * 1024;

// Lives in .bss; taking it through a cell keeps the task re-entrant safe
static SCRATCH: ConstStaticCell<[u8; SCRATCH_BYTES]> = ConstStaticCell::new([0; SCRATCH_BYTES]);

#[embassy_executor::task]
#[allow(clippy::too_many_arguments)]
pub async fn rotation_task(
    mut rotation: Rotation,
    mut panel: FramePanel,
    frame: &'static mut FrameBuffer,
    buttons: Buttons,
    stack: Stack<'static>,
    config: &'static FrameConfig,
    mut flash: FlashStore<'static>,
    mut photo_store: SdPhotoStore,
) {
    info!("Rotation task started");

    let scratch = SCRATCH.take();
    let mut http = HttpClient::new(stack);
    let mut rng = RoscRng;
    let mut quote_cache = load_quote_cache(&mut flash).await;

    loop {
        let kind = rotation.current();
        debug!("Rendering slot {}: {}", rotation.index(), kind.name());

        let cached_at = quote_cache.as_ref().map(|q| q.fetched_at);
        let result = render_panel(
            kind,
            frame,
            &mut panel,
            &mut http,
            &mut photo_store,
            &mut quote_cache,
            config,
            &mut rng,
            &mut scratch[..],
        )
        .await;

        match &result {
            Ok(Outcome::Drawn) => info!("{}: drawn", kind.name()),
            Ok(Outcome::Skipped) => info!("{}: nothing to show, previous image stays", kind.name()),
            Err(e) => warn!("{}: render failed: {:?}", kind.name(), e),
        }

        // Persist a quote the market panel refreshed this cycle
        if quote_cache.as_ref().map(|q| q.fetched_at) != cached_at {
            if let Some(quote) = quote_cache.as_ref() {
                store_quote_cache(&mut flash, quote).await;
            }
        }

        rotation.render_completed(result.map(|_| ()));

        // Dwell window: sample the buttons every 100 ms until a press or
        // the timeout ends the wait
        let outcome = loop {
            if let Some(outcome) = rotation.poll(buttons.snapshot(), BUTTON_POLL_MS) {
                break outcome;
            }
            Timer::after_millis(BUTTON_POLL_MS as u64).await;
        };
        debug!("Wait over: {:?}", outcome);

        if let Followup::ClearDisplay = rotation.conclude(outcome) {
            info!("Clearing panel");
            if let Err(e) = panel.clear(Spectrum::White).await {
                warn!("Clear failed: {:?}", e);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn render_panel(
    kind: PanelKind,
    frame: &mut FrameBuffer,
    panel: &mut FramePanel,
    http: &mut HttpClient,
    photo_store: &mut SdPhotoStore,
    quote_cache: &mut Option<CachedQuote>,
    config: &'static FrameConfig,
    rng: &mut RoscRng,
    scratch: &mut [u8],
) -> Result<Outcome, PanelError> {
    let outcome = match kind {
        PanelKind::NetworkStats => {
            zoetrope_panels::netstats::render(frame, http, &config.stats, scratch).await?
        }
        PanelKind::Photo => {
            zoetrope_panels::photo::render(frame, photo_store, rng.next_u32(), scratch).await?
        }
        PanelKind::Market => {
            let now = wall_clock()?;
            zoetrope_panels::market::render(
                frame,
                http,
                &config.market,
                quote_cache,
                now,
                &mut Delay,
                scratch,
            )
            .await?
        }
        PanelKind::DailyImage => {
            zoetrope_panels::daily::render(frame, http, &config.daily, scratch).await?
        }
        PanelKind::Reminder => {
            let now = wall_clock()?;
            zoetrope_panels::reminder::render(frame, &config.reminders, now)?
        }
    };

    // Only a drawn frame touches the glass; skips keep the previous image
    if outcome == Outcome::Drawn {
        panel.update(frame).await.map_err(|_| PanelError::Render)?;
    }
    Ok(outcome)
}

/// Wall time for the date-sensitive panels; SNTP not having landed yet
/// reads as the network being down
fn wall_clock() -> Result<u64, PanelError> {
    clock::now_unix().ok_or(PanelError::Service(ServiceError::Timeout))
}

async fn load_quote_cache(flash: &mut FlashStore<'static>) -> Option<CachedQuote> {
    let mut buffer = [0u8; 128];
    let len = flash.read(StorageKey::QuoteCache, &mut buffer).await.ok()?;
    match postcard::from_bytes::<CachedQuote>(&buffer[..len]) {
        Ok(quote) => {
            info!("Quote cache restored: {} @ {}", quote.symbol.as_str(), quote.fetched_at);
            Some(quote)
        }
        Err(_) => {
            warn!("Quote cache corrupt, dropping it");
            None
        }
    }
}

async fn store_quote_cache(flash: &mut FlashStore<'static>, quote: &CachedQuote) {
    let mut buffer = [0u8; 128];
    match postcard::to_slice(quote, &mut buffer) {
        Ok(blob) => {
            if let Err(e) = flash.write(StorageKey::QuoteCache, blob).await {
                warn!("Quote cache write failed: {:?}", e);
            }
        }
        Err(_) => warn!("Quote cache serialize failed"),
    }
}

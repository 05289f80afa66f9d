//! Zoetrope - E-Ink Picture Frame Firmware
//!
//! Pico W firmware driving a UC8159 seven-colour panel: a rotating
//! slideshow of photos, Pi-hole stats, a stock chart, the astronomy
//! picture of the day, and birthday reminders, advanced by a dwell timer
//! or the four bezel buttons.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::spi::{self, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use zoetrope_core::config::{Border, FrameConfig};
use zoetrope_core::playlist::Playlist;
use zoetrope_core::rotation::Rotation;
use zoetrope_display::{FrameBuffer, Spectrum, Uc8159};

mod buttons;
mod clock;
mod config;
mod flash;
mod net;
mod photos;
mod tasks;
mod wifi;

/// Compiled-in default configuration; a flash copy overrides it
const EMBEDDED_CONFIG: &str = include_str!("../frame.toml");

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for state that tasks hold forever; the framebuffer is
// allocated in .bss rather than moved through the boot stack
static CONFIG: StaticCell<FrameConfig> = StaticCell::new();
static FRAME: ConstStaticCell<FrameBuffer> = ConstStaticCell::new(FrameBuffer::new());

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Zoetrope firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Load configuration from flash (or the embedded frame.toml)
    let mut store = flash::FlashStore::new(p.FLASH, p.DMA_CH1);
    let frame_config = config::load(&mut store, EMBEDDED_CONFIG).await;
    let frame_config = CONFIG.init(frame_config);
    info!(
        "Configuration loaded: dwell={}s, {} reminders",
        frame_config.dwell_secs,
        frame_config.reminders.len()
    );

    // SD card on SPI1 (blocking, init-safe clock). Enumerating the photo
    // directory is the one step allowed to kill the boot: a frame that
    // cannot list its photos has nothing to rotate.
    let mut sd_config = spi::Config::default();
    sd_config.frequency = 400_000;
    let sd_bus = Spi::new_blocking(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_8, sd_config);
    let sd_cs = Output::new(p.PIN_9, Level::High);
    let Ok(sd_device) = ExclusiveDevice::new(sd_bus, sd_cs, Delay);
    let photo_store = match photos::SdPhotoStore::new(sd_device) {
        Ok(store) => {
            info!("Photo directory: {} photos", store.len());
            store
        }
        Err(e) => {
            error!("Cannot enumerate photo directory: {:?}", e);
            core::panic!("photo directory unreadable");
        }
    };

    // E-ink panel on SPI0
    let mut epd_config = spi::Config::default();
    epd_config.frequency = 20_000_000;
    let epd_bus = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, epd_config);
    let epd_cs = Output::new(p.PIN_17, Level::High);
    let Ok(epd_device) = ExclusiveDevice::new(epd_bus, epd_cs, NoDelay);
    let dc = Output::new(p.PIN_20, Level::High);
    let rst = Output::new(p.PIN_21, Level::High);
    let busy = Input::new(p.PIN_26, Pull::None);
    let mut panel = Uc8159::new(epd_device, dc, rst, busy, Delay);
    panel.set_border(match frame_config.border {
        Border::White => Spectrum::White,
        Border::Black => Spectrum::Black,
    });
    match panel.init().await {
        Ok(()) => info!("Panel initialized"),
        // Not fatal: every later refresh surfaces as a panel render failure
        Err(e) => warn!("Panel init failed: {:?}", e),
    }

    // Bezel buttons, active low
    let frame_buttons = buttons::Buttons::new(
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
    );

    // Wi-Fi and network stack
    let stack = wifi::init(
        &spawner,
        wifi::WifiPeripherals {
            pwr: p.PIN_23,
            cs: p.PIN_25,
            pio: p.PIO0,
            dio: p.PIN_24,
            clk: p.PIN_29,
            dma: p.DMA_CH2,
        },
        &frame_config.wifi,
    )
    .await;

    // Wall clock via SNTP
    unwrap!(spawner.spawn(clock::clock_task(stack)));

    // The rotation itself. An empty playlist can only happen if the
    // standard list were edited down to nothing, but the check mirrors the
    // photo-directory one: enumeration failures end the boot.
    let rotation = match Rotation::new(Playlist::standard(), frame_config.dwell_secs) {
        Ok(rotation) => rotation,
        Err(e) => {
            error!("Cannot build panel rotation: {:?}", e);
            core::panic!("empty playlist");
        }
    };

    let frame = FRAME.take();
    unwrap!(spawner.spawn(tasks::rotation_task(
        rotation,
        panel,
        frame,
        frame_buttons,
        stack,
        frame_config,
        store,
        photo_store,
    )));

    info!("All tasks spawned, frame running");
}

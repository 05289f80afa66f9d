//! cyw43 Wi-Fi bring-up
//!
//! PIO-SPI to the on-board CYW43439, firmware blobs from the
//! cyw43-firmware crate, DHCP via embassy-net. Join retries forever: the
//! frame is useless without the network, and a router that is down at
//! boot usually comes back.

use cyw43::JoinOptions;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH2, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::Peri;
use embassy_time::Timer;
use rand_core::RngCore;
use static_cell::StaticCell;
use zoetrope_core::config::WifiConfig;

use crate::Irqs;

/// The Pico W wireless pins
pub struct WifiPeripherals {
    pub pwr: Peri<'static, PIN_23>,
    pub cs: Peri<'static, PIN_25>,
    pub pio: Peri<'static, PIO0>,
    pub dio: Peri<'static, PIN_24>,
    pub clk: Peri<'static, PIN_29>,
    pub dma: Peri<'static, DMA_CH2>,
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH2>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Bring the radio up, join the network, and wait for DHCP
pub async fn init(spawner: &Spawner, p: WifiPeripherals, cfg: &WifiConfig) -> Stack<'static> {
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(p.pwr, Level::Low);
    let cs = Output::new(p.cs, Level::High);
    let mut pio = Pio::new(p.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.dio,
        p.clk,
        p.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let net_config = Config::dhcpv4(Default::default());
    let mut rng = RoscRng;
    let seed = rng.next_u64();

    static RESOURCES: StaticCell<StackResources<6>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        net_config,
        RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(spawner.spawn(net_task(runner)));

    info!("Joining '{}'...", cfg.ssid.as_str());
    loop {
        let options = if cfg.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(cfg.password.as_bytes())
        };
        match control.join(&cfg.ssid, options).await {
            Ok(()) => break,
            Err(err) => {
                info!("Join failed with status={}", err.status);
                Timer::after_secs(1).await;
            }
        }
    }

    info!("Wi-Fi connected, waiting for DHCP...");
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP address: {}", config.address);
    }
    stack
}

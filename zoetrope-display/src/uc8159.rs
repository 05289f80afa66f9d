//! UC8159 panel driver
//!
//! Command sequencing for the 5.7" 600x448 seven-colour ACeP glass. SPI
//! writes are framed by the DC pin: low for the command byte, high for its
//! data. BUSY is held low while the controller works; a full colour refresh
//! takes on the order of 30 seconds, so the busy timeout is generous.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

use crate::buffer::{FrameBuffer, BUF_BYTES, HEIGHT, WIDTH};
use crate::color::Spectrum;

// UC8159 command set (the subset the frame uses)
const PSR: u8 = 0x00;
const PWR: u8 = 0x01;
const POF: u8 = 0x02;
const PFS: u8 = 0x03;
const PON: u8 = 0x04;
const BTST: u8 = 0x06;
const DSLP: u8 = 0x07;
const DTM1: u8 = 0x10;
const DRF: u8 = 0x12;
const PLL: u8 = 0x30;
const TSE: u8 = 0x41;
const CDI: u8 = 0x50;
const TCON: u8 = 0x60;
const TRES: u8 = 0x61;
const PWS: u8 = 0xE3;

/// Refresh must finish inside this window or the panel is considered hung
const BUSY_TIMEOUT_MS: u32 = 45_000;
/// Poll interval while the controller is busy
const BUSY_POLL_MS: u32 = 10;

/// Driver errors; all of them surface as panel render failures upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI transfer failed
    Spi,
    /// Control pin failed
    Pin,
    /// BUSY never released
    BusyTimeout,
}

/// UC8159 over SPI with DC/RST/BUSY control pins
pub struct Uc8159<SPI, DC, RST, BUSY, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    border: Spectrum,
}

impl<SPI, DC, RST, BUSY, D> Uc8159<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            border: Spectrum::White,
        }
    }

    /// Border colour applied on the next init/refresh
    pub fn set_border(&mut self, color: Spectrum) {
        self.border = color;
    }

    async fn command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi.write(&[command]).await.map_err(|_| DisplayError::Spi)?;
        if !data.is_empty() {
            self.dc.set_high().map_err(|_| DisplayError::Pin)?;
            self.spi.write(data).await.map_err(|_| DisplayError::Spi)?;
        }
        Ok(())
    }

    async fn busy_wait(&mut self) -> Result<(), DisplayError> {
        let mut waited_ms = 0;
        while self.busy.is_low().map_err(|_| DisplayError::Pin)? {
            if waited_ms >= BUSY_TIMEOUT_MS {
                return Err(DisplayError::BusyTimeout);
            }
            self.delay.delay_ms(BUSY_POLL_MS).await;
            waited_ms += BUSY_POLL_MS;
        }
        Ok(())
    }

    /// Hardware reset pulse
    async fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Pin)?;
        self.delay.delay_ms(10).await;
        self.rst.set_high().map_err(|_| DisplayError::Pin)?;
        self.delay.delay_ms(100).await;
        Ok(())
    }

    /// Power-on init sequence; call once after boot and after deep sleep
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.reset().await?;
        self.busy_wait().await?;

        let w = WIDTH as u16;
        let h = HEIGHT as u16;
        self.command(TRES, &[(w >> 8) as u8, w as u8, (h >> 8) as u8, h as u8])
            .await?;
        // 600x448 scan mode, LUT from OTP, booster on, no soft reset
        self.command(PSR, &[0xE3, 0x08]).await?;
        self.command(PWR, &[0x37, 0x00, 0x23, 0x23]).await?;
        self.command(PFS, &[0x00]).await?;
        self.command(BTST, &[0xC7, 0xC7, 0x1D]).await?;
        // 50 Hz frame rate
        self.command(PLL, &[0x3C]).await?;
        self.command(TSE, &[0x00]).await?;
        self.write_cdi().await?;
        self.command(TCON, &[0x22]).await?;
        self.command(PWS, &[0xAA]).await?;
        Ok(())
    }

    /// CDI carries the border ink in its top bits
    async fn write_cdi(&mut self) -> Result<(), DisplayError> {
        self.command(CDI, &[(self.border.nibble() << 5) | 0x17]).await
    }

    async fn refresh(&mut self) -> Result<(), DisplayError> {
        self.command(PON, &[]).await?;
        self.busy_wait().await?;
        self.command(DRF, &[]).await?;
        self.busy_wait().await?;
        self.command(POF, &[]).await?;
        self.busy_wait().await?;
        Ok(())
    }

    /// Push a full frame and refresh the glass
    pub async fn update(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        self.write_cdi().await?;
        self.command(DTM1, frame.data()).await?;
        self.refresh().await
    }

    /// Blank the panel to one ink without a framebuffer
    pub async fn clear(&mut self, color: Spectrum) -> Result<(), DisplayError> {
        let fill = (color.nibble() << 4) | color.nibble();
        let chunk = [fill; 256];

        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi.write(&[DTM1]).await.map_err(|_| DisplayError::Spi)?;
        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        let mut remaining = BUF_BYTES;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            self.spi.write(&chunk[..n]).await.map_err(|_| DisplayError::Spi)?;
            remaining -= n;
        }
        self.refresh().await
    }

    /// Enter deep sleep; needs a hardware reset (init) to wake
    pub async fn sleep(&mut self) -> Result<(), DisplayError> {
        self.command(POF, &[]).await?;
        self.busy_wait().await?;
        self.command(DSLP, &[0xA5]).await
    }
}

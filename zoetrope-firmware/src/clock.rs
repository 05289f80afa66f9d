//! SNTP wall clock
//!
//! The frame has no RTC. One NTP query pins unix time to the monotonic
//! clock; `now_unix` extrapolates from there. Initial sync retries with
//! backoff, then an hourly re-sync keeps drift irrelevant at e-ink
//! timescales.

use core::cell::Cell;

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{with_timeout, Duration, Instant, Timer};

const NTP_SERVER: &str = "pool.ntp.org";
const NTP_PORT: u16 = 123;
// NTP epoch is 1900-01-01, unix is 1970-01-01
const NTP_TO_UNIX_OFFSET: u64 = 2_208_988_800;

#[derive(Clone, Copy)]
struct SyncPoint {
    unix: u64,
    at: Instant,
}

static SYNC: Mutex<CriticalSectionRawMutex, Cell<Option<SyncPoint>>> =
    Mutex::new(Cell::new(None));

/// Unix seconds now; `None` until the first successful sync
pub fn now_unix() -> Option<u64> {
    SYNC.lock(|cell| cell.get().map(|s| s.unix + s.at.elapsed().as_secs()))
}

fn set_now(unix: u64) {
    SYNC.lock(|cell| {
        cell.set(Some(SyncPoint {
            unix,
            at: Instant::now(),
        }))
    });
}

#[embassy_executor::task]
pub async fn clock_task(stack: Stack<'static>) {
    info!("Clock task started");

    // Initial sync: 10s, 30s, 60s, then every 5 minutes until it lands
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match sntp_query(stack).await {
            Ok(unix) => {
                info!("Clock synced: unix={}", unix);
                set_now(unix);
                break;
            }
            Err(e) => {
                let delay_secs = match attempt {
                    1 => 10,
                    2 => 30,
                    3 => 60,
                    _ => 300,
                };
                warn!("Clock sync failed ({}), retrying in {}s", e, delay_secs);
                Timer::after_secs(delay_secs).await;
            }
        }
    }

    // Hourly re-sync; failures keep the old sync point
    loop {
        Timer::after_secs(3600).await;
        match sntp_query(stack).await {
            Ok(unix) => {
                debug!("Clock re-synced: unix={}", unix);
                set_now(unix);
            }
            Err(e) => warn!("Periodic clock sync failed: {}", e),
        }
    }
}

async fn sntp_query(stack: Stack<'static>) -> Result<u64, &'static str> {
    let addrs = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(|_| "DNS lookup failed")?;
    let server = *addrs.first().ok_or("no DNS results")?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| "socket bind failed")?;

    // 48-byte request: LI=0, VN=3, mode 3 (client)
    let mut request = [0u8; 48];
    request[0] = 0x1B;
    socket
        .send_to(&request, (server, NTP_PORT))
        .await
        .map_err(|_| "send failed")?;

    let mut response = [0u8; 48];
    let (n, _from) = with_timeout(Duration::from_secs(5), socket.recv_from(&mut response))
        .await
        .map_err(|_| "receive timeout")?
        .map_err(|_| "receive failed")?;
    if n < 48 {
        return Err("response too short");
    }

    // Transmit timestamp, seconds field, bytes 40-43 big-endian
    let seconds = u32::from_be_bytes([response[40], response[41], response[42], response[43]]) as u64;
    if seconds < NTP_TO_UNIX_OFFSET {
        return Err("invalid timestamp");
    }
    Ok(seconds - NTP_TO_UNIX_OFFSET)
}

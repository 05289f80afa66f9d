//! Flash-backed key-value store
//!
//! Wear-levelled map over the last 64 KiB of the Pico's 2 MB flash, via
//! sequential-storage. Holds the frame-configuration override and the
//! market panel's quote cache.

use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::{DMA_CH1, FLASH};
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Total flash on the Pico W
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Store partition at the top of flash
pub const STORE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORE_PARTITION_START: usize = FLASH_SIZE - STORE_PARTITION_SIZE;

/// Flash range for the store partition
pub const STORE_RANGE: core::ops::Range<u32> =
    (STORE_PARTITION_START as u32)..(FLASH_SIZE as u32);

// Partition must be erase-aligned
const _: () = assert!(STORE_PARTITION_SIZE % ERASE_SIZE == 0);

/// Largest value the store accepts
const MAX_VALUE_SIZE: usize = 2048;

/// Storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageKey {
    /// FrameConfig as a postcard blob
    FrameConfig = 0,
    /// CachedQuote as a postcard blob
    QuoteCache = 1,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        let key = match buffer[0] {
            0 => StorageKey::FrameConfig,
            1 => StorageKey::QuoteCache,
            _ => return Err(sequential_storage::map::SerializationError::InvalidFormat),
        };
        Ok((key, 1))
    }
}

/// Errors from flash operations
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Storage operation failed
    Storage,
    /// Key not present
    NotFound,
    /// Caller buffer too small for the stored value
    BufferTooSmall,
}

/// Flash store handle
pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, DMA_CH1>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the value for `key` into `out`, returning its length
    pub async fn read(&mut self, key: StorageKey, out: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; MAX_VALUE_SIZE];
        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                if out.len() < data.len() {
                    return Err(FlashError::BufferTooSmall);
                }
                out[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    /// Store `value` under `key`, replacing any previous value
    pub async fn write(&mut self, key: StorageKey, value: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; MAX_VALUE_SIZE];
        map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &value,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}

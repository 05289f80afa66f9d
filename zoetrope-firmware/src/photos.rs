//! SD-card photo store
//!
//! FAT volume on SPI1, photos as display-ready BMPs (at or below 600x448)
//! in `/PHOTOS`. The directory is enumerated once at boot - a failure
//! there is the one fatal error the firmware allows itself - and reads
//! afterwards reopen the path per file, which keeps no long-lived borrows
//! on the volume manager.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{Mode, SdCard, ShortFileName, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use heapless::Vec;
use zoetrope_core::traits::{PhotoStore, StoreError};

/// Listing capacity; extra files on the card are ignored
pub const MAX_PHOTOS: usize = 64;

const PHOTO_DIR: &str = "PHOTOS";

type SdSpi = ExclusiveDevice<Spi<'static, SPI1, Blocking>, Output<'static>, Delay>;
type SdVolumeManager = VolumeManager<SdCard<SdSpi, Delay>, Epoch>;

/// FAT wants timestamps for file writes; the store is read-only, so a
/// fixed epoch is fine.
struct Epoch;

impl TimeSource for Epoch {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// Errors while enumerating the photo directory at boot
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhotoDirError {
    /// No usable FAT volume
    Volume,
    /// `/PHOTOS` missing or unreadable
    Directory,
}

pub struct SdPhotoStore {
    volume_manager: SdVolumeManager,
    names: Vec<ShortFileName, MAX_PHOTOS>,
}

impl SdPhotoStore {
    /// Mount the card and list `/PHOTOS`
    pub fn new(spi: SdSpi) -> Result<Self, PhotoDirError> {
        let card = SdCard::new(spi, Delay);
        let mut volume_manager = VolumeManager::new(card, Epoch);

        let mut names: Vec<ShortFileName, MAX_PHOTOS> = Vec::new();
        {
            let mut volume = volume_manager
                .open_volume(VolumeIdx(0))
                .map_err(|_| PhotoDirError::Volume)?;
            let mut root = volume
                .open_root_dir()
                .map_err(|_| PhotoDirError::Directory)?;
            let mut dir = root
                .open_dir(PHOTO_DIR)
                .map_err(|_| PhotoDirError::Directory)?;
            dir.iterate_dir(|entry| {
                if !entry.attributes.is_directory() && entry.name.extension() == b"BMP" {
                    let _ = names.push(entry.name.clone());
                }
            })
            .map_err(|_| PhotoDirError::Directory)?;
        }

        Ok(Self {
            volume_manager,
            names,
        })
    }
}

impl PhotoStore for SdPhotoStore {
    fn len(&self) -> usize {
        self.names.len()
    }

    async fn read(&mut self, index: usize, out: &mut [u8]) -> Result<usize, StoreError> {
        let name = self.names.get(index).ok_or(StoreError::OutOfRange)?.clone();

        let mut volume = self
            .volume_manager
            .open_volume(VolumeIdx(0))
            .map_err(|_| StoreError::Io)?;
        let mut root = volume.open_root_dir().map_err(|_| StoreError::Io)?;
        let mut dir = root.open_dir(PHOTO_DIR).map_err(|_| StoreError::Io)?;
        let mut file = dir
            .open_file_in_dir(name, Mode::ReadOnly)
            .map_err(|_| StoreError::Io)?;

        if file.length() as usize > out.len() {
            return Err(StoreError::TooLarge);
        }
        let mut total = 0;
        while !file.is_eof() {
            let n = file.read(&mut out[total..]).map_err(|_| StoreError::Io)?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }
}

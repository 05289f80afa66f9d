//! Configuration loading
//!
//! Flash copy first (postcard blob written by the provisioning tool), the
//! embedded frame.toml as fallback. Loading never fails: a corrupt flash
//! blob or broken embedded file degrades to compiled defaults, which at
//! worst means panels skipping themselves for missing secrets.

use defmt::*;
use postcard::from_bytes;
use zoetrope_core::config::FrameConfig;

use super::toml::parse_config;
use crate::flash::{FlashError, FlashStore, StorageKey};

/// Maximum serialized config size
const MAX_CONFIG_SIZE: usize = 2048;

/// Load the frame configuration
pub async fn load(store: &mut FlashStore<'_>, embedded: &str) -> FrameConfig {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    match store.read(StorageKey::FrameConfig, &mut buffer).await {
        Ok(len) => match from_bytes::<FrameConfig>(&buffer[..len]) {
            Ok(config) => {
                info!("Loaded configuration from flash");
                return config;
            }
            Err(_) => warn!("Flash configuration corrupt, using embedded defaults"),
        },
        Err(FlashError::NotFound) => {
            info!("No flash configuration, using embedded defaults");
        }
        Err(e) => warn!("Flash read failed: {:?}", e),
    }

    match parse_config(embedded) {
        Ok(config) => config,
        Err(e) => {
            // Should never happen: build.rs validates frame.toml
            error!("Embedded frame.toml invalid: {:?}", e);
            FrameConfig::default()
        }
    }
}

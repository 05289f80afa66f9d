//! Board-agnostic core logic for the Zoetrope picture frame firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - The rotation scheduler (carousel index, dwell window, button interrupts)
//! - The panel registry
//! - Calendar math for reminders
//! - Market-day cache staleness
//! - Seam traits for HTTP fetching and photo storage
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod market;
pub mod playlist;
pub mod rotation;
pub mod traits;

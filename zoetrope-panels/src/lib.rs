//! Panel renderers for the Zoetrope frame
//!
//! One module per slideshow panel. Panels draw into any
//! `DrawTarget<Color = Spectrum>` and reach the outside world only through
//! the seam traits in `zoetrope-core`, so every panel also runs on the
//! host against canned data.

#![no_std]
#![deny(unsafe_code)]

pub mod chart;
pub mod daily;
pub mod layout;
pub mod market;
pub mod netstats;
pub mod photo;
pub mod reminder;

/// What a successful render left on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The target holds a new image; the caller refreshes the glass
    Drawn,
    /// Nothing to show this cycle; the previous image stays up
    Skipped,
}

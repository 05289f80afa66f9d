//! UC8159 seven-colour e-ink panel driver
//!
//! Split in three: the [`Spectrum`] palette type, a packed 4-bit
//! [`FrameBuffer`] that panels draw into through `embedded-graphics`, and
//! the [`Uc8159`] SPI driver that pushes a finished frame to the glass.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod color;
pub mod uc8159;

pub use buffer::{FrameBuffer, HEIGHT, WIDTH};
pub use color::Spectrum;
pub use uc8159::{DisplayError, Uc8159};

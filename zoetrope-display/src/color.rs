//! The seven-colour ACeP palette
//!
//! Enum values are the UC8159 data-nibble encodings; `Clean` is the
//! electrically-neutral state used when blanking the panel.

use embedded_graphics::pixelcolor::raw::RawU4;
use embedded_graphics::pixelcolor::{PixelColor, Rgb888, RgbColor};

/// One panel ink
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Spectrum {
    Black = 0,
    #[default]
    White = 1,
    Green = 2,
    Blue = 3,
    Red = 4,
    Yellow = 5,
    Orange = 6,
    Clean = 7,
}

impl PixelColor for Spectrum {
    type Raw = RawU4;
}

impl From<Spectrum> for RawU4 {
    fn from(color: Spectrum) -> Self {
        RawU4::new(color as u8)
    }
}

impl Spectrum {
    /// The UC8159 data nibble for this ink
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    /// Measured sRGB appearance of each ink, used for quantization
    pub const fn srgb(self) -> (u8, u8, u8) {
        match self {
            Spectrum::Black => (0, 0, 0),
            Spectrum::White => (255, 255, 255),
            Spectrum::Green => (0, 116, 62),
            Spectrum::Blue => (28, 62, 170),
            Spectrum::Red => (196, 42, 44),
            Spectrum::Yellow => (230, 210, 36),
            Spectrum::Orange => (226, 118, 36),
            Spectrum::Clean => (255, 255, 255),
        }
    }

    /// Nearest ink for an sRGB colour
    pub fn quantize(rgb: Rgb888) -> Self {
        const INKS: [Spectrum; 7] = [
            Spectrum::Black,
            Spectrum::White,
            Spectrum::Green,
            Spectrum::Blue,
            Spectrum::Red,
            Spectrum::Yellow,
            Spectrum::Orange,
        ];
        let mut best = Spectrum::White;
        let mut best_dist = i32::MAX;
        for ink in INKS {
            let (r, g, b) = ink.srgb();
            let dr = rgb.r() as i32 - r as i32;
            let dg = rgb.g() as i32 - g as i32;
            let db = rgb.b() as i32 - b as i32;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = ink;
            }
        }
        best
    }
}

// Lets BMP images (Rgb888) draw straight into a Spectrum target through
// `DrawTarget::color_converted`.
impl From<Rgb888> for Spectrum {
    fn from(rgb: Rgb888) -> Self {
        Self::quantize(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_values() {
        assert_eq!(Spectrum::Black.nibble(), 0);
        assert_eq!(Spectrum::White.nibble(), 1);
        assert_eq!(Spectrum::Clean.nibble(), 7);
    }

    #[test]
    fn test_quantize_primaries() {
        assert_eq!(Spectrum::quantize(Rgb888::new(0, 0, 0)), Spectrum::Black);
        assert_eq!(Spectrum::quantize(Rgb888::new(255, 255, 255)), Spectrum::White);
        assert_eq!(Spectrum::quantize(Rgb888::new(210, 40, 40)), Spectrum::Red);
        assert_eq!(Spectrum::quantize(Rgb888::new(20, 60, 180)), Spectrum::Blue);
        assert_eq!(Spectrum::quantize(Rgb888::new(0, 120, 60)), Spectrum::Green);
    }

    #[test]
    fn test_quantize_never_picks_clean() {
        for r in (0..=255u16).step_by(51) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(51) {
                    let ink = Spectrum::quantize(Rgb888::new(r as u8, g as u8, b as u8));
                    assert_ne!(ink, Spectrum::Clean);
                }
            }
        }
    }
}

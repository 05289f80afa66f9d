//! Packed framebuffer for the 600x448 panel
//!
//! Two 4-bit pixels per byte, even pixel in the high nibble, exactly the
//! layout the UC8159 DTM1 command expects, so a finished frame streams to
//! the panel without any repacking.

use embedded_graphics::prelude::*;
use embedded_graphics::Pixel;

use crate::color::Spectrum;

/// Panel width in pixels
pub const WIDTH: usize = 600;
/// Panel height in pixels
pub const HEIGHT: usize = 448;
/// Packed frame size in bytes
pub const BUF_BYTES: usize = WIDTH * HEIGHT / 2;

/// One full frame, heap-free
pub struct FrameBuffer {
    data: [u8; BUF_BYTES],
}

impl FrameBuffer {
    /// A white frame
    pub const fn new() -> Self {
        let white = Spectrum::White.nibble();
        Self {
            data: [white << 4 | white; BUF_BYTES],
        }
    }

    /// Flood the frame with one ink
    pub fn fill(&mut self, color: Spectrum) {
        let nibble = color.nibble();
        self.data = [nibble << 4 | nibble; BUF_BYTES];
    }

    /// Set a single pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Spectrum) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let index = y * WIDTH + x;
        let byte = &mut self.data[index / 2];
        if index % 2 == 0 {
            *byte = (*byte & 0x0F) | (color.nibble() << 4);
        } else {
            *byte = (*byte & 0xF0) | color.nibble();
        }
    }

    /// The packed frame, ready for DTM1
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Spectrum;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as usize, point.y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_white() {
        let fb = FrameBuffer::new();
        assert!(fb.data().iter().all(|&b| b == 0x11));
        assert_eq!(fb.data().len(), BUF_BYTES);
    }

    #[test]
    fn test_nibble_packing() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, Spectrum::Red);
        fb.set_pixel(1, 0, Spectrum::Blue);
        // Even pixel in the high nibble, odd in the low
        assert_eq!(fb.data()[0], 0x43);
        // Neighbouring byte untouched
        assert_eq!(fb.data()[1], 0x11);
    }

    #[test]
    fn test_row_addressing() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 1, Spectrum::Black);
        assert_eq!(fb.data()[WIDTH / 2], 0x01);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(WIDTH, 0, Spectrum::Black);
        fb.set_pixel(0, HEIGHT, Spectrum::Black);
        assert!(fb.data().iter().all(|&b| b == 0x11));
    }

    #[test]
    fn test_fill() {
        let mut fb = FrameBuffer::new();
        fb.fill(Spectrum::Yellow);
        assert!(fb.data().iter().all(|&b| b == 0x55));
    }

    #[test]
    fn test_draw_target_clips_negative() {
        use embedded_graphics::prelude::*;
        use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

        let mut fb = FrameBuffer::new();
        Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(Spectrum::Green))
            .draw(&mut fb)
            .unwrap();
        // Only the on-screen quadrant was written
        assert_eq!(fb.data()[0] >> 4, Spectrum::Green.nibble());
    }
}

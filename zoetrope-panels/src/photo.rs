//! Random photo panel
//!
//! Picks one photo from the card listing, decodes the BMP, and centres it
//! on a white frame. Photos are expected display-ready (at or below panel
//! resolution); oversized or undecodable files are a logged skip.

use embedded_graphics::image::Image;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use tinybmp::Bmp;
use zoetrope_core::error::PanelError;
use zoetrope_core::traits::PhotoStore;
use zoetrope_display::Spectrum;

use crate::Outcome;

/// Slot picked for a given entropy sample
pub fn pick(entropy: u32, count: usize) -> usize {
    entropy as usize % count
}

/// Draw one randomly chosen photo
pub async fn render<D, S>(
    target: &mut D,
    store: &mut S,
    entropy: u32,
    scratch: &mut [u8],
) -> Result<Outcome, PanelError>
where
    D: DrawTarget<Color = Spectrum>,
    S: PhotoStore,
{
    if store.is_empty() {
        return Err(PanelError::ConfigMissing);
    }
    let index = pick(entropy, store.len());
    let n = store
        .read(index, scratch)
        .await
        .map_err(|_| PanelError::Render)?;
    let bmp = Bmp::<Rgb888>::from_slice(&scratch[..n]).map_err(|_| PanelError::Render)?;

    target.clear(Spectrum::White).map_err(|_| PanelError::Render)?;
    let bounds = target.bounding_box().size;
    let image_size = bmp.size();
    let offset = Point::new(
        bounds.width.saturating_sub(image_size.width) as i32 / 2,
        bounds.height.saturating_sub(image_size.height) as i32 / 2,
    );
    Image::new(&bmp, offset)
        .draw(&mut target.color_converted())
        .map_err(|_| PanelError::Render)?;
    Ok(Outcome::Drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use zoetrope_core::traits::StoreError;
    use zoetrope_display::FrameBuffer;

    /// Minimal 24-bit 2x2 BMP: red/blue top row, green/black bottom row
    /// (rows are stored bottom-up, padded to four bytes)
    fn tiny_bmp() -> [u8; 70] {
        let mut bmp = [0u8; 70];
        // BITMAPFILEHEADER
        bmp[0] = b'B';
        bmp[1] = b'M';
        bmp[2..6].copy_from_slice(&70u32.to_le_bytes());
        bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // pixel offset
        // BITMAPINFOHEADER
        bmp[14..18].copy_from_slice(&40u32.to_le_bytes());
        bmp[18..22].copy_from_slice(&2i32.to_le_bytes()); // width
        bmp[22..26].copy_from_slice(&2i32.to_le_bytes()); // height
        bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
        bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
        bmp[34..38].copy_from_slice(&16u32.to_le_bytes()); // image size
        // Bottom row first, BGR: green then black
        bmp[54..57].copy_from_slice(&[0, 255, 0]);
        bmp[57..60].copy_from_slice(&[0, 0, 0]);
        // Top row: red then blue
        bmp[62..65].copy_from_slice(&[0, 0, 255]);
        bmp[65..68].copy_from_slice(&[255, 0, 0]);
        bmp
    }

    struct FakeStore {
        photos: usize,
        last_read: Option<usize>,
    }

    impl PhotoStore for FakeStore {
        fn len(&self) -> usize {
            self.photos
        }

        async fn read(&mut self, index: usize, out: &mut [u8]) -> Result<usize, StoreError> {
            if index >= self.photos {
                return Err(StoreError::OutOfRange);
            }
            self.last_read = Some(index);
            let bmp = tiny_bmp();
            out[..bmp.len()].copy_from_slice(&bmp);
            Ok(bmp.len())
        }
    }

    #[test]
    fn test_pick_wraps_over_listing() {
        assert_eq!(pick(0, 7), 0);
        assert_eq!(pick(6, 7), 6);
        assert_eq!(pick(7, 7), 0);
        assert_eq!(pick(0xFFFF_FFFF, 7), 0xFFFF_FFFF % 7);
    }

    #[test]
    fn test_render_draws_chosen_photo() {
        let mut store = FakeStore { photos: 5, last_read: None };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 256];

        let outcome = block_on(render(&mut fb, &mut store, 13, &mut scratch)).unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(store.last_read, Some(13 % 5));
        // The 2x2 image sits at the frame centre; its top-left pixel (red)
        // lands at (299, 223).
        let index = 223 * zoetrope_display::WIDTH + 299;
        let byte = fb.data()[index / 2];
        let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        assert_eq!(nibble, Spectrum::Red.nibble());
    }

    #[test]
    fn test_empty_store_degrades() {
        let mut store = FakeStore { photos: 0, last_read: None };
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 256];
        let err = block_on(render(&mut fb, &mut store, 1, &mut scratch)).unwrap_err();
        assert_eq!(err, PanelError::ConfigMissing);
    }

    #[test]
    fn test_garbage_file_is_render_error() {
        struct GarbageStore;
        impl PhotoStore for GarbageStore {
            fn len(&self) -> usize {
                1
            }
            async fn read(&mut self, _: usize, out: &mut [u8]) -> Result<usize, StoreError> {
                out[..4].copy_from_slice(b"JUNK");
                Ok(4)
            }
        }
        let mut fb = FrameBuffer::new();
        let mut scratch = [0u8; 64];
        let err = block_on(render(&mut fb, &mut GarbageStore, 0, &mut scratch)).unwrap_err();
        assert_eq!(err, PanelError::Render);
    }
}

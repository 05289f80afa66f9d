//! Text layout shared by the textual panels
//!
//! The originals drew centred multi-line blocks over full-screen background
//! art; here the backdrop is a flat fill with a heading strip, and the
//! block-centring math is the same.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use profont::{PROFONT_18_POINT, PROFONT_24_POINT};
use zoetrope_display::Spectrum;

/// Body text for stat lines and messages
pub const BODY_FONT: &MonoFont<'static> = &PROFONT_24_POINT;
/// Smaller face for chart labels and captions
pub const CAPTION_FONT: &MonoFont<'static> = &PROFONT_18_POINT;

/// Heading strip height in pixels
pub const HEADER_HEIGHT: u32 = 48;

/// Vertical gap between body lines
const LINE_SPACING: i32 = 14;

/// Flood the target and draw a heading strip along the top
pub fn backdrop<D>(
    target: &mut D,
    background: Spectrum,
    accent: Spectrum,
    heading: &str,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    target.clear(background)?;
    let width = target.bounding_box().size.width;
    Rectangle::new(Point::zero(), Size::new(width, HEADER_HEIGHT))
        .into_styled(PrimitiveStyle::with_fill(accent))
        .draw(target)?;
    let style = MonoTextStyle::new(BODY_FONT, Spectrum::White);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(
        heading,
        Point::new(width as i32 / 2, HEADER_HEIGHT as i32 / 2),
        style,
        text_style,
    )
    .draw(target)?;
    Ok(())
}

/// Draw `lines` as one block centred over the whole target
pub fn centered_block<D>(target: &mut D, lines: &[&str], ink: Spectrum) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    let size = target.bounding_box().size;
    let line_height = BODY_FONT.character_size.height as i32 + LINE_SPACING;
    let block_height = line_height * lines.len() as i32 - LINE_SPACING;
    let mut y = (size.height as i32 - block_height) / 2;
    let x = size.width as i32 / 2;

    let style = MonoTextStyle::new(BODY_FONT, ink);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    for line in lines {
        Text::with_text_style(line, Point::new(x, y), style, text_style).draw(target)?;
        y += line_height;
    }
    Ok(())
}

/// Caption strip along the bottom edge, for image titles
pub fn caption_bar<D>(target: &mut D, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    let size = target.bounding_box().size;
    let bar_height = CAPTION_FONT.character_size.height + 12;
    let top = size.height.saturating_sub(bar_height) as i32;
    Rectangle::new(Point::new(0, top), Size::new(size.width, bar_height))
        .into_styled(PrimitiveStyle::with_fill(Spectrum::Black))
        .draw(target)?;
    let style = MonoTextStyle::new(CAPTION_FONT, Spectrum::White);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(
        text,
        Point::new(size.width as i32 / 2, top + bar_height as i32 / 2),
        style,
        text_style,
    )
    .draw(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoetrope_display::FrameBuffer;

    #[test]
    fn test_backdrop_fills_and_strips() {
        let mut fb = FrameBuffer::new();
        backdrop(&mut fb, Spectrum::White, Spectrum::Red, "Pi-hole").unwrap();
        // Top-left pixel sits in the accent strip
        assert_eq!(fb.data()[0] >> 4, Spectrum::Red.nibble());
        // A pixel below the strip keeps the background
        let below = (HEADER_HEIGHT as usize + 4) * zoetrope_display::WIDTH / 2;
        assert_eq!(fb.data()[below] >> 4, Spectrum::White.nibble());
    }

    #[test]
    fn test_centered_block_draws_ink() {
        let mut fb = FrameBuffer::new();
        centered_block(&mut fb, &["Birthdays Today!", "Alice"], Spectrum::Black).unwrap();
        // Something black landed near the vertical centre
        let mid_rows = &fb.data()[(200 * zoetrope_display::WIDTH / 2)..(260 * zoetrope_display::WIDTH / 2)];
        assert!(mid_rows.iter().any(|&b| b >> 4 == 0 || b & 0x0F == 0));
    }
}

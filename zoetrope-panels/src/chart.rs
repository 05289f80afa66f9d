//! Close-price line chart
//!
//! Autoscaled polyline over a bordered plot area with min/max labels; the
//! e-ink replacement for the original's matplotlib figure.

use core::fmt::Write as _;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use zoetrope_display::Spectrum;

use crate::layout::CAPTION_FONT;

/// Padding between the plot border and the polyline
const PAD: i32 = 8;

/// Plot `closes` left-to-right inside `area`, autoscaled to the series
///
/// Series shorter than two points draw only the frame.
pub fn line_chart<D>(
    target: &mut D,
    area: Rectangle,
    closes: &[f32],
    ink: Spectrum,
    frame_ink: Spectrum,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Spectrum>,
{
    area.into_styled(PrimitiveStyle::with_stroke(frame_ink, 1))
        .draw(target)?;
    if closes.len() < 2 {
        return Ok(());
    }

    let (mut min, mut max) = (closes[0], closes[0]);
    for &v in closes {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    let span = if max - min < 0.01 { 0.01 } else { max - min };

    let left = area.top_left.x + PAD;
    let top = area.top_left.y + PAD;
    let width = area.size.width as i32 - 2 * PAD;
    let height = area.size.height as i32 - 2 * PAD;
    if width < 2 || height < 2 {
        return Ok(());
    }

    let point_at = |i: usize, v: f32| -> Point {
        let x = left + (i as i32) * (width - 1) / (closes.len() as i32 - 1);
        let y = top + (height - 1) - (((v - min) / span) * (height - 1) as f32) as i32;
        Point::new(x, y)
    };

    let mut prev = point_at(0, closes[0]);
    for (i, &v) in closes.iter().enumerate().skip(1) {
        let next = point_at(i, v);
        Line::new(prev, next)
            .into_styled(PrimitiveStyle::with_stroke(ink, 2))
            .draw(target)?;
        prev = next;
    }

    // Range labels in the plot corners
    let style = MonoTextStyle::new(CAPTION_FONT, frame_ink);
    let mut label: String<16> = String::new();
    let _ = write!(label, "{max:.1}");
    Text::with_baseline(&label, Point::new(left, top), style, Baseline::Top).draw(target)?;
    label.clear();
    let _ = write!(label, "{min:.1}");
    Text::with_baseline(
        &label,
        Point::new(left, top + height - 1),
        style,
        Baseline::Bottom,
    )
    .draw(target)?;
    Ok(())
}

//! Birthday reminder panel
//!
//! Compares the configured name -> date entries against today and, on a
//! match, puts up a congratulatory card. No match means no redraw: the
//! previous image keeps the screen for another dwell.

use embedded_graphics::prelude::*;
use heapless::Vec;
use zoetrope_core::calendar::{Anniversary, Date};
use zoetrope_core::config::{ReminderEntry, MAX_REMINDERS};
use zoetrope_core::error::PanelError;
use zoetrope_display::Spectrum;

use crate::{layout, Outcome};

/// Names whose anniversary falls on `today`
///
/// Entries with unparseable dates are ignored rather than failing the
/// panel; one bad line must not silence the others.
pub fn matches_on<'a>(
    entries: &'a [ReminderEntry],
    today: Date,
) -> Vec<&'a str, MAX_REMINDERS> {
    let mut names = Vec::new();
    for entry in entries {
        let hit = Anniversary::parse(&entry.date)
            .map(|a| a.falls_on(today))
            .unwrap_or(false);
        if hit {
            let _ = names.push(entry.name.as_str());
        }
    }
    names
}

/// Draw the birthday card when anyone matches today
pub fn render<D>(
    target: &mut D,
    entries: &[ReminderEntry],
    now_unix: u64,
) -> Result<Outcome, PanelError>
where
    D: DrawTarget<Color = Spectrum>,
{
    let today = Date::from_unix(now_unix);
    let names = matches_on(entries, today);
    if names.is_empty() {
        return Ok(Outcome::Skipped);
    }

    layout::backdrop(target, Spectrum::White, Spectrum::Orange, "Zoetrope")
        .map_err(|_| PanelError::Render)?;
    let mut lines: Vec<&str, { MAX_REMINDERS + 1 }> = Vec::new();
    let _ = lines.push("Birthdays Today!");
    for name in &names {
        let _ = lines.push(name);
    }
    layout::centered_block(target, &lines, Spectrum::Black).map_err(|_| PanelError::Render)?;
    Ok(Outcome::Drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoetrope_display::FrameBuffer;

    // 2026-03-05T09:00:00Z
    const MARCH_5: u64 = 1_772_701_200;
    const DAY: u64 = 86_400;

    fn entry(name: &str, date: &str) -> ReminderEntry {
        let mut e = ReminderEntry::default();
        e.name.push_str(name).unwrap();
        e.date.push_str(date).unwrap();
        e
    }

    #[test]
    fn test_alice_matches_march_fifth() {
        let entries = [entry("Alice", "05-03-1990")];
        let names = matches_on(&entries, Date::from_unix(MARCH_5));
        assert_eq!(names.as_slice(), ["Alice"]);
    }

    #[test]
    fn test_no_match_on_other_dates() {
        let entries = [entry("Alice", "05-03-1990")];
        for offset in 1..40 {
            let names = matches_on(&entries, Date::from_unix(MARCH_5 + offset * DAY));
            assert!(names.is_empty(), "unexpected match {offset} days later");
        }
    }

    #[test]
    fn test_yearless_dates_match_too() {
        let entries = [entry("Bob", "05-03")];
        let names = matches_on(&entries, Date::from_unix(MARCH_5));
        assert_eq!(names.as_slice(), ["Bob"]);
    }

    #[test]
    fn test_bad_entry_does_not_silence_others() {
        let entries = [entry("Mallory", "not-a-date"), entry("Alice", "05-03")];
        let names = matches_on(&entries, Date::from_unix(MARCH_5));
        assert_eq!(names.as_slice(), ["Alice"]);
    }

    #[test]
    fn test_render_skips_without_matches() {
        let entries = [entry("Alice", "05-03-1990")];
        let mut fb = FrameBuffer::new();
        let outcome = render(&mut fb, &entries, MARCH_5 + 30 * DAY).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(fb.data().iter().all(|&b| b == 0x11));
    }

    #[test]
    fn test_render_draws_on_match() {
        let entries = [entry("Alice", "05-03-1990"), entry("Bob", "05-03")];
        let mut fb = FrameBuffer::new();
        let outcome = render(&mut fb, &entries, MARCH_5).unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        let has_orange = fb
            .data()
            .iter()
            .any(|&b| b >> 4 == Spectrum::Orange.nibble());
        assert!(has_orange);
    }
}

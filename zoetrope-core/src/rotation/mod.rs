//! The slideshow scheduler
//!
//! Two phases drive the frame: `Rendering` while the current panel draws
//! (synchronous from the scheduler's point of view, no interrupts observed)
//! and `Waiting` while the dwell window polls the buttons. A render attempt
//! always ends in `Waiting`, whatever its outcome; the wait ends on a
//! timeout or a button interrupt, and [`Rotation::conclude`] applies the
//! slot mutation for whichever signal fired.
//!
//! Panel failures are bookkept here but never escalate: the rotation must
//! outlive any panel, and a permanently failing panel still costs exactly
//! one slot per cycle.

mod carousel;

pub use carousel::Carousel;

use crate::error::{FatalError, PanelError};
use crate::playlist::{PanelKind, Playlist};

/// Button sampling cadence during the dwell window, in milliseconds
pub const BUTTON_POLL_MS: u32 = 100;

/// Default dwell window in seconds
pub const DEFAULT_DWELL_SECS: u32 = 900;

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// The current panel is being rendered
    Rendering,
    /// The dwell window is open and buttons are being polled
    Waiting,
}

/// Raw button levels sampled on one poll tick
///
/// `true` means pressed. Field names follow the silkscreen on the frame
/// bezel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSnapshot {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub d: bool,
}

/// A button signal that shortcuts the dwell window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// Advance one slot, same as a timeout
    Skip,
    /// Jump back to the first slot
    Home,
    /// Blank the display, then advance one slot
    Clear,
}

impl ButtonSnapshot {
    /// Map pressed buttons to an interrupt
    ///
    /// A wins over B wins over D when several are held. C has no binding
    /// and is ignored.
    pub fn interrupt(self) -> Option<Interrupt> {
        if self.a {
            Some(Interrupt::Skip)
        } else if self.b {
            Some(Interrupt::Home)
        } else if self.d {
            Some(Interrupt::Clear)
        } else {
            None
        }
    }
}

/// Why a dwell wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// The dwell window lapsed with no button press
    Elapsed,
    /// A button fired
    Interrupted(Interrupt),
}

/// Side effect the caller must perform while concluding a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Followup {
    None,
    /// Blank the display before rendering the next slot
    ClearDisplay,
}

/// Render bookkeeping across the life of the rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotationStats {
    pub attempts: u32,
    pub failures: u32,
}

/// The panel rotation scheduler
#[derive(Debug)]
pub struct Rotation {
    playlist: Playlist,
    carousel: Carousel,
    phase: Phase,
    dwell_ms: u32,
    waited_ms: u32,
    stats: RotationStats,
    last_error: Option<PanelError>,
}

impl Rotation {
    /// Build a rotation over `playlist`, starting in `Rendering` at slot 0
    pub fn new(playlist: Playlist, dwell_secs: u32) -> Result<Self, FatalError> {
        let carousel = Carousel::new(playlist.len())?;
        Ok(Self {
            playlist,
            carousel,
            phase: Phase::Rendering,
            dwell_ms: dwell_secs.saturating_mul(1000),
            waited_ms: 0,
            stats: RotationStats::default(),
            last_error: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.carousel.index()
    }

    pub fn stats(&self) -> RotationStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<PanelError> {
        self.last_error
    }

    /// The panel owning the current slot
    pub fn current(&self) -> PanelKind {
        // Carousel::new was built from playlist.len(), so the index is
        // always a valid slot.
        self.playlist.as_slice()[self.carousel.index()]
    }

    /// Record a finished render attempt and open the dwell window
    ///
    /// Success and failure both land in `Waiting`; a failure is counted and
    /// kept for the log, nothing more.
    pub fn render_completed(&mut self, result: Result<(), PanelError>) {
        self.stats.attempts = self.stats.attempts.wrapping_add(1);
        if let Err(e) = result {
            self.stats.failures = self.stats.failures.wrapping_add(1);
            self.last_error = Some(e);
        }
        self.phase = Phase::Waiting;
        self.waited_ms = 0;
    }

    /// One dwell-window poll tick
    ///
    /// `elapsed_ms` is the time since the previous tick. Buttons are
    /// checked before the clock so a press observed on the final tick still
    /// wins. Returns the outcome once the wait is over, `None` while it
    /// continues; outside `Waiting` this is a no-op.
    pub fn poll(&mut self, buttons: ButtonSnapshot, elapsed_ms: u32) -> Option<WaitOutcome> {
        if self.phase != Phase::Waiting {
            return None;
        }
        if let Some(interrupt) = buttons.interrupt() {
            return Some(WaitOutcome::Interrupted(interrupt));
        }
        self.waited_ms = self.waited_ms.saturating_add(elapsed_ms);
        if self.waited_ms >= self.dwell_ms {
            Some(WaitOutcome::Elapsed)
        } else {
            None
        }
    }

    /// Apply the slot mutation for a finished wait and re-enter `Rendering`
    ///
    /// Timeout and Skip advance one slot, Home rewinds to slot 0, Clear
    /// advances after asking the caller to blank the display first.
    pub fn conclude(&mut self, outcome: WaitOutcome) -> Followup {
        let followup = match outcome {
            WaitOutcome::Elapsed | WaitOutcome::Interrupted(Interrupt::Skip) => {
                self.carousel.advance();
                Followup::None
            }
            WaitOutcome::Interrupted(Interrupt::Home) => {
                self.carousel.rewind();
                Followup::None
            }
            WaitOutcome::Interrupted(Interrupt::Clear) => {
                self.carousel.advance();
                Followup::ClearDisplay
            }
        };
        self.phase = Phase::Rendering;
        self.waited_ms = 0;
        followup
    }
}

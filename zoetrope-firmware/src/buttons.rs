//! The four bezel buttons
//!
//! Momentary switches to ground, pulled up, sampled at the rotation's
//! 100 ms poll cadence. No edge detection: the scheduler only cares
//! whether a button is down on a given tick.

use embassy_rp::gpio::Input;
use zoetrope_core::rotation::ButtonSnapshot;

pub struct Buttons {
    a: Input<'static>,
    b: Input<'static>,
    c: Input<'static>,
    d: Input<'static>,
}

impl Buttons {
    pub fn new(a: Input<'static>, b: Input<'static>, c: Input<'static>, d: Input<'static>) -> Self {
        Self { a, b, c, d }
    }

    /// Current levels, active low
    pub fn snapshot(&self) -> ButtonSnapshot {
        ButtonSnapshot {
            a: self.a.is_low(),
            b: self.b.is_low(),
            c: self.c.is_low(),
            d: self.d.is_low(),
        }
    }
}

//! Millisecond clock and the 6-bit debounce time base.
//!
//! The tick source increments a 16-bit counter once per millisecond and lets
//! it wrap. Debouncing only looks at the low six bits of that counter, giving
//! a 64 ms period that divides the 16-bit range evenly so that wraparound of
//! the full counter never disturbs the window arithmetic.

use core::cell::Cell;

/// Monotonic millisecond counter, wrapping at `u16::MAX`.
pub trait Clock {
    /// Current count. Must be read atomically with respect to the tick.
    fn now(&self) -> u16;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u16 {
        (**self).now()
    }
}

/// A clock driven by hand, for host simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: Cell<u16>,
}

impl ManualClock {
    pub const fn new(millis: u16) -> Self {
        Self {
            millis: Cell::new(millis),
        }
    }

    pub fn set(&self, millis: u16) {
        self.millis.set(millis);
    }

    /// Advance by `ms`, wrapping like the hardware counter.
    pub fn advance(&self, ms: u16) {
        self.millis.set(self.millis.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u16 {
        self.millis.get()
    }
}

/// Period of the debounce time base in milliseconds.
pub const TICK_PERIOD: u8 = 64;

const TICK_MASK: u8 = TICK_PERIOD - 1;

const _: () = assert!((u16::MAX as u32 + 1) % TICK_PERIOD as u32 == 0);

/// A millisecond timestamp reduced modulo [`TICK_PERIOD`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DebounceTick(u8);

impl DebounceTick {
    /// Reduce a full millisecond count to the 6-bit time base.
    pub const fn from_millis(millis: u16) -> Self {
        Self((millis as u8) & TICK_MASK)
    }

    /// `value` is reduced modulo [`TICK_PERIOD`].
    pub const fn new(value: u8) -> Self {
        Self(value & TICK_MASK)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn wrapping_add(self, ms: u8) -> Self {
        Self(self.0.wrapping_add(ms) & TICK_MASK)
    }

    /// Whether a window of `duration` ms starting here crosses the 64 ms
    /// boundary.
    pub const fn window_wraps(self, duration: u8) -> bool {
        self.0 as u16 + duration as u16 >= TICK_PERIOD as u16
    }
}

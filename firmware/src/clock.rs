//! Millisecond tick from TIMER1.
//!
//! TIMER1 runs in CTC mode without prescaling and fires COMPA every
//! 16000 cycles, i.e. once per millisecond at 16MHz.

use core::cell::Cell;

use avr_device::atmega328p::TC1;
use avr_device::interrupt::{self, Mutex};
use isogrid_core::Clock;

/// Clock cycles per tick.
const TIMER1_LEN: u16 = 16000;

/// Elapsed milliseconds, wrapping at 2^16.
static ELAPSED_MS: Mutex<Cell<u16>> = Mutex::new(Cell::new(0));

#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    interrupt::free(|cs| {
        let elapsed = ELAPSED_MS.borrow(cs);
        elapsed.set(elapsed.get().wrapping_add(1));
    });
}

/// Handle to the tick counter. Creating it starts the timer.
pub struct TimerClock {
    _tc1: TC1,
}

impl TimerClock {
    /// The tick only advances once interrupts are enabled globally.
    pub fn start(tc1: TC1) -> Self {
        tc1.tcnt1.write(|w| unsafe { w.bits(0) });
        tc1.ocr1a.write(|w| unsafe { w.bits(TIMER1_LEN - 1) });
        // CTC with TOP = OCR1A: WGM1 = 0b0100, the upper two bits live in TCCR1B
        tc1.tccr1a.write(|w| w.wgm1().bits(0b00));
        tc1.tccr1b.write(|w| w.wgm1().bits(0b01).cs1().direct());
        tc1.timsk1.write(|w| w.ocie1a().set_bit());

        Self { _tc1: tc1 }
    }
}

impl Clock for TimerClock {
    fn now(&self) -> u16 {
        // Two-byte read, must not straddle a tick
        interrupt::free(|cs| ELAPSED_MS.borrow(cs).get())
    }
}

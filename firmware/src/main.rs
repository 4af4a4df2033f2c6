//! isogrid MIDI controller firmware for ATmega328P (Arduino Uno class, 16MHz).
//!
//! - Key state polled from an MCP23017 I/O expander over TWI
//! - Per-key debouncing against a 1ms TIMER1 tick
//! - Isomorphic note layout, MIDI note-on/off on USART0

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod clock;
mod serial;
mod twi;

use avr_device::atmega328p::Peripherals;
use isogrid_core::config::EXPANDER_ADDR;
use isogrid_core::{Controller, Debouncer, EventTranslator, Layout, Mcp23017, SerialMidi};

use clock::TimerClock;
use serial::Usart0;
use twi::Twi;

/// Pause at boot so the expander is powered up before it is configured.
const BOOT_DELAY_MS: u16 = 1000;

/// On-board LED (PB5).
const LED: u8 = 1 << 5;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    delay_ms(BOOT_DELAY_MS);

    // LED on PB5 for diagnostics
    dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | LED) });

    let clock = TimerClock::start(dp.TC1);
    let usart = Usart0::init(dp.USART0);
    let twi = Twi::new(dp.TWI, &dp.PORTC);

    #[cfg(feature = "diagnostics")]
    let log = serial::SerialLog::new(usart);
    #[cfg(not(feature = "diagnostics"))]
    let log = isogrid_core::NullLog;

    // Start the millisecond tick
    unsafe { avr_device::interrupt::enable() };

    let mut controller = Controller::new(
        Mcp23017::new(twi, EXPANDER_ADDR),
        Debouncer::new(),
        EventTranslator::new(Layout::ISOMORPHIC),
        clock,
        SerialMidi::new(usart),
        log,
    );

    // Retried from the loop if the expander is not answering yet
    let _ = controller.start();

    // LED on to indicate firmware is running
    dp.PORTB
        .portb
        .modify(|r, w| unsafe { w.bits(r.bits() | LED) });

    controller.run()
}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn delay_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}

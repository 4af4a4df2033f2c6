//! USART0 output for MIDI and diagnostic text.
//!
//! Only one baud rate can be active, so the `diagnostics` feature decides
//! what the line carries: MIDI at 31250 baud by default, or MIDI bytes
//! interleaved with readable log text at 9600 baud for bench debugging.

use core::convert::Infallible;

use avr_device::atmega328p::USART0;
use isogrid_core::ByteSink;
#[cfg(feature = "diagnostics")]
use isogrid_core::DiagnosticLog;

/// UBRR0 for 31250 baud at 16MHz (MIDI).
#[cfg(not(feature = "diagnostics"))]
const UBRR_VALUE: u16 = 31;
/// UBRR0 for 9600 baud at 16MHz.
#[cfg(feature = "diagnostics")]
const UBRR_VALUE: u16 = 103;

/// Transmit side of USART0.
///
/// Copies share the one peripheral; all of them live on the control loop,
/// so bytes are never interleaved mid-write.
#[derive(Clone, Copy)]
pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    /// Configure the transmitter. Consumes the peripheral so this can only
    /// happen once.
    pub fn init(usart: USART0) -> Self {
        usart.ubrr0.write(|w| unsafe { w.bits(UBRR_VALUE) });
        // 8N1, asynchronous
        usart.ucsr0c.write(|w| {
            w.umsel0()
                .usart_async()
                .ucsz0()
                .chr8()
                .upm0()
                .disabled()
                .usbs0()
                .stop1()
        });
        usart.ucsr0b.write(|w| w.txen0().set_bit());

        Self { _private: () }
    }

    fn regs(&self) -> &'static avr_device::atmega328p::usart0::RegisterBlock {
        // Initialised in `init`, which took ownership of USART0.
        unsafe { &*USART0::ptr() }
    }
}

impl ByteSink for Usart0 {
    fn write_byte(&mut self, byte: u8) {
        let regs = self.regs();
        while regs.ucsr0a.read().udre0().bit_is_clear() {}
        regs.udr0.write(|w| unsafe { w.bits(byte) });
    }
}

impl ufmt::uWrite for Usart0 {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Diagnostic text on USART0.
#[cfg(feature = "diagnostics")]
pub struct SerialLog {
    port: Usart0,
}

#[cfg(feature = "diagnostics")]
impl SerialLog {
    pub fn new(port: Usart0) -> Self {
        Self { port }
    }
}

#[cfg(feature = "diagnostics")]
impl DiagnosticLog for SerialLog {
    fn write_text(&mut self, text: &str) {
        let _ = ufmt::uWrite::write_str(&mut self.port, text);
    }

    fn write_number(&mut self, number: u16) {
        let _ = ufmt::uwrite!(&mut self.port, "{}", number);
    }

    fn write_newline(&mut self) {
        let _ = ufmt::uwrite!(&mut self.port, "\r\n");
    }
}

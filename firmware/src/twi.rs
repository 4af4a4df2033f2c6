//! ATmega328P TWI (I2C) master, polled.
//!
//! SCL/SDA are PC5/PC4 with the internal pull-ups enabled in addition to
//! the board's external ones.

use avr_device::atmega328p::{PORTC, TWI};
use isogrid_core::bus::TwiBus;

/// TWI bit rate for ~100kHz at 16MHz CPU.
/// SCL freq = CPU_FREQ / (16 + 2 * TWBR * prescaler)
/// 100kHz = 16MHz / (16 + 2 * 72 * 1) => TWBR = 72
const TWBR_VALUE: u8 = 72;

pub struct Twi {
    twi: TWI,
}

impl Twi {
    /// Set the bit rate and enable the pin pull-ups. The peripheral itself is
    /// enabled by the first command.
    pub fn new(twi: TWI, portc: &PORTC) -> Self {
        twi.twbr.write(|w| unsafe { w.bits(TWBR_VALUE) });
        // Prescaler = 1 (TWPS = 0)
        twi.twsr.write(|w| w.twps().prescaler_1());
        portc
            .portc
            .modify(|r, w| unsafe { w.bits(r.bits() | 0x30) }); // PC4, PC5

        Self { twi }
    }
}

impl TwiBus for Twi {
    fn send_start(&mut self) {
        self.twi
            .twcr
            .write(|w| w.twint().set_bit().twsta().set_bit().twen().set_bit());
    }

    fn send_byte(&mut self, byte: u8) {
        self.twi.twdr.write(|w| unsafe { w.bits(byte) });
        self.twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
    }

    fn receive_nack(&mut self) {
        // TWEA left clear: the byte is answered with NACK
        self.twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
    }

    fn send_stop(&mut self) {
        self.twi
            .twcr
            .write(|w| w.twint().set_bit().twsto().set_bit().twen().set_bit());
    }

    fn is_complete(&self) -> bool {
        self.twi.twcr.read().twint().bit_is_set()
    }

    fn status(&self) -> u8 {
        // TWS is bits 7:3 of TWSR
        self.twi.twsr.read().tws().bits() << 3
    }

    fn data(&self) -> u8 {
        self.twi.twdr.read().bits()
    }
}

//! Register-level two-wire bus primitives.
//!
//! Mirrors the AVR TWI peripheral: each command starts one bus action and
//! sets a completion flag when done, after which the status register holds a
//! code describing what happened.

/// TWI status codes (upper five bits of TWSR).
pub mod status {
    /// START transmitted.
    pub const START: u8 = 0x08;
    /// Repeated START transmitted.
    pub const REP_START: u8 = 0x10;
    /// SLA+W transmitted, ACK received.
    pub const MT_SLA_ACK: u8 = 0x18;
    /// Data byte transmitted, ACK received.
    pub const MT_DATA_ACK: u8 = 0x28;
    /// Arbitration lost.
    pub const ARB_LOST: u8 = 0x38;
    /// SLA+R transmitted, ACK received.
    pub const MR_SLA_ACK: u8 = 0x40;
    /// SLA+R transmitted, NACK received.
    pub const MR_SLA_NACK: u8 = 0x48;
    /// Data byte received, NACK returned.
    pub const MR_DATA_NACK: u8 = 0x58;
}

/// A polled two-wire bus master.
pub trait TwiBus {
    /// Begin a START (or repeated START) condition.
    fn send_start(&mut self);
    /// Load `byte` into the data register and transmit it.
    fn send_byte(&mut self, byte: u8);
    /// Receive one byte, answering with NACK.
    fn receive_nack(&mut self);
    /// Issue a STOP condition. There is no completion flag for STOP.
    fn send_stop(&mut self);
    /// Whether the current action has finished.
    fn is_complete(&self) -> bool;
    /// Status code of the last finished action, prescaler bits masked off.
    fn status(&self) -> u8;
    /// Last received byte.
    fn data(&self) -> u8;
}

/// SLA+W byte for a 7-bit address.
pub const fn address_write(address: u8) -> u8 {
    address << 1
}

/// SLA+R byte for a 7-bit address.
pub const fn address_read(address: u8) -> u8 {
    (address << 1) | 0x01
}

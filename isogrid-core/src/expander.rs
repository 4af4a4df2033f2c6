//! MCP23017 I/O expander driver.
//!
//! All sixteen expander pins are key inputs with internal pull-ups, so a
//! pressed key reads low. Bank A carries keys 0-7 and bank B keys 8-15.
//!
//! Polling relies on state left in the chip by [`Mcp23017::configure`]:
//! IOCON.SEQOP is set (with BANK=0 the register pointer then toggles between
//! the A and B register of a pair instead of incrementing) and the pointer is
//! parked on GPIOA. Each refresh therefore reads two bytes with bare SLA+R
//! phases and never resends a register address.
//!
//! Every wait for the bus is bounded. A phase that fails or times out is
//! logged and the transaction carries on; the first fault is reported once
//! the STOP condition has been sent.

use crate::bus::{address_read, address_write, status, TwiBus};
use crate::config::BUS_WAIT_BUDGET;
use crate::diag::DiagnosticLog;
use crate::keys::KeyBitmap;

// MCP23017 register addresses (IOCON.BANK = 0, default)
const IODIRA: u8 = 0x00; // I/O direction register A
const IODIRB: u8 = 0x01; // I/O direction register B
const IOCON: u8 = 0x0A; // Configuration register
const GPPUA: u8 = 0x0C; // Pull-up resistor register A
const GPPUB: u8 = 0x0D; // Pull-up resistor register B
const GPIOA: u8 = 0x12; // Port A register

/// IOCON value: sequential operation disabled.
const IOCON_SEQOP: u8 = 0x20;

/// Register writes performed at boot, in order.
const BOOT_WRITES: [(u8, u8); 5] = [
    (IODIRA, 0xFF), // all inputs
    (IODIRB, 0xFF),
    (GPPUA, 0xFF), // pull-ups on every input
    (GPPUB, 0xFF),
    (IOCON, IOCON_SEQOP),
];

/// Step of a bus transaction, for fault reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    RepeatedStart,
    AddressWrite,
    AddressRead,
    RegisterSelect,
    DataWrite,
    DataReceive,
}

impl Phase {
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Start => "S transmission",
            Phase::RepeatedStart => "RS transmission",
            Phase::AddressWrite | Phase::AddressRead => "SLA transmission",
            Phase::RegisterSelect | Phase::DataWrite => "Data transmission",
            Phase::DataReceive => "Data receive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusFault {
    /// A phase finished with a status code other than the expected one.
    UnexpectedStatus { phase: Phase, expected: u8, actual: u8 },
    /// The completion flag never rose within the wait budget.
    Timeout { phase: Phase },
    /// The expander has not been configured, nothing was read.
    NotConfigured,
}

impl BusFault {
    /// Write a one-line report to the diagnostic log.
    pub fn log<L: DiagnosticLog + ?Sized>(&self, log: &mut L) {
        match *self {
            BusFault::UnexpectedStatus { phase, actual, .. } => {
                log.write_text(phase.label());
                log.write_text(": Error ");
                log.write_number(actual as u16);
            }
            BusFault::Timeout { phase } => {
                log.write_text(phase.label());
                log.write_text(": Timeout");
            }
            BusFault::NotConfigured => log.write_text("Expander not configured"),
        }
        log.write_newline();
    }
}

/// One START..STOP sequence that keeps going past faults.
struct Transaction<'a, B, L: ?Sized> {
    bus: &'a mut B,
    log: &'a mut L,
    wait_budget: u16,
    fault: Option<BusFault>,
}

impl<'a, B: TwiBus, L: DiagnosticLog + ?Sized> Transaction<'a, B, L> {
    fn new(bus: &'a mut B, log: &'a mut L, wait_budget: u16) -> Self {
        Self {
            bus,
            log,
            wait_budget,
            fault: None,
        }
    }

    fn start(&mut self) {
        self.bus.send_start();
        self.expect(Phase::Start, status::START);
    }

    fn restart(&mut self) {
        self.bus.send_start();
        self.expect(Phase::RepeatedStart, status::REP_START);
    }

    fn write(&mut self, phase: Phase, byte: u8, expected: u8) {
        self.bus.send_byte(byte);
        self.expect(phase, expected);
    }

    /// Receive a single byte and end the burst with NACK.
    fn read_nack(&mut self) -> u8 {
        self.bus.receive_nack();
        self.expect(Phase::DataReceive, status::MR_DATA_NACK);
        self.bus.data()
    }

    fn stop(self) -> Result<(), BusFault> {
        self.bus.send_stop();
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn expect(&mut self, phase: Phase, expected: u8) {
        if !self.wait() {
            self.report(BusFault::Timeout { phase });
            return;
        }
        let actual = self.bus.status();
        if actual != expected {
            self.report(BusFault::UnexpectedStatus {
                phase,
                expected,
                actual,
            });
        }
    }

    fn wait(&self) -> bool {
        let mut budget = self.wait_budget;
        while !self.bus.is_complete() {
            if budget == 0 {
                return false;
            }
            budget -= 1;
        }
        true
    }

    fn report(&mut self, fault: BusFault) {
        fault.log(&mut *self.log);
        self.fault.get_or_insert(fault);
    }
}

pub struct Mcp23017<B> {
    bus: B,
    address: u8,
    wait_budget: u16,
    configured: bool,
    raw: KeyBitmap,
}

impl<B: TwiBus> Mcp23017<B> {
    pub const fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            wait_budget: BUS_WAIT_BUDGET,
            configured: false,
            raw: KeyBitmap::EMPTY,
        }
    }

    pub fn with_wait_budget(mut self, budget: u16) -> Self {
        self.wait_budget = budget;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Most recently published raw key state.
    pub fn raw(&self) -> KeyBitmap {
        self.raw
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Configure every pin as a pulled-up input and park the register
    /// pointer on GPIOA. Must succeed before [`refresh`](Self::refresh)
    /// reads anything.
    pub fn configure<L: DiagnosticLog + ?Sized>(&mut self, log: &mut L) -> Result<(), BusFault> {
        let sla_w = address_write(self.address);
        let mut tx = Transaction::new(&mut self.bus, log, self.wait_budget);

        tx.start();
        for (register, value) in BOOT_WRITES {
            tx.write(Phase::AddressWrite, sla_w, status::MT_SLA_ACK);
            tx.write(Phase::RegisterSelect, register, status::MT_DATA_ACK);
            tx.write(Phase::DataWrite, value, status::MT_DATA_ACK);
            tx.restart();
        }
        // Select GPIOA without writing to it
        tx.write(Phase::AddressWrite, sla_w, status::MT_SLA_ACK);
        tx.write(Phase::RegisterSelect, GPIOA, status::MT_DATA_ACK);
        let result = tx.stop();

        self.configured = result.is_ok();
        result
    }

    /// Read both input banks and publish them as the raw key state.
    ///
    /// Best effort: faults are logged, the sequence still runs to STOP and
    /// whatever bytes arrived are published. Without a successful
    /// [`configure`](Self::configure) no bus traffic happens and an
    /// all-released state is published instead.
    pub fn refresh<L: DiagnosticLog + ?Sized>(&mut self, log: &mut L) -> Result<(), BusFault> {
        if !self.configured {
            self.raw = KeyBitmap::EMPTY;
            return Err(BusFault::NotConfigured);
        }

        let sla_r = address_read(self.address);
        let mut tx = Transaction::new(&mut self.bus, log, self.wait_budget);

        tx.start();
        tx.write(Phase::AddressRead, sla_r, status::MR_SLA_ACK);
        let bank_a = tx.read_nack();
        tx.restart();
        tx.write(Phase::AddressRead, sla_r, status::MR_SLA_ACK);
        let bank_b = tx.read_nack();
        let result = tx.stop();

        // Active low
        self.raw = KeyBitmap::from_banks(!bank_a, !bank_b);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyIndex;
    use crate::test_utils::{BusOp, MockBus, RecordingLog};

    const ADDR: u8 = 0x20;

    fn configured(ports: [u8; 2]) -> (Mcp23017<MockBus>, RecordingLog) {
        let mut log = RecordingLog::default();
        let mut mcp = Mcp23017::new(MockBus::with_ports(ports), ADDR);
        mcp.configure(&mut log).unwrap();
        mcp.bus_mut().reset_trace();
        (mcp, log)
    }

    #[test]
    fn test_configure_writes_boot_registers() {
        let mut log = RecordingLog::default();
        let mut mcp = Mcp23017::new(MockBus::default(), ADDR);

        assert_eq!(mcp.configure(&mut log), Ok(()));
        assert!(mcp.is_configured());
        assert_eq!(
            mcp.bus().register_writes,
            vec![(0x00, 0xFF), (0x01, 0xFF), (0x0C, 0xFF), (0x0D, 0xFF), (0x0A, 0x20)]
        );
        assert_eq!(mcp.bus().selected_register, Some(GPIOA));
        assert_eq!(mcp.bus().ops.first(), Some(&BusOp::Start));
        assert_eq!(mcp.bus().ops.last(), Some(&BusOp::Stop));
        assert!(log.text.is_empty());
    }

    #[test]
    fn test_refresh_sequence() {
        let (mut mcp, _) = configured([0xFF, 0xFF]);
        let mut log = RecordingLog::default();

        assert_eq!(mcp.refresh(&mut log), Ok(()));
        assert_eq!(
            mcp.bus().ops,
            vec![
                BusOp::Start,
                BusOp::Byte(0x41),
                BusOp::ReceiveNack,
                BusOp::Start,
                BusOp::Byte(0x41),
                BusOp::ReceiveNack,
                BusOp::Stop,
            ]
        );
        assert!(mcp.raw().is_empty());
    }

    #[test]
    fn test_refresh_inverts_and_packs_banks() {
        // Key 0 on bank A and key 9 on bank B pulled low
        let (mut mcp, mut log) = configured([!0x01, !0x02]);
        mcp.refresh(&mut log).unwrap();

        let raw = mcp.raw();
        assert_eq!(raw.bits(), 0x0201);
        assert!(raw.state(KeyIndex::new(0).unwrap()).is_pressed());
        assert!(raw.state(KeyIndex::new(9).unwrap()).is_pressed());
    }

    #[test]
    fn test_fault_is_logged_and_sequence_continues() {
        let (mut mcp, mut log) = configured([!0x04, 0xFF]);
        // Second SLA+R answered with NACK
        mcp.bus_mut().override_status(4, status::MR_SLA_NACK);

        let result = mcp.refresh(&mut log);
        assert_eq!(
            result,
            Err(BusFault::UnexpectedStatus {
                phase: Phase::AddressRead,
                expected: status::MR_SLA_ACK,
                actual: status::MR_SLA_NACK,
            })
        );
        assert_eq!(log.text, "SLA transmission: Error 72\n");
        assert_eq!(mcp.bus().ops.len(), 7);
        assert_eq!(mcp.bus().ops.last(), Some(&BusOp::Stop));
        // Bank A still made it into the published state
        assert!(mcp.raw().state(KeyIndex::new(2).unwrap()).is_pressed());
    }

    #[test]
    fn test_first_fault_is_reported() {
        let (mut mcp, mut log) = configured([0xFF, 0xFF]);
        mcp.bus_mut().override_status(0, status::ARB_LOST);
        mcp.bus_mut().override_status(5, 0x50);

        let result = mcp.refresh(&mut log);
        assert!(matches!(
            result,
            Err(BusFault::UnexpectedStatus {
                phase: Phase::Start,
                ..
            })
        ));
        assert_eq!(log.text, "S transmission: Error 56\nData receive: Error 80\n");
    }

    #[test]
    fn test_stalled_bus_times_out() {
        let mut log = RecordingLog::default();
        let mut mcp = Mcp23017::new(MockBus::default(), ADDR).with_wait_budget(16);
        mcp.configure(&mut log).unwrap();
        mcp.bus_mut().reset_trace();
        mcp.bus_mut().stall_at = Some(2);

        let result = mcp.refresh(&mut log);
        assert_eq!(
            result,
            Err(BusFault::Timeout {
                phase: Phase::DataReceive,
            })
        );
        assert_eq!(log.text, "Data receive: Timeout\n");
        assert_eq!(mcp.bus().ops.last(), Some(&BusOp::Stop));
    }

    #[test]
    fn test_failed_configure_blocks_refresh() {
        let mut log = RecordingLog::default();
        let mut bus = MockBus::with_ports([0x00, 0x00]);
        bus.override_status(1, status::ARB_LOST);
        let mut mcp = Mcp23017::new(bus, ADDR);

        assert!(mcp.configure(&mut log).is_err());
        assert!(!mcp.is_configured());
        assert!(log.text.starts_with("SLA transmission: Error"));

        mcp.bus_mut().reset_trace();
        assert_eq!(mcp.refresh(&mut log), Err(BusFault::NotConfigured));
        assert!(mcp.raw().is_empty());
        assert!(mcp.bus().ops.is_empty());
    }
}

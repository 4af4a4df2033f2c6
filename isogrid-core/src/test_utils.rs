//! Test doubles for the hardware traits.

use crate::bus::{status, TwiBus};
use crate::diag::DiagnosticLog;
use crate::midi::{MidiTransport, NoteEvent};

/// A bus action as seen on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Start,
    Byte(u8),
    ReceiveNack,
    Stop,
}

/// Scripted MCP23017 behind a well-behaved bus.
///
/// Answers every action with the status a healthy device would produce,
/// unless overridden. Actions that set the completion flag are counted from
/// zero since the last [`reset_trace`](Self::reset_trace).
#[derive(Debug, Default)]
pub struct MockBus {
    pub ops: Vec<BusOp>,
    /// Pin levels of GPIOA and GPIOB.
    pub ports: [u8; 2],
    pub register_writes: Vec<(u8, u8)>,
    pub selected_register: Option<u8>,
    /// Action index that never completes.
    pub stall_at: Option<usize>,
    overrides: Vec<(usize, u8)>,
    actions: usize,
    complete: bool,
    status: u8,
    data: u8,
    in_transaction: bool,
    expect_address: bool,
    bytes_since_address: usize,
    pointer: usize,
}

impl MockBus {
    pub fn with_ports(ports: [u8; 2]) -> Self {
        Self {
            ports,
            ..Self::default()
        }
    }

    /// Report `status` for action `index` instead of the healthy code.
    pub fn override_status(&mut self, index: usize, status: u8) {
        self.overrides.push((index, status));
    }

    pub fn reset_trace(&mut self) {
        self.ops.clear();
        self.overrides.clear();
        self.actions = 0;
    }

    fn finish(&mut self, status: u8) {
        let index = self.actions;
        self.actions += 1;
        self.complete = self.stall_at != Some(index);
        self.status = self
            .overrides
            .iter()
            .find(|(i, _)| *i == index)
            .map_or(status, |&(_, s)| s);
    }
}

impl TwiBus for MockBus {
    fn send_start(&mut self) {
        self.ops.push(BusOp::Start);
        let code = if self.in_transaction {
            status::REP_START
        } else {
            status::START
        };
        self.in_transaction = true;
        self.expect_address = true;
        self.finish(code);
    }

    fn send_byte(&mut self, byte: u8) {
        self.ops.push(BusOp::Byte(byte));
        if self.expect_address {
            self.expect_address = false;
            self.bytes_since_address = 0;
            let code = if byte & 0x01 != 0 {
                status::MR_SLA_ACK
            } else {
                status::MT_SLA_ACK
            };
            self.finish(code);
            return;
        }

        if self.bytes_since_address == 0 {
            self.selected_register = Some(byte);
            match byte {
                0x12 => self.pointer = 0,
                0x13 => self.pointer = 1,
                _ => {}
            }
        } else if let Some(register) = self.selected_register {
            self.register_writes.push((register, byte));
        }
        self.bytes_since_address += 1;
        self.finish(status::MT_DATA_ACK);
    }

    fn receive_nack(&mut self) {
        self.ops.push(BusOp::ReceiveNack);
        self.data = self.ports[self.pointer];
        self.pointer ^= 1;
        self.finish(status::MR_DATA_NACK);
    }

    fn send_stop(&mut self) {
        self.ops.push(BusOp::Stop);
        self.in_transaction = false;
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn status(&self) -> u8 {
        self.status
    }

    fn data(&self) -> u8 {
        self.data
    }
}

#[derive(Debug, Default)]
pub struct RecordingLog {
    pub text: String,
}

impl DiagnosticLog for RecordingLog {
    fn write_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn write_number(&mut self, number: u16) {
        self.text.push_str(&number.to_string());
    }

    fn write_newline(&mut self) {
        self.text.push('\n');
    }
}

#[derive(Debug, Default)]
pub struct RecordingMidi {
    pub events: Vec<NoteEvent>,
}

impl MidiTransport for RecordingMidi {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.events.push(NoteEvent::on(note, velocity));
    }

    fn note_off(&mut self, note: u8) {
        self.events.push(NoteEvent::off(note));
    }
}

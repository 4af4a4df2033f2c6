//! MIDI note events and a serial transport for them.

use crate::config::MIDI_CHANNEL;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// Destination for note messages. Assumed never to fail.
pub trait MidiTransport {
    fn note_on(&mut self, note: u8, velocity: u8);
    fn note_off(&mut self, note: u8);

    fn send(&mut self, event: NoteEvent) {
        match event.kind {
            NoteKind::On => self.note_on(event.note, event.velocity),
            NoteKind::Off => self.note_off(event.note),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    pub kind: NoteKind,
}

impl NoteEvent {
    pub const fn on(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity,
            kind: NoteKind::On,
        }
    }

    pub const fn off(note: u8) -> Self {
        Self {
            note,
            velocity: 0,
            kind: NoteKind::Off,
        }
    }

    /// Three-byte channel voice message. Note-off is sent with velocity 0.
    /// Note and velocity must already be 7-bit data bytes.
    pub const fn to_bytes(self, channel: u8) -> [u8; 3] {
        debug_assert!(self.note <= 0x7F && self.velocity <= 0x7F);
        let status = match self.kind {
            NoteKind::On => NOTE_ON,
            NoteKind::Off => NOTE_OFF,
        };
        [
            status | (channel & 0x0F),
            self.note,
            self.velocity,
        ]
    }
}

/// Serial byte output.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8);
}

/// MIDI 1.0 over a serial byte stream, no running status.
pub struct SerialMidi<W> {
    port: W,
    channel: u8,
}

impl<W: ByteSink> SerialMidi<W> {
    pub const fn new(port: W) -> Self {
        Self::with_channel(port, MIDI_CHANNEL)
    }

    pub const fn with_channel(port: W, channel: u8) -> Self {
        Self { port, channel }
    }

    pub fn port(&self) -> &W {
        &self.port
    }

    fn write_event(&mut self, event: NoteEvent) {
        for byte in event.to_bytes(self.channel) {
            self.port.write_byte(byte);
        }
    }
}

impl<W: ByteSink> MidiTransport for SerialMidi<W> {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.write_event(NoteEvent::on(note, velocity));
    }

    fn note_off(&mut self, note: u8) {
        self.write_event(NoteEvent::off(note));
    }
}

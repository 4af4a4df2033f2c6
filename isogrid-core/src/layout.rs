//! Isomorphic key layout and translation of transitions into note events.
//!
//! Keys are numbered row by row. Moving one key along a row raises the
//! pitch by a semitone, moving one row up raises it by `row_stride`
//! semitones (13 by default, a minor ninth), so every chord shape plays the
//! same anywhere on the grid.

use crate::config::{KEYS_PER_ROW, KEY_COUNT, NOTE_ON_VELOCITY, ROW_STRIDE};
use crate::debounce::Transition;
use crate::keys::{KeyIndex, KeyState};
use crate::midi::{MidiTransport, NoteEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    keys_per_row: u8,
    row_stride: u8,
}

impl Layout {
    pub const ISOMORPHIC: Self = Self::new(KEYS_PER_ROW, ROW_STRIDE);

    /// Panics if a row is empty or the last key would land above note 127.
    pub const fn new(keys_per_row: u8, row_stride: u8) -> Self {
        assert!(keys_per_row > 0, "a row needs at least one key");
        let last = (KEY_COUNT as u16 - 1) / keys_per_row as u16 * row_stride as u16
            + (KEY_COUNT as u16 - 1) % keys_per_row as u16;
        assert!(last <= 127, "layout maps a key above MIDI note 127");
        Self {
            keys_per_row,
            row_stride,
        }
    }

    pub const fn keys_per_row(&self) -> u8 {
        self.keys_per_row
    }

    pub const fn row_stride(&self) -> u8 {
        self.row_stride
    }

    /// Physical `(row, column)` of a key.
    pub const fn position(&self, key: KeyIndex) -> (u8, u8) {
        (key.get() / self.keys_per_row, key.get() % self.keys_per_row)
    }

    pub const fn note(&self, key: KeyIndex) -> u8 {
        let (row, col) = self.position(key);
        row * self.row_stride + col
    }

    pub const fn rows(&self) -> u8 {
        let per_row = self.keys_per_row as u16;
        ((KEY_COUNT as u16 + per_row - 1) / per_row) as u8
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::ISOMORPHIC
    }
}

/// Turns confirmed transitions into note events.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventTranslator {
    layout: Layout,
}

impl EventTranslator {
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub const fn translate(&self, transition: Transition) -> NoteEvent {
        let note = self.layout.note(transition.key);
        match transition.state {
            KeyState::Pressed => NoteEvent::on(note, NOTE_ON_VELOCITY),
            KeyState::Released => NoteEvent::off(note),
        }
    }

    /// Translate and send. Returns the event that was sent.
    pub fn forward<M: MidiTransport>(&self, transition: Transition, midi: &mut M) -> NoteEvent {
        let event = self.translate(transition);
        midi.send(event);
        event
    }
}

//! Input-event pipeline for the isogrid MIDI button controller.
//!
//! Everything with state or protocol logic lives here: the 6-bit debounce
//! clock, the MCP23017 polling protocol, the debounce engine, the isomorphic
//! layout mapping and the control loop that ties them together. Hardware is
//! reached only through the traits in [`bus`], [`clock`], [`diag`] and
//! [`midi`], so the crate builds for AVR and for the host alike.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod clock;
pub mod config;
pub mod control;
pub mod debounce;
pub mod diag;
pub mod expander;
pub mod keys;
pub mod layout;
pub mod midi;

#[cfg(test)]
pub(crate) mod test_utils;

pub use clock::{Clock, DebounceTick, ManualClock};
pub use control::Controller;
pub use debounce::{Debouncer, PendingRecord, Transition};
pub use diag::{DiagnosticLog, NullLog};
pub use expander::{BusFault, Mcp23017, Phase};
pub use keys::{KeyBitmap, KeyIndex, KeyState};
pub use layout::{EventTranslator, Layout};
pub use midi::{ByteSink, MidiTransport, NoteEvent, NoteKind, SerialMidi};

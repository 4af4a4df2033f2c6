//! Compile-time configuration.

/// Number of physical keys.
pub const KEY_COUNT: usize = 60;

/// Size of the per-key tables (key count rounded up to a multiple of 8).
pub const KEY_SLOTS: usize = 64;

/// Duration a new raw state must hold before it is acknowledged (ms).
pub const DEBOUNCE_DURATION_MS: u8 = 1;

/// Keys per physical row of the isomorphic grid.
pub const KEYS_PER_ROW: u8 = 6;

/// Semitone offset between successive rows.
pub const ROW_STRIDE: u8 = 13;

/// Velocity sent with every note-on.
pub const NOTE_ON_VELOCITY: u8 = 127;

/// MIDI channel (0-based) for all note messages.
pub const MIDI_CHANNEL: u8 = 0;

/// MCP23017 7-bit bus address (A2..A0 grounded).
pub const EXPANDER_ADDR: u8 = 0x20;

/// Spin iterations allowed per bus phase before reporting a timeout.
pub const BUS_WAIT_BUDGET: u16 = 0xFFFF;

/// Control-loop iterations between runs of the infrequent hook.
pub const INFREQUENT_PERIOD: u8 = 64;

const _: () = assert!(KEY_COUNT <= KEY_SLOTS && KEY_SLOTS <= 64);
const _: () = assert!(DEBOUNCE_DURATION_MS >= 1 && DEBOUNCE_DURATION_MS < 64);
const _: () = assert!(INFREQUENT_PERIOD.is_power_of_two());

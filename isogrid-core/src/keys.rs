//! Key indices and per-key bitmaps.

use crate::config::KEY_COUNT;

/// Ordinal of a physical key, `0..KEY_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < KEY_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All keys in ascending order.
    pub fn all() -> impl Iterator<Item = KeyIndex> {
        (0..KEY_COUNT as u8).map(KeyIndex)
    }
}

/// Logical key state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
}

impl KeyState {
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    pub const fn is_pressed(self) -> bool {
        matches!(self, KeyState::Pressed)
    }
}

/// One bit per key slot, set == pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyBitmap(u64);

impl KeyBitmap {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Bitmap for keys `0..16` from the two expander banks, bank A in the
    /// low byte. The bytes must already be in pressed-high polarity.
    pub const fn from_banks(bank_a: u8, bank_b: u8) -> Self {
        Self(u16::from_le_bytes([bank_a, bank_b]) as u64)
    }

    pub const fn state(self, key: KeyIndex) -> KeyState {
        KeyState::from_pressed(self.0 & (1 << key.0) != 0)
    }

    pub fn set(&mut self, key: KeyIndex, state: KeyState) {
        match state {
            KeyState::Pressed => self.0 |= 1 << key.0,
            KeyState::Released => self.0 &= !(1 << key.0),
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

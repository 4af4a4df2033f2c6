//! Per-key debounce logic.
//!
//! A key whose raw state differs from its acknowledged state gets a pending
//! record stamped with the 6-bit time of the first mismatch. The change is
//! acknowledged once a pass samples a time outside the window
//! `[start, start + duration)`, taken modulo 64. If the raw state returns to
//! the acknowledged state before that, the record is dropped and timing
//! starts over on the next mismatch.

use crate::clock::DebounceTick;
use crate::config::{DEBOUNCE_DURATION_MS, KEY_SLOTS};
use crate::keys::{KeyBitmap, KeyIndex, KeyState};

/// A confirmed change of a key's acknowledged state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub key: KeyIndex,
    pub state: KeyState,
}

/// An unacknowledged raw state awaiting confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRecord {
    start: DebounceTick,
    wraps: bool,
}

impl PendingRecord {
    pub const fn new(start: DebounceTick, duration: u8) -> Self {
        Self {
            start,
            wraps: start.window_wraps(duration),
        }
    }

    #[cfg(test)]
    pub(crate) const fn start(&self) -> DebounceTick {
        self.start
    }

    /// Whether the confirmation window crosses the 64 ms boundary.
    pub const fn wraps(&self) -> bool {
        self.wraps
    }

    /// Whether `sample` lies outside the window, i.e. the mismatch has held
    /// for at least `duration` ms.
    pub const fn is_confirmed(&self, sample: DebounceTick, duration: u8) -> bool {
        let start = self.start.get();
        let t = sample.get();
        if self.wraps {
            let end = self.start.wrapping_add(duration).get();
            end <= t && start > t
        } else {
            !(start <= t && (start as u16 + duration as u16) > t as u16)
        }
    }
}

pub struct Debouncer {
    /// Acknowledged key states.
    acked: KeyBitmap,
    pending: [Option<PendingRecord>; KEY_SLOTS],
    duration: u8,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    pub const fn new() -> Self {
        Self::with_duration(DEBOUNCE_DURATION_MS)
    }

    /// `duration` is clamped to `1..=63` ms.
    pub const fn with_duration(duration: u8) -> Self {
        let duration = if duration == 0 {
            1
        } else if duration > 63 {
            63
        } else {
            duration
        };
        Self {
            acked: KeyBitmap::EMPTY,
            pending: [None; KEY_SLOTS],
            duration,
        }
    }

    pub fn acked(&self) -> KeyBitmap {
        self.acked
    }

    pub fn duration(&self) -> u8 {
        self.duration
    }

    pub fn pending(&self, key: KeyIndex) -> Option<PendingRecord> {
        self.pending[key.get() as usize]
    }

    /// Reconcile `raw` against the acknowledged state at time `now`.
    ///
    /// Keys are visited in ascending index order and every confirmed change
    /// is passed to `emit` in that order.
    pub fn pass<F: FnMut(Transition)>(&mut self, raw: KeyBitmap, now: u16, mut emit: F) {
        let sample = DebounceTick::from_millis(now);

        for key in KeyIndex::all() {
            let slot = &mut self.pending[key.get() as usize];
            let live = raw.state(key);

            if live == self.acked.state(key) {
                // Raw matches acknowledged state, forget any pending change
                *slot = None;
                continue;
            }

            match *slot {
                None => *slot = Some(PendingRecord::new(sample, self.duration)),
                Some(record) if record.is_confirmed(sample, self.duration) => {
                    *slot = None;
                    self.acked.set(key, live);
                    emit(Transition { key, state: live });
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: u8) -> KeyIndex {
        KeyIndex::new(i).unwrap()
    }

    fn pressed(keys: &[u8]) -> KeyBitmap {
        let mut bitmap = KeyBitmap::EMPTY;
        for &k in keys {
            bitmap.set(key(k), KeyState::Pressed);
        }
        bitmap
    }

    fn run(debouncer: &mut Debouncer, raw: KeyBitmap, now: u16) -> Vec<Transition> {
        let mut out = Vec::new();
        debouncer.pass(raw, now, |t| out.push(t));
        out
    }

    /// First sample at or after `start` (walking forward mod 64) that confirms.
    fn first_confirming(record: &PendingRecord, duration: u8) -> u8 {
        (0..64u8)
            .map(|step| record.start().wrapping_add(step))
            .find(|&t| record.is_confirmed(t, duration))
            .unwrap()
            .get()
    }

    #[test]
    fn test_confirms_at_window_end_for_every_start() {
        for duration in 1..8u8 {
            for start in 0..64u8 {
                let record = PendingRecord::new(DebounceTick::new(start), duration);
                assert_eq!(
                    first_confirming(&record, duration),
                    (start + duration) % 64,
                    "start {start} duration {duration}"
                );
            }
        }
    }

    #[test]
    fn test_window_samples_never_confirm() {
        for duration in 1..8u8 {
            for start in 0..64u8 {
                let record = PendingRecord::new(DebounceTick::new(start), duration);
                for offset in 0..duration {
                    let t = DebounceTick::new(start).wrapping_add(offset);
                    assert!(!record.is_confirmed(t, duration));
                }
            }
        }
    }

    #[test]
    fn test_wrapping_window() {
        let record = PendingRecord::new(DebounceTick::new(62), 3);
        assert!(record.wraps());
        assert!(!record.is_confirmed(DebounceTick::new(62), 3));
        assert!(!record.is_confirmed(DebounceTick::new(63), 3));
        assert!(!record.is_confirmed(DebounceTick::new(0), 3));
        assert!(record.is_confirmed(DebounceTick::new(1), 3));
        assert!(record.is_confirmed(DebounceTick::new(61), 3));
    }

    #[test]
    fn test_press_and_release_scenario() {
        let mut debouncer = Debouncer::with_duration(1);

        assert!(run(&mut debouncer, pressed(&[6]), 10).is_empty());
        assert!(debouncer.pending(key(6)).is_some());
        assert_eq!(
            run(&mut debouncer, pressed(&[6]), 11),
            vec![Transition {
                key: key(6),
                state: KeyState::Pressed,
            }]
        );
        assert!(debouncer.pending(key(6)).is_none());
        assert!(debouncer.acked().state(key(6)).is_pressed());

        assert!(run(&mut debouncer, pressed(&[6]), 15).is_empty());
        assert!(run(&mut debouncer, KeyBitmap::EMPTY, 20).is_empty());
        assert_eq!(
            run(&mut debouncer, KeyBitmap::EMPTY, 21),
            vec![Transition {
                key: key(6),
                state: KeyState::Released,
            }]
        );
    }

    #[test]
    fn test_same_sample_does_not_confirm() {
        let mut debouncer = Debouncer::with_duration(1);
        assert!(run(&mut debouncer, pressed(&[2]), 10).is_empty());
        assert!(run(&mut debouncer, pressed(&[2]), 10).is_empty());
        assert_eq!(run(&mut debouncer, pressed(&[2]), 11).len(), 1);
    }

    #[test]
    fn test_glitch_is_rejected() {
        let mut debouncer = Debouncer::with_duration(5);
        assert!(run(&mut debouncer, pressed(&[4]), 100).is_empty());
        assert!(run(&mut debouncer, pressed(&[4]), 102).is_empty());
        // Bounces back before 5 ms elapsed
        assert!(run(&mut debouncer, KeyBitmap::EMPTY, 103).is_empty());
        assert!(debouncer.pending(key(4)).is_none());
        // Timing restarts from the new mismatch
        assert!(run(&mut debouncer, pressed(&[4]), 104).is_empty());
        assert!(run(&mut debouncer, pressed(&[4]), 108).is_empty());
        assert_eq!(run(&mut debouncer, pressed(&[4]), 109).len(), 1);
    }

    #[test]
    fn test_confirmation_across_wraparound() {
        let mut debouncer = Debouncer::with_duration(2);
        // 63 mod 64 = 63, window {63, 0}
        assert!(run(&mut debouncer, pressed(&[0]), 127).is_empty());
        assert!(run(&mut debouncer, pressed(&[0]), 128).is_empty());
        assert_eq!(run(&mut debouncer, pressed(&[0]), 129).len(), 1);
    }

    #[test]
    fn test_counter_wrap_at_u16_max() {
        let mut debouncer = Debouncer::with_duration(1);
        assert!(run(&mut debouncer, pressed(&[1]), u16::MAX).is_empty());
        assert_eq!(run(&mut debouncer, pressed(&[1]), 0).len(), 1);
    }

    #[test]
    fn test_events_in_index_order() {
        let mut debouncer = Debouncer::with_duration(1);
        assert!(run(&mut debouncer, pressed(&[9, 3]), 0).is_empty());
        let events = run(&mut debouncer, pressed(&[9, 3]), 1);
        let keys: Vec<u8> = events.iter().map(|t| t.key.get()).collect();
        assert_eq!(keys, vec![3, 9]);
    }

    #[test]
    fn test_transitions_alternate() {
        let mut debouncer = Debouncer::with_duration(1);
        let mut events = Vec::new();
        let mut now = 0u16;
        for cycle in 0..10 {
            let raw = if cycle % 2 == 0 { pressed(&[7]) } else { KeyBitmap::EMPTY };
            for _ in 0..3 {
                events.extend(run(&mut debouncer, raw, now));
                now += 1;
            }
        }
        assert_eq!(events.len(), 10);
        for pair in events.windows(2) {
            assert_ne!(pair[0].state, pair[1].state);
        }
        assert_eq!(events[0].state, KeyState::Pressed);
    }

    #[test]
    fn test_zero_duration_is_clamped() {
        assert_eq!(Debouncer::with_duration(0).duration(), 1);
        assert_eq!(Debouncer::with_duration(200).duration(), 63);
    }
}

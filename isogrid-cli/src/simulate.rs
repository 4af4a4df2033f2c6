//! Offline run of the debounce and translation stages over a raw trace.

use isogrid_core::{Debouncer, EventTranslator, MidiTransport, NoteEvent};

use crate::trace::TraceSample;

/// A note event and the millisecond it was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emitted {
    pub time: u32,
    pub event: NoteEvent,
}

/// Collects events, stamping them with the current simulation time.
struct Recorder {
    time: u32,
    emitted: Vec<Emitted>,
}

impl MidiTransport for Recorder {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.emitted.push(Emitted {
            time: self.time,
            event: NoteEvent::on(note, velocity),
        });
    }

    fn note_off(&mut self, note: u8) {
        self.emitted.push(Emitted {
            time: self.time,
            event: NoteEvent::off(note),
        });
    }
}

/// Run one debounce pass per millisecond from the first sample until
/// `duration` ms after the last, holding each sample's bitmap until the next.
pub fn simulate(samples: &[TraceSample], duration: u8) -> Vec<Emitted> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Vec::new();
    };

    let mut debouncer = Debouncer::with_duration(duration);
    let translator = EventTranslator::default();
    let mut recorder = Recorder {
        time: first.time,
        emitted: Vec::new(),
    };

    // Trace times run up to u32::MAX
    let end = last.time.saturating_add(debouncer.duration() as u32);
    let mut next = 0;
    let mut raw = first.raw;

    for time in first.time..=end {
        while next < samples.len() && samples[next].time <= time {
            raw = samples[next].raw;
            next += 1;
        }
        recorder.time = time;
        // The device clock is 16 bits wide
        debouncer.pass(raw, time as u16, |transition| {
            translator.forward(transition, &mut recorder);
        });
    }

    recorder.emitted
}

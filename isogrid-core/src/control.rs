//! The control loop.
//!
//! One iteration refreshes the raw key state from the expander, runs a
//! debounce pass over every key and forwards each confirmed transition to
//! the MIDI transport. A bus fault never stops the loop: it has already been
//! logged by the driver and the pass runs on whatever state was published.

use crate::bus::TwiBus;
use crate::clock::Clock;
use crate::config::INFREQUENT_PERIOD;
use crate::debounce::Debouncer;
use crate::diag::DiagnosticLog;
use crate::expander::{BusFault, Mcp23017};
use crate::layout::EventTranslator;
use crate::midi::{MidiTransport, NoteKind};

pub struct Controller<B, C, M, L> {
    expander: Mcp23017<B>,
    debouncer: Debouncer,
    translator: EventTranslator,
    clock: C,
    midi: M,
    log: L,
    iteration: u8,
}

impl<B, C, M, L> Controller<B, C, M, L>
where
    B: TwiBus,
    C: Clock,
    M: MidiTransport,
    L: DiagnosticLog,
{
    pub fn new(
        expander: Mcp23017<B>,
        debouncer: Debouncer,
        translator: EventTranslator,
        clock: C,
        midi: M,
        log: L,
    ) -> Self {
        Self {
            expander,
            debouncer,
            translator,
            clock,
            midi,
            log,
            iteration: 0,
        }
    }

    /// One-time expander setup. A failure is logged and retried from the
    /// loop, so callers may ignore the result.
    pub fn start(&mut self) -> Result<(), BusFault> {
        self.log.write_text("Initializing MCP23017");
        self.log.write_newline();
        self.expander.configure(&mut self.log)
    }

    /// Run one iteration of the loop.
    pub fn step(&mut self) {
        if self.iteration % INFREQUENT_PERIOD == 0 {
            self.infrequent();
        }

        // Faults are already on the log
        let _ = self.expander.refresh(&mut self.log);

        let now = self.clock.now();
        let raw = self.expander.raw();
        let Self {
            debouncer,
            translator,
            midi,
            log,
            ..
        } = self;

        debouncer.pass(raw, now, |transition| {
            let event = translator.forward(transition, &mut *midi);
            let label = match event.kind {
                NoteKind::On => "Note On: ",
                NoteKind::Off => "Note Off: ",
            };
            log.write_line(label, event.note as u16);
        });

        self.iteration = self.iteration.wrapping_add(1);
    }

    /// Loop until power-off.
    pub fn run(mut self) -> ! {
        self.log.write_text("Starting loop segment");
        self.log.write_newline();
        loop {
            self.step();
        }
    }

    fn infrequent(&mut self) {
        if !self.expander.is_configured() {
            let _ = self.expander.configure(&mut self.log);
        }
    }

    pub fn expander(&self) -> &Mcp23017<B> {
        &self.expander
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn midi(&self) -> &M {
        &self.midi
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    #[cfg(test)]
    pub(crate) fn expander_mut(&mut self) -> &mut Mcp23017<B> {
        &mut self.expander
    }
}

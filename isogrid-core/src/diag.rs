//! Diagnostic text output.
//!
//! A best-effort debug sink. Write failures are not visible to callers.

pub trait DiagnosticLog {
    fn write_text(&mut self, text: &str);
    fn write_number(&mut self, number: u16);
    fn write_newline(&mut self);

    /// `text` followed by `number` and a newline.
    fn write_line(&mut self, text: &str, number: u16) {
        self.write_text(text);
        self.write_number(number);
        self.write_newline();
    }
}

impl<L: DiagnosticLog + ?Sized> DiagnosticLog for &mut L {
    fn write_text(&mut self, text: &str) {
        (**self).write_text(text);
    }

    fn write_number(&mut self, number: u16) {
        (**self).write_number(number);
    }

    fn write_newline(&mut self) {
        (**self).write_newline();
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLog;

impl DiagnosticLog for NullLog {
    fn write_text(&mut self, _text: &str) {}
    fn write_number(&mut self, _number: u16) {}
    fn write_newline(&mut self) {}
}

//! Diagnostic emitters.
//!
//! - Terminal: human-readable output with optional color
//! - JSON: machine-readable output for tooling, including the property bag

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

#[cfg(test)]
mod tests;

//! JSON emitter.
//!
//! Writes one JSON array of diagnostic objects. Each object carries the
//! property bag so downstream tools see the same facts remediation does.

use std::io::Write;

use serde_json::{json, Value};

use crate::Diagnostic;

use super::DiagnosticEmitter;

/// JSON emitter for machine-readable output.
pub struct JsonEmitter<W: Write> {
    writer: W,
    items: Vec<Value>,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            items: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Convert one diagnostic to its JSON form.
pub fn to_value(diagnostic: &Diagnostic) -> Value {
    let labels: Vec<Value> = diagnostic
        .labels
        .iter()
        .map(|label| {
            json!({
                "file": label.file,
                "start": label.span.start,
                "end": label.span.end,
                "message": label.message,
                "primary": label.is_primary,
            })
        })
        .collect();
    json!({
        "code": diagnostic.code.as_str(),
        "severity": diagnostic.severity.to_string(),
        "message": diagnostic.message,
        "labels": labels,
        "notes": diagnostic.notes,
        "suggestions": diagnostic.suggestions,
        "properties": diagnostic.properties,
    })
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.items.push(to_value(diagnostic));
    }

    fn flush(&mut self) {
        let items = std::mem::take(&mut self.items);
        if serde_json::to_writer_pretty(&mut self.writer, &Value::Array(items)).is_ok() {
            let _ = writeln!(self.writer);
        }
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, _error_count: usize, _warning_count: usize) {}
}

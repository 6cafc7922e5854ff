use super::*;
use crate::ErrorCode;

struct CountingEmitter {
    emitted: usize,
    flushed: bool,
}

impl DiagnosticEmitter for CountingEmitter {
    fn emit(&mut self, _diagnostic: &Diagnostic) {
        self.emitted += 1;
    }

    fn flush(&mut self) {
        self.flushed = true;
    }

    fn emit_summary(&mut self, _error_count: usize, _warning_count: usize) {}
}

#[test]
fn test_emit_all_visits_every_diagnostic() {
    let mut emitter = CountingEmitter {
        emitted: 0,
        flushed: false,
    };
    let diags = vec![
        Diagnostic::error(ErrorCode::VMF001),
        Diagnostic::error(ErrorCode::VMF002),
    ];
    emitter.emit_all(&diags);
    emitter.flush();
    assert_eq!(emitter.emitted, 2);
    assert!(emitter.flushed);
}

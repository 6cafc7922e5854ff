//! Command handlers for the `vmfc` CLI.
//!
//! Each submodule implements one command. Shared helpers for loading a
//! snapshot, running a pass, and reporting diagnostics live here.

use std::io::Write;
use std::path::Path;

use vmf_analysis::{analyze, Analysis, CancellationToken};
use vmf_diagnostic::emitter::{DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use vmf_diagnostic::Diagnostic;
use vmf_ir::Program;

use crate::{CliError, CliOptions, OutputFormat};

mod check;
mod emit;
mod explain;
mod fix;

pub use check::check_snapshot;
pub use emit::emit_snapshot;
pub use explain::explain_error;
pub use fix::{fix_snapshot, FixSummary};

/// Load a snapshot, logging every item that was skipped while loading.
pub(crate) fn load_program(path: &Path) -> Result<Program, CliError> {
    let program = Program::load(path)?;
    for warning in program.warnings() {
        tracing::warn!(file = %path.display(), "{warning}");
    }
    Ok(program)
}

pub(crate) fn run_analysis(program: &Program, options: &CliOptions) -> Result<Analysis, CliError> {
    Ok(analyze(
        program,
        &options.analysis_config(),
        &CancellationToken::new(),
    )?)
}

/// Write diagnostics in the requested format, with a summary line for the
/// terminal format.
pub(crate) fn report(diagnostics: &[Diagnostic], options: &CliOptions, out: &mut dyn Write) {
    match options.format {
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(out);
            emitter.emit_all(diagnostics);
            emitter.flush();
        }
        OutputFormat::Terminal => {
            let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
            let mut emitter = TerminalEmitter::with_color_mode(out, options.color, is_tty);
            emitter.emit_all(diagnostics);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            emitter.emit_summary(errors, diagnostics.len() - errors);
            emitter.flush();
        }
    }
}

/// Write `text` to `path`.
pub(crate) fn write_file(path: &Path, text: &str) -> Result<(), CliError> {
    std::fs::write(path, text).map_err(|source| CliError::Write {
        path: path.display().to_string(),
        source,
    })
}

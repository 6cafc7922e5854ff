//! The `emit` command: render the generated factory functions.

use std::io::Write;
use std::path::Path;

use super::{load_program, report, run_analysis, write_file};
use crate::{CliError, CliOptions};

/// Render the generated code for a snapshot.
///
/// Generated code goes to `-o` when given, else to `out`; diagnostics go to
/// `diagnostics`. Code is emitted for every resolved spec even when other
/// pairs have errors. Returns whether any error diagnostic was produced.
pub fn emit_snapshot(
    path: &Path,
    options: &CliOptions,
    out: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<bool, CliError> {
    let program = load_program(path)?;
    let analysis = run_analysis(&program, options)?;
    let code = analysis.render_generated();

    match &options.output {
        Some(target) => write_file(target, &code)?,
        None => out
            .write_all(code.as_bytes())
            .map_err(|source| CliError::Write {
                path: "<stdout>".to_owned(),
                source,
            })?,
    }

    if !analysis.diagnostics.is_empty() {
        report(&analysis.diagnostics, options, diagnostics);
    }
    Ok(analysis.has_errors())
}

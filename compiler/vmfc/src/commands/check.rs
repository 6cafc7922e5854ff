//! The `check` command: report wiring problems in a snapshot.

use std::io::Write;
use std::path::Path;

use super::{load_program, report, run_analysis};
use crate::{CliError, CliOptions};

/// Check a snapshot and write its diagnostics to `out`.
///
/// Returns whether any error diagnostic was produced.
pub fn check_snapshot(
    path: &Path,
    options: &CliOptions,
    out: &mut dyn Write,
) -> Result<bool, CliError> {
    let program = load_program(path)?;
    let analysis = run_analysis(&program, options)?;
    report(&analysis.diagnostics, options, out);
    tracing::debug!(
        file = %path.display(),
        specs = analysis.specs.len(),
        errors = analysis.error_count(),
        "check finished"
    );
    Ok(analysis.has_errors())
}

//! The `fix` command: apply remediations and write the snapshot back.

use std::io::Write;
use std::path::Path;

use vmf_analysis::check::props;
use vmf_analysis::remediate::{apply_action, fix_all, FixContext, FixRegistry};
use vmf_diagnostic::{Diagnostic, ErrorCode};
use vmf_ir::type_expr::short_name;
use vmf_ir::Program;

use super::{load_program, report, run_analysis, write_file};
use crate::{CliError, CliOptions, Preference};

/// What one `fix` run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixSummary {
    /// Titles of applied actions, hand-picked constructors first.
    pub applied: Vec<String>,
    /// Error diagnostics left after fixing.
    pub remaining: usize,
}

/// Fix a snapshot in place (or into `-o`), then report what is left.
///
/// Ambiguities are only settled for constructors named with `--prefer`;
/// everything else gets its machine-applicable fix.
pub fn fix_snapshot(
    path: &Path,
    options: &CliOptions,
    out: &mut dyn Write,
) -> Result<FixSummary, CliError> {
    let mut program = load_program(path)?;
    let registry = FixRegistry::with_builtin_fixes();
    let config = options.analysis_config();
    let mut summary = FixSummary::default();

    if !options.prefer.is_empty() {
        let analysis = run_analysis(&program, options)?;
        for preference in &options.prefer {
            let diagnostic = find_candidate(&analysis.diagnostics, preference).ok_or_else(|| {
                CliError::NoSuchCandidate {
                    ty: preference.ty.clone(),
                    offset: preference.offset,
                }
            })?;
            let ctx = FixContext {
                diagnostic,
                program: &program,
                config: &config,
            };
            let Some(action) = registry.get_fixes(&ctx).into_iter().next() else {
                continue;
            };
            apply_action(&mut program, &action)?;
            summary.applied.push(action.title);
        }
    }

    let analysis = run_analysis(&program, options)?;
    let fixed = fix_all(&mut program, &analysis.diagnostics, &registry, &config)?;
    tracing::debug!(
        applied = fixed.batch.applied,
        skipped = fixed.batch.skipped,
        unfixed = fixed.unfixed,
        "fix batch finished"
    );
    summary.applied.extend(fixed.actions);

    let after = run_analysis(&program, options)?;
    summary.remaining = after.error_count();
    report(&after.diagnostics, options, out);

    write_snapshot(&program, options.output.as_deref().unwrap_or(path))?;
    Ok(summary)
}

/// The VMF003 diagnostic for the constructor a preference names.
fn find_candidate<'a>(
    diagnostics: &'a [Diagnostic],
    preference: &Preference,
) -> Option<&'a Diagnostic> {
    let offset = preference.offset.to_string();
    diagnostics.iter().find(|d| {
        d.code == ErrorCode::VMF003
            && d.property(props::CONSTRUCTOR_SPAN_START) == Some(offset.as_str())
            && d
                .property(props::COMPANION_TYPE)
                .is_some_and(|ty| ty == preference.ty || short_name(ty) == preference.ty)
    })
}

fn write_snapshot(program: &Program, path: &Path) -> Result<(), CliError> {
    let text = program.to_snapshot().to_json()?;
    write_file(path, &text)
}

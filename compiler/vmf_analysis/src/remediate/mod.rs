//! Remediation: turning findings into edits.
//!
//! Each diagnostic's fixes are built from its property bag into
//! [`EditOp`]s. Batch fixing collects the machine-applicable action of every
//! diagnostic and applies them as one atomic batch; each operation
//! re-resolves its target against the program as the batch has left it.

mod edit;
mod fixes;
mod placement;

pub use edit::{apply_batch, BatchReport, EditOp};
pub use fixes::{parse_injected_signature, CodeAction, CodeFix, FixContext, FixRegistry};
pub use placement::{choose_container, directory_distance};

use vmf_diagnostic::Diagnostic;
use vmf_ir::Program;

use crate::{AnalysisConfig, EditError};

/// Outcome of fixing a set of diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FixReport {
    /// Titles of the actions that were applied, in diagnostic order.
    pub actions: Vec<String>,
    pub batch: BatchReport,
    /// Diagnostics without a machine-applicable fix.
    pub unfixed: usize,
}

/// Apply the preferred machine-applicable action of every diagnostic.
pub fn fix_all(
    program: &mut Program,
    diagnostics: &[Diagnostic],
    registry: &FixRegistry,
    config: &AnalysisConfig,
) -> Result<FixReport, EditError> {
    let mut report = FixReport::default();
    let mut edits = Vec::new();
    for diagnostic in diagnostics {
        let ctx = FixContext {
            diagnostic,
            program: &*program,
            config,
        };
        let action = registry
            .get_fixes(&ctx)
            .into_iter()
            .find(|a| a.applicability.is_machine_applicable());
        match action {
            Some(action) => {
                report.actions.push(action.title);
                edits.extend(action.edits);
            }
            None => report.unfixed += 1,
        }
    }
    report.batch = apply_batch(program, &edits)?;
    Ok(report)
}

/// Apply one chosen action, whatever its applicability.
pub fn apply_action(program: &mut Program, action: &CodeAction) -> Result<BatchReport, EditError> {
    tracing::debug!(title = %action.title, "applying code action");
    apply_batch(program, &action.edits)
}

//! The two-phase analysis pipeline.
//!
//! Phase 1 (collect) runs per compilation unit on a scoped rayon pool.
//! Each unit produces its own slot and container lists; nothing shared is
//! written. The per-unit results are merged in unit order, which is the
//! barrier. Phase 2 (check and emit) reads only the merged, immutable
//! result.

use rayon::prelude::*;
use vmf_diagnostic::Diagnostic;
use vmf_ir::{compilation_units, CompilationUnit, SymbolFacade};

use crate::check::{check, to_diagnostics, Finding};
use crate::emit::{emit, render_all, GeneratedBlock};
use crate::extract::extract_slots;
use crate::registry::{index_unit, Container, RegistrationIndex};
use crate::{AnalysisConfig, AnalysisError, CancellationToken, FactorySlot, FactorySpec};

/// Everything one pass produces.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub index: RegistrationIndex,
    /// Resolved specs eligible for generation.
    pub specs: Vec<FactorySpec>,
    pub findings: Vec<Finding>,
    /// Ordered by file, then offset, then code.
    pub diagnostics: Vec<Diagnostic>,
    pub generated: Vec<GeneratedBlock>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn render_generated(&self) -> String {
        render_all(&self.generated)
    }
}

/// Output of phase 1 for one compilation unit.
struct UnitOutput {
    slots: Vec<FactorySlot>,
    containers: Vec<Container>,
}

fn collect_unit<F: SymbolFacade + ?Sized>(
    facade: &F,
    unit: &CompilationUnit,
    cancel: &CancellationToken,
) -> Option<UnitOutput> {
    if cancel.is_cancelled() {
        return None;
    }
    Some(UnitOutput {
        slots: extract_slots(facade, unit),
        containers: index_unit(facade, unit),
    })
}

#[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
fn collect<F: SymbolFacade + ?Sized>(
    facade: &F,
    units: &[CompilationUnit],
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Option<Vec<UnitOutput>> {
    let sequential = || {
        units
            .iter()
            .map(|unit| collect_unit(facade, unit, cancel))
            .collect::<Option<Vec<_>>>()
    };
    if config.is_sequential() {
        return sequential();
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if config.num_threads > 0 {
        builder = builder.num_threads(config.num_threads);
    }
    builder
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                units
                    .par_iter()
                    .map(|unit| collect_unit(facade, unit, cancel))
                    .collect::<Option<Vec<_>>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), collecting sequentially");
            sequential()
        })
}

/// Run collection, checking, and emission over a whole program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze<F: SymbolFacade + ?Sized>(
    facade: &F,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<Analysis, AnalysisError> {
    let units = compilation_units(facade);
    let outputs = collect(facade, &units, config, cancel).ok_or(AnalysisError::Cancelled)?;

    let mut slots = Vec::new();
    let mut parts = Vec::with_capacity(outputs.len());
    for output in outputs {
        slots.extend(output.slots);
        parts.push(output.containers);
    }
    let index = RegistrationIndex::from_parts(facade, parts);
    tracing::debug!(
        slots = slots.len(),
        containers = index.len(),
        "collection complete"
    );

    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    let checked = check(facade, &slots, &index);
    let mut diagnostics = to_diagnostics(facade, &index, &checked.findings);
    diagnostics.sort_by_cached_key(|d| {
        let label = d.primary_label();
        (
            label.map(|l| l.file.clone()).unwrap_or_default(),
            label.map_or(0, |l| l.span.start),
            d.code,
        )
    });
    let generated = emit(facade, &index, &checked.specs);

    Ok(Analysis {
        index,
        specs: checked.specs,
        findings: checked.findings,
        diagnostics,
        generated,
    })
}

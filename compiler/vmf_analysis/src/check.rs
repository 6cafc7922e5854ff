//! Consistency checking.
//!
//! Runs after collection over the merged, immutable slot list and
//! registration index. Every finding is local to one view, container, or
//! companion type; a broken pair never hides another.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use vmf_diagnostic::{Diagnostic, ErrorCode};
use vmf_ir::{Location, SymbolFacade, TypeArgs, TypeId};

use crate::registry::{Container, RegistrationIndex};
use crate::resolve::{resolve, Resolution, ResolveError};
use crate::{FactorySlot, FactorySpec};

/// Property-bag keys. Remediation reads these instead of re-deriving facts.
pub mod props {
    pub const VIEW: &str = "view";
    pub const VIEW_SPAN_START: &str = "viewSpanStart";
    pub const COMPANION_TYPE: &str = "companionType";
    pub const COMPANION_SHORT_NAME: &str = "companionShortName";
    pub const COMPANION_SPAN_START: &str = "companionSpanStart";
    pub const FACTORY_TYPE: &str = "factoryType";
    pub const RUNTIME_PARAMETER_TYPES: &str = "runtimeParameterTypes";
    pub const INJECTED_SIGNATURE: &str = "injectedSignature";
    pub const FUNCTION_NAME: &str = "functionName";
    pub const HAS_REGISTRATION: &str = "hasRegistration";
    pub const HAS_GENERATED_STUB: &str = "hasGeneratedStub";
    pub const CONTAINER: &str = "container";
    pub const CONTAINER_SPAN_START: &str = "containerSpanStart";
    pub const CONSTRUCTOR_SPAN_START: &str = "constructorSpanStart";
}

/// What the checker found wrong.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Finding {
    /// No container registers the view.
    Unregistered {
        view: TypeId,
        view_location: Location,
        /// The view's first resolved spec, when it has one.
        spec: Option<FactorySpec>,
    },
    /// A container registers the view without a complete companion factory.
    MissingCompanion {
        spec: FactorySpec,
        view_location: Location,
        /// Index into [`RegistrationIndex::containers`].
        container: usize,
        has_registration: bool,
        has_stub: bool,
    },
    /// Several candidate constructors, not singled out by markers.
    Ambiguous {
        companion: TypeId,
        runtime: TypeArgs,
        candidates: Vec<usize>,
    },
    /// No public constructor starts with the runtime types.
    NoMatch {
        companion: TypeId,
        factory: TypeId,
        arity: usize,
        location: Location,
    },
}

impl Finding {
    pub fn code(&self) -> ErrorCode {
        match self {
            Finding::Unregistered { .. } => ErrorCode::VMF001,
            Finding::MissingCompanion { .. } => ErrorCode::VMF002,
            Finding::Ambiguous { .. } => ErrorCode::VMF003,
            Finding::NoMatch { .. } => ErrorCode::VMF004,
        }
    }
}

/// Result of checking one program.
#[derive(Clone, Debug, Default)]
pub struct CheckOutput {
    /// Resolved specs eligible for generation, in view order.
    pub specs: Vec<FactorySpec>,
    pub findings: Vec<Finding>,
}

/// Resolve every slot, then check every view against the index.
pub fn check<F: SymbolFacade + ?Sized>(
    facade: &F,
    slots: &[FactorySlot],
    index: &RegistrationIndex,
) -> CheckOutput {
    let pool = facade.pool();

    let mut ordered: Vec<&FactorySlot> = slots.iter().collect();
    ordered.sort_by_cached_key(|s| {
        (
            pool.display(s.view),
            s.view_location.span.start,
            s.location.span.start,
        )
    });

    let mut memo: FxHashMap<(TypeId, TypeArgs), Resolution> = FxHashMap::default();
    let mut findings = Vec::new();
    let mut ambiguous: FxHashSet<TypeId> = FxHashSet::default();
    let mut no_match_seen: FxHashSet<(TypeId, usize)> = FxHashSet::default();
    let mut specs = Vec::new();
    // View -> (location, index of its first spec in `specs`).
    let mut views: BTreeMap<(String, u32), (TypeId, Location, Option<usize>)> = BTreeMap::new();

    for slot in ordered {
        let Some(companion) = facade.decl_of(slot.companion) else {
            tracing::debug!(
                companion = %pool.display(slot.companion),
                "companion type is not declared; slot skipped"
            );
            continue;
        };
        let view_entry = views
            .entry((pool.display(slot.view), slot.view_location.span.start))
            .or_insert((slot.view, slot.view_location, None));

        let resolution = memo
            .entry((slot.companion, slot.runtime.clone()))
            .or_insert_with(|| resolve(companion, &slot.runtime));

        match resolution {
            Ok(resolved) => {
                if view_entry.2.is_none() {
                    view_entry.2 = Some(specs.len());
                }
                specs.push(FactorySpec::new(
                    facade,
                    slot,
                    resolved.constructor,
                    &resolved.injected,
                ));
            }
            Err(ResolveError::NoMatch { arity }) => {
                if no_match_seen.insert((slot.companion, *arity)) {
                    findings.push(Finding::NoMatch {
                        companion: slot.companion,
                        factory: slot.factory,
                        arity: *arity,
                        location: slot.location,
                    });
                }
            }
            Err(ResolveError::Ambiguous { candidates }) => {
                if ambiguous.insert(slot.companion) {
                    findings.push(Finding::Ambiguous {
                        companion: slot.companion,
                        runtime: slot.runtime.clone(),
                        candidates: candidates.clone(),
                    });
                }
            }
        }
    }

    for (view, view_location, first_spec) in views.into_values() {
        let spec = first_spec.map(|idx| &specs[idx]);
        let registering: Vec<(usize, &Container)> = index.registering(view).collect();

        if registering.is_empty() {
            findings.push(Finding::Unregistered {
                view,
                view_location,
                spec: spec.cloned(),
            });
            continue;
        }

        let Some(spec) = spec else {
            continue;
        };
        let states: Vec<(usize, bool, bool)> = registering
            .iter()
            .map(|&(idx, container)| {
                (
                    idx,
                    has_registration(container, spec),
                    has_stub(facade, container, spec),
                )
            })
            .collect();
        if states.iter().any(|&(_, reg, stub)| reg && stub) {
            continue;
        }
        for (container, has_registration, has_stub) in states {
            findings.push(Finding::MissingCompanion {
                spec: spec.clone(),
                view_location,
                container,
                has_registration,
                has_stub,
            });
        }
    }

    specs.retain(|spec| !ambiguous.contains(&spec.companion));
    tracing::debug!(
        specs = specs.len(),
        findings = findings.len(),
        "consistency check complete"
    );
    CheckOutput { specs, findings }
}

/// The container registers the companion (or its factory type) with an
/// explicit factory method.
pub fn has_registration(container: &Container, spec: &FactorySpec) -> bool {
    container.registrations.iter().any(|r| {
        (r.binds(spec.companion) || r.binds(spec.factory)) && r.has_explicit_factory()
    })
}

/// The container declares a member matching the generated signature.
pub fn has_stub<F: SymbolFacade + ?Sized>(
    facade: &F,
    container: &Container,
    spec: &FactorySpec,
) -> bool {
    facade.decls()[container.decl].members.iter().any(|member| {
        member.is_static
            && facade.text(member.name) == spec.function_name
            && member.result == spec.factory
            && member.params.len() == spec.injected.len()
            && member
                .params
                .iter()
                .zip(spec.injected_types())
                .all(|(p, ty)| p.ty == ty)
    })
}

/// Render findings as diagnostics.
pub fn to_diagnostics<F: SymbolFacade + ?Sized>(
    facade: &F,
    index: &RegistrationIndex,
    findings: &[Finding],
) -> Vec<Diagnostic> {
    findings
        .iter()
        .flat_map(|finding| finding_diagnostics(facade, index, finding))
        .collect()
}

fn finding_diagnostics<F: SymbolFacade + ?Sized>(
    facade: &F,
    index: &RegistrationIndex,
    finding: &Finding,
) -> Vec<Diagnostic> {
    let pool = facade.pool();
    let file = |loc: &Location| facade.text(loc.file).to_owned();

    match finding {
        Finding::Unregistered {
            view,
            view_location,
            spec,
        } => {
            let name = pool.display(*view);
            let mut diag = Diagnostic::error(ErrorCode::VMF001)
                .with_message(format!("view `{name}` is not registered in any container"))
                .with_label(file(view_location), view_location.span, "view declared here")
                .with_suggestion(format!("register `{name}` in a container"))
                .with_property(props::VIEW, name)
                .with_property(props::VIEW_SPAN_START, view_location.span.start.to_string());
            if let Some(spec) = spec {
                diag = with_spec_properties(diag, facade, spec);
            }
            vec![diag]
        }
        Finding::MissingCompanion {
            spec,
            view_location,
            container,
            has_registration,
            has_stub,
        } => {
            let Some(container) = index.containers().get(*container) else {
                return Vec::new();
            };
            let container_name = pool.display(container.ty);
            let view = pool.display(spec.view);
            let companion = pool.display(spec.companion);
            let factory = pool.display(spec.factory);
            let signature = format!(
                "static {factory} {}({})",
                spec.function_name,
                spec.injected_signature(facade)
            );

            let mut diag = Diagnostic::error(ErrorCode::VMF002)
                .with_message(format!(
                    "`{container_name}` registers `{view}` but not a factory for `{companion}`"
                ))
                .with_label(
                    file(&container.location),
                    container.location.span,
                    format!("`{view}` is registered here"),
                )
                .with_secondary_label(
                    file(&spec.location),
                    spec.location.span,
                    format!("factory for `{companion}` requested here"),
                )
                .with_note(format!("expected `{signature}`"));
            if !has_registration {
                diag = diag.with_suggestion(format!(
                    "register `{factory}` with `Factory = nameof({})`",
                    spec.function_name
                ));
            }
            if !has_stub {
                diag = diag.with_suggestion(format!(
                    "declare `{signature}` on `{container_name}`"
                ));
            }
            vec![with_spec_properties(diag, facade, spec)
                .with_property(props::VIEW, view)
                .with_property(props::VIEW_SPAN_START, view_location.span.start.to_string())
                .with_property(props::HAS_REGISTRATION, has_registration.to_string())
                .with_property(props::HAS_GENERATED_STUB, has_stub.to_string())
                .with_property(props::CONTAINER, container_name)
                .with_property(
                    props::CONTAINER_SPAN_START,
                    container.location.span.start.to_string(),
                )]
        }
        Finding::Ambiguous {
            companion,
            runtime,
            candidates,
        } => {
            let Some(decl) = facade.decl_of(*companion) else {
                return Vec::new();
            };
            let name = pool.display(*companion);
            let runtime = runtime
                .iter()
                .map(|&ty| pool.display(ty))
                .collect::<Vec<_>>()
                .join(", ");
            candidates
                .iter()
                .filter_map(|&idx| decl.constructors.get(idx))
                .map(|ctor| {
                    Diagnostic::error(ErrorCode::VMF003)
                        .with_message(format!(
                            "ambiguous constructor for `{name}` with runtime parameters ({runtime})"
                        ))
                        .with_label(
                            file(&ctor.location),
                            ctor.location.span,
                            "candidate constructor",
                        )
                        .with_note(format!(
                            "{} public constructors of `{name}` start with ({runtime})",
                            candidates.len()
                        ))
                        .with_suggestion("mark exactly one candidate as the preferred constructor")
                        .with_property(props::COMPANION_TYPE, name.clone())
                        .with_property(
                            props::COMPANION_SPAN_START,
                            decl.location.span.start.to_string(),
                        )
                        .with_property(
                            props::CONSTRUCTOR_SPAN_START,
                            ctor.location.span.start.to_string(),
                        )
                        .with_property(props::RUNTIME_PARAMETER_TYPES, runtime.clone())
                })
                .collect()
        }
        Finding::NoMatch {
            companion,
            factory,
            arity,
            location,
        } => {
            let name = pool.display(*companion);
            let factory = pool.display(*factory);
            vec![Diagnostic::error(ErrorCode::VMF004)
                .with_message(format!(
                    "no public constructor of `{name}` matches `{factory}`"
                ))
                .with_label(file(location), location.span, "factory requested here")
                .with_note(format!(
                    "a matching constructor starts with the {arity} runtime parameter type{} of `{factory}`",
                    if *arity == 1 { "" } else { "s" }
                ))
                .with_property(props::COMPANION_TYPE, name)
                .with_property(props::FACTORY_TYPE, factory)]
        }
    }
}

fn with_spec_properties<F: SymbolFacade + ?Sized>(
    diag: Diagnostic,
    facade: &F,
    spec: &FactorySpec,
) -> Diagnostic {
    let pool = facade.pool();
    diag.with_property(props::COMPANION_TYPE, pool.display(spec.companion))
        .with_property(props::COMPANION_SHORT_NAME, pool.short_name(spec.companion))
        .with_property(props::FACTORY_TYPE, pool.display(spec.factory))
        .with_property(props::RUNTIME_PARAMETER_TYPES, spec.runtime_signature(facade))
        .with_property(props::INJECTED_SIGNATURE, spec.injected_signature(facade))
        .with_property(props::FUNCTION_NAME, spec.function_name.clone())
}

#[cfg(test)]
mod tests;

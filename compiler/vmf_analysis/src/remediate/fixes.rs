//! Code fixes.
//!
//! Fixes are registered per error code. A fix reads the diagnostic's
//! property bag for what the checker established, and only consults the
//! program to re-find declarations and to pick a target container.

use rustc_hash::FxHashMap;
use vmf_diagnostic::{Applicability, Diagnostic, ErrorCode};
use vmf_ir::type_expr::split_top_level;
use vmf_ir::{DeclKey, Program, SymbolFacade};

use super::edit::EditOp;
use super::placement::choose_container;
use crate::check::props;
use crate::AnalysisConfig;

/// A concrete fix the user (or batch fixing) can apply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodeAction {
    pub title: String,
    pub edits: Vec<EditOp>,
    pub applicability: Applicability,
    /// Preferred among the actions offered for one diagnostic.
    pub is_preferred: bool,
}

impl CodeAction {
    pub fn new(title: impl Into<String>, edits: Vec<EditOp>) -> Self {
        CodeAction {
            title: title.into(),
            edits,
            applicability: Applicability::Unspecified,
            is_preferred: false,
        }
    }

    #[must_use]
    pub fn with_applicability(mut self, applicability: Applicability) -> Self {
        self.applicability = applicability;
        self
    }

    #[must_use]
    pub fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }
}

/// Everything a fix may look at.
pub struct FixContext<'a> {
    pub diagnostic: &'a Diagnostic,
    pub program: &'a Program,
    pub config: &'a AnalysisConfig,
}

impl FixContext<'_> {
    fn prop(&self, key: &str) -> Option<&str> {
        self.diagnostic.property(key)
    }

    fn span_prop(&self, key: &str) -> Option<u32> {
        self.prop(key)?.parse().ok()
    }
}

/// A fix for one or more error codes.
pub trait CodeFix: Send + Sync {
    fn error_codes(&self) -> &'static [ErrorCode];

    fn get_fixes(&self, ctx: &FixContext<'_>) -> Vec<CodeAction>;
}

/// Fixes indexed by error code.
#[derive(Default)]
pub struct FixRegistry {
    fixes: Vec<Box<dyn CodeFix>>,
    by_code: FxHashMap<ErrorCode, Vec<usize>>,
}

impl FixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in fix.
    pub fn with_builtin_fixes() -> Self {
        let mut registry = Self::new();
        registry.register(RegisterView);
        registry.register(AddCompanionFactory);
        registry.register(PreferConstructor);
        registry
    }

    pub fn register<F: CodeFix + 'static>(&mut self, fix: F) {
        let idx = self.fixes.len();
        for &code in fix.error_codes() {
            self.by_code.entry(code).or_default().push(idx);
        }
        self.fixes.push(Box::new(fix));
    }

    /// All actions for the context's diagnostic, preferred first.
    pub fn get_fixes(&self, ctx: &FixContext<'_>) -> Vec<CodeAction> {
        let mut actions: Vec<CodeAction> = self
            .by_code
            .get(&ctx.diagnostic.code)
            .into_iter()
            .flatten()
            .flat_map(|&idx| self.fixes[idx].get_fixes(ctx))
            .collect();
        actions.sort_by_key(|a| !a.is_preferred);
        actions
    }

    pub fn has_fixes_for(&self, code: ErrorCode) -> bool {
        self.by_code.contains_key(&code)
    }

    pub fn fix_count(&self) -> usize {
        self.fixes.len()
    }
}

impl std::fmt::Debug for FixRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixRegistry")
            .field("fix_count", &self.fix_count())
            .finish_non_exhaustive()
    }
}

/// `ApiClient d0, Logger d1` → `[("ApiClient", "d0"), ("Logger", "d1")]`.
pub fn parse_injected_signature(text: &str) -> Option<Vec<(String, String)>> {
    split_top_level(text, ',')
        .into_iter()
        .map(|param| {
            let (ty, name) = param.rsplit_once(char::is_whitespace)?;
            Some((ty.trim().to_owned(), name.to_owned()))
        })
        .collect()
}

/// Companion registration plus stub, as far as the bag describes them.
fn companion_edits(
    ctx: &FixContext<'_>,
    container: &DeclKey,
    view: &str,
    with_registration: bool,
    with_stub: bool,
) -> Option<Vec<EditOp>> {
    let factory = ctx.prop(props::FACTORY_TYPE)?;
    let function = ctx.prop(props::FUNCTION_NAME)?;
    let companion = ctx.prop(props::COMPANION_TYPE)?;
    let params = parse_injected_signature(ctx.prop(props::INJECTED_SIGNATURE)?)?;

    let mut edits = Vec::new();
    if with_registration {
        edits.push(EditOp::InsertRegistration {
            container: container.clone(),
            service: factory.to_owned(),
            factory: Some(function.to_owned()),
            after: ctx.config.keep_pairs_adjacent.then(|| view.to_owned()),
        });
    } else if ctx.config.keep_pairs_adjacent {
        edits.push(EditOp::KeepAdjacent {
            container: container.clone(),
            services: vec![factory.to_owned(), companion.to_owned()],
            after: view.to_owned(),
        });
    }
    if with_stub {
        edits.push(EditOp::InsertStub {
            container: container.clone(),
            name: function.to_owned(),
            params,
            result: factory.to_owned(),
        });
    }
    Some(edits)
}

/// VMF001: register the view (and its companion factory) in the nearest
/// container.
struct RegisterView;

impl CodeFix for RegisterView {
    fn error_codes(&self) -> &'static [ErrorCode] {
        &[ErrorCode::VMF001]
    }

    fn get_fixes(&self, ctx: &FixContext<'_>) -> Vec<CodeAction> {
        let (Some(view), Some(start)) = (ctx.prop(props::VIEW), ctx.span_prop(props::VIEW_SPAN_START))
        else {
            return Vec::new();
        };
        let Some(decl) = ctx.program.find(&DeclKey::new(view, start)) else {
            return Vec::new();
        };
        let Some(container) = choose_container(ctx.program, ctx.program.text(decl.location.file))
        else {
            tracing::debug!(view, "no container to register the view in");
            return Vec::new();
        };

        let mut edits = vec![EditOp::InsertRegistration {
            container: container.clone(),
            service: view.to_owned(),
            factory: None,
            after: None,
        }];
        if ctx.prop(props::FUNCTION_NAME).is_some() {
            match companion_edits(ctx, &container, view, true, true) {
                Some(more) => edits.extend(more),
                None => return Vec::new(),
            }
        }

        vec![CodeAction::new(
            format!("Register `{view}` in `{}`", container.name),
            edits,
        )
        .with_applicability(Applicability::MachineApplicable)
        .preferred()]
    }
}

/// VMF002: add whichever of registration and stub is missing.
struct AddCompanionFactory;

impl CodeFix for AddCompanionFactory {
    fn error_codes(&self) -> &'static [ErrorCode] {
        &[ErrorCode::VMF002]
    }

    fn get_fixes(&self, ctx: &FixContext<'_>) -> Vec<CodeAction> {
        let d = ctx.diagnostic;
        let (Some(container), Some(start), Some(view), Some(has_registration), Some(has_stub)) = (
            ctx.prop(props::CONTAINER),
            ctx.span_prop(props::CONTAINER_SPAN_START),
            ctx.prop(props::VIEW),
            d.flag(props::HAS_REGISTRATION),
            d.flag(props::HAS_GENERATED_STUB),
        ) else {
            return Vec::new();
        };
        let container = DeclKey::new(container, start);
        let Some(edits) = companion_edits(ctx, &container, view, !has_registration, !has_stub)
        else {
            return Vec::new();
        };

        let companion = ctx.prop(props::COMPANION_TYPE).unwrap_or(view);
        let title = match (has_registration, has_stub) {
            (false, false) => format!("Add factory registration and stub for `{companion}`"),
            (false, true) => format!("Add factory registration for `{companion}`"),
            _ => format!("Add generated factory stub for `{companion}`"),
        };
        vec![CodeAction::new(title, edits)
            .with_applicability(Applicability::MachineApplicable)
            .preferred()]
    }
}

/// VMF003: mark the reported candidate as preferred. Never applied
/// without an explicit choice.
struct PreferConstructor;

impl CodeFix for PreferConstructor {
    fn error_codes(&self) -> &'static [ErrorCode] {
        &[ErrorCode::VMF003]
    }

    fn get_fixes(&self, ctx: &FixContext<'_>) -> Vec<CodeAction> {
        let (Some(companion), Some(start), Some(constructor)) = (
            ctx.prop(props::COMPANION_TYPE),
            ctx.span_prop(props::COMPANION_SPAN_START),
            ctx.span_prop(props::CONSTRUCTOR_SPAN_START),
        ) else {
            return Vec::new();
        };
        vec![CodeAction::new(
            format!("Prefer the `{companion}` constructor at offset {constructor}"),
            vec![EditOp::AttachMarker {
                decl: DeclKey::new(companion, start),
                constructor,
            }],
        )
        .with_applicability(Applicability::MaybeIncorrect)]
    }
}

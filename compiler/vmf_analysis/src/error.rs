//! Operational failures. Wiring problems are diagnostics, not errors.

use vmf_ir::TypeParseError;

/// A pass that did not run to completion.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis cancelled")]
    Cancelled,
}

/// A remediation batch that could not be applied. The program is left
/// unchanged when this is returned.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no declaration `{name}` at offset {span_start}")]
    MissingDecl { name: String, span_start: u32 },
    #[error("`{owner}` has no constructor at offset {span_start}")]
    MissingConstructor { owner: String, span_start: u32 },
    #[error("cannot parse type `{text}`: {error}")]
    BadType { text: String, error: TypeParseError },
    #[error("registration of `{after}` not found in `{container}`")]
    MissingAnchor { container: String, after: String },
    #[error("the vocabulary names no {0} marker")]
    NoMarkerName(&'static str),
}

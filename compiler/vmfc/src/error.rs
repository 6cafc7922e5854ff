//! Driver failures. Wiring problems are diagnostics, not errors.

use vmf_analysis::{AnalysisError, EditError};
use vmf_ir::LoadError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot write `{path}`: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("fix could not be applied: {0}")]
    Edit(#[from] EditError),
    #[error("unknown error code `{0}`")]
    UnknownCode(String),
    #[error("no documentation available for {0}")]
    NoDocs(String),
    #[error("no ambiguous constructor of `{ty}` at offset {offset}")]
    NoSuchCandidate { ty: String, offset: u32 },
}

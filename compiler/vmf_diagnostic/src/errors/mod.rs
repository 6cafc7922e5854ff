//! Embedded error documentation for `vmfc explain`.
//!
//! Each error code has a markdown file in this directory, embedded at
//! compile time.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Documentation for an error code, if any.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    (ErrorCode::VMF001, include_str!("VMF001.md")),
    (ErrorCode::VMF002, include_str!("VMF002.md")),
    (ErrorCode::VMF003, include_str!("VMF003.md")),
    (ErrorCode::VMF004, include_str!("VMF004.md")),
];

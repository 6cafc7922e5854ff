//! Diagnostics for the view-model factory verifier.
//!
//! Every finding becomes a [`Diagnostic`]:
//! - a stable [`ErrorCode`] for filtering and `explain`
//! - a message saying what is wrong
//! - a primary label at the offending declaration
//! - help lines saying how to fix it
//! - a property bag remediation reads instead of recomputing facts

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;

pub use diagnostic::{Applicability, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;

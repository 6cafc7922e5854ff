//! Factory wiring analysis.
//!
//! Finds every view constructor parameter of a factory type, resolves the
//! companion constructor each factory should call, checks that every
//! container registering a view also provides the companion factory, and
//! renders the generated factory functions.
//!
//! ```text
//! façade ──► extract ──┐
//!        └─► registry ─┴─► resolve ──► check ──► remediate
//!                                 └──► emit
//! ```
//!
//! [`analyze`] runs the whole pass; [`remediate`] turns its diagnostics into
//! edits against a [`vmf_ir::Program`].

mod cancel;
pub mod check;
mod config;
pub mod emit;
mod error;
pub mod extract;
mod factory_spec;
mod pipeline;
pub mod registry;
pub mod remediate;
pub mod resolve;

pub use cancel::CancellationToken;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, EditError};
pub use factory_spec::{function_name, FactorySlot, FactorySpec, InjectedParam};
pub use pipeline::{analyze, Analysis};

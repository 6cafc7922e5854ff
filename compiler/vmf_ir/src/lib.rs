//! Symbol model for the view-model factory verifier.
//!
//! Everything the analysis reads about a program lives here:
//!
//! - [`Name`] / [`StringInterner`]: interned identifiers and paths
//! - [`TypePool`]: hash-consed type references with a one-time
//!   [`TypeClass`] (is this a factory type, and of what)
//! - [`TypeDecl`] and friends: constructors, parameters, members, and
//!   [`Marker`]s classified into [`MarkerKind`]
//! - [`SymbolFacade`]: the read-only oracle the analysis is written against,
//!   implemented by the snapshot-backed [`Program`]

mod classify;
mod decl;
mod interner;
mod name;
mod program;
pub mod snapshot;
mod span;
pub mod type_expr;
mod types;
mod vocabulary;

pub use classify::{strip_nameof, MarkerClassifier};
pub use decl::{
    Binding, Constructor, Lifetime, Marker, MarkerKind, MemberDecl, Param, TypeDecl, Visibility,
};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use program::{
    compilation_units, CompilationUnit, DeclKey, LoadError, LoadWarning, Program, SymbolFacade,
};
pub use span::{Location, Span};
pub use type_expr::{TypeExpr, TypeParseError};
pub use types::{TypeArgs, TypeClass, TypeId, TypePool};
pub use vocabulary::Vocabulary;

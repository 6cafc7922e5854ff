//! Constructor resolution.
//!
//! Picks the one public constructor of a companion type whose leading
//! parameters are exactly the runtime parameter types. Equality is nominal
//! (`TypeId` equality). There is no declaration-order fallback: when more
//! than one constructor matches and the disambiguation markers do not
//! single one out, resolution fails.

use smallvec::SmallVec;
use vmf_ir::{TypeDecl, TypeId};

/// Indexes of the constructors applicable to a runtime prefix.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CandidateSet {
    candidates: SmallVec<[usize; 4]>,
}

impl CandidateSet {
    /// Public constructors with at least `runtime.len()` parameters whose
    /// leading parameter types equal `runtime`.
    pub fn build(companion: &TypeDecl, runtime: &[TypeId]) -> Self {
        let candidates = companion
            .constructors
            .iter()
            .enumerate()
            .filter(|(_, ctor)| {
                ctor.is_public()
                    && ctor.params.len() >= runtime.len()
                    && ctor.params.iter().zip(runtime).all(|(p, &ty)| p.ty == ty)
            })
            .map(|(idx, _)| idx)
            .collect();
        CandidateSet { candidates }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A uniquely chosen constructor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolved {
    /// Index into the companion's constructors.
    pub constructor: usize,
    /// Parameter types after the runtime prefix, in order.
    pub injected: Vec<TypeId>,
}

/// Why no constructor could be chosen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolveError {
    /// No public constructor starts with the runtime types.
    NoMatch { arity: usize },
    /// Several candidates and the markers do not pick exactly one.
    Ambiguous { candidates: Vec<usize> },
}

pub type Resolution = Result<Resolved, ResolveError>;

/// Resolve the constructor a factory for `runtime` should call.
pub fn resolve(companion: &TypeDecl, runtime: &[TypeId]) -> Resolution {
    let set = CandidateSet::build(companion, runtime);
    let chosen = match *set.as_slice() {
        [] => {
            return Err(ResolveError::NoMatch {
                arity: runtime.len(),
            })
        }
        [only] => only,
        ref several => {
            let mut marked = several
                .iter()
                .copied()
                .filter(|&idx| companion.constructors[idx].is_preferred());
            match (marked.next(), marked.next()) {
                (Some(idx), None) => idx,
                _ => {
                    return Err(ResolveError::Ambiguous {
                        candidates: several.to_vec(),
                    })
                }
            }
        }
    };

    let injected = companion.constructors[chosen].params[runtime.len()..]
        .iter()
        .map(|p| p.ty)
        .collect();
    Ok(Resolved {
        constructor: chosen,
        injected,
    })
}

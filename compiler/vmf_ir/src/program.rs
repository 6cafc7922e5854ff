//! The loaded program and the symbol façade trait.
//!
//! [`Program`] is the concrete façade: an immutable view of every declared
//! type, built from a [`ProgramSnapshot`]. Loading interns every name and
//! type and classifies every marker exactly once. Items that cannot be
//! understood are skipped one at a time and reported as [`LoadWarning`]s;
//! nothing short of unreadable JSON aborts a load.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::classify::MarkerClassifier;
use crate::snapshot::{
    ConstructorSnapshot, MarkerSnapshot, MemberSnapshot, ParamSnapshot, ProgramSnapshot,
    SpanSnapshot, TypeSnapshot,
};
use crate::type_expr::TypeParseError;
use crate::{
    Constructor, Location, Marker, MarkerKind, MemberDecl, Name, Param, SharedInterner, Span,
    StringInterner, TypeDecl, TypeId, TypePool, Visibility, Vocabulary,
};

/// Read-only access to declared symbols.
///
/// The analysis is generic over this trait so that a host compiler can
/// provide symbols directly; [`Program`] is the snapshot-backed
/// implementation. Implementations must be shareable across the worker
/// threads of the collection phase.
pub trait SymbolFacade: Sync {
    fn interner(&self) -> &StringInterner;
    fn pool(&self) -> &TypePool;
    fn decls(&self) -> &[TypeDecl];
    fn decl_of(&self, ty: TypeId) -> Option<&TypeDecl>;

    /// Text of an interned name.
    fn text(&self, name: Name) -> &str {
        self.interner().lookup(name)
    }
}

/// Stable identity for a declaration across edits: full name plus span
/// start. Edits are keyed by this rather than by index so they can be
/// re-resolved against a program that earlier edits already changed.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DeclKey {
    pub name: String,
    pub span_start: u32,
}

impl DeclKey {
    pub fn new(name: impl Into<String>, span_start: u32) -> Self {
        DeclKey {
            name: name.into(),
            span_start,
        }
    }
}

/// Declarations from one source file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompilationUnit {
    pub file: Name,
    /// Indexes into [`SymbolFacade::decls`], in declaration order.
    pub decls: Vec<usize>,
}

/// Group declarations by file, ordered by file path.
pub fn compilation_units<F: SymbolFacade + ?Sized>(facade: &F) -> Vec<CompilationUnit> {
    let mut by_file: BTreeMap<&str, CompilationUnit> = BTreeMap::new();
    for (idx, decl) in facade.decls().iter().enumerate() {
        let file = decl.location.file;
        by_file
            .entry(facade.text(file))
            .or_insert_with(|| CompilationUnit {
                file,
                decls: Vec::new(),
            })
            .decls
            .push(idx);
    }
    by_file.into_values().collect()
}

/// A snapshot item that was skipped or degraded during loading.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LoadWarning {
    #[error("duplicate declaration of `{name}`; keeping the first")]
    DuplicateType { name: String },
    #[error("`{owner}`: cannot parse type `{text}`: {error}")]
    BadType {
        owner: String,
        text: String,
        error: TypeParseError,
    },
    #[error("`{owner}`: unknown visibility `{text}`")]
    BadVisibility { owner: String, text: String },
    #[error("`{owner}`: marker `{marker}` does not name one or two types")]
    MalformedBinding { owner: String, marker: String },
}

/// Failure to read a snapshot at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot-backed symbol façade.
#[derive(Clone, Debug)]
pub struct Program {
    interner: SharedInterner,
    vocabulary: Vocabulary,
    pool: TypePool,
    classifier: MarkerClassifier,
    decls: Vec<TypeDecl>,
    by_type: FxHashMap<TypeId, usize>,
    warnings: Vec<LoadWarning>,
}

impl SymbolFacade for Program {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn pool(&self) -> &TypePool {
        &self.pool
    }

    fn decls(&self) -> &[TypeDecl] {
        &self.decls
    }

    fn decl_of(&self, ty: TypeId) -> Option<&TypeDecl> {
        self.by_type.get(&ty).map(|&idx| &self.decls[idx])
    }
}

impl Program {
    /// Read and load a snapshot file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(Self::from_snapshot(&ProgramSnapshot::from_json(text)?))
    }

    /// Build a program, skipping malformed items.
    pub fn from_snapshot(snapshot: &ProgramSnapshot) -> Self {
        let interner = SharedInterner::new();
        let pool = TypePool::new(interner.clone(), &snapshot.vocabulary);
        let classifier = MarkerClassifier::new(&snapshot.vocabulary, &interner);
        let mut program = Program {
            interner,
            vocabulary: snapshot.vocabulary.clone(),
            pool,
            classifier,
            decls: Vec::with_capacity(snapshot.types.len()),
            by_type: FxHashMap::default(),
            warnings: Vec::new(),
        };

        for ty in &snapshot.types {
            if let Some(decl) = program.load_type(ty) {
                if program.by_type.contains_key(&decl.ty) {
                    program.warn(LoadWarning::DuplicateType {
                        name: ty.name.clone(),
                    });
                    continue;
                }
                program.by_type.insert(decl.ty, program.decls.len());
                program.decls.push(decl);
            }
        }

        tracing::debug!(
            types = program.decls.len(),
            warnings = program.warnings.len(),
            "program loaded"
        );
        program
    }

    fn warn(&mut self, warning: LoadWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn intern_type(&mut self, owner: &str, text: &str) -> Option<TypeId> {
        match self.pool.intern_str(text) {
            Ok(id) => Some(id),
            Err(error) => {
                self.warn(LoadWarning::BadType {
                    owner: owner.to_owned(),
                    text: text.to_owned(),
                    error,
                });
                None
            }
        }
    }

    fn load_type(&mut self, snapshot: &TypeSnapshot) -> Option<TypeDecl> {
        let owner = snapshot.name.as_str();
        let ty = self.intern_type(owner, owner)?;
        let file = self.interner.intern(&snapshot.file);

        let markers = snapshot
            .markers
            .iter()
            .filter_map(|m| self.load_marker(owner, file, m))
            .collect();
        let constructors = snapshot
            .constructors
            .iter()
            .filter_map(|c| self.load_constructor(owner, file, c))
            .collect();
        let members = snapshot
            .members
            .iter()
            .filter_map(|m| self.load_member(owner, file, m))
            .collect();

        Some(TypeDecl {
            ty,
            location: Location::new(file, span_of(snapshot.span)),
            constructors,
            markers,
            members,
        })
    }

    fn load_types(&mut self, owner: &str, texts: &[String]) -> Option<Vec<TypeId>> {
        texts
            .iter()
            .map(|text| self.intern_type(owner, text))
            .collect()
    }

    fn load_marker(&mut self, owner: &str, file: Name, snapshot: &MarkerSnapshot) -> Option<Marker> {
        let type_args = self.load_types(owner, &snapshot.type_args)?;
        let type_literals = self.load_types(owner, &snapshot.type_literals)?;
        let named = snapshot
            .named
            .iter()
            .map(|(key, value)| (self.interner.intern(key), value.clone()))
            .collect();
        let marker = self.marker(
            &snapshot.name,
            type_args,
            type_literals,
            named,
            Location::new(file, span_of(snapshot.span)),
        );
        if marker.kind == MarkerKind::Unclassified && self.names_binding(&snapshot.name) {
            self.warn(LoadWarning::MalformedBinding {
                owner: owner.to_owned(),
                marker: snapshot.name.clone(),
            });
        }
        Some(marker)
    }

    fn names_binding(&self, marker: &str) -> bool {
        let marker = crate::vocabulary::normalize_marker_name(marker);
        let v = &self.vocabulary;
        [&v.singleton_markers, &v.scoped_markers, &v.transient_markers]
            .into_iter()
            .flatten()
            .any(|name| crate::vocabulary::normalize_marker_name(name) == marker)
    }

    fn load_params(&mut self, owner: &str, file: Name, span: Span, params: &[ParamSnapshot]) -> Option<Vec<Param>> {
        params
            .iter()
            .map(|p| {
                let ty = self.intern_type(owner, &p.ty)?;
                Some(Param {
                    ty,
                    name: self.interner.intern(&p.name),
                    location: Location::new(file, span),
                })
            })
            .collect()
    }

    fn load_constructor(
        &mut self,
        owner: &str,
        file: Name,
        snapshot: &ConstructorSnapshot,
    ) -> Option<Constructor> {
        let Some(visibility) = Visibility::parse(&snapshot.visibility) else {
            self.warn(LoadWarning::BadVisibility {
                owner: owner.to_owned(),
                text: snapshot.visibility.clone(),
            });
            return None;
        };
        let span = span_of(snapshot.span);
        let params = self.load_params(owner, file, span, &snapshot.params)?;
        let markers = snapshot
            .markers
            .iter()
            .filter_map(|m| self.load_marker(owner, file, m))
            .collect();
        Some(Constructor {
            params,
            visibility,
            markers,
            location: Location::new(file, span),
        })
    }

    fn load_member(&mut self, owner: &str, file: Name, snapshot: &MemberSnapshot) -> Option<MemberDecl> {
        let span = span_of(snapshot.span);
        let params = self.load_params(owner, file, span, &snapshot.params)?;
        let result = self.intern_type(owner, &snapshot.result)?;
        Some(MemberDecl {
            name: self.interner.intern(&snapshot.name),
            is_static: snapshot.is_static,
            params,
            result,
            location: Location::new(file, span),
        })
    }

    /// Build a classified marker. Used by loading and by remediation when it
    /// inserts registrations or disambiguation markers.
    pub fn marker(
        &self,
        name: &str,
        type_args: Vec<TypeId>,
        type_literals: Vec<TypeId>,
        named: Vec<(Name, String)>,
        location: Location,
    ) -> Marker {
        let name = self.interner.intern(name);
        let kind = self
            .classifier
            .classify(&self.interner, name, &type_args, &type_literals, &named);
        Marker {
            name,
            type_args,
            type_literals,
            named,
            location,
            kind,
        }
    }

    pub fn shared_interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn pool_mut(&mut self) -> &mut TypePool {
        &mut self.pool
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Stable key of a declaration.
    pub fn key_of(&self, decl: &TypeDecl) -> DeclKey {
        DeclKey::new(self.pool.display(decl.ty), decl.location.span.start)
    }

    /// Find a declaration by stable key.
    pub fn find(&self, key: &DeclKey) -> Option<&TypeDecl> {
        let ty = self.pool.lookup_str(&key.name)?;
        self.decl_of(ty)
            .filter(|decl| decl.location.span.start == key.span_start)
    }

    /// Find a declaration by stable key for editing.
    pub fn find_mut(&mut self, key: &DeclKey) -> Option<&mut TypeDecl> {
        let ty = self.pool.lookup_str(&key.name)?;
        let idx = *self.by_type.get(&ty)?;
        let decl = &mut self.decls[idx];
        (decl.location.span.start == key.span_start).then_some(decl)
    }

    /// Serialize back to a snapshot; loading the result yields an equal
    /// program.
    pub fn to_snapshot(&self) -> ProgramSnapshot {
        ProgramSnapshot {
            vocabulary: self.vocabulary.clone(),
            types: self.decls.iter().map(|d| self.type_snapshot(d)).collect(),
        }
    }

    fn type_snapshot(&self, decl: &TypeDecl) -> TypeSnapshot {
        TypeSnapshot {
            name: self.pool.display(decl.ty),
            file: self.interner.lookup(decl.location.file).to_owned(),
            span: snapshot_span(decl.location.span),
            markers: decl.markers.iter().map(|m| self.marker_snapshot(m)).collect(),
            constructors: decl
                .constructors
                .iter()
                .map(|c| ConstructorSnapshot {
                    visibility: c.visibility.as_str().to_owned(),
                    params: self.param_snapshots(&c.params),
                    markers: c.markers.iter().map(|m| self.marker_snapshot(m)).collect(),
                    span: snapshot_span(c.location.span),
                })
                .collect(),
            members: decl
                .members
                .iter()
                .map(|m| MemberSnapshot {
                    name: self.interner.lookup(m.name).to_owned(),
                    is_static: m.is_static,
                    params: self.param_snapshots(&m.params),
                    result: self.pool.display(m.result),
                    span: snapshot_span(m.location.span),
                })
                .collect(),
        }
    }

    fn param_snapshots(&self, params: &[Param]) -> Vec<ParamSnapshot> {
        params
            .iter()
            .map(|p| ParamSnapshot {
                ty: self.pool.display(p.ty),
                name: self.interner.lookup(p.name).to_owned(),
            })
            .collect()
    }

    fn marker_snapshot(&self, marker: &Marker) -> MarkerSnapshot {
        MarkerSnapshot {
            name: self.interner.lookup(marker.name).to_owned(),
            type_args: marker.type_args.iter().map(|&t| self.pool.display(t)).collect(),
            type_literals: marker
                .type_literals
                .iter()
                .map(|&t| self.pool.display(t))
                .collect(),
            named: marker
                .named
                .iter()
                .map(|(k, v)| (self.interner.lookup(*k).to_owned(), v.clone()))
                .collect(),
            span: snapshot_span(marker.location.span),
        }
    }
}

fn span_of(span: SpanSnapshot) -> Span {
    Span::new(span[0], span[1])
}

fn snapshot_span(span: Span) -> SpanSnapshot {
    [span.start, span.end]
}

//! Declarations exposed by the symbol façade.

use std::fmt;

use crate::{Location, Name, TypeId};

/// Declared accessibility of a constructor or member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "public" => Some(Visibility::Public),
            "internal" => Some(Visibility::Internal),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// A constructor or member parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub ty: TypeId,
    pub name: Name,
    pub location: Location,
}

/// Registration lifetime.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Lifetime {
    Singleton,
    Scoped,
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "singleton"),
            Lifetime::Scoped => write!(f, "scoped"),
            Lifetime::Transient => write!(f, "transient"),
        }
    }
}

/// A lifetime marker normalized to one representation, whichever of the
/// three binding forms declared it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Binding {
    pub lifetime: Lifetime,
    /// The service type a consumer asks for.
    pub service: TypeId,
    /// The type the binding produces; equals `service` for the
    /// single-argument form.
    pub bound: TypeId,
    /// Factory-method reference, when the binding names one.
    pub factory: Option<Name>,
}

impl Binding {
    pub fn has_explicit_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Whether this binding registers `ty` as either its service or its
    /// implementation.
    pub fn binds(&self, ty: TypeId) -> bool {
        self.service == ty || self.bound == ty
    }
}

/// What a marker means, decided once when the marker is loaded.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MarkerKind {
    Unclassified,
    Container,
    Lifetime(Binding),
    Disambiguation,
    /// Module composition; recorded, never expanded.
    Import(TypeId),
}

/// A declarative marker attached to a type or constructor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Marker {
    /// Marker name as written.
    pub name: Name,
    /// Generic arguments, `Transient<IService, Impl>`.
    pub type_args: Vec<TypeId>,
    /// Type-literal constructor arguments, `Transient(typeof(Impl))`.
    pub type_literals: Vec<TypeId>,
    /// Named arguments in declaration order.
    pub named: Vec<(Name, String)>,
    pub location: Location,
    pub kind: MarkerKind,
}

impl Marker {
    pub fn binding(&self) -> Option<&Binding> {
        match &self.kind {
            MarkerKind::Lifetime(binding) => Some(binding),
            _ => None,
        }
    }
}

/// A constructor declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub visibility: Visibility,
    pub markers: Vec<Marker>,
    pub location: Location,
}

impl Constructor {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the constructor carries a disambiguation marker.
    pub fn is_preferred(&self) -> bool {
        self.markers
            .iter()
            .any(|m| m.kind == MarkerKind::Disambiguation)
    }
}

/// A method declared on a type; generated-function stubs are members.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberDecl {
    pub name: Name,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub result: TypeId,
    pub location: Location,
}

/// A declared type with everything the analysis reads from it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDecl {
    pub ty: TypeId,
    pub location: Location,
    pub constructors: Vec<Constructor>,
    pub markers: Vec<Marker>,
    pub members: Vec<MemberDecl>,
}

impl TypeDecl {
    pub fn is_container(&self) -> bool {
        self.markers.iter().any(|m| m.kind == MarkerKind::Container)
    }

    /// Lifetime bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&Marker, &Binding)> {
        self.markers
            .iter()
            .filter_map(|m| m.binding().map(|binding| (m, binding)))
    }

    /// Composed modules, in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.markers.iter().filter_map(|m| match m.kind {
            MarkerKind::Import(ty) => Some(ty),
            _ => None,
        })
    }
}

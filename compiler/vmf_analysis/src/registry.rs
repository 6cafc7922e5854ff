//! Registration index.
//!
//! A type is a container iff it carries a container marker. Each container
//! owns its direct registrations, normalized from whichever binding form
//! declared them. Imported modules are recorded but never expanded: a
//! container is checked against its own list only.

use vmf_ir::{CompilationUnit, Lifetime, Location, Name, SymbolFacade, TypeDecl, TypeId};

/// One lifetime binding on a container.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Registration {
    pub lifetime: Lifetime,
    pub service: TypeId,
    /// The registered implementation; equals `service` for single-type
    /// bindings.
    pub bound: TypeId,
    pub factory: Option<Name>,
    pub site: Location,
}

impl Registration {
    pub fn has_explicit_factory(&self) -> bool {
        self.factory.is_some()
    }

    pub fn binds(&self, ty: TypeId) -> bool {
        self.service == ty || self.bound == ty
    }
}

/// A container and its direct registrations, in declaration order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
    pub ty: TypeId,
    /// Index into [`SymbolFacade::decls`].
    pub decl: usize,
    pub location: Location,
    pub registrations: Vec<Registration>,
    pub imports: Vec<TypeId>,
}

impl Container {
    fn from_decl(decl: &TypeDecl, idx: usize) -> Self {
        Container {
            ty: decl.ty,
            decl: idx,
            location: decl.location,
            registrations: decl
                .bindings()
                .map(|(marker, binding)| Registration {
                    lifetime: binding.lifetime,
                    service: binding.service,
                    bound: binding.bound,
                    factory: binding.factory,
                    site: marker.location,
                })
                .collect(),
            imports: decl.imports().collect(),
        }
    }

    pub fn registers(&self, ty: TypeId) -> bool {
        self.registrations.iter().any(|r| r.binds(ty))
    }
}

/// Containers found in one compilation unit.
pub fn index_unit<F: SymbolFacade + ?Sized>(facade: &F, unit: &CompilationUnit) -> Vec<Container> {
    unit.decls
        .iter()
        .map(|&idx| (idx, &facade.decls()[idx]))
        .filter(|(_, decl)| decl.is_container())
        .map(|(idx, decl)| Container::from_decl(decl, idx))
        .collect()
}

/// Every container in the program, ordered by display name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegistrationIndex {
    containers: Vec<Container>,
}

impl RegistrationIndex {
    /// Merge per-unit results. The final order does not depend on the
    /// order the parts arrive in.
    pub fn from_parts<F: SymbolFacade + ?Sized>(
        facade: &F,
        parts: impl IntoIterator<Item = Vec<Container>>,
    ) -> Self {
        let pool = facade.pool();
        let mut containers: Vec<Container> = parts.into_iter().flatten().collect();
        containers.sort_by_cached_key(|c| (pool.display(c.ty), c.location.span.start));
        for container in &containers {
            for &import in &container.imports {
                tracing::debug!(
                    container = %pool.display(container.ty),
                    import = %pool.display(import),
                    "module import recorded, not expanded"
                );
            }
        }
        RegistrationIndex { containers }
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Containers with a direct registration of `ty`, with their index in
    /// [`Self::containers`].
    pub fn registering(&self, ty: TypeId) -> impl Iterator<Item = (usize, &Container)> {
        self.containers
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.registers(ty))
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

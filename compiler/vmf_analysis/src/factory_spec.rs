//! Factory slots and the specs resolved from them.

use vmf_ir::{Location, SymbolFacade, TypeArgs, TypeId};

/// A constructor parameter whose type is a factory type.
///
/// Slots are what collection finds; a [`FactorySpec`] is what a slot
/// becomes once its companion constructor resolves.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FactorySlot {
    /// The declaring type.
    pub view: TypeId,
    pub view_location: Location,
    /// The parameter's factory type, e.g. `Func<Guid, DetailViewModel>`.
    pub factory: TypeId,
    pub companion: TypeId,
    /// Factory arguments minus the result, in order.
    pub runtime: TypeArgs,
    /// Location of the declaring constructor parameter.
    pub location: Location,
}

/// An injected constructor parameter, forwarded after the runtime prefix.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct InjectedParam {
    pub ty: TypeId,
    /// `d0`, `d1`, ...
    pub name: String,
}

/// Everything needed to generate and check one factory function.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FactorySpec {
    pub view: TypeId,
    pub companion: TypeId,
    pub factory: TypeId,
    pub runtime: TypeArgs,
    pub injected: Vec<InjectedParam>,
    /// `Create` + short name of the companion.
    pub function_name: String,
    /// Index of the chosen constructor on the companion declaration.
    pub constructor: usize,
    pub location: Location,
}

impl FactorySpec {
    /// Complete a slot with the injected suffix of the chosen constructor.
    pub fn new<F: SymbolFacade + ?Sized>(
        facade: &F,
        slot: &FactorySlot,
        constructor: usize,
        injected: &[TypeId],
    ) -> Self {
        FactorySpec {
            view: slot.view,
            companion: slot.companion,
            factory: slot.factory,
            runtime: slot.runtime.clone(),
            injected: injected
                .iter()
                .enumerate()
                .map(|(i, &ty)| InjectedParam {
                    ty,
                    name: format!("d{i}"),
                })
                .collect(),
            function_name: function_name(facade.pool().short_name(slot.companion)),
            constructor,
            location: slot.location,
        }
    }

    pub fn injected_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.injected.iter().map(|p| p.ty)
    }

    /// `ApiClient d0, Logger d1`
    pub fn injected_signature<F: SymbolFacade + ?Sized>(&self, facade: &F) -> String {
        self.injected
            .iter()
            .map(|p| format!("{} {}", facade.pool().display(p.ty), p.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `Guid, string`
    pub fn runtime_signature<F: SymbolFacade + ?Sized>(&self, facade: &F) -> String {
        self.runtime
            .iter()
            .map(|&ty| facade.pool().display(ty))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Generated function name for a companion's short name.
pub fn function_name(companion_short_name: &str) -> String {
    format!("Create{companion_short_name}")
}

//! Marker classification.
//!
//! Marker names are compared as interned `Name`s against a table built once
//! from the [`Vocabulary`], never by re-parsing display strings.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::vocabulary::normalize_marker_name;
use crate::{Binding, Lifetime, MarkerKind, Name, StringInterner, TypeId, Vocabulary};

/// Lookup tables for [`MarkerKind`] classification.
#[derive(Clone, Debug)]
pub struct MarkerClassifier {
    containers: FxHashSet<Name>,
    lifetimes: FxHashMap<Name, Lifetime>,
    disambiguation: FxHashSet<Name>,
    imports: FxHashSet<Name>,
    factory_argument: Name,
}

impl MarkerClassifier {
    pub fn new(vocabulary: &Vocabulary, interner: &StringInterner) -> Self {
        let set = |names: &[String]| -> FxHashSet<Name> {
            names
                .iter()
                .map(|n| interner.intern(normalize_marker_name(n)))
                .collect()
        };

        let mut lifetimes = FxHashMap::default();
        for (names, lifetime) in [
            (&vocabulary.singleton_markers, Lifetime::Singleton),
            (&vocabulary.scoped_markers, Lifetime::Scoped),
            (&vocabulary.transient_markers, Lifetime::Transient),
        ] {
            for name in names {
                lifetimes.insert(interner.intern(normalize_marker_name(name)), lifetime);
            }
        }

        MarkerClassifier {
            containers: set(&vocabulary.container_markers),
            lifetimes,
            disambiguation: set(&vocabulary.disambiguation_markers),
            imports: set(&vocabulary.import_markers),
            factory_argument: interner.intern(&vocabulary.factory_argument),
        }
    }

    /// Classify one marker.
    ///
    /// Lifetime markers whose type arguments cannot be normalized to one or
    /// two types stay `Unclassified`; the caller logs and skips them.
    pub fn classify(
        &self,
        interner: &StringInterner,
        name: Name,
        type_args: &[TypeId],
        type_literals: &[TypeId],
        named: &[(Name, String)],
    ) -> MarkerKind {
        let Some(key) = interner.get(normalize_marker_name(interner.lookup(name))) else {
            return MarkerKind::Unclassified;
        };

        if self.containers.contains(&key) {
            return MarkerKind::Container;
        }
        if self.disambiguation.contains(&key) {
            return MarkerKind::Disambiguation;
        }

        let types = if type_args.is_empty() {
            type_literals
        } else {
            type_args
        };

        if self.imports.contains(&key) {
            return types
                .first()
                .map_or(MarkerKind::Unclassified, |&ty| MarkerKind::Import(ty));
        }

        let Some(&lifetime) = self.lifetimes.get(&key) else {
            return MarkerKind::Unclassified;
        };
        let (service, bound) = match *types {
            [single] => (single, single),
            [service, implementation] => (service, implementation),
            _ => return MarkerKind::Unclassified,
        };
        let factory = named
            .iter()
            .find(|(arg, _)| *arg == self.factory_argument)
            .map(|(_, value)| interner.intern(strip_nameof(value)));

        MarkerKind::Lifetime(Binding {
            lifetime,
            service,
            bound,
            factory,
        })
    }
}

/// `nameof(CreateFoo)` → `CreateFoo`; a quoted `"CreateFoo"` → `CreateFoo`.
pub fn strip_nameof(value: &str) -> &str {
    let value = value.trim();
    let value = value
        .strip_prefix("nameof(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(value)
        .trim();
    value.trim_matches('"')
}

//! Recognized marker and type names.
//!
//! The host program communicates intent through declarative markers and a
//! generic factory type. Which names mean what is configurable; the defaults
//! follow the common attribute spelling. Classification against these names
//! happens once at load time (see [`crate::TypeClass`] and
//! [`crate::MarkerKind`]).

use serde::{Deserialize, Serialize};

/// Names the classifier recognizes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Vocabulary {
    /// Generic heads whose last type argument is the produced type.
    pub factory_types: Vec<String>,
    /// Markers that turn a declaration into a Container.
    pub container_markers: Vec<String>,
    pub singleton_markers: Vec<String>,
    pub scoped_markers: Vec<String>,
    pub transient_markers: Vec<String>,
    /// Markers selecting the preferred constructor.
    pub disambiguation_markers: Vec<String>,
    /// Markers composing another Container into this one.
    pub import_markers: Vec<String>,
    /// Named marker argument holding a factory-method reference.
    pub factory_argument: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| (*s).to_owned()).collect()
        }

        Vocabulary {
            factory_types: owned(&["Func", "System.Func"]),
            container_markers: owned(&["ServiceProvider", "ServiceProviderModule"]),
            singleton_markers: owned(&["Singleton"]),
            scoped_markers: owned(&["Scoped"]),
            transient_markers: owned(&["Transient"]),
            disambiguation_markers: owned(&[
                "PreferredConstructor",
                "ActivatorUtilitiesConstructor",
            ]),
            import_markers: owned(&["Import"]),
            factory_argument: "Factory".to_owned(),
        }
    }
}

/// Strip a trailing `Attribute` so `SingletonAttribute` and `Singleton`
/// classify the same way.
pub fn normalize_marker_name(name: &str) -> &str {
    match name.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_marker_name() {
        assert_eq!(normalize_marker_name("SingletonAttribute"), "Singleton");
        assert_eq!(normalize_marker_name("Transient"), "Transient");
        assert_eq!(normalize_marker_name("Attribute"), "Attribute");
    }

    #[test]
    fn test_partial_vocabulary_fills_defaults() {
        let vocab: Vocabulary =
            serde_json::from_str(r#"{ "factory_types": ["Factory"] }"#).unwrap_or_default();
        assert_eq!(vocab.factory_types, vec!["Factory".to_owned()]);
        assert_eq!(vocab.transient_markers, vec!["Transient".to_owned()]);
        assert_eq!(vocab.factory_argument, "Factory");
    }
}

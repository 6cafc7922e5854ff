//! Serialized program snapshots.
//!
//! A snapshot is the on-disk form of everything the symbol façade exposes:
//! declared types with their files and spans, constructors, markers with
//! type arguments and named arguments, and member declarations. Types are
//! written as text (`Func<Guid, DetailViewModel>`) and interned on load.
//!
//! The builder-style helpers on the snapshot types keep test programs short:
//!
//! ```text
//! let mut snapshot = ProgramSnapshot::default();
//! snapshot.class("MainViewModel", "src/ViewModels/MainViewModel.cs")
//!     .constructor(&[("ApiClient", "api"), ("Logger", "logger")]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Vocabulary;

/// `[start, end]` byte offsets.
pub type SpanSnapshot = [u32; 2];

/// Root of a snapshot file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    #[serde(default)]
    pub vocabulary: Vocabulary,
    #[serde(default)]
    pub types: Vec<TypeSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSnapshot {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub span: SpanSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_literals: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, String>,
    #[serde(default)]
    pub span: SpanSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSnapshot {
    #[serde(default = "public")]
    pub visibility: String,
    #[serde(default)]
    pub params: Vec<ParamSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerSnapshot>,
    #[serde(default)]
    pub span: SpanSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<ParamSnapshot>,
    pub result: String,
    #[serde(default)]
    pub span: SpanSnapshot,
}

fn public() -> String {
    "public".to_owned()
}

/// Spacing of automatically assigned spans in builder-made snapshots.
const TYPE_STRIDE: u32 = 1000;

impl ProgramSnapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Append a type declaration with an automatically assigned span.
    pub fn class(&mut self, name: &str, file: &str) -> &mut TypeSnapshot {
        let start = u32::try_from(self.types.len())
            .unwrap_or(u32::MAX / TYPE_STRIDE)
            .saturating_mul(TYPE_STRIDE);
        self.types.push(TypeSnapshot {
            span: [start, start + TYPE_STRIDE - 1],
            ..TypeSnapshot::new(name, file)
        });
        let last = self.types.len() - 1;
        &mut self.types[last]
    }

    /// Find a type by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeSnapshot> {
        self.types.iter_mut().find(|t| t.name == name)
    }
}

impl TypeSnapshot {
    pub fn new(name: &str, file: &str) -> Self {
        TypeSnapshot {
            name: name.to_owned(),
            file: file.to_owned(),
            ..TypeSnapshot::default()
        }
    }

    fn child_span(&self, slot: usize) -> SpanSnapshot {
        let offset = u32::try_from(slot).unwrap_or(0).saturating_mul(10);
        let start = self.span[0].saturating_add(100).saturating_add(offset);
        [start, start.saturating_add(9)]
    }

    /// Add a public constructor with `(type, name)` parameters.
    pub fn constructor(&mut self, params: &[(&str, &str)]) -> &mut Self {
        self.constructor_with(ConstructorSnapshot::new(params))
    }

    /// Add a constructor; an unset span is assigned automatically.
    pub fn constructor_with(&mut self, mut ctor: ConstructorSnapshot) -> &mut Self {
        if ctor.span == [0, 0] {
            ctor.span = self.child_span(self.constructors.len());
        }
        self.constructors.push(ctor);
        self
    }

    pub fn marker(&mut self, mut marker: MarkerSnapshot) -> &mut Self {
        if marker.span == [0, 0] {
            marker.span = self.child_span(50 + self.markers.len());
        }
        self.markers.push(marker);
        self
    }

    pub fn member(&mut self, mut member: MemberSnapshot) -> &mut Self {
        if member.span == [0, 0] {
            member.span = self.child_span(80 + self.members.len());
        }
        self.members.push(member);
        self
    }
}

impl ConstructorSnapshot {
    pub fn new(params: &[(&str, &str)]) -> Self {
        ConstructorSnapshot {
            visibility: public(),
            params: params
                .iter()
                .map(|(ty, name)| ParamSnapshot::new(ty, name))
                .collect(),
            markers: Vec::new(),
            span: [0, 0],
        }
    }

    /// Attach a disambiguation marker with the given name.
    #[must_use]
    pub fn preferred(mut self, marker: &str) -> Self {
        self.markers.push(MarkerSnapshot::new(marker));
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: &str) -> Self {
        visibility.clone_into(&mut self.visibility);
        self
    }
}

impl ParamSnapshot {
    pub fn new(ty: &str, name: &str) -> Self {
        ParamSnapshot {
            ty: ty.to_owned(),
            name: name.to_owned(),
        }
    }
}

impl MarkerSnapshot {
    pub fn new(name: &str) -> Self {
        MarkerSnapshot {
            name: name.to_owned(),
            ..MarkerSnapshot::default()
        }
    }

    #[must_use]
    pub fn with_type_arg(mut self, ty: &str) -> Self {
        self.type_args.push(ty.to_owned());
        self
    }

    #[must_use]
    pub fn with_type_literal(mut self, ty: &str) -> Self {
        self.type_literals.push(ty.to_owned());
        self
    }

    #[must_use]
    pub fn with_named(mut self, key: &str, value: &str) -> Self {
        self.named.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl MemberSnapshot {
    /// A static member, the shape generated-function stubs take.
    pub fn new_static(name: &str, params: &[(&str, &str)], result: &str) -> Self {
        MemberSnapshot {
            name: name.to_owned(),
            is_static: true,
            params: params
                .iter()
                .map(|(ty, name)| ParamSnapshot::new(ty, name))
                .collect(),
            result: result.to_owned(),
            span: [0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let text = r#"{
            "types": [
                { "name": "MainView", "file": "src/Views/MainView.cs",
                  "constructors": [ { "params": [ { "type": "Func<MainViewModel>", "name": "factory" } ] } ] }
            ]
        }"#;
        let Ok(snapshot) = ProgramSnapshot::from_json(text) else {
            panic!("should deserialize");
        };
        assert_eq!(snapshot.vocabulary, Vocabulary::default());
        assert_eq!(snapshot.types[0].constructors[0].visibility, "public");
        assert_eq!(snapshot.types[0].span, [0, 0]);
    }

    #[test]
    fn test_builder_assigns_distinct_spans() {
        let mut snapshot = ProgramSnapshot::default();
        snapshot.class("A", "a.cs").constructor(&[]).constructor(&[("int", "x")]);
        snapshot.class("B", "b.cs");
        let a = &snapshot.types[0];
        assert_eq!(a.span, [0, 999]);
        assert_ne!(a.constructors[0].span, a.constructors[1].span);
        assert_eq!(snapshot.types[1].span, [1000, 1999]);
    }
}

//! Code emission.
//!
//! One block per container that owns at least one resolved spec, one
//! function per distinct companion type in that block. Rendering is a pure
//! function of the specs, so re-rendering an unchanged program is
//! byte-identical.

use std::collections::BTreeMap;
use std::fmt::Write;

use vmf_ir::type_expr::split_top_level;
use vmf_ir::{SymbolFacade, TypeExpr, TypeParseError};

use crate::registry::RegistrationIndex;
use crate::FactorySpec;

const INDENT: &str = "    ";

/// One generated factory function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedFunction {
    pub name: String,
    /// Factory type, the function's return type.
    pub result: String,
    /// `(type, name)` of each injected parameter.
    pub params: Vec<(String, String)>,
    pub companion: String,
    pub runtime_arity: usize,
}

impl GeneratedFunction {
    pub fn from_spec<F: SymbolFacade + ?Sized>(facade: &F, spec: &FactorySpec) -> Self {
        let pool = facade.pool();
        GeneratedFunction {
            name: spec.function_name.clone(),
            result: pool.display(spec.factory),
            params: spec
                .injected
                .iter()
                .map(|p| (pool.display(p.ty), p.name.clone()))
                .collect(),
            companion: pool.display(spec.companion),
            runtime_arity: spec.runtime.len(),
        }
    }

    /// Declaration line plus the expression body.
    pub fn render(&self, out: &mut String, indent: &str) {
        let params = self
            .params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let runtime: Vec<String> = (0..self.runtime_arity).map(|i| format!("a{i}")).collect();
        let forwarded = runtime
            .iter()
            .cloned()
            .chain(self.params.iter().map(|(_, name)| name.clone()))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{indent}private static {} {}({params})",
            self.result, self.name
        );
        let _ = writeln!(
            out,
            "{indent}{INDENT}=> ({}) => new {}({forwarded});",
            runtime.join(", "),
            self.companion
        );
    }
}

/// Generated declarations for one container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedBlock {
    pub container_name: String,
    pub file: String,
    pub functions: Vec<GeneratedFunction>,
}

impl GeneratedBlock {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let short = vmf_ir::type_expr::short_name(&self.container_name);
        let _ = writeln!(out, "// <auto-generated />");
        let _ = writeln!(out, "// container: {}", self.container_name);
        let _ = writeln!(out, "partial class {short}");
        let _ = writeln!(out, "{{");
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            function.render(&mut out, INDENT);
        }
        let _ = writeln!(out, "}}");
        out
    }
}

/// Why a spec lost its function name to an earlier spec in one container.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NameConflict {
    /// Two distinct companion types with the same short name.
    ShortName,
    /// One companion requested with different runtime or injected types.
    Shape,
}

impl NameConflict {
    /// `None` when `spec` generates exactly what `kept` already does.
    pub fn between(kept: &FactorySpec, spec: &FactorySpec) -> Option<Self> {
        if kept.companion != spec.companion {
            Some(NameConflict::ShortName)
        } else if kept.factory != spec.factory || kept.injected != spec.injected {
            Some(NameConflict::Shape)
        } else {
            None
        }
    }
}

/// Build the generated blocks for every container.
///
/// A container owns a spec when it registers the spec's view. When two
/// specs in one container share a function name, the first in view order
/// wins and the other is logged with its [`NameConflict`].
pub fn emit<F: SymbolFacade + ?Sized>(
    facade: &F,
    index: &RegistrationIndex,
    specs: &[FactorySpec],
) -> Vec<GeneratedBlock> {
    let pool = facade.pool();
    let mut blocks = Vec::new();
    for container in index.containers() {
        let mut chosen: BTreeMap<&str, &FactorySpec> = BTreeMap::new();
        for spec in specs.iter().filter(|s| container.registers(s.view)) {
            match chosen.get(spec.function_name.as_str()) {
                None => {
                    chosen.insert(&spec.function_name, spec);
                }
                Some(kept) => match NameConflict::between(kept, spec) {
                    Some(NameConflict::ShortName) => tracing::warn!(
                        container = %pool.display(container.ty),
                        function = %spec.function_name,
                        kept = %pool.display(kept.companion),
                        dropped = %pool.display(spec.companion),
                        view = %pool.display(spec.view),
                        "companion types share a short name; keeping the first"
                    ),
                    Some(NameConflict::Shape) => tracing::warn!(
                        container = %pool.display(container.ty),
                        kept = %pool.display(kept.factory),
                        dropped = %pool.display(spec.factory),
                        view = %pool.display(spec.view),
                        "companion requested with a different factory shape; keeping the first"
                    ),
                    None => {}
                },
            }
        }
        if chosen.is_empty() {
            continue;
        }
        blocks.push(GeneratedBlock {
            container_name: pool.display(container.ty),
            file: facade.text(container.location.file).to_owned(),
            functions: chosen
                .into_values()
                .map(|spec| GeneratedFunction::from_spec(facade, spec))
                .collect(),
        });
    }
    blocks
}

/// Render every block, separated by blank lines.
pub fn render_all(blocks: &[GeneratedBlock]) -> String {
    blocks
        .iter()
        .map(GeneratedBlock::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A function signature read back from rendered output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedSignature {
    pub name: String,
    pub params: Vec<(TypeExpr, String)>,
    pub result: TypeExpr,
}

/// Failure to read a rendered declaration line.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SignatureError {
    #[error("not a generated declaration: `{0}`")]
    NotADeclaration(String),
    #[error("malformed parameter `{0}`")]
    BadParam(String),
    #[error(transparent)]
    Type(#[from] TypeParseError),
}

impl GeneratedSignature {
    /// Parse `private static <Result> <Name>(<Type> <name>, ...)`.
    pub fn parse(line: &str) -> Result<Self, SignatureError> {
        let not_decl = || SignatureError::NotADeclaration(line.to_owned());
        let rest = line
            .trim()
            .strip_prefix("private static ")
            .ok_or_else(not_decl)?;
        let open = top_level_find(rest, '(').ok_or_else(not_decl)?;
        let close = rest.rfind(')').ok_or_else(not_decl)?;
        if close < open {
            return Err(not_decl());
        }
        let head = rest[..open].trim_end();
        let split = top_level_rfind(head, ' ').ok_or_else(not_decl)?;
        let result = TypeExpr::parse(&head[..split])?;
        let name = head[split + 1..].to_owned();

        let params = split_top_level(&rest[open + 1..close], ',')
            .into_iter()
            .map(|param| {
                let at = top_level_rfind(param, ' ')
                    .ok_or_else(|| SignatureError::BadParam(param.to_owned()))?;
                Ok((
                    TypeExpr::parse(&param[..at])?,
                    param[at + 1..].trim().to_owned(),
                ))
            })
            .collect::<Result<Vec<_>, SignatureError>>()?;

        Ok(GeneratedSignature {
            name,
            params,
            result,
        })
    }

    /// Every declaration line in rendered output.
    pub fn parse_all(text: &str) -> Result<Vec<Self>, SignatureError> {
        text.lines()
            .filter(|line| line.trim_start().starts_with("private static "))
            .map(Self::parse)
            .collect()
    }

    /// Whether this signature is the one `spec` generates.
    pub fn matches<F: SymbolFacade + ?Sized>(&self, facade: &F, spec: &FactorySpec) -> bool {
        let pool = facade.pool();
        self.name == spec.function_name
            && self.result == pool.to_expr(spec.factory)
            && self.params.len() == spec.injected.len()
            && self
                .params
                .iter()
                .zip(&spec.injected)
                .all(|((ty, _), p)| *ty == pool.to_expr(p.ty))
    }
}

fn top_level_find(text: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn top_level_rfind(text: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            '>' => depth += 1,
            '<' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

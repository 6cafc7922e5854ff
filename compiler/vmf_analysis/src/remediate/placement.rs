//! Choosing the container that receives a new registration.

use std::path::{Component, Path};

use vmf_ir::{DeclKey, Program, SymbolFacade};

/// Number of directory steps between the directories of two files: up from
/// `from` to the common ancestor, then down to `to`.
pub fn directory_distance(from: &str, to: &str) -> usize {
    let dirs = |file: &str| -> Vec<String> {
        Path::new(file)
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    let from = dirs(from);
    let to = dirs(to);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    (from.len() - common) + (to.len() - common)
}

/// The container closest to `file`, ties broken by container name.
pub fn choose_container(program: &Program, file: &str) -> Option<DeclKey> {
    program
        .decls()
        .iter()
        .filter(|decl| decl.is_container())
        .map(|decl| {
            let distance = directory_distance(file, program.text(decl.location.file));
            (distance, program.key_of(decl))
        })
        .min()
        .map(|(_, key)| key)
}

#[cfg(test)]
mod tests;

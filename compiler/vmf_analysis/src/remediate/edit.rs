//! Index-based edit operations.
//!
//! Operations name their targets by [`DeclKey`] and by type text, never by
//! position in a vector, so every operation can be re-resolved against the
//! program as earlier operations in the same batch left it. Each operation
//! checks whether its effect is already present and skips itself if so,
//! which makes applying a batch twice the same as applying it once.

use vmf_ir::{
    DeclKey, Location, Marker, MarkerKind, MemberDecl, Param, Program, Span, SymbolFacade,
    TypeDecl, TypeId,
};

use crate::EditError;

/// One structural edit.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum EditOp {
    /// Register `service` on a container, optionally with an explicit
    /// factory method, optionally placed right after the registration of
    /// `after`. An existing registration without a factory is upgraded in
    /// place.
    InsertRegistration {
        container: DeclKey,
        service: String,
        factory: Option<String>,
        after: Option<String>,
    },
    /// Move the first explicit-factory registration of any of `services`
    /// directly after the registration of `after`.
    KeepAdjacent {
        container: DeclKey,
        services: Vec<String>,
        after: String,
    },
    /// Declare a static generated-function stub on a container.
    InsertStub {
        container: DeclKey,
        name: String,
        params: Vec<(String, String)>,
        result: String,
    },
    /// Mark one constructor preferred and unmark its siblings.
    AttachMarker { decl: DeclKey, constructor: u32 },
}

impl EditOp {
    /// The declaration this operation edits.
    pub fn target(&self) -> &DeclKey {
        match self {
            EditOp::InsertRegistration { container, .. }
            | EditOp::KeepAdjacent { container, .. }
            | EditOp::InsertStub { container, .. } => container,
            EditOp::AttachMarker { decl, .. } => decl,
        }
    }
}

/// Counts from one applied batch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchReport {
    pub applied: usize,
    /// Operations whose effect was already present.
    pub skipped: usize,
}

/// Apply `ops` in order as one atomic batch.
///
/// On error the program is left exactly as it was.
pub fn apply_batch(program: &mut Program, ops: &[EditOp]) -> Result<BatchReport, EditError> {
    let mut next = program.clone();
    let mut report = BatchReport::default();
    for op in ops {
        if apply_op(&mut next, op)? {
            report.applied += 1;
        } else {
            tracing::trace!(?op, "edit already satisfied");
            report.skipped += 1;
        }
    }
    tracing::debug!(
        applied = report.applied,
        skipped = report.skipped,
        "edit batch applied"
    );
    *program = next;
    Ok(report)
}

/// Apply one operation. Returns whether anything changed.
fn apply_op(program: &mut Program, op: &EditOp) -> Result<bool, EditError> {
    match op {
        EditOp::InsertRegistration {
            container,
            service,
            factory,
            after,
        } => insert_registration(program, container, service, factory.as_deref(), after.as_deref()),
        EditOp::KeepAdjacent {
            container,
            services,
            after,
        } => keep_adjacent(program, container, services, after),
        EditOp::InsertStub {
            container,
            name,
            params,
            result,
        } => insert_stub(program, container, name, params, result),
        EditOp::AttachMarker { decl, constructor } => attach_marker(program, decl, *constructor),
    }
}

fn intern(program: &mut Program, text: &str) -> Result<TypeId, EditError> {
    program
        .pool_mut()
        .intern_str(text)
        .map_err(|error| EditError::BadType {
            text: text.to_owned(),
            error,
        })
}

fn missing(key: &DeclKey) -> EditError {
    EditError::MissingDecl {
        name: key.name.clone(),
        span_start: key.span_start,
    }
}

fn fetch<'a>(program: &'a Program, key: &DeclKey) -> Result<&'a TypeDecl, EditError> {
    program.find(key).ok_or_else(|| missing(key))
}

fn fetch_mut<'a>(program: &'a mut Program, key: &DeclKey) -> Result<&'a mut TypeDecl, EditError> {
    program.find_mut(key).ok_or_else(|| missing(key))
}

/// Index of the first marker whose binding matches.
fn position(decl: &TypeDecl, pred: impl Fn(&vmf_ir::Binding) -> bool) -> Option<usize> {
    decl.markers
        .iter()
        .position(|m| m.binding().is_some_and(&pred))
}

/// Move `markers[idx]` to directly after `markers[anchor]`. Returns whether
/// anything moved.
fn place_after(markers: &mut Vec<Marker>, idx: usize, anchor: usize) -> bool {
    if idx == anchor + 1 || idx == anchor {
        return false;
    }
    let marker = markers.remove(idx);
    let anchor = if idx < anchor { anchor - 1 } else { anchor };
    markers.insert(anchor + 1, marker);
    true
}

fn insert_point(decl: &TypeDecl) -> Location {
    Location::new(decl.location.file, Span::point(decl.location.span.end))
}

fn insert_registration(
    program: &mut Program,
    key: &DeclKey,
    service: &str,
    factory: Option<&str>,
    after: Option<&str>,
) -> Result<bool, EditError> {
    let ty = intern(program, service)?;
    let anchor_ty = after.map(|text| intern(program, text)).transpose()?;
    let decl = fetch(program, key)?;

    let anchor = match anchor_ty {
        Some(anchor_ty) => Some(position(decl, |b| b.binds(anchor_ty)).ok_or_else(|| {
            EditError::MissingAnchor {
                container: key.name.clone(),
                after: after.unwrap_or_default().to_owned(),
            }
        })?),
        None => None,
    };

    let satisfied = position(decl, |b| {
        b.binds(ty) && (factory.is_none() || b.has_explicit_factory())
    });
    if let Some(idx) = satisfied {
        let moved = match anchor {
            Some(anchor) => place_after(&mut fetch_mut(program, key)?.markers, idx, anchor),
            None => false,
        };
        return Ok(moved);
    }

    let factory_arg = match factory {
        Some(method) => {
            let argument = program.vocabulary().factory_argument.clone();
            Some((
                program.shared_interner().intern(&argument),
                format!("nameof({method})"),
            ))
        }
        None => None,
    };

    // An existing registration keeps its marker and arguments; only the
    // factory reference is added.
    let marker = match position(decl, |b| b.binds(ty)) {
        Some(idx) => {
            let existing = &decl.markers[idx];
            let name = program.text(existing.name).to_owned();
            let mut named = existing.named.clone();
            named.extend(factory_arg);
            let marker = program.marker(
                &name,
                existing.type_args.clone(),
                existing.type_literals.clone(),
                named,
                existing.location,
            );
            (Some(idx), marker)
        }
        None => {
            let marker_name = program
                .vocabulary()
                .transient_markers
                .first()
                .cloned()
                .ok_or(EditError::NoMarkerName("transient"))?;
            let named = factory_arg.into_iter().collect();
            let marker =
                program.marker(&marker_name, Vec::new(), vec![ty], named, insert_point(decl));
            (None, marker)
        }
    };

    let markers = &mut fetch_mut(program, key)?.markers;
    let idx = match marker {
        (Some(idx), marker) => {
            markers[idx] = marker;
            idx
        }
        (None, marker) => {
            markers.push(marker);
            markers.len() - 1
        }
    };
    if let Some(anchor) = anchor {
        place_after(markers, idx, anchor);
    }
    tracing::debug!(container = %key.name, service, ?factory, "registration inserted");
    Ok(true)
}

fn keep_adjacent(
    program: &mut Program,
    key: &DeclKey,
    services: &[String],
    after: &str,
) -> Result<bool, EditError> {
    let pool = program.pool();
    let types: Vec<TypeId> = services.iter().filter_map(|s| pool.lookup_str(s)).collect();
    let Some(anchor_ty) = pool.lookup_str(after) else {
        return Ok(false);
    };
    let decl = fetch(program, key)?;
    let found = position(decl, |b| {
        b.has_explicit_factory() && types.iter().any(|&ty| b.binds(ty))
    });
    let (Some(idx), Some(anchor)) = (found, position(decl, |b| b.binds(anchor_ty))) else {
        return Ok(false);
    };
    Ok(place_after(&mut fetch_mut(program, key)?.markers, idx, anchor))
}

fn insert_stub(
    program: &mut Program,
    key: &DeclKey,
    name: &str,
    params: &[(String, String)],
    result: &str,
) -> Result<bool, EditError> {
    let result = intern(program, result)?;
    let param_types = params
        .iter()
        .map(|(ty, _)| intern(program, ty))
        .collect::<Result<Vec<_>, _>>()?;
    let decl = fetch(program, key)?;

    let exists = decl.members.iter().any(|m| {
        m.is_static
            && program.text(m.name) == name
            && m.result == result
            && m.params.iter().map(|p| p.ty).eq(param_types.iter().copied())
    });
    if exists {
        return Ok(false);
    }

    let location = insert_point(decl);
    let interner = program.shared_interner().clone();
    let member = MemberDecl {
        name: interner.intern(name),
        is_static: true,
        params: param_types
            .iter()
            .zip(params)
            .map(|(&ty, (_, param_name))| Param {
                ty,
                name: interner.intern(param_name),
                location,
            })
            .collect(),
        result,
        location,
    };
    fetch_mut(program, key)?.members.push(member);
    tracing::debug!(container = %key.name, name, "stub inserted");
    Ok(true)
}

fn attach_marker(program: &mut Program, key: &DeclKey, constructor: u32) -> Result<bool, EditError> {
    let decl = fetch(program, key)?;
    let Some(chosen) = decl
        .constructors
        .iter()
        .position(|c| c.location.span.start == constructor)
    else {
        return Err(EditError::MissingConstructor {
            owner: key.name.clone(),
            span_start: constructor,
        });
    };
    let already = decl.constructors.iter().enumerate().all(|(i, c)| c.is_preferred() == (i == chosen));
    if already {
        return Ok(false);
    }

    let marker_name = program
        .vocabulary()
        .disambiguation_markers
        .first()
        .cloned()
        .ok_or(EditError::NoMarkerName("disambiguation"))?;
    let location = decl.constructors[chosen].location;
    let marker = program.marker(&marker_name, Vec::new(), Vec::new(), Vec::new(), location);

    let decl = fetch_mut(program, key)?;
    for (i, ctor) in decl.constructors.iter_mut().enumerate() {
        if i != chosen {
            ctor.markers.retain(|m| m.kind != MarkerKind::Disambiguation);
        }
    }
    let ctor = &mut decl.constructors[chosen];
    if !ctor.is_preferred() {
        ctor.markers.push(marker);
    }
    tracing::debug!(decl = %key.name, constructor, "constructor marked preferred");
    Ok(true)
}

#[cfg(test)]
mod tests;

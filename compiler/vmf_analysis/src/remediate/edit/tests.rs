use super::*;
use pretty_assertions::assert_eq;
use vmf_ir::snapshot::{ConstructorSnapshot, MarkerSnapshot, ProgramSnapshot};

fn container_program(markers: &[MarkerSnapshot]) -> Program {
    let mut snapshot = ProgramSnapshot::default();
    let container = snapshot
        .class("AppContainer", "src/AppContainer.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"));
    for marker in markers {
        container.marker(marker.clone());
    }
    Program::from_snapshot(&snapshot)
}

fn key() -> DeclKey {
    DeclKey::new("AppContainer", 0)
}

/// `(marker name, first type, has factory)` for every marker on the container.
fn markers(program: &Program) -> Vec<(String, String, bool)> {
    let Some(decl) = program.find(&key()) else {
        panic!("container should exist");
    };
    decl.markers
        .iter()
        .map(|m| {
            let ty = m
                .type_args
                .first()
                .or(m.type_literals.first())
                .map(|&t| program.pool().display(t))
                .unwrap_or_default();
            (
                program.text(m.name).to_owned(),
                ty,
                m.binding().is_some_and(vmf_ir::Binding::has_explicit_factory),
            )
        })
        .collect()
}

fn row(marker: &str, ty: &str, factory: bool) -> (String, String, bool) {
    (marker.to_owned(), ty.to_owned(), factory)
}

fn insert_factory(after: Option<&str>) -> EditOp {
    EditOp::InsertRegistration {
        container: key(),
        service: "Func<Guid, DetailViewModel>".to_owned(),
        factory: Some("CreateDetailViewModel".to_owned()),
        after: after.map(str::to_owned),
    }
}

#[test]
fn test_insert_after_anchor() {
    let mut program = container_program(&[
        MarkerSnapshot::new("Transient").with_type_arg("DetailView"),
        MarkerSnapshot::new("Singleton").with_type_arg("Logger"),
    ]);
    let Ok(report) = apply_batch(&mut program, &[insert_factory(Some("DetailView"))]) else {
        panic!("batch should apply");
    };
    assert_eq!(report, BatchReport { applied: 1, skipped: 0 });
    assert_eq!(
        markers(&program),
        vec![
            row("ServiceProvider", "", false),
            row("Transient", "DetailView", false),
            row("Transient", "Func<Guid, DetailViewModel>", true),
            row("Singleton", "Logger", false),
        ]
    );
}

#[test]
fn test_insert_without_anchor_appends() {
    let mut program = container_program(&[
        MarkerSnapshot::new("Transient").with_type_arg("DetailView"),
        MarkerSnapshot::new("Singleton").with_type_arg("Logger"),
    ]);
    assert!(apply_batch(&mut program, &[insert_factory(None)]).is_ok());
    assert_eq!(
        markers(&program).last(),
        Some(&row("Transient", "Func<Guid, DetailViewModel>", true))
    );
}

#[test]
fn test_batch_is_idempotent() {
    let mut program = container_program(&[MarkerSnapshot::new("Transient").with_type_arg("DetailView")]);
    let ops = vec![
        insert_factory(Some("DetailView")),
        EditOp::InsertStub {
            container: key(),
            name: "CreateDetailViewModel".to_owned(),
            params: vec![("ApiClient".to_owned(), "d0".to_owned())],
            result: "Func<Guid, DetailViewModel>".to_owned(),
        },
    ];
    assert_eq!(
        apply_batch(&mut program, &ops),
        Ok(BatchReport { applied: 2, skipped: 0 })
    );
    let once = program.to_snapshot();
    assert_eq!(
        apply_batch(&mut program, &ops),
        Ok(BatchReport { applied: 0, skipped: 2 })
    );
    assert_eq!(program.to_snapshot(), once);
}

#[test]
fn test_upgrade_registration_without_factory() {
    let mut program = container_program(&[
        MarkerSnapshot::new("Transient").with_type_arg("DetailView"),
        MarkerSnapshot::new("Singleton").with_type_arg("Logger"),
        MarkerSnapshot::new("Transient").with_type_literal("Func<Guid, DetailViewModel>"),
    ]);
    assert!(apply_batch(&mut program, &[insert_factory(Some("DetailView"))]).is_ok());
    assert_eq!(
        markers(&program),
        vec![
            row("ServiceProvider", "", false),
            row("Transient", "DetailView", false),
            row("Transient", "Func<Guid, DetailViewModel>", true),
            row("Singleton", "Logger", false),
        ]
    );
}

#[test]
fn test_upgrade_keeps_lifetime_and_named_arguments() {
    let mut program = container_program(&[
        MarkerSnapshot::new("Transient").with_type_arg("DetailView"),
        MarkerSnapshot::new("Singleton")
            .with_type_arg("Func<Guid, DetailViewModel>")
            .with_named("Key", "\"detail\""),
    ]);
    assert_eq!(
        apply_batch(&mut program, &[insert_factory(Some("DetailView"))]),
        Ok(BatchReport { applied: 1, skipped: 0 })
    );
    assert_eq!(
        markers(&program),
        vec![
            row("ServiceProvider", "", false),
            row("Transient", "DetailView", false),
            row("Singleton", "Func<Guid, DetailViewModel>", true),
        ]
    );

    let Some(decl) = program.find(&key()) else {
        panic!("container should exist");
    };
    let named: Vec<(&str, &str)> = decl.markers[2]
        .named
        .iter()
        .map(|(k, v)| (program.text(*k), v.as_str()))
        .collect();
    assert_eq!(
        named,
        vec![
            ("Key", "\"detail\""),
            ("Factory", "nameof(CreateDetailViewModel)"),
        ]
    );
    assert!(matches!(
        decl.markers[2].binding(),
        Some(vmf_ir::Binding {
            lifetime: vmf_ir::Lifetime::Singleton,
            ..
        })
    ));
}

#[test]
fn test_keep_adjacent_moves_existing_registration() {
    let mut program = container_program(&[
        MarkerSnapshot::new("Transient")
            .with_type_arg("DetailViewModel")
            .with_named("Factory", "nameof(CreateDetailViewModel)"),
        MarkerSnapshot::new("Singleton").with_type_arg("Logger"),
        MarkerSnapshot::new("Transient").with_type_arg("DetailView"),
    ]);
    let op = EditOp::KeepAdjacent {
        container: key(),
        services: vec!["Func<Guid, DetailViewModel>".to_owned(), "DetailViewModel".to_owned()],
        after: "DetailView".to_owned(),
    };
    assert_eq!(
        apply_batch(&mut program, std::slice::from_ref(&op)),
        Ok(BatchReport { applied: 1, skipped: 0 })
    );
    assert_eq!(
        markers(&program),
        vec![
            row("ServiceProvider", "", false),
            row("Singleton", "Logger", false),
            row("Transient", "DetailView", false),
            row("Transient", "DetailViewModel", true),
        ]
    );
    assert_eq!(
        apply_batch(&mut program, &[op]),
        Ok(BatchReport { applied: 0, skipped: 1 })
    );
}

#[test]
fn test_failed_batch_leaves_program_unchanged() {
    let mut program = container_program(&[MarkerSnapshot::new("Transient").with_type_arg("DetailView")]);
    let before = program.to_snapshot();
    let ops = vec![
        insert_factory(Some("DetailView")),
        EditOp::InsertStub {
            container: DeclKey::new("MissingContainer", 0),
            name: "CreateX".to_owned(),
            params: vec![],
            result: "Func<X>".to_owned(),
        },
    ];
    assert!(matches!(
        apply_batch(&mut program, &ops),
        Err(EditError::MissingDecl { .. })
    ));
    assert_eq!(program.to_snapshot(), before);
}

#[test]
fn test_missing_anchor_is_an_error() {
    let mut program = container_program(&[]);
    assert!(matches!(
        apply_batch(&mut program, &[insert_factory(Some("DetailView"))]),
        Err(EditError::MissingAnchor { .. })
    ));
}

#[test]
fn test_attach_marker_unmarks_siblings() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("DetailViewModel", "a.cs")
        .constructor_with(
            ConstructorSnapshot::new(&[("Guid", "id"), ("ApiClient", "api")])
                .preferred("PreferredConstructor"),
        )
        .constructor(&[("Guid", "id"), ("Logger", "logger")]);
    let mut program = Program::from_snapshot(&snapshot);
    let key = DeclKey::new("DetailViewModel", 0);
    let second = snapshot.types[0].constructors[1].span[0];

    let op = EditOp::AttachMarker {
        decl: key.clone(),
        constructor: second,
    };
    assert_eq!(
        apply_batch(&mut program, std::slice::from_ref(&op)),
        Ok(BatchReport { applied: 1, skipped: 0 })
    );
    let Some(decl) = program.find(&key) else {
        panic!("decl should exist");
    };
    assert_eq!(
        decl.constructors.iter().map(|c| c.is_preferred()).collect::<Vec<_>>(),
        vec![false, true]
    );
    assert_eq!(
        apply_batch(&mut program, &[op]),
        Ok(BatchReport { applied: 0, skipped: 1 })
    );

    assert!(matches!(
        apply_batch(
            &mut program,
            &[EditOp::AttachMarker {
                decl: key,
                constructor: 7
            }]
        ),
        Err(EditError::MissingConstructor { .. })
    ));
}

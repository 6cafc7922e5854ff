use super::*;
use pretty_assertions::assert_eq;
use vmf_ir::snapshot::{ConstructorSnapshot, MarkerSnapshot, MemberSnapshot, ProgramSnapshot};
use vmf_ir::{compilation_units, Program};

use crate::extract::extract_slots;
use crate::registry::index_unit;

fn run(program: &Program) -> (CheckOutput, RegistrationIndex) {
    let units = compilation_units(program);
    let slots: Vec<_> = units
        .iter()
        .flat_map(|u| extract_slots(program, u))
        .collect();
    let index =
        RegistrationIndex::from_parts(program, units.iter().map(|u| index_unit(program, u)));
    (check(program, &slots, &index), index)
}

fn detail_program(container: impl FnOnce(&mut vmf_ir::snapshot::TypeSnapshot)) -> Program {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("DetailView", "src/Views/DetailView.cs")
        .constructor(&[("Func<Guid, DetailViewModel>", "factory")]);
    snapshot
        .class("DetailViewModel", "src/ViewModels/DetailViewModel.cs")
        .constructor(&[("Guid", "id"), ("ApiClient", "api"), ("Logger", "logger")]);
    container(
        snapshot
            .class("AppContainer", "src/AppContainer.cs")
            .marker(MarkerSnapshot::new("ServiceProvider")),
    );
    Program::from_snapshot(&snapshot)
}

fn factory_registration() -> MarkerSnapshot {
    MarkerSnapshot::new("Transient")
        .with_type_literal("Func<Guid, DetailViewModel>")
        .with_named("Factory", "nameof(CreateDetailViewModel)")
}

fn stub() -> MemberSnapshot {
    MemberSnapshot::new_static(
        "CreateDetailViewModel",
        &[("ApiClient", "d0"), ("Logger", "d1")],
        "Func<Guid, DetailViewModel>",
    )
}

#[test]
fn test_registered_without_factory_reports_once() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"));
    });
    let (out, index) = run(&program);

    assert_eq!(out.findings.len(), 1);
    let Finding::MissingCompanion {
        has_registration,
        has_stub,
        ..
    } = &out.findings[0]
    else {
        panic!("expected a missing-companion finding, got {:?}", out.findings[0]);
    };
    assert!(!has_registration);
    assert!(!has_stub);

    let diags = to_diagnostics(&program, &index, &out.findings);
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.code, ErrorCode::VMF002);
    assert_eq!(diag.property(props::COMPANION_TYPE), Some("DetailViewModel"));
    assert_eq!(diag.property(props::COMPANION_SHORT_NAME), Some("DetailViewModel"));
    assert_eq!(
        diag.property(props::FACTORY_TYPE),
        Some("Func<Guid, DetailViewModel>")
    );
    assert_eq!(diag.property(props::RUNTIME_PARAMETER_TYPES), Some("Guid"));
    assert_eq!(
        diag.property(props::INJECTED_SIGNATURE),
        Some("ApiClient d0, Logger d1")
    );
    assert_eq!(diag.property(props::FUNCTION_NAME), Some("CreateDetailViewModel"));
    assert_eq!(diag.flag(props::HAS_REGISTRATION), Some(false));
    assert_eq!(diag.flag(props::HAS_GENERATED_STUB), Some(false));
    assert_eq!(diag.property(props::CONTAINER), Some("AppContainer"));
}

#[test]
fn test_registration_without_stub_is_partial() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"))
            .marker(factory_registration());
    });
    let (out, _) = run(&program);
    assert!(matches!(
        out.findings.as_slice(),
        [Finding::MissingCompanion {
            has_registration: true,
            has_stub: false,
            ..
        }]
    ));
}

#[test]
fn test_complete_pair_has_no_findings() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"))
            .marker(factory_registration())
            .member(stub());
    });
    let (out, _) = run(&program);
    assert_eq!(out.findings, vec![]);
    assert_eq!(out.specs.len(), 1);
}

#[test]
fn test_companion_registered_by_its_own_type_counts() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"))
            .marker(
                MarkerSnapshot::new("Transient")
                    .with_type_arg("DetailViewModel")
                    .with_named("Factory", "\"CreateDetailViewModel\""),
            )
            .member(stub());
    });
    let (out, _) = run(&program);
    assert_eq!(out.findings, vec![]);
}

#[test]
fn test_stub_with_wrong_signature_does_not_count() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"))
            .marker(factory_registration())
            .member(MemberSnapshot::new_static(
                "CreateDetailViewModel",
                &[("Logger", "d0"), ("ApiClient", "d1")],
                "Func<Guid, DetailViewModel>",
            ));
    });
    let (out, _) = run(&program);
    assert!(matches!(
        out.findings.as_slice(),
        [Finding::MissingCompanion {
            has_registration: true,
            has_stub: false,
            ..
        }]
    ));
}

#[test]
fn test_unregistered_view() {
    let program = detail_program(|_| {});
    let (out, index) = run(&program);
    assert_eq!(out.findings.len(), 1);
    assert_eq!(out.findings[0].code(), ErrorCode::VMF001);

    let diags = to_diagnostics(&program, &index, &out.findings);
    assert_eq!(diags[0].property(props::VIEW), Some("DetailView"));
    assert_eq!(
        diags[0].primary_label().map(|l| l.file.as_str()),
        Some("src/Views/DetailView.cs")
    );
    assert_eq!(diags[0].property(props::FUNCTION_NAME), Some("CreateDetailViewModel"));
}

#[test]
fn test_one_complete_container_is_enough() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("MainView", "src/MainView.cs")
        .constructor(&[("Func<MainViewModel>", "factory")]);
    snapshot.class("MainViewModel", "src/MainViewModel.cs").constructor(&[]);
    snapshot
        .class("A", "src/A.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("MainView"));
    snapshot
        .class("B", "src/B.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("MainView"))
        .marker(
            MarkerSnapshot::new("Transient")
                .with_type_arg("Func<MainViewModel>")
                .with_named("Factory", "nameof(CreateMainViewModel)"),
        )
        .member(MemberSnapshot::new_static(
            "CreateMainViewModel",
            &[],
            "Func<MainViewModel>",
        ));
    let program = Program::from_snapshot(&snapshot);
    let (out, _) = run(&program);
    assert_eq!(out.findings, vec![]);
}

#[test]
fn test_ambiguous_reports_each_candidate_and_suppresses_generation() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("DetailView", "src/Views/DetailView.cs")
        .constructor(&[("Func<Guid, DetailViewModel>", "factory")]);
    snapshot
        .class("OtherView", "src/Views/OtherView.cs")
        .constructor(&[("Func<Guid, DetailViewModel>", "factory")]);
    snapshot
        .class("DetailViewModel", "src/ViewModels/DetailViewModel.cs")
        .constructor(&[("Guid", "id"), ("ApiClient", "api")])
        .constructor(&[("Guid", "id"), ("Logger", "logger")]);
    snapshot
        .class("AppContainer", "src/AppContainer.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("DetailView"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("OtherView"));
    let program = Program::from_snapshot(&snapshot);
    let (out, index) = run(&program);

    let diags = to_diagnostics(&program, &index, &out.findings);
    let ambiguous: Vec<_> = diags
        .iter()
        .filter(|d| d.code == ErrorCode::VMF003)
        .collect();
    assert_eq!(ambiguous.len(), 2);
    assert_ne!(ambiguous[0].primary_label(), ambiguous[1].primary_label());
    assert!(out.specs.is_empty());
    assert_eq!(diags.len(), 2, "unresolved views get no VMF002: {diags:#?}");
}

#[test]
fn test_no_match_reported_once_per_arity() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("AView", "a.cs")
        .constructor(&[("Func<int, DetailViewModel>", "factory")]);
    snapshot
        .class("BView", "b.cs")
        .constructor(&[("Func<int, DetailViewModel>", "factory")]);
    snapshot
        .class("DetailViewModel", "c.cs")
        .constructor_with(ConstructorSnapshot::new(&[("Guid", "id")]));
    snapshot
        .class("AppContainer", "d.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("AView"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("BView"));
    let program = Program::from_snapshot(&snapshot);
    let (out, _) = run(&program);

    assert_eq!(
        out.findings.iter().map(Finding::code).collect::<Vec<_>>(),
        vec![ErrorCode::VMF004]
    );
}

#[test]
fn test_undeclared_companion_is_skipped() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("Service", "a.cs")
        .constructor(&[("Func<HttpClient>", "client")]);
    let program = Program::from_snapshot(&snapshot);
    let (out, _) = run(&program);
    assert_eq!(out.findings, vec![]);
    assert!(out.specs.is_empty());
}

#[test]
fn test_checking_twice_is_stable() {
    let program = detail_program(|c| {
        c.marker(MarkerSnapshot::new("Transient").with_type_literal("DetailView"));
    });
    let (first, _) = run(&program);
    let (second, _) = run(&program);
    assert_eq!(first.findings, second.findings);
    assert_eq!(first.specs, second.specs);
}

//! Command round trips over snapshot files in a temporary directory.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vmf_diagnostic::emitter::ColorMode;
use vmf_ir::snapshot::{ConstructorSnapshot, MarkerSnapshot, ProgramSnapshot};
use vmfc::commands::{check_snapshot, emit_snapshot, explain_error, fix_snapshot};
use vmfc::{CliError, CliOptions, OutputFormat, Preference};

fn options() -> CliOptions {
    CliOptions {
        threads: 1,
        color: ColorMode::Never,
        ..CliOptions::default()
    }
}

fn write_snapshot(dir: &TempDir, snapshot: &ProgramSnapshot) -> PathBuf {
    let path = dir.path().join("app.json");
    let Ok(text) = snapshot.to_json() else {
        panic!("snapshot should serialize");
    };
    let Ok(()) = std::fs::write(&path, text) else {
        panic!("snapshot should be written");
    };
    path
}

fn temp_dir() -> TempDir {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("temp dir should be created");
    };
    dir
}

/// `DetailView` registered without its companion factory.
fn unpaired() -> ProgramSnapshot {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("DetailView", "src/Views/DetailView.cs")
        .constructor(&[("Func<Guid, DetailViewModel>", "factory")]);
    snapshot
        .class("DetailViewModel", "src/ViewModels/DetailViewModel.cs")
        .constructor(&[("Guid", "id"), ("ApiClient", "api"), ("Logger", "logger")]);
    snapshot
        .class("AppContainer", "src/AppContainer.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"))
        .marker(MarkerSnapshot::new("Transient").with_type_arg("DetailView"));
    snapshot
}

fn check(path: &Path, options: &CliOptions) -> (bool, String) {
    let mut out = Vec::new();
    let Ok(has_errors) = check_snapshot(path, options, &mut out) else {
        panic!("check should run");
    };
    (has_errors, String::from_utf8_lossy(&out).into_owned())
}

#[test]
fn test_check_reports_missing_companion() {
    let dir = temp_dir();
    let path = write_snapshot(&dir, &unpaired());
    let (has_errors, out) = check(&path, &options());
    assert!(has_errors);
    assert!(out.contains("error[VMF002]"), "{out}");
    assert!(out.contains("error: found 1 wiring error"), "{out}");
}

#[test]
fn test_check_json_carries_properties() {
    let dir = temp_dir();
    let path = write_snapshot(&dir, &unpaired());
    let options = CliOptions {
        format: OutputFormat::Json,
        ..options()
    };
    let (_, out) = check(&path, &options);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&out) else {
        panic!("output should be JSON: {out}");
    };
    assert_eq!(value[0]["code"], "VMF002");
    assert_eq!(
        value[0]["properties"]["functionName"],
        "CreateDetailViewModel"
    );
    assert_eq!(value[0]["properties"]["hasRegistration"], "false");
}

#[test]
fn test_emit_writes_generated_code() {
    let dir = temp_dir();
    let path = write_snapshot(&dir, &unpaired());
    let target = dir.path().join("Generated.cs");
    let options = CliOptions {
        output: Some(target.clone()),
        ..options()
    };
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();
    let Ok(has_errors) = emit_snapshot(&path, &options, &mut out, &mut diagnostics) else {
        panic!("emit should run");
    };
    assert!(has_errors);
    assert!(out.is_empty());
    let Ok(code) = std::fs::read_to_string(&target) else {
        panic!("generated file should exist");
    };
    assert!(code.contains(
        "private static Func<Guid, DetailViewModel> CreateDetailViewModel(ApiClient d0, Logger d1)"
    ));
    assert!(code.contains("=> (a0) => new DetailViewModel(a0, d0, d1);"));
}

#[test]
fn test_fix_rewrites_snapshot_until_clean() {
    let dir = temp_dir();
    let path = write_snapshot(&dir, &unpaired());
    let mut out = Vec::new();
    let Ok(summary) = fix_snapshot(&path, &options(), &mut out) else {
        panic!("fix should run");
    };
    assert_eq!(summary.remaining, 0);
    assert_eq!(
        summary.applied,
        vec!["Add factory registration and stub for `DetailViewModel`".to_owned()]
    );

    let (has_errors, out) = check(&path, &options());
    assert!(!has_errors, "{out}");
    assert!(out.is_empty());
}

#[test]
fn test_fix_settles_ambiguity_only_when_asked() {
    let mut snapshot = unpaired();
    if let Some(vm) = snapshot.get_mut("DetailViewModel") {
        vm.constructor_with(ConstructorSnapshot::new(&[("Guid", "id"), ("Logger", "logger")]));
    }
    let dir = temp_dir();
    let path = write_snapshot(&dir, &snapshot);

    let Ok(summary) = fix_snapshot(&path, &options(), &mut Vec::new()) else {
        panic!("fix should run");
    };
    assert_eq!(summary.remaining, 2);
    assert!(summary.applied.is_empty());

    let options = CliOptions {
        prefer: vec![Preference {
            ty: "DetailViewModel".to_owned(),
            offset: 1110,
        }],
        ..options()
    };
    let Ok(summary) = fix_snapshot(&path, &options, &mut Vec::new()) else {
        panic!("fix should run");
    };
    assert_eq!(summary.remaining, 0);
    assert_eq!(summary.applied.len(), 2);

    let target = dir.path().join("Generated.cs");
    let emit_options = CliOptions {
        output: Some(target.clone()),
        ..CliOptions::default()
    };
    let Ok(false) = emit_snapshot(&path, &emit_options, &mut Vec::new(), &mut Vec::new()) else {
        panic!("emit should run cleanly");
    };
    let Ok(code) = std::fs::read_to_string(&target) else {
        panic!("generated file should exist");
    };
    assert!(code.contains("CreateDetailViewModel(Logger d0)"));
}

#[test]
fn test_unknown_preference_is_an_error() {
    let dir = temp_dir();
    let path = write_snapshot(&dir, &unpaired());
    let options = CliOptions {
        prefer: vec![Preference {
            ty: "DetailViewModel".to_owned(),
            offset: 7,
        }],
        ..options()
    };
    let result = fix_snapshot(&path, &options, &mut Vec::new());
    assert!(matches!(result, Err(CliError::NoSuchCandidate { offset: 7, .. })));
}

#[test]
fn test_missing_snapshot_is_a_load_error() {
    let dir = temp_dir();
    let result = check_snapshot(&dir.path().join("absent.json"), &options(), &mut Vec::new());
    assert!(matches!(result, Err(CliError::Load(_))));
}

#[test]
fn test_explain() {
    let mut out = Vec::new();
    assert!(explain_error("vmf001", &mut out).is_ok());
    assert!(String::from_utf8_lossy(&out).starts_with("# VMF001:"));
    assert!(matches!(
        explain_error("E0001", &mut Vec::new()),
        Err(CliError::UnknownCode(_))
    ));
}

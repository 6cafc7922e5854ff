use super::*;
use pretty_assertions::assert_eq;
use vmf_ir::snapshot::{MarkerSnapshot, ProgramSnapshot};

#[test]
fn test_directory_distance() {
    assert_eq!(directory_distance("src/Views/A.cs", "src/Views/B.cs"), 0);
    assert_eq!(directory_distance("src/Views/A.cs", "src/B.cs"), 1);
    assert_eq!(directory_distance("src/Views/A.cs", "src/Other/B.cs"), 2);
    assert_eq!(directory_distance("A.cs", "lib/deep/B.cs"), 2);
}

#[test]
fn test_nearest_container_wins() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("RootContainer", "src/RootContainer.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"));
    snapshot
        .class("ViewsModule", "src/Views/ViewsModule.cs")
        .marker(MarkerSnapshot::new("ServiceProviderModule"));
    let program = Program::from_snapshot(&snapshot);

    assert_eq!(
        choose_container(&program, "src/Views/Detail/DetailView.cs").map(|k| k.name),
        Some("ViewsModule".to_owned())
    );
    assert_eq!(
        choose_container(&program, "src/Shell.cs").map(|k| k.name),
        Some("RootContainer".to_owned())
    );
}

#[test]
fn test_ties_break_alphabetically() {
    let mut snapshot = ProgramSnapshot::default();
    snapshot
        .class("Zeta", "src/Zeta.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"));
    snapshot
        .class("Alpha", "src/Alpha.cs")
        .marker(MarkerSnapshot::new("ServiceProvider"));
    let program = Program::from_snapshot(&snapshot);

    assert_eq!(
        choose_container(&program, "src/Views/MainView.cs").map(|k| k.name),
        Some("Alpha".to_owned())
    );
}

#[test]
fn test_no_containers() {
    let program = Program::from_snapshot(&ProgramSnapshot::default());
    assert_eq!(choose_container(&program, "src/A.cs"), None);
}

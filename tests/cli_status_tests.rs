use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn status_reports_stopped_for_unknown_component() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("edgelord").unwrap();
    cmd.args(["status", "--component", "orchestrator", "--status-dir"]).arg(dir.path());
    cmd.assert().success().stdout(contains("stopped"));
}

#[test]
fn status_lists_every_known_component_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("edgelord").unwrap();
    cmd.args(["status", "--status-dir"]).arg(dir.path());
    cmd.assert()
        .success()
        .stdout(contains("orchestrator"))
        .stdout(contains("execution"))
        .stdout(contains("position_tracker"));
}

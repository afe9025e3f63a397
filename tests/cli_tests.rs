use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn run_without_database_url_fails_fast() {
    let mut cmd = Command::cargo_bin("edgelord").unwrap();
    cmd.args(["run", "position-tracker"])
        .env_remove("DATABASE_URL")
        .env_remove("REDIS_URL")
        .env("PAPER_TRADING", "true");
    cmd.assert().failure().stderr(contains("DATABASE_URL"));
}

#[test]
fn check_without_database_url_fails_fast() {
    let mut cmd = Command::cargo_bin("edgelord").unwrap();
    cmd.arg("check").env_remove("DATABASE_URL").env_remove("REDIS_URL");
    cmd.assert().failure().stderr(contains("DATABASE_URL"));
}

#[test]
fn help_lists_every_component() {
    let mut cmd = Command::cargo_bin("edgelord").unwrap();
    cmd.args(["run", "--help"]);
    cmd.assert()
        .success()
        .stdout(contains("orchestrator"))
        .stdout(contains("shard"))
        .stdout(contains("position-tracker"));
}

//! Integration tests for the CLI boundary: usage errors and help output.

#[path = "common/mod.rs"]
mod common;

use assert_cmd::Command;
use common::BIN;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn missing_filename_prints_usage_and_exits_2() {
    Command::new(BIN)
        .assert()
        .code(2)
        .stderr(contains("Usage"));
}

#[test]
fn unknown_action_exits_2() {
    Command::new(BIN)
        .arg("/tmp/a.log")
        .arg("rotate")
        .assert()
        .code(2)
        .stderr(contains("invalid value"));
}

#[test]
fn help_describes_the_actions() {
    Command::new(BIN)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("reopen").and(contains("waitkill")));
}

#[test]
fn version_flag_reports_version() {
    Command::new(BIN)
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("plog"));
}

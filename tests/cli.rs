//! Smoke tests for the binary's argument surface. Nothing here talks to a
//! service.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_command_tree() {
    Command::cargo_bin("datalens")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("datasets"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn query_requires_a_dataset_id() {
    Command::cargo_bin("datalens")
        .unwrap()
        .arg("query")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ID>"));
}

#[test]
fn unknown_subcommands_are_rejected() {
    Command::cargo_bin("datalens")
        .unwrap()
        .arg("subscribe-all")
        .assert()
        .failure();
}

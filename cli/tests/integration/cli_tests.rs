//! Argument parsing, help and version output.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn spire_supply() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spire-supply"));
    cmd.env_clear().env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    spire_supply().assert().code(2).stderr(predicate::str::contains(
        "Provision a SPIRE agent sidecar into a buildpack build",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    spire_supply()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("supply"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_command_shows_version() {
    spire_supply()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "spire-supply ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = spire_supply().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    spire_supply()
        .arg("finalize")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_supply_requires_all_four_directories() {
    spire_supply()
        .args(["supply", "/tmp/build", "/tmp/cache"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DEPS_DIR"));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "yes", "anything", "true", "0", ""] {
        spire_supply()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("spire-supply"));
    }
}

#[test]
fn test_no_color_flag_still_works_as_switch() {
    spire_supply()
        .args(["--no-color", "version"])
        .assert()
        .success();
}

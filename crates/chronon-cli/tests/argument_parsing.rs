//! Focused CLI argument parsing and command tests.
//!
//! Every command runs against a temporary project directory so a
//! chronon.toml in the working tree never leaks in.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn chronon() -> Command {
    let mut cmd = Command::cargo_bin("chronon").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn project_with(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("chronon.toml"), config).unwrap();
    temp
}

// ============================================================================
// Version And Help
// ============================================================================

#[test]
fn version_command_succeeds() {
    chronon()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("heap, list, map"));
}

#[test]
fn version_flag_shows_version() {
    chronon()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chronon"));
}

#[test]
fn help_flag_shows_usage() {
    chronon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discrete-event"));
}

#[test]
fn no_command_shows_help() {
    chronon()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn run_prints_summary_table() {
    let temp = TempDir::new().unwrap();
    chronon()
        .args(["run", "--timers", "200", "--seed", "5", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Timer workload"))
        .stdout(predicate::str::contains("Fired"))
        .stdout(predicate::str::contains("Dispatch gaps"));
}

#[test]
fn run_json_reports_every_timer() {
    let temp = TempDir::new().unwrap();
    let output = chronon()
        .args([
            "run",
            "--timers",
            "300",
            "--cancel-ratio",
            "0.25",
            "--scheduler",
            "map",
            "--json",
            "--project",
        ])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scheduler"], "map");
    assert_eq!(report["armed"], 300);
    let fired = report["fired"].as_u64().unwrap();
    let cancelled = report["cancelled"].as_u64().unwrap();
    assert_eq!(fired + cancelled, 300);
    assert_eq!(report["pending"], 0);
}

#[test]
fn run_is_deterministic_for_a_seed() {
    let temp = TempDir::new().unwrap();
    let end_time = || {
        let output = chronon()
            .args(["run", "--timers", "100", "--seed", "11", "--json", "--project"])
            .arg(temp.path())
            .output()
            .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        (report["end_time"].clone(), report["fired"].clone())
    };
    assert_eq!(end_time(), end_time());
}

#[test]
fn run_stop_time_leaves_pending_events() {
    let temp = TempDir::new().unwrap();
    let output = chronon()
        .args(["run", "--stop-time", "50us", "--json", "--project"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["end_time"], "+50000ns");
    assert!(report["pending"].as_u64().unwrap() > 0);
}

#[test]
fn run_uses_project_config() {
    let temp = project_with(
        r#"
[simulator]
scheduler = "list"
resolution = "us"
"#,
    );
    let output = chronon()
        .args(["run", "--timers", "50", "--json", "--project"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scheduler"], "list");
    assert_eq!(report["resolution"], "us");
}

#[test]
fn run_rejects_unknown_scheduler() {
    chronon()
        .args(["run", "--scheduler", "calendar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("calendar"));
}

#[test]
fn run_rejects_out_of_range_cancel_ratio() {
    let temp = TempDir::new().unwrap();
    chronon()
        .args(["run", "--cancel-ratio", "1.5", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cancel ratio"));
}

#[test]
fn run_rejects_bad_time_literal() {
    let temp = TempDir::new().unwrap();
    chronon()
        .args(["run", "--max-delay", "soon", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-delay"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_show_text_lists_sections() {
    let temp = TempDir::new().unwrap();
    chronon()
        .args(["config", "show", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulator:"))
        .stdout(predicate::str::contains("Garbage collector:"));
}

#[test]
fn config_show_toml_reflects_project_file() {
    let temp = project_with(
        r#"
[simulator]
scheduler = "map"
"#,
    );
    chronon()
        .args(["config", "show", "--format", "toml", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[simulator]"))
        .stdout(predicate::str::contains("scheduler = \"map\""));
}

#[test]
fn config_show_json_is_valid() {
    let temp = TempDir::new().unwrap();
    let output = chronon()
        .args(["config", "show", "--format", "json", "--project"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["gc"]["initial_chunk"], 8);
}

#[test]
fn config_show_rejects_unknown_format() {
    chronon()
        .args(["config", "show", "--format", "yaml"])
        .assert()
        .failure();
}

#[test]
fn config_validate_accepts_valid_file() {
    let temp = project_with(
        r#"
[realtime]
enabled = true
mode = "hard-limit"
hard_limit = "5ms"
"#,
    );
    chronon()
        .args(["config", "validate", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn config_validate_rejects_invalid_file() {
    let temp = project_with(
        r#"
[realtime]
mode = "eventually"
"#,
    );
    chronon()
        .args(["config", "validate", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("realtime.mode"));
}

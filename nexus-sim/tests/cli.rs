// The cargo_bin! macro requires build script setup that's overkill for simple tests.
// Suppress deprecation warning on the function until we need custom build-dir support.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn demo_world() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/demo_world.json")
}

fn sim() -> Command {
    Command::new(cargo_bin("nexus-sim"))
}

#[test]
fn test_help_flag() {
    sim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--world"));
}

#[test]
fn test_missing_world_fails_with_path() {
    sim()
        .args(["--world", "/nonexistent/world.json", "-t", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/world.json"));
}

#[test]
fn test_demo_world_prints_every_player() {
    sim()
        .arg("--world")
        .arg(demo_world())
        .args(["-t", "2", "--log-level", "warn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 vega"))
        .stdout(predicate::str::contains("#2 orin"))
        .stdout(predicate::str::contains("#3 kessa"));
}

#[test]
fn test_report_lists_contributions() {
    sim()
        .arg("--world")
        .arg(demo_world())
        .args(["-t", "1", "--log-level", "error", "--report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("offense:"))
        .stdout(predicate::str::contains("warlords_throne"));
}

#[test]
fn test_output_world_marks_turns_processed() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("after.json");
    sim()
        .arg("--world")
        .arg(demo_world())
        .args(["-t", "3", "--log-level", "error", "--output"])
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    let world: serde_json::Value = serde_json::from_str(&text).unwrap();
    let players = world["players"].as_array().unwrap();
    assert_eq!(players.len(), 3);
    for p in players {
        assert_eq!(p["progression"]["last_processed_turn"], 3);
    }
}

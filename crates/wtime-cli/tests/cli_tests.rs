//! Integration tests for the `wtime` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the snapshot,
//! dst, season, month and watch subcommands through the actual binary,
//! including configuration files, flag overrides and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the Tokyo / southern hemisphere config fixture.
fn tokyo_config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tokyo_south.json")
}

/// Helper: run `wtime` with `args`, assert success and parse stdout as JSON.
fn run_json(args: &[&str]) -> Value {
    let output = Command::cargo_bin("wtime")
        .unwrap()
        .args(args)
        .output()
        .expect("wtime should run");
    assert!(
        output.status.success(),
        "wtime {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn snapshot_fixed_instant_in_utc() {
    let json = run_json(&["snapshot", "--at", "2024-12-01T15:04:05Z"]);
    let values = &json["values"];

    assert_eq!(values["clock_24h"], "15:04");
    assert_eq!(values["clock_24h_sec"], "15:04:05");
    assert_eq!(values["clock_12h"], "03:04 PM");
    assert_eq!(values["date_long"], "December 1, 2024");
    assert_eq!(values["date_short"], "12/01/24");
    assert_eq!(values["current_month"], "December");
    assert_eq!(values["weekday_long"], "Sunday");
    assert_eq!(values["season"], "Winter");
    assert_eq!(values["dst_active"], false);
    assert_eq!(values["is_weekend"], true);
}

#[test]
fn snapshot_uses_local_date_of_the_timezone() {
    // 03:00 UTC on Dec 1 is still Nov 30 in New York.
    let json = run_json(&[
        "--timezone",
        "America/New_York",
        "snapshot",
        "--at",
        "2024-12-01T03:00:00Z",
    ]);
    let values = &json["values"];

    assert_eq!(values["clock_24h"], "22:00");
    assert_eq!(values["clock_12h"], "10:00 PM");
    assert_eq!(values["date_long"], "November 30, 2024");
    assert_eq!(values["weekday_long"], "Saturday");
    assert_eq!(values["season"], "Fall");
}

#[test]
fn snapshot_publishes_every_key() {
    let json = run_json(&["snapshot", "--at", "2024-06-15T12:00:00Z"]);
    let values = json["values"].as_object().expect("values is an object");
    for key in [
        "clock_12h",
        "clock_12h_sec",
        "clock_24h",
        "clock_24h_sec",
        "current_month",
        "weekday_long",
        "weekday_short",
        "date_long",
        "date_short",
        "season",
        "dst_active",
    ] {
        assert!(values.contains_key(key), "missing key {}", key);
    }
}

#[test]
fn snapshot_invalid_timezone_fails() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["--timezone", "Atlantis/Capital", "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn snapshot_invalid_instant_fails() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["snapshot", "--at", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --at timestamp"));
}

#[test]
fn invalid_hemisphere_is_rejected_by_argument_parsing() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["--hemisphere", "east", "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown hemisphere"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_file_sets_zone_hemisphere_and_locale() {
    // 00:00 UTC on Jul 1 2024 is 09:00 Monday in Tokyo.
    let json = run_json(&[
        "--config",
        tokyo_config_path(),
        "snapshot",
        "--at",
        "2024-07-01T00:00:00Z",
    ]);
    let values = &json["values"];

    assert_eq!(values["clock_24h"], "09:00");
    assert_eq!(values["current_month"], "julio");
    assert_eq!(values["weekday_long"], "Monday");
    // Sunday start: Sunday = 1, Monday = 2.
    assert_eq!(values["day_of_week"], 2);
    assert_eq!(values["season"], "Winter");
}

#[test]
fn flags_override_config_file() {
    let json = run_json(&[
        "--config",
        tokyo_config_path(),
        "--timezone",
        "UTC",
        "--hemisphere",
        "north",
        "snapshot",
        "--at",
        "2024-07-01T00:00:00Z",
    ]);
    let values = &json["values"];

    assert_eq!(values["clock_24h"], "00:00");
    assert_eq!(values["season"], "Summer");
    // Locale from the file still applies.
    assert_eq!(values["current_month"], "julio");
}

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["--config", "/tmp/wtime-test-no-such-config.json", "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn malformed_config_file_fails() {
    let path = "/tmp/wtime-test-malformed-config.json";
    std::fs::write(path, "{ not json").expect("write temp config");

    Command::cargo_bin("wtime")
        .unwrap()
        .args(["--config", path, "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));

    let _ = std::fs::remove_file(path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Dst / Season / Month subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dst_reports_next_spring_forward() {
    let json = run_json(&[
        "--timezone",
        "America/New_York",
        "dst",
        "--at",
        "2024-03-10T06:59:00Z",
    ]);

    assert_eq!(json["timezone"], "America/New_York");
    assert_eq!(json["dst_in_effect"], false);
    assert_eq!(json["next_change"], "2024-03-10T03:00:00-04:00");
    assert_eq!(json["next_state"], true);
}

#[test]
fn dst_for_zone_without_transitions() {
    let json = run_json(&["dst", "--at", "2024-03-10T06:59:00Z"]);
    assert_eq!(json["dst_in_effect"], false);
    assert!(json["next_change"].is_null());
}

#[test]
fn season_outlook_in_southern_hemisphere() {
    let json = run_json(&[
        "--hemisphere",
        "South",
        "season",
        "--at",
        "2024-01-15T12:00:00Z",
    ]);

    assert_eq!(json["season"], "Summer");
    assert_eq!(json["start"], "2023-12-01");
    assert_eq!(json["end"], "2024-03-01");
    assert_eq!(json["next_season"], "Fall");
    assert_eq!(json["countdown"], "45d 12h");
}

#[test]
fn month_details_for_leap_february() {
    let json = run_json(&["month", "--at", "2024-02-10T00:00:00Z"]);

    assert_eq!(json["name"], "February");
    assert_eq!(json["number"], 2);
    assert_eq!(json["zero_padded"], "02");
    assert_eq!(json["length"], 29);
    assert_eq!(json["first_weekday"], "Thursday");
}

// ─────────────────────────────────────────────────────────────────────────────
// Watch subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn watch_prints_initial_publication_as_json_lines() {
    let output = Command::cargo_bin("wtime")
        .unwrap()
        .args(["watch", "--seconds", "1"])
        .output()
        .expect("wtime watch should run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    let changes: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect();

    // At least the first tick, which announces every key.
    let initial = changes.iter().filter(|c| c["old_value"].is_null()).count();
    assert!(initial >= 11, "only {} initial notifications", initial);
    assert!(changes.iter().any(|c| c["key"] == "clock_24h"));
    assert!(changes.iter().all(|c| c["tick_at"].is_string()));
}

#[test]
fn watch_duration_is_given_in_seconds() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["watch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--seconds"))
        .stdout(predicate::str::contains("--ticks").not());
}

#[test]
fn watch_invalid_timezone_fails() {
    Command::cargo_bin("wtime")
        .unwrap()
        .args(["--timezone", "Not/AZone", "watch", "--seconds", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

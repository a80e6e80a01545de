//! Integration tests for CLI argument validation.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_calibrate_rejects_out_of_range_target_recall() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("calibrate")
        .arg("--data")
        .arg("tiles/val")
        .arg("--target-recall")
        .arg("1.5");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recall target must be in"));
}

#[test]
fn test_calibrate_rejects_zero_target_recall() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("calibrate")
        .arg("--data")
        .arg("tiles/val")
        .arg("--target-recall")
        .arg("0.0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recall target must be in"));
}

#[test]
fn test_telemetry_rejects_out_of_range_threshold() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("telemetry")
        .arg("--data")
        .arg("tiles/val")
        .arg("--threshold")
        .arg("2.0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("probability must be between"));
}

#[test]
fn test_filter_rejects_negative_temperature() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("filter")
        .arg("--data")
        .arg("tiles")
        .arg("--temperature=-1.0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("temperature must be a positive"));
}

#[test]
fn test_gpu_and_cpu_conflict() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("filter")
        .arg("--data")
        .arg("tiles")
        .arg("--gpu")
        .arg("--cpu");

    cmd.assert().failure();
}

#[test]
fn test_no_subcommand_shows_usage() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_summarize_requires_all_inputs() {
    let mut cmd = cargo_bin_cmd!("tilegate");
    cmd.arg("summarize").arg("--val-log").arg("val.jsonl");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--downlink-log"));
}

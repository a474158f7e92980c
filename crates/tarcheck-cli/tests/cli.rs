//! Integration tests for the tarcheck binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn tarcheck() -> Command {
    Command::cargo_bin("tarcheck").unwrap()
}

#[test]
fn test_config_show_prints_defaults() {
    tarcheck()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cost_buffer"))
        .stdout(predicate::str::contains("max_deviation_percent"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tarcheck.json");

    tarcheck()
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .success();

    tarcheck()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "get", "thresholds.cost_buffer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));
}

#[test]
fn test_config_set_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tarcheck.json");

    tarcheck()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "set", "thresholds.cost_buffer", "\"25\""])
        .assert()
        .success();

    tarcheck()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "get", "thresholds.cost_buffer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25"));
}

#[test]
fn test_validate_missing_fields_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("request.json");
    std::fs::write(&input_path, r#"{"traveler": "Jane Roe"}"#).unwrap();

    tarcheck()
        .arg("validate")
        .arg(&input_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validation failed"))
        .stdout(predicate::str::contains("contactNumber"));
}

#[test]
fn test_validate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("request.json");
    std::fs::write(&input_path, r#"{"traveler": "Jane Roe"}"#).unwrap();

    tarcheck()
        .arg("validate")
        .arg(&input_path)
        .args(["--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"));
}

#[test]
fn test_validate_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("request.txt");
    std::fs::write(&input_path, "plain text").unwrap();

    tarcheck()
        .arg("validate")
        .arg(&input_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported input format"));
}

#[test]
fn test_batch_summary_for_incomplete_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("trips.csv");
    // No Contact column, so every request fails field checks before any
    // rate lookup happens.
    std::fs::write(
        &csv_path,
        "Request ID,Traveler,Departure Date,Return Date,Destination,Purpose,Cost,Total\n\
         TA-1,Jane Roe,05/01/2025,05/03/2025,\"Washington, DC\",Review,$450.00,\n\
         TA-1,Jane Roe,,,\"Washington, DC\",Review,$537.00,\n",
    )
    .unwrap();

    let out_dir = dir.path().join("out");
    tarcheck()
        .arg("batch")
        .arg(csv_path.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed"));

    let summary = std::fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("TA-1"));
    assert!(summary.contains("failed"));
}

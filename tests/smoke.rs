use std::fs;

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("entity-tracker").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn annotate_prints_one_json_line_per_input_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lines.txt");
    fs::write(&input, "Alice went to Paris.\nBob works at Acme Corp.\n").unwrap();

    let output = Command::cargo_bin("entity-tracker")
        .unwrap()
        .arg("annotate")
        .arg("--input")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["text"], "Alice went to Paris.");
    assert_eq!(first["ents"][1]["label"], "GPE");
}

#[test]
fn offline_log_writes_run_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lines.txt");
    fs::write(&input, "Alice went to Paris.\nBob works at Acme Corp.\n").unwrap();
    let runs = dir.path().join("runs");

    Command::cargo_bin("entity-tracker")
        .unwrap()
        .env("TRACKING_DIR", &runs)
        .args(["log", "--mode", "offline", "--project", "smoke", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("logged 2 rows"));

    let files: Vec<_> = fs::read_dir(runs.join("smoke")).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("entity-tracker")
        .unwrap()
        .env("TRACKING_DIR", dir.path().join("runs"))
        .args(["log", "--mode", "offline", "--input"])
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .stderr(contains("reading input file"));
    assert!(!dir.path().join("runs").exists());
}

#[test]
fn each_line_is_echoed_at_default_log_level() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lines.txt");
    fs::write(&input, "Alice went to Paris.\nBob works at Acme Corp.\n").unwrap();

    Command::cargo_bin("entity-tracker")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("annotate")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stderr(contains("annotating").and(contains("Bob works at Acme Corp.")));
}

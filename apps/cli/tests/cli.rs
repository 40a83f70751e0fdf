//! End-to-end tests of the `study` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn study(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("study").unwrap();
    cmd.arg("--data-dir").arg(dir.path()).env("RUST_LOG", "off");
    cmd
}

#[test]
fn add_then_list() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .args(["add", "gregarious", "fond of company", "--tags", "adjective, social"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added [1] gregarious"));

    study(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("gregarious").and(predicate::str::contains("adjective, social")));

    assert!(dir.path().join("vocabulary.db").exists());
}

#[test]
fn adding_twice_reports_existing_item() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir).args(["add", "laconic", "using few words"]).assert().success();
    study(&dir)
        .args(["add", "LACONIC", "brief"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already stored as [1] laconic"));
}

#[test]
fn blank_term_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .args(["add", " ", "meaning"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("term must not be empty"));
}

#[test]
fn unknown_item_exits_not_found() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir).args(["show", "9"]).assert().code(2);
}

#[test]
fn quiz_reads_answers_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir).args(["add", "gregarious", "fond of company"]).assert().success();

    study(&dir)
        .args(["quiz", "--count", "1"])
        .write_stdin("fond\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Correct!").and(predicate::str::contains("Score: 1/1 (100.0%)")));

    study(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reviews:       1 (1 correct)"));

    study(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("gregarious"));
}

#[test]
fn quiz_stops_on_quit_command() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir).args(["add", "gregarious", "fond of company"]).assert().success();

    study(&dir)
        .arg("quiz")
        .write_stdin(":q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz stopped before the first answer"));
}

#[test]
fn quiz_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .arg("quiz")
        .assert()
        .success()
        .stdout(predicate::str::contains("No words available"));
}

#[test]
fn zero_count_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir).args(["due", "--count", "0"]).assert().failure();
}

#[test]
fn inverted_stats_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .args(["stats", "--from", "2024-03-05", "--to", "2024-03-01"])
        .assert()
        .code(3);
}

#[test]
fn stats_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Words:        0").and(predicate::str::contains("Accuracy:     0.0%")));
}

#[test]
fn corrupt_store_is_set_aside() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vocabulary.db"), b"definitely not sqlite, just some bytes that are long enough").unwrap();

    study(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No words yet"))
        .stderr(predicate::str::contains("has been replaced"));

    let backups = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(backups, 1);
}

#[test]
fn settings_file_sets_default_quiz_size() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "default_quiz_size = 1\n").unwrap();
    for term in ["a", "b", "c"] {
        study(&dir).args(["add", term, "letter"]).assert().success();
    }

    study(&dir)
        .arg("quiz")
        .write_stdin("letter\nletter\nletter\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/1"));
}

#[test]
fn overlong_stats_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    study(&dir)
        .args(["stats", "--from", "0001-01-01", "--to", "9999-12-31"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("at most 3660"));
}

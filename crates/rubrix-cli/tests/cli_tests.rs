//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rubrix() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("rubrix").unwrap()
}

const ANSWER: &str = "In India, Article 21 of the Constitution guarantees personal liberty. \
                      However, the Supreme Court widened it in 1978. In conclusion, the way \
                      forward lies in consistent enforcement.";

#[test]
fn evaluate_offline_prints_json() {
    rubrix()
        .arg("evaluate")
        .arg("--question")
        .arg("Discuss the impact of Article 21 on personal liberty.")
        .arg("--answer")
        .arg(ANSWER)
        .arg("--id")
        .arg("cli-1")
        .arg("--offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("\"submission_id\": \"cli-1\""))
        .stdout(predicate::str::contains("heuristic-fallback"));
}

#[test]
fn evaluate_reads_answer_from_file() {
    let dir = TempDir::new().unwrap();
    let answer_path = dir.path().join("answer.txt");
    std::fs::write(&answer_path, ANSWER).unwrap();

    rubrix()
        .arg("evaluate")
        .arg("--question")
        .arg("Examine the significance of Article 21.")
        .arg("--answer-file")
        .arg(&answer_path)
        .arg("--offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn evaluate_persists_when_output_given() {
    let dir = TempDir::new().unwrap();

    rubrix()
        .arg("evaluate")
        .arg("--question")
        .arg("Examine the significance of Article 21.")
        .arg("--answer")
        .arg(ANSWER)
        .arg("--id")
        .arg("cli-2")
        .arg("--offline")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Evaluation saved to"));

    assert!(dir.path().join("cli-2.json").exists());
    let status = std::fs::read_to_string(dir.path().join("cli-2.status")).unwrap();
    assert_eq!(status, "completed");
}

#[test]
fn evaluate_rejects_blank_answer() {
    rubrix()
        .arg("evaluate")
        .arg("--question")
        .arg("A question?")
        .arg("--answer")
        .arg("   ")
        .arg("--offline")
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid request"));
}

#[test]
fn evaluate_requires_an_answer_source() {
    rubrix()
        .arg("evaluate")
        .arg("--question")
        .arg("A question?")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide --answer or --answer-file"));
}

#[test]
fn batch_evaluates_all_submissions() {
    let dir = TempDir::new().unwrap();

    // init provides a known-good batch file
    rubrix().current_dir(dir.path()).arg("init").assert().success();

    rubrix()
        .current_dir(dir.path())
        .arg("batch")
        .arg("--file")
        .arg("submissions/example.toml")
        .arg("--output")
        .arg("results")
        .arg("--offline")
        .assert()
        .success()
        .stderr(predicate::str::contains("2 submissions"))
        .stderr(predicate::str::contains("2/2 succeeded"));

    assert!(dir.path().join("results/example-001.json").exists());
}

#[test]
fn batch_nonexistent_file() {
    rubrix()
        .arg("batch")
        .arg("--file")
        .arg("no_such_batch.toml")
        .arg("--offline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    rubrix()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rubrix.toml"))
        .stdout(predicate::str::contains("Created submissions/example.toml"));

    assert!(dir.path().join("rubrix.toml").exists());
    assert!(dir.path().join("submissions/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    rubrix().current_dir(dir.path()).arg("init").assert().success();

    rubrix()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    rubrix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rubric-based constrained-text evaluation engine",
        ));
}

#[test]
fn version_output() {
    rubrix()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rubrix"));
}

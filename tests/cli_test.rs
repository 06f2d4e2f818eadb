// ABOUTME: Runs the compiled binary to check exit status and console error reporting
// ABOUTME: Uses only invalid inputs, so no MongoDB server is needed

use std::process::{Command, Output};

fn run_migrate(args: &[&str]) -> (Output, tempfile::TempDir) {
    let log_dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_mongo-sample-migrator"))
        .arg("--log-dir")
        .arg(log_dir.path())
        .arg("migrate")
        .args(args)
        .output()
        .expect("binary should start");
    (output, log_dir)
}

#[test]
fn test_invalid_batch_size_is_reported_once() {
    let (output, _log_dir) = run_migrate(&["mongodb://localhost:1/", "shop", "--batch-size", "0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches("Batch size must be at least 1").count(),
        1,
        "stderr was: {}",
        stderr
    );
}

#[test]
fn test_connection_error_is_reported_once_and_logged_to_file() {
    let (output, log_dir) = run_migrate(&[
        "mongodb://localhost:1/",
        "shop",
        "--target",
        "mongodb://localhost:27017/?connectTimeoutMS=abc",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches("MongoDB connection error (target)").count(),
        1,
        "stderr was: {}",
        stderr
    );

    let logged: String = std::fs::read_dir(log_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap_or_default())
        .collect();
    assert!(logged.contains("MongoDB connection error (target)"));
}

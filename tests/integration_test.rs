// tests/integration_test.rs
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// The binary run in an empty directory with no ambient configuration
fn release_pr(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-pr"));
    cmd.args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITHUB_OUTPUT")
        .env_remove("RUST_LOG");
    for name in [
        "INPUT_COMMIT_PREFIX",
        "INPUT_PR_BRANCH",
        "INPUT_TARGET_BRANCH",
        "INPUT_VERSION_CMD",
        "GITHUB_EVENT_NAME",
        "GITHUB_EVENT_PATH",
        "GITHUB_REF",
        "GITHUB_REPOSITORY",
    ] {
        cmd.env_remove(name);
    }
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_release_pr_help() {
    let dir = TempDir::new().unwrap();
    let output = release_pr(dir.path(), &["--help"]).output().unwrap();

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("release-pr"));
    assert!(stdout.contains("extract-version"));
    assert!(stdout.contains("classify"));
}

#[test]
fn test_extract_version_normalizes() {
    let dir = TempDir::new().unwrap();
    let output = release_pr(dir.path(), &["extract-version", "chore: release  1.1.0 "])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "v1.1.0\n");
}

#[test]
fn test_extract_version_with_prefix_flag() {
    let dir = TempDir::new().unwrap();
    let output = release_pr(
        dir.path(),
        &["--commit-prefix", "release:", "extract-version", "release: 2.0.0-rc.1"],
    )
    .output()
    .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "v2.0.0-rc.1\n");
}

#[test]
fn test_extract_version_not_found_fails() {
    let dir = TempDir::new().unwrap();
    let output = release_pr(dir.path(), &["extract-version", "feat: nothing to see"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No version found"));
}

#[test]
fn test_config_file_prefix_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("release-pr.toml"), "commit_prefix = \"ship\"\n").unwrap();

    let output = release_pr(dir.path(), &["extract-version", "ship v3.1.4"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "v3.1.4\n");
}

#[test]
fn test_classify_fork_push() {
    let dir = TempDir::new().unwrap();
    let event = dir.path().join("event.json");
    std::fs::write(
        &event,
        r#"{"ref":"refs/heads/main","head_commit":{"id":"abc","message":"feat: a"},
            "repository":{"full_name":"someone/widget","fork":true,"default_branch":"main"}}"#,
    )
    .unwrap();

    let output = release_pr(dir.path(), &["classify"])
        .env("GITHUB_EVENT_NAME", "push")
        .env("GITHUB_EVENT_PATH", &event)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "skip\nno releases in forks\n");
}

#[test]
fn test_classify_ordinary_push() {
    let dir = TempDir::new().unwrap();
    let event = dir.path().join("event.json");
    std::fs::write(
        &event,
        r#"{"ref":"refs/heads/main","head_commit":{"id":"abc","message":"feat: a"},
            "repository":{"full_name":"acme/widget","fork":false,"default_branch":"main"}}"#,
    )
    .unwrap();

    let output = release_pr(dir.path(), &["classify"])
        .env("GITHUB_EVENT_NAME", "push")
        .env("GITHUB_EVENT_PATH", &event)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "prepare-pr\n");
}

#[test]
fn test_run_without_event_fails() {
    let dir = TempDir::new().unwrap();
    let output = release_pr(dir.path(), &["run"]).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GITHUB_EVENT_NAME"));
}

#[test]
fn test_shipped_workflow_serializes_runs() {
    let workflow = include_str!("../demos/release-pr.yml");
    let concurrency = workflow
        .split("\nconcurrency:\n")
        .nth(1)
        .expect("workflow declares a top-level concurrency block");
    let block: Vec<&str> = concurrency
        .lines()
        .take_while(|line| line.starts_with("  "))
        .map(str::trim)
        .collect();

    assert!(block.contains(&"group: release-pr"));
    assert!(block.contains(&"cancel-in-progress: false"));
    assert!(workflow.contains("release-pr run"));
}

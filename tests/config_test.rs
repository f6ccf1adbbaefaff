// tests/config_test.rs
use release_pr::config::{load_config, Config, Overrides};
use release_pr::engine::Settings;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const INPUTS: [&str; 4] = [
    "INPUT_COMMIT_PREFIX",
    "INPUT_PR_BRANCH",
    "INPUT_TARGET_BRANCH",
    "INPUT_VERSION_CMD",
];

fn clear_inputs() {
    for name in INPUTS {
        std::env::remove_var(name);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_from_file() {
    let temp_file = config_file(
        r#"
commit_prefix = "release:"
pr_branch = "bot/release"
target_branch = "trunk"
version_cmd = "./scripts/bump.sh"
lock_timeout_secs = 30

[changelog]
path = "docs/CHANGES.md"
config = "cliff.toml"
normalize_line_endings = true
"#,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.commit_prefix, "release:");
    assert_eq!(config.pr_branch, "bot/release");
    assert_eq!(config.target_branch.as_deref(), Some("trunk"));
    assert_eq!(config.version_cmd.as_deref(), Some("./scripts/bump.sh"));
    assert_eq!(config.lock_timeout_secs, 30);
    assert_eq!(config.remote, "origin");
    assert_eq!(config.changelog.path, PathBuf::from("docs/CHANGES.md"));
    assert_eq!(config.changelog.git_cliff_bin, "git-cliff");
    assert_eq!(config.changelog.config, Some(PathBuf::from("cliff.toml")));
    assert!(config.changelog.normalize_line_endings);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_file = config_file("delete_branch_after_release = false\n");

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert!(!config.delete_branch_after_release);
    assert_eq!(config.commit_prefix, "chore: release");
    assert_eq!(config.pr_branch, "release-pr");
    assert_eq!(config.changelog, Config::default().changelog);
}

#[test]
fn test_invalid_file_is_an_error() {
    let temp_file = config_file("commit_prefix = [1, 2]\n");
    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("TOML error"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(load_config(Some("/nonexistent/release-pr.toml")).is_err());
}

#[test]
#[serial]
fn test_action_inputs_override_file() {
    clear_inputs();
    std::env::set_var("INPUT_COMMIT_PREFIX", "release:");
    std::env::set_var("INPUT_TARGET_BRANCH", "");
    std::env::set_var("INPUT_VERSION_CMD", "make bump");

    let temp_file = config_file("commit_prefix = \"chore(release):\"\ntarget_branch = \"main\"\n");
    let mut config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    config.apply(Overrides::from_env());
    clear_inputs();

    assert_eq!(config.commit_prefix, "release:");
    assert_eq!(config.target_branch.as_deref(), Some("main"));
    assert_eq!(config.version_cmd.as_deref(), Some("make bump"));
}

#[test]
#[serial]
fn test_flags_override_action_inputs() {
    clear_inputs();
    std::env::set_var("INPUT_PR_BRANCH", "from-input");

    let mut config = Config::default();
    config.apply(Overrides::from_env());
    config.apply(Overrides {
        pr_branch: Some("from-flag".to_string()),
        ..Overrides::default()
    });
    clear_inputs();

    assert_eq!(config.pr_branch, "from-flag");
}

#[test]
fn test_settings_follow_config() {
    let mut config = Config::default();
    config.commit_prefix = "release:".to_string();
    config.version_cmd = Some("make bump".to_string());

    let settings = Settings::from_config(&config, "main");
    assert_eq!(settings.commit_prefix, "release:");
    assert_eq!(settings.target_branch, "main");
    assert_eq!(
        settings.version_cmd.as_ref().map(|cmd| cmd.command()),
        Some("make bump")
    );
    assert_eq!(settings.changelog_path, PathBuf::from("CHANGELOG.md"));
}

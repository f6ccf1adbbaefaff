// tests/event_payload_test.rs
use release_pr::domain::EventKind;
use release_pr::github::{from_payload, load_with};
use std::collections::HashMap;

const PUSH: &str = r#"{
  "ref": "refs/heads/main",
  "after": "b1e2",
  "head_commit": {
    "id": "b1e2",
    "message": "chore: release v1.1.0 (#12)\n\n* feat: add b"
  },
  "repository": {
    "full_name": "acme/widget",
    "fork": false,
    "default_branch": "main"
  }
}"#;

const TITLE_EDIT: &str = r#"{
  "action": "edited",
  "number": 12,
  "changes": { "title": { "from": "chore: release v1.0.1" } },
  "pull_request": {
    "number": 12,
    "title": "chore: release  1.1.0 ",
    "base": { "ref": "main", "repo": { "full_name": "acme/widget" } },
    "head": { "ref": "release-pr", "repo": { "full_name": "acme/widget" } }
  },
  "repository": { "full_name": "acme/widget", "fork": false, "default_branch": "main" }
}"#;

#[test]
fn test_push_payload() {
    let event = from_payload("push", None, None, PUSH).unwrap();

    assert_eq!(event.kind, EventKind::Push);
    assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
    assert_eq!(
        event.head_commit_subject.as_deref(),
        Some("chore: release v1.1.0 (#12)")
    );
    assert_eq!(event.head_sha.as_deref(), Some("b1e2"));
    assert_eq!(event.repo_full_name.as_deref(), Some("acme/widget"));
    assert_eq!(event.default_branch.as_deref(), Some("main"));
    assert!(!event.is_fork);
}

#[test]
fn test_fork_push_payload() {
    let payload = PUSH.replace("\"fork\": false", "\"fork\": true");
    let event = from_payload("push", None, None, &payload).unwrap();
    assert!(event.is_fork);
}

#[test]
fn test_title_edit_payload() {
    let event = from_payload("pull_request", None, None, TITLE_EDIT).unwrap();

    assert_eq!(event.kind, EventKind::PullRequest);
    assert_eq!(event.pr_action.as_deref(), Some("edited"));
    assert!(event.pr_title_changed);
    assert_eq!(event.pr_number, Some(12));
    assert_eq!(event.pr_title.as_deref(), Some("chore: release  1.1.0 "));
    assert_eq!(event.base_ref.as_deref(), Some("main"));
    assert_eq!(event.head_ref.as_deref(), Some("release-pr"));
    assert_eq!(event.pr_head_repo_full_name.as_deref(), Some("acme/widget"));
}

#[test]
fn test_body_edit_does_not_change_title() {
    let payload = TITLE_EDIT.replace(
        r#""changes": { "title": { "from": "chore: release v1.0.1" } }"#,
        r#""changes": { "body": { "from": "old" } }"#,
    );
    let event = from_payload("pull_request_target", None, None, &payload).unwrap();
    assert_eq!(event.kind, EventKind::PullRequest);
    assert!(!event.pr_title_changed);
}

#[test]
fn test_deleted_head_repository() {
    let payload = TITLE_EDIT.replace(
        r#""head": { "ref": "release-pr", "repo": { "full_name": "acme/widget" } }"#,
        r#""head": { "ref": "release-pr", "repo": null }"#,
    );
    let event = from_payload("pull_request", None, None, &payload).unwrap();
    assert_eq!(event.pr_head_repo_full_name, None);
}

#[test]
fn test_pull_request_payload_without_pull_request_fails() {
    assert!(from_payload("pull_request", None, None, "{}").is_err());
}

#[test]
fn test_other_events_keep_their_name() {
    let event = from_payload("workflow_dispatch", Some("refs/heads/main"), None, "{}").unwrap();
    assert_eq!(event.kind, EventKind::Other("workflow_dispatch".to_string()));
    assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
}

#[test]
fn test_load_from_event_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, PUSH).unwrap();

    let env: HashMap<&str, String> = [
        ("GITHUB_EVENT_NAME", "push".to_string()),
        ("GITHUB_EVENT_PATH", path.to_string_lossy().into_owned()),
        ("GITHUB_REF", "refs/heads/ignored".to_string()),
    ]
    .into_iter()
    .collect();

    let event = load_with(|name| env.get(name).cloned()).unwrap();
    assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
}

#[test]
fn test_unreadable_event_file() {
    let err = load_with(|name| match name {
        "GITHUB_EVENT_NAME" => Some("push".to_string()),
        "GITHUB_EVENT_PATH" => Some("/nonexistent/event.json".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("Cannot read event payload"));
}

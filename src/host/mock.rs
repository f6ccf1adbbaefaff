use crate::domain::{PrState, PullRequest, ReleaseRequest};
use crate::error::{ReleasePrError, Result};
use crate::host::Host;
use std::cell::RefCell;

#[derive(Debug, Default)]
struct State {
    pull_requests: Vec<PullRequest>,
    releases: Vec<ReleaseRequest>,
    calls: Vec<String>,
    next_number: u64,
}

/// In-memory host for tests
///
/// Every trait call is recorded, so a test can assert that a skipped run
/// never reached the host.
pub struct MockHost {
    default_branch: String,
    state: RefCell<State>,
}

impl MockHost {
    pub fn new(default_branch: impl Into<String>) -> Self {
        MockHost {
            default_branch: default_branch.into(),
            state: RefCell::new(State {
                next_number: 1,
                ..State::default()
            }),
        }
    }

    /// A pull request by number
    pub fn pr(&self, number: u64) -> Option<PullRequest> {
        self.state
            .borrow()
            .pull_requests
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
    }

    /// All pull requests ever opened
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.state.borrow().pull_requests.clone()
    }

    /// Change a title as a maintainer would in the web UI
    pub fn set_title(&self, number: u64, title: &str) -> Result<()> {
        self.update(number, |pr| pr.title = title.to_string())
    }

    /// Mark a pull request merged
    pub fn merge_pr(&self, number: u64) -> Result<()> {
        self.update(number, |pr| pr.state = PrState::Merged)
    }

    /// Mark a pull request closed without merging
    pub fn close_pr(&self, number: u64) -> Result<()> {
        self.update(number, |pr| pr.state = PrState::Closed)
    }

    /// Releases published so far
    pub fn releases(&self) -> Vec<ReleaseRequest> {
        self.state.borrow().releases.clone()
    }

    /// Names of the trait methods called, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.as_str() == method)
            .count()
    }

    fn update(&self, number: u64, change: impl FnOnce(&mut PullRequest)) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let pr = state
            .pull_requests
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| ReleasePrError::external("mock host", format!("no PR #{}", number)))?;
        change(pr);
        Ok(())
    }

    fn record(&self, call: &str) {
        self.state.borrow_mut().calls.push(call.to_string());
    }
}

impl Host for MockHost {
    fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        self.record("find_open_pr");
        Ok(self
            .state
            .borrow()
            .pull_requests
            .iter()
            .find(|pr| pr.state == PrState::Open && pr.head_branch == head && pr.base_branch == base)
            .cloned())
    }

    fn get_pr(&self, number: u64) -> Result<PullRequest> {
        self.record("get_pr");
        self.pr(number)
            .ok_or_else(|| ReleasePrError::external("mock host", format!("no PR #{}", number)))
    }

    fn create_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest> {
        self.record("create_pr");
        let mut state = self.state.borrow_mut();
        let pr = PullRequest {
            number: state.next_number,
            title: title.to_string(),
            body: body.to_string(),
            head_branch: head.to_string(),
            base_branch: base.to_string(),
            state: PrState::Open,
        };
        state.next_number += 1;
        state.pull_requests.push(pr.clone());
        Ok(pr)
    }

    fn edit_pr(&self, number: u64, title: Option<&str>, body: Option<&str>) -> Result<()> {
        self.record("edit_pr");
        self.update(number, |pr| {
            if let Some(title) = title {
                pr.title = title.to_string();
            }
            if let Some(body) = body {
                pr.body = body.to_string();
            }
        })
    }

    fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        self.record("create_release");
        let mut state = self.state.borrow_mut();
        if state.releases.iter().any(|r| r.tag == request.tag) {
            return Err(ReleasePrError::external(
                "mock host",
                format!("release {} already exists", request.tag),
            ));
        }
        state.releases.push(request.clone());
        Ok(())
    }

    fn default_branch(&self) -> Result<String> {
        self.record("default_branch");
        Ok(self.default_branch.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_open_pr_ignores_closed() {
        let host = MockHost::new("main");
        let pr = host.create_pr("chore: release v1.0.0", "", "release-pr", "main").unwrap();
        assert_eq!(pr.number, 1);
        assert!(host.find_open_pr("release-pr", "main").unwrap().is_some());

        host.close_pr(1).unwrap();
        assert!(host.find_open_pr("release-pr", "main").unwrap().is_none());
    }

    #[test]
    fn test_edit_and_calls_are_recorded() {
        let host = MockHost::new("main");
        host.create_pr("a", "body", "release-pr", "main").unwrap();
        host.edit_pr(1, Some("b"), None).unwrap();

        let pr = host.pr(1).unwrap();
        assert_eq!(pr.title, "b");
        assert_eq!(pr.body, "body");
        assert_eq!(host.calls(), vec!["create_pr", "edit_pr"]);
        assert_eq!(host.call_count("edit_pr"), 1);
    }

    #[test]
    fn test_duplicate_release_is_rejected() {
        let host = MockHost::new("main");
        let request = ReleaseRequest {
            tag: "v1.0.0".to_string(),
            body: String::new(),
            draft: true,
            prerelease: false,
        };
        host.create_release(&request).unwrap();
        assert!(host.create_release(&request).is_err());
        assert_eq!(host.releases().len(), 1);
    }
}

use crate::domain::{PrState, PullRequest, ReleaseRequest};
use crate::error::{ReleasePrError, Result};
use crate::host::Host;
use crate::process::run_tool;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

const PR_FIELDS: &str = "number,title,body,headRefName,baseRefName,state";

/// Pull request as printed by `gh ... --json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPullRequest {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    head_ref_name: String,
    base_ref_name: String,
    state: String,
}

impl From<GhPullRequest> for PullRequest {
    fn from(pr: GhPullRequest) -> Self {
        let state = match pr.state.as_str() {
            "MERGED" => PrState::Merged,
            "CLOSED" => PrState::Closed,
            _ => PrState::Open,
        };
        PullRequest {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            head_branch: pr.head_ref_name,
            base_branch: pr.base_ref_name,
            state,
        }
    }
}

/// Parse the `gh pr list --json` output
fn parse_pr_list(json: &str) -> Result<Vec<PullRequest>> {
    let prs: Vec<GhPullRequest> = serde_json::from_str(json)?;
    Ok(prs.into_iter().map(PullRequest::from).collect())
}

/// Extract the PR number from the URL printed by `gh pr create`
fn parse_pr_url(output: &str) -> Option<u64> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.contains("/pull/"))?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

/// GitHub host backed by the `gh` CLI
///
/// Authentication is whatever `gh` picks up (`GH_TOKEN` / `GITHUB_TOKEN`
/// in CI).
pub struct GhCli {
    workdir: PathBuf,
    repo: Option<String>,
    program: String,
}

impl GhCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        GhCli {
            workdir: workdir.into(),
            repo: None,
            program: "gh".to_string(),
        }
    }

    /// Target `owner/name` explicitly instead of the work tree's remote
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    fn gh(&self, args: &[&str]) -> Result<String> {
        let mut full: Vec<&str> = args.to_vec();
        if let Some(repo) = &self.repo {
            full.push("--repo");
            full.push(repo);
        }
        debug!(args = ?full, "gh");
        run_tool(&self.program, &full, &self.workdir)
    }
}

impl Host for GhCli {
    fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        let output = self.gh(&[
            "pr", "list", "--state", "open", "--head", head, "--base", base, "--json", PR_FIELDS,
            "--limit", "1",
        ])?;
        Ok(parse_pr_list(&output)?.into_iter().next())
    }

    fn get_pr(&self, number: u64) -> Result<PullRequest> {
        let number = number.to_string();
        let output = self.gh(&["pr", "view", &number, "--json", PR_FIELDS])?;
        let pr: GhPullRequest = serde_json::from_str(&output)?;
        Ok(pr.into())
    }

    fn create_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest> {
        let output = self.gh(&[
            "pr", "create", "--title", title, "--body", body, "--head", head, "--base", base,
        ])?;

        let number = parse_pr_url(&output).ok_or_else(|| {
            ReleasePrError::external(
                "gh",
                format!("could not read a pull request URL from '{}'", output.trim()),
            )
        })?;

        Ok(PullRequest {
            number,
            title: title.to_string(),
            body: body.to_string(),
            head_branch: head.to_string(),
            base_branch: base.to_string(),
            state: PrState::Open,
        })
    }

    fn edit_pr(&self, number: u64, title: Option<&str>, body: Option<&str>) -> Result<()> {
        let number = number.to_string();
        let mut args = vec!["pr", "edit", number.as_str()];
        if let Some(title) = title {
            args.extend(["--title", title]);
        }
        if let Some(body) = body {
            args.extend(["--body", body]);
        }
        self.gh(&args)?;
        Ok(())
    }

    fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        let mut args = vec![
            "release",
            "create",
            request.tag.as_str(),
            "--title",
            request.tag.as_str(),
            "--notes",
            request.body.as_str(),
            "--verify-tag",
        ];
        if request.draft {
            args.push("--draft");
        }
        if request.prerelease {
            args.push("--prerelease");
        }
        self.gh(&args)?;
        Ok(())
    }

    fn default_branch(&self) -> Result<String> {
        let output = self.gh(&[
            "repo",
            "view",
            "--json",
            "defaultBranchRef",
            "--jq",
            ".defaultBranchRef.name",
        ])?;
        let branch = output.trim();
        if branch.is_empty() {
            return Err(ReleasePrError::external("gh", "empty default branch name"));
        }
        Ok(branch.to_string())
    }
}

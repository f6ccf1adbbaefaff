use crate::changelog::ChangelogGenerator;
use crate::domain::Version;
use crate::error::{ReleasePrError, Result};
use crate::process::run_tool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `git-cliff` run in the repository work tree
pub struct GitCliff {
    bin: String,
    config: Option<PathBuf>,
    workdir: PathBuf,
}

impl GitCliff {
    pub fn new(bin: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        GitCliff {
            bin: bin.into(),
            config: None,
            workdir: workdir.into(),
        }
    }

    /// Use an explicit `cliff.toml`
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    fn cliff(&self, args: &[&str]) -> Result<String> {
        let config = self.config.as_ref().map(|p| p.to_string_lossy().into_owned());
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        if let Some(config) = &config {
            full.push("--config");
            full.push(config);
        }
        full.extend_from_slice(args);

        debug!(bin = %self.bin, args = ?full, "git-cliff");
        run_tool(&self.bin, &full, &self.workdir)
    }
}

/// The bumped version is the last non-empty line of `--bumped-version`
/// output; earlier lines may carry warnings.
fn parse_bumped_version(output: &str) -> Result<Version> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| ReleasePrError::external("git-cliff", "no bumped version printed"))?;
    Version::parse(line)
}

impl ChangelogGenerator for GitCliff {
    fn next_version(&self) -> Result<Version> {
        let output = self.cliff(&["--bumped-version"])?;
        parse_bumped_version(&output)
    }

    fn render(&self, version: &Version) -> Result<String> {
        let tag = version.to_string();
        self.cliff(&["--unreleased", "--tag", &tag, "--strip", "all"])
    }

    fn write_file(&self, version: &Version, path: &Path) -> Result<()> {
        let tag = version.to_string();
        let output = self.workdir.join(path);
        let output = output.to_string_lossy();
        self.cliff(&["--tag", &tag, "--output", &output])?;
        Ok(())
    }
}

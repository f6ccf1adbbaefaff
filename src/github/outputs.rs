use crate::engine::RunReport;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const DELIMITER: &str = "RELEASE_PR_CHANGELOG_EOF";

/// Step outputs in `$GITHUB_OUTPUT` syntax; the multi-line changelog uses
/// a heredoc delimiter that does not occur in it.
pub fn format_outputs(report: &RunReport) -> String {
    let version = report
        .version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut delimiter = DELIMITER.to_string();
    let mut n = 0;
    while report.changelog.contains(&delimiter) {
        n += 1;
        delimiter = format!("{}_{}", DELIMITER, n);
    }

    let mut changelog = report.changelog.clone();
    if !changelog.is_empty() && !changelog.ends_with('\n') {
        changelog.push('\n');
    }

    format!(
        "result={}\nversion={}\nprerelease={}\nchangelog<<{delim}\n{}{delim}\n",
        report.result.as_output(),
        version,
        report.prerelease(),
        changelog,
        delim = delimiter
    )
}

/// Append the outputs of `report` to the file at `path`
pub fn write_outputs(path: &Path, report: &RunReport) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_outputs(report).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SkipReason, Version};
    use crate::engine::{ReconcileOutcome, RunResult};

    fn prepared(changelog: &str) -> RunReport {
        RunReport {
            result: RunResult::PreparedPr,
            version: Some(Version::parse("1.1.0-rc.1").unwrap()),
            changelog: changelog.to_string(),
            pull_request: Some(ReconcileOutcome::Created(4)),
            release: None,
            skip_reason: None,
        }
    }

    #[test]
    fn test_prepared_outputs() {
        let out = format_outputs(&prepared("- feat: a"));
        assert_eq!(
            out,
            "result=prepared-pr\nversion=v1.1.0-rc.1\nprerelease=true\n\
             changelog<<RELEASE_PR_CHANGELOG_EOF\n- feat: a\nRELEASE_PR_CHANGELOG_EOF\n"
        );
    }

    #[test]
    fn test_skipped_outputs_are_empty() {
        let out = format_outputs(&RunReport::skipped(SkipReason::ForkRepository));
        assert!(out.starts_with("result=\nversion=\nprerelease=false\n"));
    }

    #[test]
    fn test_delimiter_avoids_changelog_content() {
        let out = format_outputs(&prepared("RELEASE_PR_CHANGELOG_EOF\n"));
        assert!(out.contains("changelog<<RELEASE_PR_CHANGELOG_EOF_1\n"));
    }

    #[test]
    fn test_write_appends() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "existing=1\n").unwrap();

        write_outputs(file.path(), &prepared("- feat: a\n")).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("existing=1\nresult=prepared-pr\n"));
    }
}

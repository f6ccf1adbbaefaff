use crate::domain::{SkipReason, Version};
use crate::engine::{ReconcileOutcome, RunReport, RunResult};
use crate::error::ReleasePrError;
use std::fmt;

/// Severity of a [Notice], mapped to GitHub workflow command levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Notice,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn command(&self) -> &'static str {
        match self {
            NoticeLevel::Notice => "notice",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// Terminal outcome of a run, as reported to operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Skipped { reason: SkipReason },
    PrCreated { number: u64, version: Version },
    PrUpdated { number: u64, version: Version },
    PrUnchanged { number: u64, version: Version },
    VersionSet { number: u64, version: Version },
    Released { version: Version, prerelease: bool },
    RaceDetected { version: String, pr_number: u64 },
    Failed { message: String },
}

impl Notice {
    /// Notice for a finished run
    pub fn from_report(report: &RunReport) -> Self {
        let version = report.version.clone().unwrap_or_else(|| Version::new(0, 0, 0));

        match (report.result, report.pull_request) {
            (RunResult::Skipped, _) => Notice::Skipped {
                reason: report
                    .skip_reason
                    .clone()
                    .unwrap_or(SkipReason::UnsupportedEvent {
                        kind: "unknown".to_string(),
                    }),
            },
            (RunResult::Released, _) => Notice::Released {
                prerelease: version.is_prerelease(),
                version,
            },
            (RunResult::SetVersion, Some(outcome)) => Notice::VersionSet {
                number: outcome.pr_number(),
                version,
            },
            (_, Some(ReconcileOutcome::Created(number))) => Notice::PrCreated { number, version },
            (_, Some(ReconcileOutcome::Updated(number))) => Notice::PrUpdated { number, version },
            (_, Some(ReconcileOutcome::Unchanged(number))) => {
                Notice::PrUnchanged { number, version }
            }
            (_, None) => Notice::Failed {
                message: "run finished without a pull request".to_string(),
            },
        }
    }

    /// Notice for a failed run
    pub fn from_error(error: &ReleasePrError) -> Self {
        match error {
            ReleasePrError::RaceDetected { version, pr_number } => Notice::RaceDetected {
                version: version.clone(),
                pr_number: *pr_number,
            },
            other => Notice::Failed {
                message: other.to_string(),
            },
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::RaceDetected { .. } => NoticeLevel::Warning,
            Notice::Failed { .. } => NoticeLevel::Error,
            _ => NoticeLevel::Notice,
        }
    }

    /// Short heading for the notice
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Skipped { .. } => "Skipped",
            Notice::PrCreated { .. } => "Release PR created",
            Notice::PrUpdated { .. } => "Release PR updated",
            Notice::PrUnchanged { .. } => "Release PR up to date",
            Notice::VersionSet { .. } => "Release version set",
            Notice::Released { .. } => "Released",
            Notice::RaceDetected { .. } => "Release blocked",
            Notice::Failed { .. } => "Release run failed",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Skipped { reason } => write!(f, "Skipped: {}", reason),
            Notice::PrCreated { number, version } => {
                write!(f, "Opened release PR #{} for {}", number, version)
            }
            Notice::PrUpdated { number, version } => {
                write!(f, "Updated release PR #{} to {}", number, version)
            }
            Notice::PrUnchanged { number, version } => {
                write!(f, "Release PR #{} already proposes {}", number, version)
            }
            Notice::VersionSet { number, version } => {
                write!(f, "Release PR #{} now proposes {}", number, version)
            }
            Notice::Released { version, prerelease } => {
                if *prerelease {
                    write!(f, "Tagged {} and drafted a prerelease", version)
                } else {
                    write!(f, "Tagged {} and drafted a release", version)
                }
            }
            Notice::RaceDetected { version, pr_number } => write!(
                f,
                "Changelog for {} changed after the release PR was prepared; not released, see superseding PR #{}",
                version, pr_number
            ),
            Notice::Failed { message } => write!(f, "{}", message),
        }
    }
}

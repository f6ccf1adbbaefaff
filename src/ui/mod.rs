//! User interface module - reporting notices.
//!
//! - `formatter` - Pure formatting functions
//! - This module - choosing between console output and workflow commands

pub mod formatter;

pub use formatter::{display_error, display_status, display_success, display_warning};

use crate::notice::{Notice, NoticeLevel};

/// Whether we run inside GitHub Actions
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").map_or(false, |value| value == "true")
}

/// Report `notice` to the operator.
///
/// Inside GitHub Actions the notice becomes a workflow command so it shows
/// up as an annotation; otherwise it is a colored console line.
pub fn report(notice: &Notice) {
    let message = notice.to_string();

    if in_github_actions() {
        println!(
            "{}",
            formatter::workflow_command(notice.level().command(), notice.title(), &message)
        );
        return;
    }

    match (notice.level(), notice) {
        (NoticeLevel::Error, _) => display_error(&message),
        (NoticeLevel::Warning, _) => display_warning(&message),
        (_, Notice::Skipped { .. }) => display_status(&message),
        _ => display_success(&message),
    }
}

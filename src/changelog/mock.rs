use crate::changelog::ChangelogGenerator;
use crate::domain::Version;
use crate::error::Result;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Changelog generator with scripted answers
///
/// Entries accumulate as a test lands commits; the body is one `- entry`
/// line per entry.
pub struct ScriptedChangelog {
    workdir: PathBuf,
    next_version: RefCell<Version>,
    entries: RefCell<Vec<String>>,
}

impl ScriptedChangelog {
    pub fn new(workdir: impl Into<PathBuf>, next_version: Version) -> Self {
        ScriptedChangelog {
            workdir: workdir.into(),
            next_version: RefCell::new(next_version),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn add_entry(&self, entry: &str) {
        self.entries.borrow_mut().push(entry.to_string());
    }

    pub fn set_next_version(&self, version: Version) {
        *self.next_version.borrow_mut() = version;
    }

    /// Text [ChangelogGenerator::write_file] writes for `version`
    pub fn file_content(&self, version: &Version) -> String {
        format!("# Changelog\n\n## {}\n\n{}", version, self.body())
    }

    fn body(&self) -> String {
        self.entries
            .borrow()
            .iter()
            .map(|entry| format!("- {}\n", entry))
            .collect()
    }
}

impl ChangelogGenerator for ScriptedChangelog {
    fn next_version(&self) -> Result<Version> {
        Ok(self.next_version.borrow().clone())
    }

    fn render(&self, _version: &Version) -> Result<String> {
        Ok(self.body())
    }

    fn write_file(&self, version: &Version, path: &Path) -> Result<()> {
        let full = self.workdir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, self.file_content(version))?;
        Ok(())
    }
}

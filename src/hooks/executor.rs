use crate::domain::Version;
use crate::error::Result;
use crate::process::run_command;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Environment variable carrying the resolved version, e.g. `v1.2.3`
pub const VERSION_ENV: &str = "VERSION";

/// The configured `version_cmd` shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCommand {
    command: String,
}

impl VersionCommand {
    pub fn new(command: impl Into<String>) -> Self {
        VersionCommand {
            command: command.into(),
        }
    }

    /// `None` for an absent or blank command
    pub fn from_config(command: Option<&str>) -> Option<Self> {
        command
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Self::new)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the command through `sh -c` in `workdir` with `VERSION` set.
    ///
    /// A non-zero exit fails the run.
    pub fn execute(&self, version: &Version, workdir: &Path) -> Result<()> {
        info!(command = %self.command, %version, "running version_cmd");

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .current_dir(workdir)
            .env(VERSION_ENV, version.to_string());

        run_command("version_cmd", &mut cmd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleasePrError;
    use std::fs;

    #[test]
    fn test_blank_command_is_absent() {
        assert!(VersionCommand::from_config(None).is_none());
        assert!(VersionCommand::from_config(Some("   ")).is_none());
        assert_eq!(
            VersionCommand::from_config(Some(" make bump ")).unwrap().command(),
            "make bump"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_version_is_exposed_to_command() {
        let dir = tempfile::TempDir::new().unwrap();
        let cmd = VersionCommand::new("printf '%s' \"$VERSION\" > version.txt");

        cmd.execute(&Version::new(1, 2, 3), dir.path()).unwrap();

        let written = fs::read_to_string(dir.path().join("version.txt")).unwrap();
        assert_eq!(written, "v1.2.3");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_is_external_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = VersionCommand::new("exit 3")
            .execute(&Version::new(1, 0, 0), dir.path())
            .unwrap_err();

        assert!(matches!(err, ReleasePrError::External { ref tool, .. } if tool == "version_cmd"));
        assert!(err.to_string().contains("exit code 3"));
    }
}

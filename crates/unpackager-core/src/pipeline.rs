//! The unpackaging run: project file, launch settings, framework lookup and
//! publish script, strictly in that order.
//!
//! Each stage commits its write before the next one starts. A failure stops
//! the run but nothing already written is rolled back.

use std::path::{Path, PathBuf};

use crate::config::UnpackConfig;
use crate::error::Result;
use crate::launch::rewrite_launch_settings;
use crate::project::{edit_project_file, find_target_framework, TargetFramework};
use crate::publish::write_publish_script;

/// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every stage ran and the publish script was written
    Completed {
        /// Rewritten project file
        project: PathBuf,
        /// Rewritten launch settings file
        launch_settings: PathBuf,
        /// Generated publish script
        script: PathBuf,
        /// Moniker used in the publish command
        target_framework: TargetFramework,
        /// Property groups that received the flag element
        groups_updated: usize,
        /// `commandName` entries replaced in the launch settings
        lines_replaced: usize,
    },
    /// No conditional Windows `TargetFrameworks` was found; no script written
    NoTargetFramework,
}

/// Runs the conversion for one project file
#[derive(Debug, Clone, Default)]
pub struct Unpackager {
    config: UnpackConfig,
}

impl Unpackager {
    /// Create a runner with the given options
    pub fn new(config: UnpackConfig) -> Self {
        Self { config }
    }

    /// Options in effect
    pub fn config(&self) -> &UnpackConfig {
        &self.config
    }

    /// Convert the project at `project_path`.
    pub fn run<P: AsRef<Path>>(&self, project_path: P) -> Result<RunOutcome> {
        let project_path = project_path.as_ref();
        let project_dir = project_dir(project_path);

        tracing::debug!("Editing project file {}", project_path.display());
        let edit = edit_project_file(project_path, &self.config)?;

        tracing::debug!("Rewriting launch settings under {}", project_dir.display());
        let launch = rewrite_launch_settings(project_dir, self.config.launch_settings_mode)?;

        let Some(target_framework) = find_target_framework(&edit.descriptor) else {
            tracing::warn!(
                "No conditional Windows TargetFrameworks in {}",
                project_path.display()
            );
            return Ok(RunOutcome::NoTargetFramework);
        };

        let script = write_publish_script(project_dir, &target_framework)?;

        Ok(RunOutcome::Completed {
            project: project_path.to_path_buf(),
            launch_settings: launch.path,
            script,
            target_framework,
            groups_updated: edit.groups_updated,
            lines_replaced: launch.replaced,
        })
    }
}

/// Directory containing the project file.
pub fn project_dir(project_path: &Path) -> &Path {
    match project_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_dir() {
        assert_eq!(project_dir(Path::new("src/App/App.csproj")), Path::new("src/App"));
        assert_eq!(project_dir(Path::new("App.csproj")), Path::new("."));
    }
}

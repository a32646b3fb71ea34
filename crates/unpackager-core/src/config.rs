//! Run options

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result, UnpackError};

/// Indentation width used when rewriting the project file
pub const DEFAULT_INDENT: usize = 2;

/// How `launchSettings.json` is rewritten
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchSettingsMode {
    /// Replace every line containing the `commandName` key with a fixed line
    #[default]
    Line,
    /// Parse as JSON, set every `commandName` member and pretty-print
    Structured,
}

/// Which process exit status each outcome maps to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCodePolicy {
    /// Every run exits with status 0, errors included
    #[default]
    AlwaysSuccess,
    /// Each error kind gets its own non-zero status
    PerKind,
}

/// Exit status reported when no Windows TargetFramework is found
pub const NO_TARGET_FRAMEWORK_EXIT_CODE: i32 = 8;

impl ExitCodePolicy {
    /// Exit status for a failed run
    pub fn for_error(self, kind: ErrorKind) -> i32 {
        match self {
            ExitCodePolicy::AlwaysSuccess => 0,
            ExitCodePolicy::PerKind => match kind {
                ErrorKind::Usage => 2,
                ErrorKind::Parse => 3,
                ErrorKind::Structure => 4,
                ErrorKind::NotFound => 5,
                ErrorKind::Read => 6,
                ErrorKind::Write => 7,
            },
        }
    }

    /// Exit status for a run that found no Windows TargetFramework
    pub fn for_no_target_framework(self) -> i32 {
        match self {
            ExitCodePolicy::AlwaysSuccess => 0,
            ExitCodePolicy::PerKind => NO_TARGET_FRAMEWORK_EXIT_CODE,
        }
    }
}

/// Options for a single unpackaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnpackConfig {
    /// Spaces per nesting level in the rewritten project file
    pub indent: usize,

    /// Rewrite strategy for `launchSettings.json`
    pub launch_settings_mode: LaunchSettingsMode,

    /// Exit status mapping used by the command line front end
    pub exit_code_policy: ExitCodePolicy,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            launch_settings_mode: LaunchSettingsMode::default(),
            exit_code_policy: ExitCodePolicy::default(),
        }
    }
}

impl UnpackConfig {
    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| UnpackError::read(path, e))?;
        let config = serde_json::from_str(&content).map_err(|e| UnpackError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded options from {}", path.display());
        Ok(config)
    }
}

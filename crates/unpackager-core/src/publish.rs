//! Publish script generation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UnpackError};
use crate::project::TargetFramework;

/// Name of the generated script, created beside the project file
pub const SCRIPT_FILE_NAME: &str = "unpackaged_app_publish.bat";

/// Runtime identifier passed to `dotnet publish`
pub const RUNTIME_IDENTIFIER: &str = "win10-x64";

/// The `dotnet publish` command line for an unpackaged, self-contained build.
pub fn publish_command(framework: &TargetFramework) -> String {
    format!(
        "dotnet publish -f {} -c Release -p:RuntimeIdentifierOverride={} -p:WindowsPackageType=None -p:WindowsAppSDKSelfContained=true",
        framework, RUNTIME_IDENTIFIER
    )
}

/// Write the publish script into `project_dir`, replacing any previous one.
pub fn write_publish_script<P: AsRef<Path>>(
    project_dir: P,
    framework: &TargetFramework,
) -> Result<PathBuf> {
    let path = project_dir.as_ref().join(SCRIPT_FILE_NAME);
    fs::write(&path, publish_command(framework)).map_err(|e| UnpackError::write(&path, e))?;
    tracing::info!("Wrote publish script {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_command_template() {
        let tfm = TargetFramework::new("net8.0-windows10.0.19041.0");
        assert_eq!(
            publish_command(&tfm),
            "dotnet publish -f net8.0-windows10.0.19041.0 -c Release -p:RuntimeIdentifierOverride=win10-x64 -p:WindowsPackageType=None -p:WindowsAppSDKSelfContained=true"
        );
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let tfm = TargetFramework::new("net8.0-windows10.0.19041.0");
        let err = write_publish_script("/nonexistent/unpackager/dir", &tfm).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Write);
        assert!(err.to_string().starts_with("Error writing batch file:"));
    }
}

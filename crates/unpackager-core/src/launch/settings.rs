//! Launch settings rewriter.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::LaunchSettingsMode;
use crate::error::{Result, UnpackError};

/// Directory holding the launch settings, relative to the project directory
pub const PROPERTIES_DIR: &str = "Properties";

/// Launch settings file name
pub const LAUNCH_SETTINGS_FILE: &str = "launchSettings.json";

/// JSON member switched to [`COMMAND_NAME_VALUE`]
pub const COMMAND_NAME_KEY: &str = "commandName";

/// Value that launches the build output directly
pub const COMMAND_NAME_VALUE: &str = "Project";

/// Token identifying a line to replace in line mode
pub const COMMAND_NAME_TOKEN: &str = "\"commandName\":";

/// Replacement line written in line mode
pub const CANONICAL_COMMAND_LINE: &str = "      \"commandName\": \"Project\",";

/// Result of rewriting the launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRewrite {
    /// File that was rewritten
    pub path: PathBuf,
    /// Number of lines (line mode) or members (structured mode) replaced
    pub replaced: usize,
}

/// Location of the launch settings for a project directory.
pub fn launch_settings_path<P: AsRef<Path>>(project_dir: P) -> PathBuf {
    project_dir
        .as_ref()
        .join(PROPERTIES_DIR)
        .join(LAUNCH_SETTINGS_FILE)
}

/// Replace every line containing the `"commandName":` token.
///
/// Works on raw bytes so lines in other encodings pass through untouched.
/// Lines end at `\n` (a preceding `\r` is dropped); line order and count
/// are preserved and each output line ends with `\n`.
pub fn rewrite_lines(content: &[u8]) -> (Vec<u8>, usize) {
    let token = COMMAND_NAME_TOKEN.as_bytes();
    let mut lines: Vec<&[u8]> = content.split(|b| *b == b'\n').collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    let mut output = Vec::with_capacity(content.len() + 64);
    let mut replaced = 0;
    for line in lines {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.windows(token.len()).any(|w| w == token) {
            output.extend_from_slice(CANONICAL_COMMAND_LINE.as_bytes());
            replaced += 1;
        } else {
            output.extend_from_slice(line);
        }
        output.push(b'\n');
    }
    (output, replaced)
}

/// Set every `commandName` member, at any depth, to `"Project"`.
///
/// Member order is preserved and the result is pretty-printed.
pub fn rewrite_structured(content: &str) -> std::result::Result<(String, usize), serde_json::Error> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut doc: Value = serde_json::from_str(content)?;
    let replaced = set_command_name(&mut doc);
    let mut output = serde_json::to_string_pretty(&doc)?;
    output.push('\n');
    Ok((output, replaced))
}

fn set_command_name(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => {
            let mut count = 0;
            for (key, member) in map.iter_mut() {
                if key == COMMAND_NAME_KEY {
                    *member = Value::String(COMMAND_NAME_VALUE.to_string());
                    count += 1;
                } else {
                    count += set_command_name(member);
                }
            }
            count
        }
        Value::Array(items) => items.iter_mut().map(set_command_name).sum(),
        _ => 0,
    }
}

/// Rewrite `<project_dir>/Properties/launchSettings.json` in place.
pub fn rewrite_launch_settings<P: AsRef<Path>>(
    project_dir: P,
    mode: LaunchSettingsMode,
) -> Result<LaunchRewrite> {
    let path = launch_settings_path(project_dir);

    let (output, replaced) = match mode {
        LaunchSettingsMode::Line => {
            let content = fs::read(&path).map_err(|e| UnpackError::read(&path, e))?;
            rewrite_lines(&content)
        }
        LaunchSettingsMode::Structured => {
            let content = fs::read_to_string(&path).map_err(|e| UnpackError::read(&path, e))?;
            let (output, replaced) =
                rewrite_structured(&content).map_err(|e| UnpackError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            (output.into_bytes(), replaced)
        }
    };

    fs::write(&path, output).map_err(|e| UnpackError::write(&path, e))?;
    tracing::info!(
        "Rewrote {} ({} {} replaced)",
        path.display(),
        replaced,
        COMMAND_NAME_KEY
    );

    Ok(LaunchRewrite { path, replaced })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"{
  "profiles": {
    "Windows Machine": {
      "commandName": "MsixPackage",
      "nativeDebugging": false
    }
  }
}"#;

    #[test]
    fn test_rewrite_lines_replaces_only_matching_lines() {
        let (out, replaced) = rewrite_lines(SETTINGS.as_bytes());
        let out = String::from_utf8(out).unwrap();
        assert_eq!(replaced, 1);

        let input: Vec<&str> = SETTINGS.lines().collect();
        let output: Vec<&str> = out.lines().collect();
        assert_eq!(input.len(), output.len());
        for (before, after) in input.iter().zip(&output) {
            if before.contains(COMMAND_NAME_TOKEN) {
                assert_eq!(*after, CANONICAL_COMMAND_LINE);
            } else {
                assert_eq!(before, after);
            }
        }
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_rewrite_lines_normalizes_crlf() {
        let (out, replaced) = rewrite_lines(b"{\r\n  \"commandName\": \"X\"\r\n}\r\n");
        assert_eq!(replaced, 1);
        assert_eq!(
            out,
            format!("{{\n{}\n}}\n", CANONICAL_COMMAND_LINE).into_bytes()
        );
    }

    #[test]
    fn test_rewrite_lines_empty_input() {
        assert_eq!(rewrite_lines(b""), (Vec::new(), 0));
    }

    #[test]
    fn test_rewrite_lines_last_line_without_newline() {
        let (out, replaced) = rewrite_lines(b"{\n}");
        assert_eq!(replaced, 0);
        assert_eq!(out, b"{\n}\n".to_vec());
    }

    #[test]
    fn test_rewrite_lines_keeps_non_utf8_bytes() {
        let input = b"{\n  // caf\xe9\n  \"commandName\": \"X\"\n}\n";
        let (out, replaced) = rewrite_lines(input);
        assert_eq!(replaced, 1);

        let mut expected = b"{\n  // caf\xe9\n".to_vec();
        expected.extend_from_slice(CANONICAL_COMMAND_LINE.as_bytes());
        expected.extend_from_slice(b"\n}\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_rewrite_launch_settings_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = launch_settings_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{\n  // caf\xe9\n  \"commandName\": \"X\"\n}\n").unwrap();

        let rewrite = rewrite_launch_settings(dir.path(), LaunchSettingsMode::Line).unwrap();
        assert_eq!(rewrite.replaced, 1);

        let written = fs::read(&path).unwrap();
        assert!(written.starts_with(b"{\n  // caf\xe9\n"));
        assert_eq!(
            written.iter().filter(|b| **b == b'\n').count(),
            4
        );
    }

    #[test]
    fn test_structured_mode_rejects_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = launch_settings_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{\"a\": \"caf\xe9\"}").unwrap();

        let err = rewrite_launch_settings(dir.path(), LaunchSettingsMode::Structured).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Read);
    }

    #[test]
    fn test_rewrite_structured_keeps_order_and_commas_valid() {
        let (out, replaced) = rewrite_structured(SETTINGS).unwrap();
        assert_eq!(replaced, 1);

        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            doc["profiles"]["Windows Machine"]["commandName"],
            Value::String("Project".to_string())
        );
        let keys: Vec<&String> = doc["profiles"]["Windows Machine"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["commandName", "nativeDebugging"]);
    }

    #[test]
    fn test_rewrite_structured_last_member() {
        // Last member in its block: line mode would leave a dangling comma.
        let input = r#"{"profiles":{"App":{"dotnetRunMessages":true,"commandName":"MsixPackage"}}}"#;
        let (out, _) = rewrite_structured(input).unwrap();
        assert!(serde_json::from_str::<Value>(&out).is_ok());
        assert!(out.contains("\"commandName\": \"Project\""));
    }

    #[test]
    fn test_rewrite_structured_rejects_invalid_json() {
        assert!(rewrite_structured("{ not json").is_err());
    }

    #[test]
    fn test_launch_settings_path() {
        assert_eq!(
            launch_settings_path("/src/App"),
            PathBuf::from("/src/App/Properties/launchSettings.json")
        );
    }
}

//! Smoke tests for the `unpackager` binary.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks Condition="$([MSBuild]::IsOSPlatform('windows'))">$(TargetFrameworks);net8.0-windows10.0.19041.0</TargetFrameworks>
  </PropertyGroup>
</Project>
"#;

const LAUNCH_SETTINGS: &str = r#"{
  "profiles": {
    "Windows Machine": {
      "commandName": "MsixPackage"
    }
  }
}
"#;

fn write_project(dir: &Path, project: &str, with_settings: bool) {
    fs::write(dir.join("App.csproj"), project).unwrap();
    if with_settings {
        fs::create_dir_all(dir.join("Properties")).unwrap();
        fs::write(dir.join("Properties/launchSettings.json"), LAUNCH_SETTINGS).unwrap();
    }
}

fn unpackager(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_unpackager"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to spawn unpackager")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn test_usage_without_arguments() {
    let output = unpackager(&[]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Usage: unpackager <path-to-csproj>");
}

#[test]
fn test_usage_with_strict_exit_codes() {
    let output = unpackager(&["--strict-exit-codes"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_successful_run() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), PROJECT, true);
    let csproj = dir.path().join("App.csproj");

    let output = unpackager(&[csproj.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "MauiUnpackager completed successfully.");
    assert!(dir.path().join("unpackaged_app_publish.bat").exists());
}

#[test]
fn test_no_framework_exits_zero_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "<Project><PropertyGroup/></Project>", true);
    let csproj = dir.path().join("App.csproj");

    let output = unpackager(&[csproj.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "No valid TargetFramework found in the csproj file."
    );

    let output = unpackager(&["--strict-exit-codes", csproj.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(8));
}

#[test]
fn test_missing_settings_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), PROJECT, false);
    let csproj = dir.path().join("App.csproj");

    let output = unpackager(&[csproj.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Error reading launchSettings.json:"));
    assert!(!dir.path().join("unpackaged_app_publish.bat").exists());

    let output = unpackager(&["--strict-exit-codes", csproj.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_config_file_sets_exit_policy() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "<Project><PropertyGroup/></Project>", true);
    let csproj = dir.path().join("App.csproj");
    let options = dir.path().join("unpackager.json");
    fs::write(&options, r#"{ "exit_code_policy": "per_kind", "indent": 4 }"#).unwrap();

    let output = unpackager(&[
        "--config",
        options.to_str().unwrap(),
        csproj.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(8));
    assert!(fs::read_to_string(&csproj)
        .unwrap()
        .contains("\n        <WindowsPackageType>None</WindowsPackageType>\n"));
}

#[test]
fn test_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), PROJECT, true);
    let csproj = dir.path().join("App.csproj");
    let options = dir.path().join("unpackager.json");
    fs::write(&options, r#"{ "indent": 4 }"#).unwrap();

    let output = unpackager(&[
        "--config",
        options.to_str().unwrap(),
        "--indent",
        "2",
        csproj.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(fs::read_to_string(&csproj)
        .unwrap()
        .contains("\n    <WindowsPackageType>None</WindowsPackageType>\n  </PropertyGroup>"));
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let output = unpackager(&["--config", missing.to_str().unwrap(), "App.csproj"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Error reading nope.json:"));

    let output = unpackager(&[
        "--strict-exit-codes",
        "--config",
        missing.to_str().unwrap(),
        "App.csproj",
    ]);
    assert_eq!(output.status.code(), Some(5));
}

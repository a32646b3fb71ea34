//! `Properties/launchSettings.json` handling
//!
//! Switches every launch profile to `"commandName": "Project"` so the app
//! starts as a plain executable instead of an MSIX package.

mod settings;

pub use settings::*;

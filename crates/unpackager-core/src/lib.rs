//! # Unpackager Core Library
//!
//! Converts a packaged (MSIX) WinUI / .NET MAUI desktop project into an
//! unpackaged one.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! A run performs three edits, in order:
//! - adds `<WindowsPackageType>None</WindowsPackageType>` to every top-level
//!   `PropertyGroup` of the project file
//! - switches `commandName` in `Properties/launchSettings.json` to `Project`
//! - writes `unpackaged_app_publish.bat` with a `dotnet publish` command for
//!   the Windows target framework
//!
//! ## Example
//!
//! ```rust,no_run
//! use unpackager_core::prelude::*;
//!
//! let outcome = Unpackager::new(UnpackConfig::default()).run("MyApp/MyApp.csproj")?;
//! if let RunOutcome::Completed { script, .. } = outcome {
//!     println!("publish with {}", script.display());
//! }
//! # Ok::<(), UnpackError>(())
//! ```

pub mod config;
pub mod error;
pub mod launch;
pub mod pipeline;
pub mod project;
pub mod publish;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ExitCodePolicy, LaunchSettingsMode, UnpackConfig};
    pub use crate::error::{ErrorKind, UnpackError};
    pub use crate::pipeline::{RunOutcome, Unpackager};
    pub use crate::project::{ProjectDescriptor, TargetFramework};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

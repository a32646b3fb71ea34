//! MSBuild project file handling
//!
//! Loading and saving `.csproj` files, adding the unpackaged flag to
//! property groups and locating the Windows TargetFramework.

mod descriptor;
mod editor;
mod framework;

pub use descriptor::*;
pub use editor::*;
pub use framework::*;

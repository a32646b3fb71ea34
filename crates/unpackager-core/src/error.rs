//! Error types for the unpackaging run

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a project
#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("Usage: unpackager <path-to-csproj>")]
    Usage,

    #[error("Error reading {}: {message}", file_label(.path))]
    Parse { path: PathBuf, message: String },

    #[error("No <{expected}> element found in the csproj file.")]
    Structure { path: PathBuf, expected: String },

    #[error("Error reading {}: {} does not exist", file_label(.path), .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading {}: {source}", file_label(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing {}: {source}", file_label(.path))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of an [`UnpackError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing command line argument
    Usage,
    /// Malformed project descriptor or launch settings document
    Parse,
    /// Descriptor lacks the expected root element
    Structure,
    /// Launch settings file is absent
    NotFound,
    /// A file exists but could not be read
    Read,
    /// A file could not be (re)created
    Write,
}

impl UnpackError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnpackError::Usage => ErrorKind::Usage,
            UnpackError::Parse { .. } => ErrorKind::Parse,
            UnpackError::Structure { .. } => ErrorKind::Structure,
            UnpackError::NotFound { .. } => ErrorKind::NotFound,
            UnpackError::Read { .. } => ErrorKind::Read,
            UnpackError::Write { .. } => ErrorKind::Write,
        }
    }

    /// Path of the file involved, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            UnpackError::Usage => None,
            UnpackError::Parse { path, .. }
            | UnpackError::Structure { path, .. }
            | UnpackError::NotFound { path }
            | UnpackError::Read { path, .. }
            | UnpackError::Write { path, .. } => Some(path),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            UnpackError::NotFound { path }
        } else {
            UnpackError::Read { path, source }
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        UnpackError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Map a path to the name users know it by in messages.
///
/// Anything that is neither the batch file nor a named settings file is the
/// project file, whatever its extension (`.csproj`, `.fsproj`, in-memory).
fn file_label(path: &std::path::Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bat") => "batch file".to_string(),
        Some("json") => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        _ => "csproj file".to_string(),
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, UnpackError>;

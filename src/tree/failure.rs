//! Failures raised by tree checks.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A failed tree check.
///
/// The `Display` rendering is the human-readable description handed to the
/// test framework. [`Failure::actual`] and [`Failure::expected`] expose the
/// values the check compared.
#[derive(Debug, Error)]
pub enum Failure {
    /// A file that should exist under the root does not.
    #[error("has file: {}", path.display())]
    MissingFile {
        /// The resolved path that was missing.
        path: PathBuf,
    },

    /// A file that should not exist under the root does.
    #[error("does not have file: {}", path.display())]
    FilePresent {
        /// The resolved path that exists.
        path: PathBuf,
    },

    /// A regular file exists that no check has verified.
    #[error("contains no more files: found unexpected {}", path.display())]
    UnexpectedFile {
        /// Path of the unexpected file, relative to the root.
        path: PathBuf,
    },

    /// A file exists but its contents differ from the expectation.
    #[error("{} file content equals: expected {expected:?}, got {actual:?}", name.display())]
    ContentMismatch {
        /// The name the check was called with.
        name: PathBuf,
        /// Expected text.
        expected: String,
        /// Text decoded from the file.
        actual: String,
    },

    /// The entry exists but is not a symbolic link (or does not exist).
    #[error("{} is not a symlink", name.display())]
    NotASymlink {
        /// The name the check was called with.
        name: PathBuf,
    },

    /// The symbolic link resolves to a different file than expected.
    #[error(
        "{} does not point to expected target: expected {}, got {}",
        name.display(),
        expected.display(),
        actual.display()
    )]
    SymlinkTargetMismatch {
        /// The symlink name the check was called with.
        name: PathBuf,
        /// The expected target, relative to the root.
        expected: PathBuf,
        /// Where the link actually resolves, relative to its own directory.
        actual: PathBuf,
    },

    /// The filesystem could not be read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl Failure {
    /// The observed value, rendered as text.
    #[must_use]
    pub fn actual(&self) -> String {
        match self {
            Self::MissingFile { path }
            | Self::FilePresent { path }
            | Self::UnexpectedFile { path }
            | Self::Io { path, .. } => path.display().to_string(),
            Self::NotASymlink { name } => name.display().to_string(),
            Self::ContentMismatch { actual, .. } => actual.clone(),
            Self::SymlinkTargetMismatch { actual, .. } => actual.display().to_string(),
        }
    }

    /// The expected value, for checks that compare against one.
    #[must_use]
    pub fn expected(&self) -> Option<String> {
        match self {
            Self::ContentMismatch { expected, .. } => Some(expected.clone()),
            Self::SymlinkTargetMismatch { expected, .. } => Some(expected.display().to_string()),
            _ => None,
        }
    }

    /// The path the failure is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::MissingFile { path }
            | Self::FilePresent { path }
            | Self::UnexpectedFile { path }
            | Self::Io { path, .. } => path,
            Self::ContentMismatch { name, .. }
            | Self::NotASymlink { name }
            | Self::SymlinkTargetMismatch { name, .. } => name,
        }
    }
}

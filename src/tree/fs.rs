//! Read-only filesystem access used by tree checks.
//!
//! [`TreeFs`] is the seam between [`TreeAssertion`](super::TreeAssertion)
//! and the disk. [`OsFs`] reads the real filesystem.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// The filesystem queries a tree check needs. Nothing here writes.
pub trait TreeFs {
    /// Return `true` if `path` exists, following symbolic links. A dangling
    /// link does not exist.
    fn exists(&self, path: &Path) -> bool;

    /// Return `true` if `path` itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the target of the symbolic link at `path`, as stored.
    ///
    /// # Errors
    /// Returns an error if `path` is not a link or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Return `true` if `a` and `b` refer to the same underlying file.
    ///
    /// # Errors
    /// Returns an error if either path cannot be resolved.
    fn is_same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;

    /// Read the whole file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Every regular file under `root`, recursively, in a stable order.
    /// Symbolic links are not followed and are never reported.
    ///
    /// # Errors
    /// Returns an error if any directory under `root` cannot be read.
    fn regular_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// [`TreeFs`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl TreeFs for OsFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    #[cfg(unix)]
    fn is_same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        use std::os::unix::fs::MetadataExt as _;

        let a = std::fs::metadata(a)?;
        let b = std::fs::metadata(b)?;
        Ok(a.dev() == b.dev() && a.ino() == b.ino())
    }

    #[cfg(not(unix))]
    fn is_same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        Ok(std::fs::canonicalize(a)? == std::fs::canonicalize(b)?)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn regular_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

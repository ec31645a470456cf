//! Fluent assertions about the exact contents of a directory tree.
//!
//! ```no_run
//! use ferry_testing::tree::assert_that_path;
//!
//! # let workdir = std::path::Path::new("/tmp/workdir");
//! assert_that_path(workdir)
//!     .contains_files(["file1", "file2"])
//!     .contains_file("file3", "foo bar")
//!     .contains_no_more_files();
//! ```
//!
//! Every positive check adds the paths it verified to a whitelist. The
//! whitelist only grows. [`TreeAssertion::contains_no_more_files`] then fails
//! on the first regular file under the root that is not on it, which is how
//! a test states "exactly these files exist". Symbolic links are never
//! checked against the whitelist themselves; `contains_symlink` whitelists
//! the link's target instead.

pub mod failure;
pub mod fs;
pub mod reporter;

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

pub use failure::Failure;
pub use fs::{OsFs, TreeFs};
pub use reporter::{FailureReporter, PanicReporter, RecordingReporter};

/// Start a chain of checks against the tree rooted at `root`, reading the
/// real filesystem and panicking on the first failure.
#[must_use]
pub fn assert_that_path(root: impl Into<PathBuf>) -> TreeAssertion {
    TreeAssertion::new(root)
}

/// Assertions about the files under a fixed root directory.
///
/// Checks that fail hand a [`Failure`] to the configured reporter and stop;
/// whitelist entries added before the failure are kept.
pub struct TreeAssertion {
    root: PathBuf,
    whitelist: BTreeSet<PathBuf>,
    reporter: Box<dyn FailureReporter>,
    fs: Box<dyn TreeFs>,
}

impl std::fmt::Debug for TreeAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeAssertion")
            .field("root", &self.root)
            .field("whitelist", &self.whitelist)
            .finish_non_exhaustive()
    }
}

impl TreeAssertion {
    /// Create an assertion over `root` with [`PanicReporter`] and [`OsFs`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            whitelist: BTreeSet::new(),
            reporter: Box::new(PanicReporter),
            fs: Box::new(OsFs),
        }
    }

    /// Send failures to `reporter` instead of panicking.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Read the tree through `fs` instead of `std::fs`.
    #[must_use]
    pub fn with_fs(mut self, fs: impl TreeFs + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// The root every name is resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths verified so far, relative to the root.
    #[must_use]
    pub const fn whitelist(&self) -> &BTreeSet<PathBuf> {
        &self.whitelist
    }

    /// Check that every name exists under the root and whitelist it.
    pub fn contains_files<I>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        for name in names {
            if self.check_file(name.as_ref()).is_none() {
                break;
            }
        }
        self
    }

    /// Check that none of the names exist under the root.
    ///
    /// Prefer [`contains_file`](Self::contains_file) followed by
    /// [`contains_no_more_files`](Self::contains_no_more_files), which also
    /// catches files nobody thought to name.
    pub fn contains_no_files<I>(&self, names: I)
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        for name in names {
            let path = self.root.join(name.as_ref());
            debug!(root = %self.root.display(), path = %path.display(), check = "absent");
            if self.fs.exists(&path) {
                self.report(Failure::FilePresent { path });
                return;
            }
        }
    }

    /// Check that `name` exists and its contents, decoded as UTF-8, equal
    /// `contents` exactly.
    pub fn contains_file(&mut self, name: impl AsRef<Path>, contents: &str) -> &mut Self {
        let name = name.as_ref();
        let Some(path) = self.check_file(name) else {
            return self;
        };
        let bytes = match self.fs.read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                self.report(Failure::Io { path, source });
                return self;
            }
        };
        let actual = String::from_utf8_lossy(&bytes);
        if actual != contents {
            self.report(Failure::ContentMismatch {
                name: name.to_path_buf(),
                expected: contents.to_owned(),
                actual: actual.into_owned(),
            });
        }
        self
    }

    /// Check that `name` is a symbolic link that resolves, relative to its
    /// own directory, to the same file as `target`.
    ///
    /// `target` is whitelisted; the link itself is not, since
    /// [`contains_no_more_files`](Self::contains_no_more_files) never looks
    /// at links.
    pub fn contains_symlink(
        &mut self,
        name: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> &mut Self {
        let name = name.as_ref();
        let link_path = self.root.join(name);
        let Some(target_path) = self.check_file(target.as_ref()) else {
            return self;
        };

        debug!(root = %self.root.display(), path = %link_path.display(), check = "symlink");
        if !self.fs.is_symlink(&link_path) {
            self.report(Failure::NotASymlink {
                name: name.to_path_buf(),
            });
            return self;
        }
        let stored = match self.fs.read_link(&link_path) {
            Ok(stored) => stored,
            Err(source) => {
                self.report(Failure::Io {
                    path: link_path,
                    source,
                });
                return self;
            }
        };
        let resolved = link_path.parent().unwrap_or(self.root.as_path()).join(stored);
        // A dangling link cannot be the same file as an existing target.
        let same = self
            .fs
            .is_same_file(&resolved, &target_path)
            .unwrap_or(false);
        if !same {
            self.report(Failure::SymlinkTargetMismatch {
                name: name.to_path_buf(),
                expected: target.as_ref().to_path_buf(),
                actual: resolved,
            });
        }
        self
    }

    /// Check that every regular file under the root has been verified by an
    /// earlier check.
    pub fn contains_no_more_files(&mut self) -> &mut Self {
        debug!(
            root = %self.root.display(),
            whitelisted = self.whitelist.len(),
            check = "no-more-files"
        );
        let files = match self.fs.regular_files(&self.root) {
            Ok(files) => files,
            Err(source) => {
                self.report(Failure::Io {
                    path: self.root.clone(),
                    source,
                });
                return self;
            }
        };
        for file in files {
            let relative = relativize(&self.root, &file);
            if !self.whitelist.contains(&relative) {
                self.report(Failure::UnexpectedFile { path: relative });
                break;
            }
        }
        self
    }

    /// Resolve `name`, check it exists, and whitelist it. Returns the
    /// resolved path, or `None` after reporting a failure.
    fn check_file(&mut self, name: &Path) -> Option<PathBuf> {
        let path = self.root.join(name);
        debug!(root = %self.root.display(), path = %path.display(), check = "exists");
        if !self.fs.exists(&path) {
            self.report(Failure::MissingFile { path });
            return None;
        }
        self.whitelist.insert(relativize(&self.root, &path));
        Some(path)
    }

    fn report(&self, failure: Failure) {
        warn!(root = %self.root.display(), %failure, "tree check failed");
        self.reporter.fail(failure);
    }
}

/// `path` relative to `root`, with `.` dropped and `..` applied lexically.
///
/// A path outside `root` stays absolute, so it never equals an entry found
/// by walking the root.
fn relativize(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut out = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
            Component::CurDir => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

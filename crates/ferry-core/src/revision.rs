//! The [`Revision`] trait: what the pipeline needs to know about a single
//! point in an origin's history.
//!
//! Origin implementations (git, mercurial, folders, test doubles) each
//! provide their own revision type; downstream code programs against this
//! trait only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::RepoError;

/// A single revision of an origin.
///
/// # Object safety
///
/// This trait is object-safe. Callers may use `&dyn Revision`.
pub trait Revision {
    /// The revision identifier as a string (a SHA, a change number, ...).
    fn as_str(&self) -> &str;

    /// The instant the revision was created.
    ///
    /// Returns `Ok(None)` when the timestamp is unknown, for example
    /// because it has not been fetched yet.
    ///
    /// # Errors
    /// Returns an error if the backing repository cannot be read.
    fn read_timestamp(&self) -> Result<Option<DateTime<Utc>>, RepoError>;

    /// The label name used to record this revision in destination messages
    /// (e.g. `GitOrigin-RevId`). Identifies which kind of origin produced it.
    fn label_name(&self) -> &str;

    /// A reference that gives context to the revision, such as the branch
    /// name it was resolved from.
    fn context_reference(&self) -> Option<&str> {
        None
    }

    /// Labels attached to the reference itself rather than parsed out of the
    /// message (e.g. pull request metadata).
    fn associated_labels(&self) -> &BTreeMap<String, String>;
}

impl<R: Revision + ?Sized> Revision for &R {
    fn as_str(&self) -> &str {
        (**self).as_str()
    }

    fn read_timestamp(&self) -> Result<Option<DateTime<Utc>>, RepoError> {
        (**self).read_timestamp()
    }

    fn label_name(&self) -> &str {
        (**self).label_name()
    }

    fn context_reference(&self) -> Option<&str> {
        (**self).context_reference()
    }

    fn associated_labels(&self) -> &BTreeMap<String, String> {
        (**self).associated_labels()
    }
}

//! Error types for the ferry pipeline contracts.
//!
//! [`RepoError`] is returned by [`Revision`](crate::Revision) methods that
//! need to consult a backing repository. [`ChangeError`] is returned when a
//! revision cannot be projected into a [`Change`](crate::Change).

use thiserror::Error;

/// Errors returned by [`Revision`](crate::Revision) accessors.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The requested revision data does not exist in the backing store.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// An I/O error occurred while reading revision data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing repository returned an unclassified error.
    #[error("repository backend error: {message}")]
    BackendError {
        /// Freeform error description from the backend.
        message: String,
    },
}

/// Errors returned when building a [`Change`](crate::Change).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// The revision has no timestamp, so no zoned date time can be derived.
    #[error("revision `{reference}` has no timestamp; set one before converting it to a change")]
    MissingTimestamp {
        /// Identifier of the revision being converted.
        reference: String,
    },
}

//! Pipeline contracts for ferry.
//!
//! Every origin, transformation and destination in the migration pipeline
//! talks about history in terms of the types defined here. Nothing in this
//! crate knows about a concrete version-control backend.
//!
//! # Crate layout
//!
//! - [`revision`]: the [`Revision`] trait implemented by every origin's
//!   revision type.
//! - [`types`]: [`Author`] and [`Change`].
//! - [`authoring`]: the [`AuthoringPolicy`] trait and the standard
//!   [`Authoring`] implementation.
//! - [`labels`]: the `Name: value` label-line grammar.
//! - [`error`]: [`RepoError`] and [`ChangeError`].

pub mod authoring;
pub mod error;
pub mod labels;
pub mod revision;
pub mod types;

pub use authoring::{Authoring, AuthoringError, AuthoringMode, AuthoringPolicy};
pub use error::{ChangeError, RepoError};
pub use labels::{Label, LabelError, find_labels};
pub use revision::Revision;
pub use types::{Author, AuthorParseError, Change};

//! Test support for ferry migrations.
//!
//! Two independent helpers for exercising the migration pipeline without a
//! real repository backend:
//!
//! - [`tree`]: fluent assertions that a directory holds exactly the
//!   expected files ([`tree::assert_that_path`]).
//! - [`revision`]: [`RevisionRecord`], an immutable fake revision, and
//!   [`revision::to_change`] to project it through an authoring policy.
//!
//! [`config`] holds the defaults both read from `ferry-testing.toml`, and
//! [`telemetry`] wires `tracing` output for test binaries.

pub mod config;
pub mod revision;
pub mod telemetry;
pub mod tree;

pub use revision::{RevisionBuilder, RevisionError, RevisionRecord};
pub use tree::{Failure, TreeAssertion, assert_that_path};

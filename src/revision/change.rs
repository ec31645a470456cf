//! Projection of a [`RevisionRecord`] into a [`Change`].

use chrono::Local;
use ferry_core::{AuthoringPolicy, Change, ChangeError, Revision};
use tracing::debug;

use super::RevisionRecord;

/// Project `revision` into a [`Change`], applying `authoring` to pick the
/// effective author.
///
/// The timestamp is expressed in the process's local zone. Tests should
/// compare instants rather than rely on the zone.
///
/// # Errors
/// Returns [`ChangeError::MissingTimestamp`] if the revision has no
/// timestamp; call [`RevisionRecord::with_timestamp`] first.
pub fn to_change<P>(
    revision: &RevisionRecord,
    authoring: &P,
) -> Result<Change<RevisionRecord>, ChangeError>
where
    P: AuthoringPolicy + ?Sized,
{
    let timestamp = revision
        .timestamp()
        .ok_or_else(|| ChangeError::MissingTimestamp {
            reference: revision.as_str().to_owned(),
        })?;

    let author = authoring.resolve(revision.author());
    if author != *revision.author() {
        debug!(
            reference = revision.as_str(),
            original = %revision.author(),
            effective = %author,
            "authoring policy replaced author"
        );
    }

    Ok(Change::new(
        revision.clone(),
        author,
        revision.message().to_owned(),
        timestamp.with_timezone(&Local),
        revision.description_labels().clone(),
    ))
}

impl RevisionRecord {
    /// Shorthand for [`to_change`].
    ///
    /// # Errors
    /// Returns [`ChangeError::MissingTimestamp`] if no timestamp is set.
    pub fn to_change<P>(&self, authoring: &P) -> Result<Change<Self>, ChangeError>
    where
        P: AuthoringPolicy + ?Sized,
    {
        to_change(self, authoring)
    }
}

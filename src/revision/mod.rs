//! An in-memory [`Revision`] for driving pipeline tests without a
//! repository.
//!
//! [`RevisionRecord`] is immutable: every `with_*` method returns a new
//! record and leaves the receiver untouched. Labels declared in the message
//! body are parsed once, at construction, into
//! [`description_labels`](RevisionRecord::description_labels). A message
//! that declares the same label twice is rejected instead of letting one
//! declaration silently win.

mod change;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use ferry_core::labels::find_labels;
use ferry_core::{Author, RepoError, Revision};
use thiserror::Error;
use tracing::trace;

use crate::config::RevisionConfig;

pub use change::to_change;

/// Label name reported by every [`RevisionRecord`].
pub const LABEL_NAME: &str = "DummyOrigin-RevId";

/// Errors building a [`RevisionRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RevisionError {
    /// A required field was missing or empty.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The message declares the same label on two lines.
    #[error("label `{key}` declared twice in message (values {first:?} and {second:?})")]
    DuplicateLabelKey {
        /// The repeated label name.
        key: String,
        /// Value from the first declaration.
        first: String,
        /// Value from the second declaration.
        second: String,
    },
}

/// A fake revision with every field under the test's control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionRecord {
    reference: String,
    message: String,
    author: Author,
    base_path: PathBuf,
    timestamp: Option<DateTime<Utc>>,
    context_reference: Option<String>,
    reference_labels: BTreeMap<String, String>,
    matches_glob: bool,
    description_labels: BTreeMap<String, String>,
}

impl RevisionRecord {
    /// A revision with the default message, author and base path.
    ///
    /// # Errors
    /// Returns [`RevisionError::InvalidArgument`] if `reference` is empty.
    pub fn new(reference: impl Into<String>) -> Result<Self, RevisionError> {
        Self::builder(reference).build()
    }

    /// Like [`new`](Self::new), with defaults taken from `config`.
    ///
    /// # Errors
    /// Returns [`RevisionError::InvalidArgument`] if `reference` is empty.
    pub fn with_defaults(
        reference: impl Into<String>,
        config: &RevisionConfig,
    ) -> Result<Self, RevisionError> {
        RevisionBuilder::from_config(reference.into(), config).build()
    }

    /// Start building a revision with every field but `reference` defaulted.
    #[must_use]
    pub fn builder(reference: impl Into<String>) -> RevisionBuilder {
        RevisionBuilder::from_config(reference.into(), &RevisionConfig::default())
    }

    /// A copy of this revision with `timestamp` set.
    #[must_use]
    pub fn with_timestamp(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self.clone()
        }
    }

    /// A copy of this revision attributed to `author`.
    #[must_use]
    pub fn with_author(&self, author: Author) -> Self {
        Self {
            author,
            ..self.clone()
        }
    }

    /// A copy of this revision with a context reference. The value is
    /// stored as given; an empty string is still a present reference.
    #[must_use]
    pub fn with_context_reference(&self, context_reference: impl Into<String>) -> Self {
        Self {
            context_reference: Some(context_reference.into()),
            ..self.clone()
        }
    }

    /// A copy of this revision with a new message. Description labels are
    /// derived again from the new message.
    ///
    /// # Errors
    /// Returns [`RevisionError::DuplicateLabelKey`] if the message declares a
    /// label twice.
    pub fn with_message(&self, message: impl Into<String>) -> Result<Self, RevisionError> {
        let message = message.into();
        let description_labels = description_labels(&message)?;
        Ok(Self {
            message,
            description_labels,
            ..self.clone()
        })
    }

    /// A copy of this revision with `labels` attached to the reference.
    #[must_use]
    pub fn with_reference_labels(&self, labels: BTreeMap<String, String>) -> Self {
        Self {
            reference_labels: labels,
            ..self.clone()
        }
    }

    /// A copy of this revision with the glob-match flag set to `matches`.
    #[must_use]
    pub fn with_matches_glob(&self, matches: bool) -> Self {
        Self {
            matches_glob: matches,
            ..self.clone()
        }
    }

    /// A copy of this revision with a different base path.
    ///
    /// # Errors
    /// Returns [`RevisionError::InvalidArgument`] if `base_path` is empty.
    pub fn with_base_path(&self, base_path: impl Into<PathBuf>) -> Result<Self, RevisionError> {
        let base_path = base_path.into();
        require_non_empty_path(&base_path)?;
        Ok(Self {
            base_path,
            ..self.clone()
        })
    }

    /// The timestamp, if one was set.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// The author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// The full message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Directory the test materialized this revision's files in.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Labels parsed out of the message body.
    #[must_use]
    pub const fn description_labels(&self) -> &BTreeMap<String, String> {
        &self.description_labels
    }

    /// Whether this revision should be treated as matching the origin's
    /// path glob.
    #[must_use]
    pub const fn matches_glob(&self) -> bool {
        self.matches_glob
    }
}

impl Revision for RevisionRecord {
    fn as_str(&self) -> &str {
        &self.reference
    }

    fn read_timestamp(&self) -> Result<Option<DateTime<Utc>>, RepoError> {
        Ok(self.timestamp)
    }

    fn label_name(&self) -> &str {
        LABEL_NAME
    }

    fn context_reference(&self) -> Option<&str> {
        self.context_reference.as_deref()
    }

    fn associated_labels(&self) -> &BTreeMap<String, String> {
        &self.reference_labels
    }
}

// ---------------------------------------------------------------------------
// RevisionBuilder
// ---------------------------------------------------------------------------

/// Builder for [`RevisionRecord`]. Validation happens in
/// [`build`](Self::build).
#[derive(Clone, Debug)]
#[must_use]
pub struct RevisionBuilder {
    reference: String,
    message: String,
    author: Author,
    base_path: Option<PathBuf>,
    base_dir: PathBuf,
    timestamp: Option<DateTime<Utc>>,
    context_reference: Option<String>,
    reference_labels: BTreeMap<String, String>,
    matches_glob: bool,
}

impl RevisionBuilder {
    fn from_config(reference: String, config: &RevisionConfig) -> Self {
        Self {
            reference,
            message: config.message.clone(),
            author: config.author(),
            base_path: None,
            base_dir: config.base_dir.clone(),
            timestamp: None,
            context_reference: None,
            reference_labels: BTreeMap::new(),
            matches_glob: true,
        }
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the author.
    pub fn author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    /// Set the base path. Defaults to `<base_dir>/<reference>`, with the
    /// reference always appended below `base_dir` even when it starts with
    /// `/`.
    pub fn base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the context reference.
    pub fn context_reference(mut self, context_reference: impl Into<String>) -> Self {
        self.context_reference = Some(context_reference.into());
        self
    }

    /// Attach a label to the reference.
    pub fn reference_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.reference_labels.insert(key.into(), value.into());
        self
    }

    /// Replace every reference label.
    pub fn reference_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.reference_labels = labels;
        self
    }

    /// Set the glob-match flag. Defaults to `true`.
    pub fn matches_glob(mut self, matches: bool) -> Self {
        self.matches_glob = matches;
        self
    }

    /// Validate the fields and derive description labels.
    ///
    /// # Errors
    /// Returns [`RevisionError::InvalidArgument`] for an empty reference or
    /// base path, and
    /// [`RevisionError::DuplicateLabelKey`] if the message declares a label
    /// twice.
    pub fn build(self) -> Result<RevisionRecord, RevisionError> {
        require_non_empty("reference", &self.reference)?;
        let base_path = self
            .base_path
            .unwrap_or_else(|| default_base_path(&self.base_dir, &self.reference));
        require_non_empty_path(&base_path)?;
        let description_labels = description_labels(&self.message)?;

        Ok(RevisionRecord {
            reference: self.reference,
            message: self.message,
            author: self.author,
            base_path,
            timestamp: self.timestamp,
            context_reference: self.context_reference,
            reference_labels: self.reference_labels,
            matches_glob: self.matches_glob,
            description_labels,
        })
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), RevisionError> {
    if value.is_empty() {
        return Err(RevisionError::InvalidArgument {
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn require_non_empty_path(path: &Path) -> Result<(), RevisionError> {
    if path.as_os_str().is_empty() {
        return Err(RevisionError::InvalidArgument {
            field: "base_path",
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

/// `base_dir` with every component of `reference` appended. Root and prefix
/// components are skipped so `/x` lands at `base_dir/x`.
fn default_base_path(base_dir: &Path, reference: &str) -> PathBuf {
    let mut path = base_dir.to_path_buf();
    for component in Path::new(reference).components() {
        match component {
            Component::RootDir | Component::Prefix(_) => {}
            other => path.push(other),
        }
    }
    path
}

/// Collect the labels declared in `message`, rejecting repeated keys.
fn description_labels(message: &str) -> Result<BTreeMap<String, String>, RevisionError> {
    let mut labels = BTreeMap::new();
    for label in find_labels(message) {
        match labels.entry(label.name().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(label.value().to_owned());
            }
            Entry::Occupied(existing) => {
                return Err(RevisionError::DuplicateLabelKey {
                    key: existing.key().clone(),
                    first: existing.get().clone(),
                    second: label.value().to_owned(),
                });
            }
        }
    }
    trace!(count = labels.len(), "derived description labels");
    Ok(labels)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn instant(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    // -- Construction --

    #[test]
    fn new_uses_defaults() {
        let rev = RevisionRecord::new("r1").unwrap();
        assert_eq!(rev.as_str(), "r1");
        assert_eq!(rev.message(), "DummyReference message");
        assert_eq!(rev.author(), &Author::new("Dummy Author", "no-reply@dummy.com"));
        assert_eq!(rev.base_path(), Path::new("/DummyReference/r1"));
        assert_eq!(rev.timestamp(), None);
        assert_eq!(rev.context_reference(), None);
        assert!(rev.associated_labels().is_empty());
        assert!(rev.matches_glob());
        assert!(rev.description_labels().is_empty());
        assert_eq!(rev.label_name(), LABEL_NAME);
    }

    #[test]
    fn empty_reference_is_invalid() {
        let err = RevisionRecord::new("").unwrap_err();
        assert!(matches!(
            err,
            RevisionError::InvalidArgument {
                field: "reference",
                ..
            }
        ));
    }

    #[test]
    fn empty_base_path_is_invalid() {
        let err = RevisionRecord::builder("r1")
            .base_path("")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RevisionError::InvalidArgument {
                field: "base_path",
                ..
            }
        ));
    }

    #[test]
    fn defaults_follow_config() {
        let config = RevisionConfig {
            author_name: "Tess".to_owned(),
            author_email: "tess@example.com".to_owned(),
            message: "configured".to_owned(),
            base_dir: PathBuf::from("/fixtures"),
        };
        let rev = RevisionRecord::with_defaults("abc", &config).unwrap();
        assert_eq!(rev.author().email(), "tess@example.com");
        assert_eq!(rev.message(), "configured");
        assert_eq!(rev.base_path(), Path::new("/fixtures/abc"));
    }

    #[test]
    fn absolute_reference_is_appended_to_base_dir() {
        let rev = RevisionRecord::new("/abs/ref").unwrap();
        assert_eq!(rev.base_path(), Path::new("/DummyReference/abs/ref"));
        let nested = RevisionRecord::new("refs/heads/main").unwrap();
        assert_eq!(nested.base_path(), Path::new("/DummyReference/refs/heads/main"));
    }

    #[test]
    fn explicit_base_path_wins_over_default() {
        let rev = RevisionRecord::builder("/abs")
            .base_path("/custom")
            .build()
            .unwrap();
        assert_eq!(rev.base_path(), Path::new("/custom"));
    }

    // -- Label extraction --

    #[test]
    fn single_label_line_is_derived() {
        let rev = RevisionRecord::builder("r1")
            .message("Field: value")
            .build()
            .unwrap();
        assert_eq!(
            rev.description_labels(),
            &BTreeMap::from([("Field".to_owned(), "value".to_owned())])
        );
    }

    #[test]
    fn labels_come_from_every_line() {
        let rev = RevisionRecord::builder("r1")
            .message("Subject\n\nSome prose.\nBUG=42\nReviewed-by: alice\n")
            .build()
            .unwrap();
        assert_eq!(rev.description_labels().len(), 2);
        assert_eq!(rev.description_labels()["BUG"], "42");
        assert_eq!(rev.description_labels()["Reviewed-by"], "alice");
    }

    #[test]
    fn duplicate_label_key_fails_construction() {
        let err = RevisionRecord::builder("r1")
            .message("K: one\nK: two")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RevisionError::DuplicateLabelKey {
                key: "K".to_owned(),
                first: "one".to_owned(),
                second: "two".to_owned(),
            }
        );
    }

    #[test]
    fn duplicate_with_same_value_still_fails() {
        let err = RevisionRecord::builder("r1")
            .message("K: same\nK=same")
            .build()
            .unwrap_err();
        assert!(matches!(err, RevisionError::DuplicateLabelKey { .. }));
    }

    #[test]
    fn reference_labels_are_separate_from_description_labels() {
        let rev = RevisionRecord::builder("r1")
            .message("Field: from-message")
            .reference_label("pr", "17")
            .build()
            .unwrap();
        assert_eq!(rev.associated_labels().len(), 1);
        assert_eq!(rev.associated_labels()["pr"], "17");
        assert!(!rev.associated_labels().contains_key("Field"));
        assert!(!rev.description_labels().contains_key("pr"));
    }

    // -- Copy-with-override --

    #[test]
    fn with_timestamp_leaves_receiver_untouched() {
        let rev = RevisionRecord::new("r1").unwrap();
        let stamped = rev.with_timestamp(instant(1_000));
        assert_eq!(rev.timestamp(), None);
        assert_eq!(stamped.read_timestamp().unwrap(), Some(instant(1_000)));
        assert_eq!(stamped.with_timestamp(instant(2_000)).timestamp(), Some(instant(2_000)));
        assert_eq!(stamped.timestamp(), Some(instant(1_000)));
    }

    #[test]
    fn with_author_replaces_only_author() {
        let rev = RevisionRecord::new("r1").unwrap().with_timestamp(instant(5));
        let other = Author::new("Other", "other@example.com");
        let moved = rev.with_author(other.clone());
        assert_eq!(moved.author(), &other);
        assert_eq!(moved.with_author(rev.author().clone()), rev);
    }

    #[test]
    fn with_context_reference_sets_value() {
        let rev = RevisionRecord::new("r1").unwrap();
        let ctx = rev.with_context_reference("main");
        assert_eq!(ctx.context_reference(), Some("main"));
        assert_eq!(rev.context_reference(), None);
    }

    #[test]
    fn empty_context_reference_is_present() {
        let rev = RevisionRecord::new("r1").unwrap();
        assert_eq!(rev.with_context_reference("").context_reference(), Some(""));
        let built = RevisionRecord::builder("r1")
            .context_reference("")
            .build()
            .unwrap();
        assert_eq!(built.context_reference(), Some(""));
    }

    #[test]
    fn with_message_rederives_labels() {
        let rev = RevisionRecord::builder("r1")
            .message("Old: 1")
            .build()
            .unwrap();
        let updated = rev.with_message("New: 2").unwrap();
        assert_eq!(updated.description_labels()["New"], "2");
        assert!(!updated.description_labels().contains_key("Old"));
        assert!(rev.with_message("A: 1\nA: 2").is_err());
    }

    #[test]
    fn other_overrides() {
        let rev = RevisionRecord::new("r1").unwrap();
        assert!(!rev.with_matches_glob(false).matches_glob());
        let labeled =
            rev.with_reference_labels(BTreeMap::from([("k".to_owned(), "v".to_owned())]));
        assert_eq!(labeled.associated_labels()["k"], "v");
        assert_eq!(
            rev.with_base_path("/elsewhere").unwrap().base_path(),
            Path::new("/elsewhere")
        );
        assert!(rev.with_base_path("").is_err());
    }

    proptest! {
        #[test]
        fn with_timestamp_preserves_every_other_field(
            reference in "[a-z0-9]{1,12}",
            secs in 0i64..4_000_000_000,
            glob in any::<bool>(),
        ) {
            let rev = RevisionRecord::builder(reference)
                .matches_glob(glob)
                .context_reference("ctx")
                .build()
                .unwrap();
            let stamped = rev.with_timestamp(instant(secs));
            prop_assert_eq!(stamped.timestamp(), Some(instant(secs)));
            prop_assert_eq!(stamped.as_str(), rev.as_str());
            prop_assert_eq!(stamped.message(), rev.message());
            prop_assert_eq!(stamped.author(), rev.author());
            prop_assert_eq!(stamped.base_path(), rev.base_path());
            prop_assert_eq!(stamped.context_reference(), rev.context_reference());
            prop_assert_eq!(stamped.associated_labels(), rev.associated_labels());
            prop_assert_eq!(stamped.matches_glob(), rev.matches_glob());
            prop_assert_eq!(stamped.description_labels(), rev.description_labels());
        }

        #[test]
        fn distinct_label_keys_are_all_derived(
            keys in proptest::collection::btree_set("[A-Za-z][A-Za-z0-9-]{0,8}", 0..6),
        ) {
            let message: String = keys.iter().map(|k| format!("{k}: v-{k}\n")).collect();
            let rev = RevisionRecord::builder("r").message(message).build().unwrap();
            prop_assert_eq!(rev.description_labels().len(), keys.len());
            for key in &keys {
                prop_assert_eq!(&rev.description_labels()[key], &format!("v-{key}"));
            }
        }
    }
}

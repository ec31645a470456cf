//! Value types shared by every stage of the migration pipeline.
//!
//! [`Author`] identifies who wrote a change and [`Change`] is a revision
//! projected with the author and zoned timestamp the pipeline will use.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::revision::Revision;

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// The author of a change: a display name and an email address.
///
/// Equality is structural on both fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    /// Create an author from a display name and an email address.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Parse an author from the `Name <email>` form.
    ///
    /// # Errors
    /// Returns an error if the angle brackets are missing or the name is empty.
    pub fn parse(s: &str) -> Result<Self, AuthorParseError> {
        let err = |reason: &str| AuthorParseError {
            value: s.to_owned(),
            reason: reason.to_owned(),
        };
        let trimmed = s.trim();
        let Some(rest) = trimmed.strip_suffix('>') else {
            return Err(err("expected `Name <email>`, missing closing '>'"));
        };
        let Some((name, email)) = rest.split_once('<') else {
            return Err(err("expected `Name <email>`, missing opening '<'"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(err("author name must not be empty"));
        }
        if email.contains(['<', '>']) {
            return Err(err("email must not contain angle brackets"));
        }
        Ok(Self::new(name, email.trim()))
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl FromStr for Author {
    type Err = AuthorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error from parsing a string into an [`Author`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorParseError {
    /// The raw value that failed.
    pub value: String,
    /// Why it failed.
    pub reason: String,
}

impl fmt::Display for AuthorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid author {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for AuthorParseError {}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// A revision projected for consumption by the migration logic.
///
/// Carries the effective author (after the authoring policy has been
/// applied), the message, the timestamp in a concrete zone and the labels
/// parsed out of the message body.
#[derive(Clone, Debug)]
pub struct Change<R> {
    revision: R,
    author: Author,
    message: String,
    date_time: DateTime<Local>,
    labels: BTreeMap<String, String>,
}

impl<R: Revision> Change<R> {
    /// Assemble a change. No validation is performed; callers derive every
    /// field from `revision`.
    #[must_use]
    pub const fn new(
        revision: R,
        author: Author,
        message: String,
        date_time: DateTime<Local>,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            revision,
            author,
            message,
            date_time,
            labels,
        }
    }

    /// The revision this change was projected from.
    pub const fn revision(&self) -> &R {
        &self.revision
    }

    /// The effective author.
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// The full message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The first line of the message, without the trailing newline.
    #[must_use]
    pub fn first_line_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// The change timestamp in the zone it was projected into.
    pub const fn date_time(&self) -> &DateTime<Local> {
        &self.date_time
    }

    /// Labels parsed out of the message body.
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Value of the label `key`, if the message declared it.
    #[must_use]
    pub fn label_value(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Author --

    #[test]
    fn author_parse_roundtrip() {
        let author = Author::parse("Alice Liddell <alice@example.com>").unwrap();
        assert_eq!(author.name(), "Alice Liddell");
        assert_eq!(author.email(), "alice@example.com");
        assert_eq!(author.to_string(), "Alice Liddell <alice@example.com>");
    }

    #[test]
    fn author_parse_trims_whitespace() {
        let author: Author = "  Bob   < bob@example.com > ".parse().unwrap();
        assert_eq!(author, Author::new("Bob", "bob@example.com"));
    }

    #[test]
    fn author_parse_rejects_missing_brackets() {
        let err = Author::parse("Bob bob@example.com").unwrap_err();
        assert!(err.reason.contains("'>'"));
        let err = Author::parse("Bob bob@example.com>").unwrap_err();
        assert!(err.reason.contains("'<'"));
    }

    #[test]
    fn author_parse_rejects_empty_name() {
        let err = Author::parse("<bob@example.com>").unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn author_equality_is_structural() {
        assert_eq!(
            Author::new("A", "a@example.com"),
            Author::new("A", "a@example.com")
        );
        assert_ne!(
            Author::new("A", "a@example.com"),
            Author::new("A", "b@example.com")
        );
    }
}

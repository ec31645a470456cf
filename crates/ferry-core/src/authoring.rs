//! Authoring policy: whether a change keeps its original author or is
//! attributed to a default author in the destination.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::types::Author;

/// Decides the effective author of a change.
pub trait AuthoringPolicy {
    /// Return `true` if a change authored by `email` keeps its author.
    fn use_author(&self, email: &str) -> bool;

    /// The author used when [`use_author`](Self::use_author) returns `false`.
    fn default_author(&self) -> &Author;

    /// Pick the effective author for `author` under this policy.
    fn resolve(&self, author: &Author) -> Author {
        if self.use_author(author.email()) {
            author.clone()
        } else {
            self.default_author().clone()
        }
    }
}

/// How [`Authoring`] treats original authors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthoringMode {
    /// Keep every original author.
    #[default]
    PassThru,
    /// Replace every author with the default author.
    Overwrite,
    /// Keep authors whose email is on the allow-list; replace the rest.
    Allowed,
}

impl fmt::Display for AuthoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThru => write!(f, "pass-thru"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Allowed => write!(f, "allowed"),
        }
    }
}

/// Errors building an [`Authoring`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthoringError {
    /// `Allowed` mode was requested with nothing on the allow-list.
    #[error("authoring mode `allowed` requires at least one allowed author")]
    EmptyAllowList,

    /// An allow-list entry is neither an email nor a `*@domain` pattern.
    #[error("invalid allow-list entry `{entry}`: expected an email or `*@domain`")]
    InvalidEntry {
        /// The rejected entry.
        entry: String,
    },
}

/// The standard [`AuthoringPolicy`].
///
/// Allow-list entries are exact emails (`alice@example.com`) or domain
/// wildcards (`*@example.com`). Email comparison is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authoring {
    default_author: Author,
    mode: AuthoringMode,
    allowed: BTreeSet<String>,
}

impl Authoring {
    /// Keep every original author.
    #[must_use]
    pub const fn pass_thru(default_author: Author) -> Self {
        Self {
            default_author,
            mode: AuthoringMode::PassThru,
            allowed: BTreeSet::new(),
        }
    }

    /// Attribute every change to `default_author`.
    #[must_use]
    pub const fn overwrite(default_author: Author) -> Self {
        Self {
            default_author,
            mode: AuthoringMode::Overwrite,
            allowed: BTreeSet::new(),
        }
    }

    /// Keep only authors on the allow-list.
    ///
    /// # Errors
    /// Returns an error if `allowed` is empty or contains an entry that is
    /// neither an email nor a `*@domain` pattern.
    pub fn allowed<I, S>(default_author: Author, allowed: I) -> Result<Self, AuthoringError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for entry in allowed {
            let entry = entry.as_ref().trim();
            let Some((local, domain)) = entry.split_once('@') else {
                return Err(AuthoringError::InvalidEntry {
                    entry: entry.to_owned(),
                });
            };
            if local.is_empty() || domain.is_empty() || domain.contains('@') {
                return Err(AuthoringError::InvalidEntry {
                    entry: entry.to_owned(),
                });
            }
            set.insert(entry.to_ascii_lowercase());
        }
        if set.is_empty() {
            return Err(AuthoringError::EmptyAllowList);
        }
        Ok(Self {
            default_author,
            mode: AuthoringMode::Allowed,
            allowed: set,
        })
    }

    /// The mode this policy was built with.
    #[must_use]
    pub const fn mode(&self) -> AuthoringMode {
        self.mode
    }

    /// The allow-list entries, lowercased. Empty unless the mode is
    /// [`AuthoringMode::Allowed`].
    #[must_use]
    pub const fn allowed_entries(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    fn is_allowed(&self, email: &str) -> bool {
        let email = email.to_ascii_lowercase();
        if self.allowed.contains(&email) {
            return true;
        }
        email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| self.allowed.contains(&format!("*@{domain}")))
    }
}

impl AuthoringPolicy for Authoring {
    fn use_author(&self, email: &str) -> bool {
        match self.mode {
            AuthoringMode::PassThru => true,
            AuthoringMode::Overwrite => false,
            AuthoringMode::Allowed => self.is_allowed(email),
        }
    }

    fn default_author(&self) -> &Author {
        &self.default_author
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Test-support configuration (`ferry-testing.toml`).
//!
//! Defines the defaults used for fake revisions and the authoring policy
//! tests project them through.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use ferry_core::{Author, Authoring, AuthoringMode};
use serde::Deserialize;

/// File name looked up by [`TestingConfig::load_from_dir`].
pub const CONFIG_FILE: &str = "ferry-testing.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level test-support configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestingConfig {
    /// Defaults for [`RevisionRecord`](crate::revision::RevisionRecord).
    #[serde(default)]
    pub revision: RevisionConfig,

    /// Authoring policy used when projecting revisions into changes.
    #[serde(default)]
    pub authoring: AuthoringConfig,
}

// ---------------------------------------------------------------------------
// RevisionConfig
// ---------------------------------------------------------------------------

/// Defaults for fake revisions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevisionConfig {
    /// Display name of the default author.
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Email of the default author.
    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Message used when none is given.
    #[serde(default = "default_message")]
    pub message: String,

    /// Directory under which `<reference>` forms the default base path.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
            message: default_message(),
            base_dir: default_base_dir(),
        }
    }
}

impl RevisionConfig {
    /// The configured default author.
    #[must_use]
    pub fn author(&self) -> Author {
        Author::new(&self.author_name, &self.author_email)
    }
}

fn default_author_name() -> String {
    "Dummy Author".to_owned()
}

fn default_author_email() -> String {
    "no-reply@dummy.com".to_owned()
}

fn default_message() -> String {
    "DummyReference message".to_owned()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("/DummyReference")
}

// ---------------------------------------------------------------------------
// AuthoringConfig
// ---------------------------------------------------------------------------

/// Authoring policy settings.
///
/// ```toml
/// [authoring]
/// mode = "allowed"
/// default_author = "Copy Bot <copy-bot@example.com>"
/// allowed = ["*@example.com"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthoringConfig {
    /// How original authors are treated.
    #[serde(default)]
    pub mode: AuthoringModeSetting,

    /// Author used when the original one is not kept, as `Name <email>`.
    #[serde(default = "default_policy_author")]
    pub default_author: String,

    /// Emails or `*@domain` patterns kept in `allowed` mode.
    #[serde(default)]
    pub allowed: Vec<String>,
}

impl Default for AuthoringConfig {
    fn default() -> Self {
        Self {
            mode: AuthoringModeSetting::default(),
            default_author: default_policy_author(),
            allowed: Vec::new(),
        }
    }
}

fn default_policy_author() -> String {
    "Copy Bot <copy-bot@example.com>".to_owned()
}

/// Authoring mode as written in the config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthoringModeSetting {
    /// Keep every author.
    #[default]
    PassThru,
    /// Replace every author.
    Overwrite,
    /// Keep allow-listed authors.
    Allowed,
}

impl From<AuthoringModeSetting> for AuthoringMode {
    fn from(setting: AuthoringModeSetting) -> Self {
        match setting {
            AuthoringModeSetting::PassThru => Self::PassThru,
            AuthoringModeSetting::Overwrite => Self::Overwrite,
            AuthoringModeSetting::Allowed => Self::Allowed,
        }
    }
}

impl AuthoringConfig {
    /// Build the authoring policy these settings describe.
    ///
    /// # Errors
    /// Returns `ConfigError` if `default_author` is not `Name <email>`, or
    /// if `allowed` mode has an empty or malformed allow-list.
    pub fn to_authoring(&self) -> Result<Authoring, ConfigError> {
        let default_author = Author::parse(&self.default_author).map_err(|e| ConfigError {
            path: None,
            message: format!("authoring.default_author: {e}"),
        })?;
        match AuthoringMode::from(self.mode) {
            AuthoringMode::PassThru => Ok(Authoring::pass_thru(default_author)),
            AuthoringMode::Overwrite => Ok(Authoring::overwrite(default_author)),
            AuthoringMode::Allowed => {
                Authoring::allowed(default_author, &self.allowed).map_err(|e| ConfigError {
                    path: None,
                    message: format!("authoring.allowed: {e}"),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A `ferry-testing.toml` that could not be read or understood.
#[derive(Debug)]
pub struct ConfigError {
    /// File the error came from. `None` for [`TestingConfig::parse`].
    pub path: Option<PathBuf>,
    /// What was wrong, prefixed with `line N:` for syntax and schema errors.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "bad test config {}: {}", path.display(), self.message),
            None => write!(f, "bad test config: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TestingConfig {
    /// Read and parse the TOML file at `path`. An absent file yields
    /// [`TestingConfig::default`].
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file exists but cannot be read, is
    /// not valid TOML, or names a field this crate does not know.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let at_path = |message: String| ConfigError {
            path: Some(path.to_owned()),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map_err(|err| at_path(err.message)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(at_path(format!("unreadable: {err}"))),
        }
    }

    /// Load [`CONFIG_FILE`] from `dir`.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed TOML or unknown fields.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| {
            let message = match err.span() {
                Some(span) => format!("line {}: {}", line_at(text, span.start), err.message()),
                None => err.message().to_owned(),
            };
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

/// 1-based line number of byte `offset` in `text`.
fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::AuthoringPolicy;

    #[test]
    fn defaults_all_fields() {
        let cfg = TestingConfig::default();
        assert_eq!(cfg.revision.author_name, "Dummy Author");
        assert_eq!(cfg.revision.author_email, "no-reply@dummy.com");
        assert_eq!(cfg.revision.message, "DummyReference message");
        assert_eq!(cfg.revision.base_dir, PathBuf::from("/DummyReference"));
        assert_eq!(cfg.authoring.mode, AuthoringModeSetting::PassThru);
        assert!(cfg.authoring.allowed.is_empty());
    }

    #[test]
    fn parse_empty_string() {
        let cfg = TestingConfig::parse("").unwrap();
        assert_eq!(cfg, TestingConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[revision]
author_name = "Fixture"
author_email = "fixture@example.com"
message = "fixture message"
base_dir = "/fixtures"

[authoring]
mode = "allowed"
default_author = "Bot <bot@example.org>"
allowed = ["*@example.com"]
"#;
        let cfg = TestingConfig::parse(toml).unwrap();
        assert_eq!(cfg.revision.author(), Author::new("Fixture", "fixture@example.com"));
        assert_eq!(cfg.revision.message, "fixture message");
        assert_eq!(cfg.revision.base_dir, PathBuf::from("/fixtures"));
        assert_eq!(cfg.authoring.mode, AuthoringModeSetting::Allowed);

        let authoring = cfg.authoring.to_authoring().unwrap();
        assert!(authoring.use_author("someone@example.com"));
        assert!(!authoring.use_author("someone@elsewhere.com"));
        assert_eq!(authoring.default_author().email(), "bot@example.org");
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let cfg = TestingConfig::parse("[revision]\nmessage = \"m\"\n").unwrap();
        assert_eq!(cfg.revision.message, "m");
        assert_eq!(cfg.revision.author_name, "Dummy Author");
        assert_eq!(cfg.authoring, AuthoringConfig::default());
    }

    #[test]
    fn all_authoring_modes_parse() {
        for (input, expected) in [
            ("pass-thru", AuthoringModeSetting::PassThru),
            ("overwrite", AuthoringModeSetting::Overwrite),
            ("allowed", AuthoringModeSetting::Allowed),
        ] {
            let toml = format!("[authoring]\nmode = \"{input}\"");
            let cfg = TestingConfig::parse(&toml).unwrap();
            assert_eq!(cfg.authoring.mode, expected, "variant: {input}");
        }
    }

    #[test]
    fn parse_rejects_unknown_field() {
        let err = TestingConfig::parse("[revision]\nextra = 1\n").unwrap_err();
        assert!(
            err.message.contains("unknown field"),
            "error should mention unknown field: {}",
            err.message
        );
    }

    #[test]
    fn parse_includes_line_number_on_error() {
        let err = TestingConfig::parse("[revision]\n\nmessage = 42\n").unwrap_err();
        assert!(err.message.contains("line 3"), "{}", err.message);
    }

    #[test]
    fn overwrite_mode_builds_overwrite_policy() {
        let cfg = TestingConfig::parse("[authoring]\nmode = \"overwrite\"\n").unwrap();
        let authoring = cfg.authoring.to_authoring().unwrap();
        assert_eq!(authoring.mode(), AuthoringMode::Overwrite);
    }

    #[test]
    fn allowed_mode_without_entries_is_an_error() {
        let cfg = TestingConfig::parse("[authoring]\nmode = \"allowed\"\n").unwrap();
        let err = cfg.authoring.to_authoring().unwrap_err();
        assert!(err.message.starts_with("authoring.allowed"));
    }

    #[test]
    fn bad_default_author_is_an_error() {
        let cfg =
            TestingConfig::parse("[authoring]\ndefault_author = \"no brackets\"\n").unwrap();
        let err = cfg.authoring.to_authoring().unwrap_err();
        assert!(err.to_string().contains("authoring.default_author"));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = TestingConfig::load(Path::new("/nonexistent/ferry-testing.toml")).unwrap();
        assert_eq!(cfg, TestingConfig::default());
    }

    #[test]
    fn load_from_dir_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[revision]\nbase_dir = \"/x\"\n",
        )
        .unwrap();
        let cfg = TestingConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg.revision.base_dir, PathBuf::from("/x"));
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not toml [[[").unwrap();
        let err = TestingConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn load_unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TestingConfig::load(dir.path()).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(dir.path()));
        assert!(err.message.starts_with("unreadable"), "{}", err.message);
        assert!(err.to_string().starts_with("bad test config"));
    }

    #[test]
    fn line_at_counts_from_one() {
        assert_eq!(line_at("abc", 0), 1);
        assert_eq!(line_at("a\nb\nc", 4), 3);
        assert_eq!(line_at("a\n", 99), 2);
    }
}

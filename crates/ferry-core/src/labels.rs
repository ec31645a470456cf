//! Label lines: `Name: value` / `Name=value` pairs embedded in change
//! messages.
//!
//! A line is a label when it matches `^([\w-]+)( *[:=] ?)(.*)$`, where `\w`
//! is ASCII `[A-Za-z0-9_]`. Lines that look like URLs (`scheme://...`) are
//! never labels even though they would otherwise match.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Separator used by [`Label::new`].
pub const DEFAULT_SEPARATOR: &str = ": ";

// `[[:word:]]` is ASCII-only, unlike `\w` in the regex crate.
static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([[:word:]-]+)( *[:=] ?)(.*)$").expect("label regex is valid")
});

static URL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:word:]-]+://").expect("url regex is valid"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *[:=] ?$").expect("separator regex is valid"));

/// A single `name<separator>value` label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    name: String,
    separator: String,
    value: String,
}

impl Label {
    /// Create a label rendered with the default `": "` separator.
    ///
    /// # Errors
    /// Returns an error if `name` is empty or has characters outside
    /// `[A-Za-z0-9_-]`.
    pub fn new(name: &str, value: impl Into<String>) -> Result<Self, LabelError> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            value: value.into(),
        })
    }

    /// Create a label rendered with an explicit separator such as `"="` or
    /// `" : "`.
    ///
    /// # Errors
    /// Returns an error if `name` is invalid or `separator` is not a run of
    /// spaces followed by `:` or `=` and at most one more space.
    pub fn with_separator(
        name: &str,
        value: impl Into<String>,
        separator: &str,
    ) -> Result<Self, LabelError> {
        validate_name(name)?;
        if !SEPARATOR.is_match(separator) {
            return Err(LabelError {
                value: separator.to_owned(),
                reason: "separators must be `:` or `=`, optionally padded with spaces".to_owned(),
            });
        }
        Ok(Self {
            name: name.to_owned(),
            separator: separator.to_owned(),
            value: value.into(),
        })
    }

    /// Parse a single line. Returns `None` when the line is not a label.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        if URL_LINE.is_match(line) {
            return None;
        }
        let caps = LABEL_LINE.captures(line)?;
        Some(Self {
            name: caps[1].to_owned(),
            separator: caps[2].to_owned(),
            value: caps[3].to_owned(),
        })
    }

    /// The label name (the key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label value. May be empty.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The separator exactly as written, including surrounding spaces.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.separator, self.value)
    }
}

/// Iterate over the labels declared in `message`, one line at a time, in
/// the order they appear.
pub fn find_labels(message: &str) -> impl Iterator<Item = Label> + '_ {
    message.lines().filter_map(Label::parse_line)
}

/// Return `true` if `name` is a valid label name.
#[must_use]
pub fn is_valid_label_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn validate_name(name: &str) -> Result<(), LabelError> {
    if is_valid_label_name(name) {
        Ok(())
    } else {
        Err(LabelError {
            value: name.to_owned(),
            reason: "label names must be non-empty and only contain [A-Za-z0-9_-]".to_owned(),
        })
    }
}

/// Error from validating a [`Label`] name or separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelError {
    /// The rejected name or separator.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid label part {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for LabelError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

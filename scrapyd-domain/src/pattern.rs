//! Shell-style name patterns used to filter projects and spiders.

use std::fmt;

use glob::MatchOptions;
use serde::{Deserialize, Serialize};

/// Errors raised while building a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pattern '{pattern}': {message}")]
pub struct PatternError {
    /// The pattern as given
    pub pattern: String,
    /// Why it was rejected
    pub message: String,
}

/// A validated glob pattern (`*`, `?`, `[seq]`, `[!seq]`).
///
/// Matching is case-sensitive and `*` also matches `/`, as names are not paths.
/// A `[` without a closing `]` matches itself, so `foo[` only matches `foo[`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    /// `None` matches everything
    compiled: Option<glob::Pattern>,
}

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    /// Returns `PatternError` if glob rejects the pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        // Runs of '*' mean the same as one; glob reserves '**' for paths.
        let mut collapsed = String::with_capacity(pattern.len());
        for c in pattern.chars() {
            if c == '*' && collapsed.ends_with('*') {
                continue;
            }
            collapsed.push(c);
        }

        if collapsed == "*" {
            return Ok(Self {
                source: pattern.to_string(),
                compiled: None,
            });
        }

        let escaped = escape_open_brackets(&collapsed);
        let compiled = glob::Pattern::new(&escaped).map_err(|e| PatternError {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            compiled: Some(compiled),
        })
    }

    /// Pattern matching every name.
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            compiled: None,
        }
    }

    /// Pattern text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if `name` matches.
    pub fn matches(&self, name: &str) -> bool {
        self.compiled
            .as_ref()
            .map_or(true, |compiled| compiled.matches_with(name, OPTIONS))
    }

    /// Keep the names that match, in their original order.
    pub fn filter<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(Into::into)
            .filter(|name| self.matches(name))
            .collect()
    }
}

/// Escape every `[` that does not start a complete `[...]` class.
///
/// A class needs at least one character after `[` or `[!`; a leading `]`
/// is part of the class.
fn escape_open_brackets(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut escaped = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '[' {
            escaped.push(chars[i]);
            i += 1;
            continue;
        }

        let mut j = i + 1;
        if chars.get(j) == Some(&'!') {
            j += 1;
        }
        if chars.get(j) == Some(&']') {
            j += 1;
        }
        match chars[j.min(chars.len())..].iter().position(|c| *c == ']') {
            Some(offset) => {
                let end = j + offset;
                escaped.extend(&chars[i..=end]);
                i = end + 1;
            }
            None => {
                escaped.push_str("[[]");
                i += 1;
            }
        }
    }
    escaped
}

impl Default for Pattern {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

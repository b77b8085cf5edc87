//! Keyword search patterns.
//!
//! Keyword search is a case-insensitive match against a single text field.
//! The keyword becomes a regular expression handed to the store. In
//! [`SearchMode::Literal`] every metacharacter is escaped, so `a.b` only
//! matches the text `a.b`. [`SearchMode::Pattern`] passes the keyword through
//! untouched, which lets callers send arbitrary expressions to the store and
//! should only be enabled for trusted clients.

use core::fmt;
use core::str::FromStr;

use regex::{Regex, RegexBuilder};

/// Error returned when parsing an unknown search mode.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search mode `{0}` (expected `literal` or `pattern`)")]
pub struct SearchModeError(String);

/// How a raw keyword is turned into a store pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Escape metacharacters: plain substring search.
    #[default]
    Literal,
    /// Use the keyword as a regular expression fragment.
    Pattern,
}

impl SearchMode {
    /// Configuration value for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Pattern => "pattern",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "pattern" => Ok(Self::Pattern),
            _ => Err(SearchModeError(s.to_string())),
        }
    }
}

/// A case-insensitive search pattern built from a user-supplied keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPattern {
    source: String,
}

impl KeywordPattern {
    /// Build the pattern for `keyword` under `mode`.
    #[must_use]
    pub fn new(keyword: &str, mode: SearchMode) -> Self {
        let source = match mode {
            SearchMode::Literal => regex::escape(keyword),
            SearchMode::Pattern => keyword.to_string(),
        };
        Self { source }
    }

    /// The regular expression source, without case-insensitivity flags.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compile into a case-insensitive [`Regex`].
    ///
    /// # Errors
    ///
    /// Returns the `regex` error when a [`SearchMode::Pattern`] keyword is not
    /// a valid expression. Literal patterns always compile.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.source).case_insensitive(true).build()
    }
}

impl fmt::Display for KeywordPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_parse() {
        assert_eq!("literal".parse::<SearchMode>(), Ok(SearchMode::Literal));
        assert_eq!(" Pattern ".parse::<SearchMode>(), Ok(SearchMode::Pattern));
        assert!("regex".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::default(), SearchMode::Literal);
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let pattern = KeywordPattern::new("a.b", SearchMode::Literal);
        let re = pattern.compile().unwrap();

        assert!(re.is_match("xx A.B yy"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_literal_never_fails_to_compile() {
        let pattern = KeywordPattern::new("(unclosed[", SearchMode::Literal);
        let re = pattern.compile().unwrap();
        assert!(re.is_match("an (unclosed[ bracket"));
    }

    #[test]
    fn test_pattern_mode_passes_expression_through() {
        let pattern = KeywordPattern::new("^ro.d", SearchMode::Pattern);
        assert_eq!(pattern.as_str(), "^ro.d");

        let re = pattern.compile().unwrap();
        assert!(re.is_match("Road bike"));
        assert!(!re.is_match("a road bike"));
    }

    #[test]
    fn test_pattern_mode_reports_invalid_expression() {
        let pattern = KeywordPattern::new("(unclosed", SearchMode::Pattern);
        assert!(pattern.compile().is_err());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let re = KeywordPattern::new("BIKE", SearchMode::Literal)
            .compile()
            .unwrap();
        assert!(re.is_match("road bike"));
    }
}

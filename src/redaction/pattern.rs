//! Redaction patterns applied to string leaves

use super::REDACTED;
use crate::core::error::RedactionError;
use regex::Regex;
use serde::Deserialize;

/// A rule that masks matching text inside string values
///
/// Deserializes from `{"literal": "..."}` or `{"regex": "..."}`.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::RedactPattern;
///
/// let patterns = vec![
///     RedactPattern::literal("internal-host.local"),
///     RedactPattern::regex(r"\b\d{16}\b"),
/// ];
/// assert_eq!(patterns.len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactPattern {
    /// Exact substring
    Literal(String),
    /// Regular-expression source, compiled when the redactor is built
    Regex(String),
    /// Pre-compiled regular expression
    #[serde(skip)]
    Compiled(Regex),
}

impl RedactPattern {
    pub fn literal(text: impl Into<String>) -> Self {
        RedactPattern::Literal(text.into())
    }

    pub fn regex(source: impl Into<String>) -> Self {
        RedactPattern::Regex(source.into())
    }

    /// Compile into a matcher; regex sources may fail here
    pub(crate) fn compile(&self) -> Result<Matcher, RedactionError> {
        match self {
            RedactPattern::Literal(text) => Ok(Matcher::Literal(text.clone())),
            RedactPattern::Regex(source) => Regex::new(source)
                .map(Matcher::Regex)
                .map_err(|e| RedactionError::invalid_pattern(source.clone(), e.to_string())),
            RedactPattern::Compiled(re) => Ok(Matcher::Regex(re.clone())),
        }
    }
}

impl From<&str> for RedactPattern {
    fn from(text: &str) -> Self {
        RedactPattern::Literal(text.to_string())
    }
}

impl From<String> for RedactPattern {
    fn from(text: String) -> Self {
        RedactPattern::Literal(text)
    }
}

impl From<Regex> for RedactPattern {
    fn from(re: Regex) -> Self {
        RedactPattern::Compiled(re)
    }
}

/// Compiled form of a [`RedactPattern`]
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl Matcher {
    pub(crate) fn replace_all(&self, input: &str) -> String {
        match self {
            // An empty needle would match between every character
            Matcher::Literal(text) if text.is_empty() => input.to_string(),
            Matcher::Literal(text) => input.replace(text.as_str(), REDACTED),
            Matcher::Regex(re) => re.replace_all(input, REDACTED).into_owned(),
        }
    }
}

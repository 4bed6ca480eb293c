//! Path exclusion rules

use crate::algorithm::Decoded;
use regex::Regex;
use std::fmt;
use zipgate_core::{Error, Result};

/// How an `excludedPaths` entry interprets its `path` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpressionKind {
    /// Case-insensitive exact match
    #[default]
    String,
    /// Regular expression, matched against the raw path
    Regex,
}

impl ExpressionKind {
    /// Decode a case-insensitive keyword (`string`, `regex`)
    pub fn decode(s: &str) -> Decoded<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Decoded::Value(Self::String),
            "regex" => Decoded::Value(Self::Regex),
            _ => Decoded::Unrecognized,
        }
    }

    /// Resolve the `type` attribute of a path entry.
    ///
    /// Absent or empty selects [`ExpressionKind::String`]; anything else
    /// that is not a known keyword is a configuration error.
    pub fn from_attribute(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::String),
            Some(kind) => Self::decode(kind)
                .value()
                .ok_or_else(|| Error::UnknownExpressionType(kind.to_string())),
        }
    }

    /// Configuration keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single path exclusion
#[derive(Debug, Clone)]
pub enum PathRule {
    /// Lower-cased exact path
    Literal(String),
    /// Compiled pattern
    Pattern(Regex),
}

impl PathRule {
    /// `raw` is the request path, `lowered` its lower-cased form
    fn matches(&self, raw: &str, lowered: &str) -> bool {
        match self {
            PathRule::Literal(literal) => literal == lowered,
            PathRule::Pattern(pattern) => pattern.is_match(raw),
        }
    }

    /// Stored text (lower-cased literal or pattern source)
    pub fn as_str(&self) -> &str {
        match self {
            PathRule::Literal(literal) => literal,
            PathRule::Pattern(pattern) => pattern.as_str(),
        }
    }

    /// Expression kind of this rule
    pub fn kind(&self) -> ExpressionKind {
        match self {
            PathRule::Literal(_) => ExpressionKind::String,
            PathRule::Pattern(_) => ExpressionKind::Regex,
        }
    }
}

/// Ordered path exclusions.
///
/// Literals behave as a set: they are lower-cased on insertion and never
/// duplicated. Patterns keep insertion order, which is their evaluation
/// order, and may repeat.
#[derive(Debug, Clone, Default)]
pub struct PathRules {
    rules: Vec<PathRule>,
}

impl PathRules {
    /// Create an empty rule list
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a literal unless an equal one is present
    pub fn add_literal(&mut self, path: &str) {
        let lowered = path.to_lowercase();
        if self.literal_position(&lowered).is_none() {
            self.rules.push(PathRule::Literal(lowered));
        }
    }

    /// Remove a literal. Returns whether it was present.
    pub fn remove_literal(&mut self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        match self.literal_position(&lowered) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    /// Compile and append a pattern
    pub fn add_pattern(&mut self, source: &str) -> Result<()> {
        let pattern = compile(source)?;
        self.rules.push(PathRule::Pattern(pattern));
        Ok(())
    }

    /// Remove the first pattern whose source text equals `source`.
    ///
    /// The source must still compile. Returns whether a pattern was removed.
    pub fn remove_pattern(&mut self, source: &str) -> Result<bool> {
        let pattern = compile(source)?;
        let position = self.rules.iter().position(|rule| {
            matches!(rule, PathRule::Pattern(existing) if existing.as_str() == pattern.as_str())
        });

        Ok(match position {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        })
    }

    /// Whether `path` is a literal or matches any pattern
    pub fn is_excluded(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        self.rules.iter().any(|rule| rule.matches(path, &lowered))
    }

    /// Whether `path` is stored as a literal
    pub fn contains_literal(&self, path: &str) -> bool {
        self.literal_position(&path.to_lowercase()).is_some()
    }

    /// All rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PathRule> {
        self.rules.iter()
    }

    /// Stored literals in insertion order
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|rule| match rule {
            PathRule::Literal(literal) => Some(literal.as_str()),
            PathRule::Pattern(_) => None,
        })
    }

    /// Pattern sources in evaluation order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|rule| match rule {
            PathRule::Pattern(pattern) => Some(pattern.as_str()),
            PathRule::Literal(_) => None,
        })
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn literal_position(&self, lowered: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| matches!(rule, PathRule::Literal(literal) if literal == lowered))
    }
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| Error::invalid_pattern(source, e))
}

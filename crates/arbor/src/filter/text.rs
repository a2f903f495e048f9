//! Text filters built from raw filter strings.
//!
//! A [`TextFilter`] matches anywhere inside the text a node exposes through
//! [`FilterText`]. The pattern is interpreted as a fixed string, a wildcard
//! expression (`*`, `?`, `[...]`) or a regular expression.

use std::borrow::Cow;

use arbor_core::logging::targets;
use arbor_core::{Predicate, PredicateError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the filter text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternSyntax {
    /// Literal substring match.
    #[default]
    #[serde(rename = "fixed")]
    FixedString,
    /// Shell-style wildcards: `*` matches any run, `?` any single character.
    #[serde(rename = "wildcard")]
    Wildcard,
    /// Regular expression (`regex` crate syntax).
    #[serde(rename = "regex")]
    RegExp,
}

/// Controls how matching handles letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// "Foo" does not match "foo".
    CaseSensitive,
    /// "Foo" matches "foo".
    #[default]
    CaseInsensitive,
}

impl CaseSensitivity {
    /// Maps a `case_sensitive` flag to a sensitivity.
    pub fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            Self::CaseSensitive
        } else {
            Self::CaseInsensitive
        }
    }
}

/// The text a node offers to text filters.
pub trait FilterText {
    /// Returns the searchable text for this node.
    fn filter_text(&self) -> Cow<'_, str>;
}

impl FilterText for String {
    fn filter_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl FilterText for str {
    fn filter_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl FilterText for &str {
    fn filter_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// A predicate matching node text against a pattern.
///
/// An empty pattern accepts everything.
///
/// # Example
///
/// ```
/// use arbor::filter::{CaseSensitivity, PatternSyntax, TextFilter};
///
/// let filter = TextFilter::new("sh0*0", PatternSyntax::Wildcard, CaseSensitivity::CaseInsensitive)
///     .unwrap();
/// assert!(filter.is_match("SH010_comp"));
/// assert!(!filter.is_match("sq01"));
/// ```
#[derive(Debug, Clone)]
pub struct TextFilter {
    pattern: String,
    syntax: PatternSyntax,
    case_sensitivity: CaseSensitivity,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Everything,
    /// Fixed strings never go through the regex engine, so any pattern
    /// length is accepted. `needle` is already lowercased when folding.
    Substring { needle: String, fold_case: bool },
    Regex(Regex),
}

impl Matcher {
    fn substring(pattern: &str, case_sensitivity: CaseSensitivity) -> Self {
        let fold_case = case_sensitivity == CaseSensitivity::CaseInsensitive;
        let needle = if fold_case {
            pattern.to_lowercase()
        } else {
            pattern.to_string()
        };
        Self::Substring { needle, fold_case }
    }

    fn compile(pattern: &str, source: &str, case_sensitivity: CaseSensitivity) -> Result<Self> {
        RegexBuilder::new(source)
            .case_insensitive(case_sensitivity == CaseSensitivity::CaseInsensitive)
            .build()
            .map(Self::Regex)
            .map_err(|e| Error::invalid_pattern(pattern, e))
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Substring {
                needle,
                fold_case: true,
            } => text.to_lowercase().contains(needle.as_str()),
            Self::Substring { needle, .. } => text.contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}

impl TextFilter {
    /// Compiles `pattern` with the given syntax and case sensitivity.
    ///
    /// Fails with [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn new(
        pattern: impl Into<String>,
        syntax: PatternSyntax,
        case_sensitivity: CaseSensitivity,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = match syntax {
            _ if pattern.is_empty() => Matcher::Everything,
            PatternSyntax::FixedString => Matcher::substring(&pattern, case_sensitivity),
            PatternSyntax::Wildcard => {
                Matcher::compile(&pattern, &wildcard_to_regex(&pattern), case_sensitivity)?
            }
            PatternSyntax::RegExp => Matcher::compile(&pattern, &pattern, case_sensitivity)?,
        };

        tracing::debug!(
            target: targets::FILTER,
            pattern = %pattern,
            ?syntax,
            ?case_sensitivity,
            "compiled text filter"
        );

        Ok(Self {
            pattern,
            syntax,
            case_sensitivity,
            matcher,
        })
    }

    /// A case-insensitive substring filter. Never fails.
    pub fn fixed(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let matcher = if pattern.is_empty() {
            Matcher::Everything
        } else {
            Matcher::substring(&pattern, CaseSensitivity::CaseInsensitive)
        };
        Self {
            pattern,
            syntax: PatternSyntax::FixedString,
            case_sensitivity: CaseSensitivity::CaseInsensitive,
            matcher,
        }
    }

    /// The raw pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// How the pattern is interpreted.
    pub fn syntax(&self) -> PatternSyntax {
        self.syntax
    }

    /// The case sensitivity of the match.
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    /// Returns a copy with a different pattern, keeping syntax and case.
    pub fn with_pattern(&self, pattern: impl Into<String>) -> Result<Self> {
        Self::new(pattern, self.syntax, self.case_sensitivity)
    }

    /// Returns a copy with a different syntax.
    pub fn with_syntax(&self, syntax: PatternSyntax) -> Result<Self> {
        Self::new(self.pattern.clone(), syntax, self.case_sensitivity)
    }

    /// Returns a copy with a different case sensitivity.
    pub fn with_case_sensitivity(&self, case_sensitivity: CaseSensitivity) -> Result<Self> {
        Self::new(self.pattern.clone(), self.syntax, case_sensitivity)
    }

    /// Returns `true` if the filter accepts everything.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Returns `true` if `text` contains a match.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

impl<T: FilterText + ?Sized> Predicate<T> for TextFilter {
    fn accepts(&self, data: &T) -> std::result::Result<bool, PredicateError> {
        Ok(self.is_match(&data.filter_text()))
    }
}

/// Converts a wildcard pattern to an unanchored regular expression.
///
/// A `[` without a non-empty class after it is a literal bracket.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                regex.push_str(".*");
                i += 1;
            }
            '?' => {
                regex.push('.');
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut regex, &chars[i + 1..end]);
                    i = end + 1;
                }
                None => {
                    regex.push_str(r"\[");
                    i += 1;
                }
            },
            c => {
                let mut buf = [0u8; 4];
                regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    regex
}

/// Index of the `]` closing the class opened at `open`.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut body = open + 1;
    if matches!(chars.get(body), Some('!' | '^')) {
        body += 1;
    }
    let close = body + chars.get(body..)?.iter().position(|&c| c == ']')?;
    (close > body).then_some(close)
}

/// Emits a character class. Members are `c` or `a-z` ranges; everything
/// else the regex engine would read as class syntax is escaped.
fn push_class(regex: &mut String, class: &[char]) {
    let (negated, body) = match class.split_first() {
        Some((&('!' | '^'), rest)) => (true, rest),
        _ => (false, class),
    };

    regex.push('[');
    if negated {
        regex.push('^');
    }

    let mut j = 0;
    while j < body.len() {
        push_class_member(regex, body[j]);
        if body.get(j + 1) == Some(&'-') && j + 2 < body.len() {
            regex.push('-');
            push_class_member(regex, body[j + 2]);
            j += 3;
        } else {
            j += 1;
        }
    }

    regex.push(']');
}

fn push_class_member(regex: &mut String, c: char) {
    if matches!(c, '\\' | '^' | '[' | ']' | '&' | '~' | '-') {
        regex.push('\\');
    }
    regex.push(c);
}

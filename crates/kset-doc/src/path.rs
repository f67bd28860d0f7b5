//! Field paths for addressing nodes within YAML documents
//!
//! Provides [`FieldPath`] for hierarchical addressing of mapping keys and
//! sequence elements.

use std::fmt::{self, Display, Formatter, Write};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathSegment {
    /// Key segment
    #[inline]
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Key text, if this is a key segment
    #[inline]
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }
}

/// Path within a document tree
///
/// Written in dot/bracket notation:
/// - `spec.replicas` → `[Key(spec), Key(replicas)]`
/// - `spec.containers[1].image` → `[Key(spec), Key(containers), Index(1), Key(image)]`
/// - `metadata.labels["app.kubernetes.io/name"]` → a key containing dots
///
/// Two paths address "the same field" iff their segments are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Append a key segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Key(key.into()));
        new
    }

    /// Append an index segment, returning new path
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Index(index));
        new
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if needs_brackets(key) => {
                    f.write_str("[\"")?;
                    for c in key.chars() {
                        if matches!(c, '"' | '\\') {
                            f.write_char('\\')?;
                        }
                        f.write_char(c)?;
                    }
                    f.write_str("\"]")?;
                }
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']'])
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut rest = s;
        let mut after_dot = false;
        loop {
            match rest.strip_prefix('[') {
                // `a.[0]` is rejected: a dot is always followed by a plain key
                Some(inner) if !after_dot => {
                    let (segment, tail) = bracket(inner)?;
                    segments.push(segment);
                    rest = tail;
                }
                _ => {
                    let end = rest.find(['.', '[', ']']).unwrap_or(rest.len());
                    if end == 0 {
                        return Err(PathError::EmptySegment);
                    }
                    segments.push(PathSegment::Key(rest[..end].to_string()));
                    rest = &rest[end..];
                }
            }

            if rest.is_empty() {
                break;
            }
            if let Some(tail) = rest.strip_prefix('.') {
                rest = tail;
                after_dot = true;
            } else if rest.starts_with('[') {
                after_dot = false;
            } else {
                return Err(PathError::InvalidSegment(rest.to_string()));
            }
        }

        Ok(Self(segments))
    }
}

/// Parse a bracket segment; `inner` follows the opening `[`
///
/// `[3]` is an index, `["a.b"]` a key with `\"` and `\\` escapes.
fn bracket(inner: &str) -> Result<(PathSegment, &str), PathError> {
    let invalid = || PathError::InvalidSegment(format!("[{inner}"));

    if let Some(quoted) = inner.strip_prefix('"') {
        let mut key = String::new();
        let mut chars = quoted.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => break,
                },
                '"' => {
                    let tail = quoted[i + 1..].strip_prefix(']').ok_or_else(invalid)?;
                    return Ok((PathSegment::Key(key), tail));
                }
                _ => key.push(c),
            }
        }
        return Err(invalid());
    }

    let close = inner.find(']').ok_or_else(invalid)?;
    let digits = &inner[..close];
    let index = digits
        .parse::<usize>()
        .map_err(|_| PathError::InvalidIndex(digits.to_string()))?;
    Ok((PathSegment::Index(index), &inner[close + 1..]))
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

/// Errors related to field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path string is empty
    #[error("field path is empty")]
    Empty,

    /// Empty segment in path
    #[error("field path contains empty segment")]
    EmptySegment,

    /// Malformed segment
    #[error("invalid field path segment: {0}")]
    InvalidSegment(String),

    /// Non-numeric sequence index
    #[error("invalid sequence index: [{0}]")]
    InvalidIndex(String),
}

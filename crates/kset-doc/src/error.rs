//! Error types for the document layer

use crate::layout::LocateFailure;
use crate::path::{FieldPath, PathError};

/// Errors while loading or editing documents
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// A document is not valid YAML
    #[error("failed to parse document {index}: {source}")]
    Parse {
        /// Document index within its set
        index: usize,
        /// Parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// Content on the `---` line itself
    #[error("document {index} starts with content on its `---` line {line}, which cannot be edited in place")]
    InlineDocumentStart {
        /// Document index within its set
        index: usize,
        /// 1-based line number in the source
        line: usize,
    },

    /// Malformed field path
    #[error(transparent)]
    Path(#[from] PathError),

    /// A node has no editable source line
    #[error("cannot locate `{path}` in document {index}: {reason}")]
    Unlocatable {
        /// Document index within its set
        index: usize,
        /// Requested path
        path: String,
        /// Why the walk stopped
        reason: &'static str,
    },

    /// A comment edit would change the parsed content
    #[error("cannot mark `{path}` in document {index}: its value spans lines the marker would break")]
    ContentChanged {
        /// Document index within its set
        index: usize,
        /// Requested path
        path: String,
    },
}

impl DocError {
    /// Create unlocatable error for `path`
    #[must_use]
    pub fn unlocatable(index: usize, path: &FieldPath, failure: LocateFailure) -> Self {
        let reason = match failure {
            LocateFailure::Root => "path addresses the document root",
            LocateFailure::Missing => "no such node",
            LocateFailure::NotBlock => "node is inside a scalar or flow collection",
        };
        Self::Unlocatable {
            index,
            path: path.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocatable_display() {
        let path: FieldPath = "spec.list[0]".parse().unwrap();
        let err = DocError::unlocatable(2, &path, LocateFailure::NotBlock);
        assert_eq!(
            err.to_string(),
            "cannot locate `spec.list[0]` in document 2: node is inside a scalar or flow collection"
        );
    }

    #[test]
    fn path_error_is_transparent() {
        let err: DocError = PathError::EmptySegment.into();
        assert_eq!(err.to_string(), "field path contains empty segment");
    }
}

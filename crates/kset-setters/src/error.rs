//! Error types for setter creation
//!
//! Every variant is terminal for one invocation: the pipeline returns before
//! anything is persisted.

use kset_doc::{DocError, PathError};
use std::fmt;

/// Shape of the values compared by the consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Single scalar
    Scalar,
    /// Ordered sequence of scalars
    Array,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => Ok(()),
            Self::Array => f.write_str("array "),
        }
    }
}

/// Main setter error type
#[derive(Debug, thiserror::Error)]
pub enum SetterError {
    /// No document contains the requested field
    #[error("could not find {target} in any document")]
    FieldNotFound {
        /// Human description of what was searched for
        target: String,
    },

    /// A literal value matched several distinct field paths
    #[error("value `{value}` was found at multiple field paths ({}), set the field flag to pick one", .paths.join(", "))]
    AmbiguousField {
        /// Searched value
        value: String,
        /// Distinct matching paths, in discovery order
        paths: Vec<String>,
    },

    /// Array setters need an explicit field path
    #[error("field flag must be set for array type setters")]
    FieldPathRequiredForCollection,

    /// Occurrences of the field disagree
    #[error("setters can only be created for fields with same values, encountered different {shape}values for specified field path: {found}, {baseline}")]
    InconsistentValues {
        /// Scalar or array comparison
        shape: ValueShape,
        /// The diverging value
        found: String,
        /// The value established first
        baseline: String,
    },

    /// A substitution already uses the name
    #[error("substitution with name {name} already exists, substitution and setter can't have same name")]
    NameCollision {
        /// Requested setter name
        name: String,
    },

    /// An input document failed to parse
    #[error(transparent)]
    MalformedInput(#[from] DocError),

    /// Setter name is empty or contains whitespace
    #[error("invalid setter name `{0}`: must be non-empty and contain no whitespace")]
    InvalidName(String),

    /// Scalar setter without value and without field path
    #[error("a value is required for scalar setters when no field path is given")]
    MissingValue,

    /// Field path flag could not be parsed
    #[error("invalid field path: {0}")]
    InvalidFieldPath(#[from] PathError),

    /// The field does not hold the kind of value the setter type needs
    #[error("field `{path}` in document {document} is not a {expected}")]
    FieldTypeMismatch {
        /// Field path
        path: String,
        /// Document index
        document: usize,
        /// Expected node kind
        expected: &'static str,
    },

    /// A resolved field has no editable source line
    #[error("cannot annotate field: {0}")]
    UnsupportedLayout(#[source] DocError),

    /// Constraint fragment is not a mapping of constraint keys
    #[error("invalid constraint fragment: {0}")]
    InvalidConstraints(String),

    /// Registry document has an unusable shape
    #[error("invalid registry document: {0}")]
    InvalidRegistry(String),
}

impl SetterError {
    /// Create inconsistent-values error
    pub fn inconsistent(shape: ValueShape, found: impl Into<String>, baseline: impl Into<String>) -> Self {
        Self::InconsistentValues {
            shape,
            found: found.into(),
            baseline: baseline.into(),
        }
    }

    /// Create field-not-found error for a target description
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::FieldNotFound {
            target: target.into(),
        }
    }
}

/// Result type alias for setter operations
pub type SetterResult<T> = Result<T, SetterError>;

//! Core types for setter creation
//!
//! Defines the operation parameters and the values flowing between
//! pipeline stages:
//! - Setter names, types and values
//! - Resolved field occurrences
//! - The create request

use crate::error::SetterError;
use crate::schema::ConstraintFragment;
use kset_doc::FieldPath;
use std::fmt;
use std::str::FromStr;

/// Name of a setter
///
/// Unique across setters and substitutions in one registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetterName(String);

impl SetterName {
    /// Validate and wrap a name
    ///
    /// # Errors
    /// Returns `SetterError::InvalidName` for empty names or names with whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, SetterError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(SetterError::InvalidName(name));
        }
        Ok(Self(name))
    }

    /// Name as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SetterName {
    type Err = SetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SetterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Declared setter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetterType {
    /// Single scalar field
    #[default]
    Scalar,
    /// Field holding a sequence of scalars
    Array,
}

impl SetterType {
    /// Map an OpenAPI type name onto a setter type
    ///
    /// `array` selects [`SetterType::Array`]; every other type name
    /// (`string`, `integer`, `boolean`, ...) is a scalar.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("array") {
            Self::Array
        } else {
            Self::Scalar
        }
    }
}

/// Canonical value registered for a setter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetterValue {
    /// Scalar text
    Scalar(String),
    /// Ordered scalar elements
    List(Vec<String>),
}

impl SetterValue {
    /// Scalar text, or the empty string for lists
    #[must_use]
    pub fn scalar(&self) -> &str {
        match self {
            Self::Scalar(value) => value,
            Self::List(_) => "",
        }
    }

    /// Elements, for lists
    #[must_use]
    pub fn list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(values) => Some(values),
        }
    }
}

impl fmt::Display for SetterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::List(values) => write!(f, "[{}]", values.join(" ")),
        }
    }
}

/// One occurrence of the target field
///
/// Holds an index into its `DocumentSet` and the path; the node is located
/// again when annotating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedField {
    /// Document index within the set
    pub document: usize,
    /// Path of the field within that document
    pub path: FieldPath,
}

impl fmt::Display for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.document)
    }
}

/// Parameters of one create-setter invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSetterRequest {
    /// Setter name
    pub name: SetterName,
    /// Literal value to match (scalar setters without a field path)
    pub value: Option<String>,
    /// Explicit field path
    pub field: Option<FieldPath>,
    /// Description written to the registry
    pub description: String,
    /// Provenance written to the registry
    pub set_by: String,
    /// Declared type
    pub setter_type: SetterType,
    /// Externally supplied schema constraints
    pub constraints: Option<ConstraintFragment>,
}

impl CreateSetterRequest {
    /// Create request for `name` with no other parameters
    #[inline]
    #[must_use]
    pub fn new(name: SetterName) -> Self {
        Self {
            name,
            value: None,
            field: None,
            description: String::new(),
            set_by: String::new(),
            setter_type: SetterType::Scalar,
            constraints: None,
        }
    }

    /// With literal value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// With explicit field path
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: FieldPath) -> Self {
        self.field = Some(field);
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With provenance
    #[inline]
    #[must_use]
    pub fn with_set_by(mut self, set_by: impl Into<String>) -> Self {
        self.set_by = set_by.into();
        self
    }

    /// With setter type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, setter_type: SetterType) -> Self {
        self.setter_type = setter_type;
        self
    }

    /// With constraint fragment
    #[inline]
    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintFragment) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setter_name_validation() {
        assert!(SetterName::new("replicas").is_ok());
        assert!(SetterName::new("my-image").is_ok());
        assert!(matches!(SetterName::new(""), Err(SetterError::InvalidName(_))));
        assert!(matches!(SetterName::new("two words"), Err(SetterError::InvalidName(_))));
    }

    #[test]
    fn setter_type_from_name() {
        assert_eq!(SetterType::from_type_name("array"), SetterType::Array);
        assert_eq!(SetterType::from_type_name("Array"), SetterType::Array);
        assert_eq!(SetterType::from_type_name("integer"), SetterType::Scalar);
        assert_eq!(SetterType::from_type_name("string"), SetterType::Scalar);
    }

    #[test]
    fn setter_value_forms() {
        let scalar = SetterValue::Scalar("3".into());
        assert_eq!(scalar.scalar(), "3");
        assert_eq!(scalar.list(), None);
        assert_eq!(scalar.to_string(), "3");

        let list = SetterValue::List(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(list.scalar(), "");
        assert_eq!(list.list().map(<[String]>::len), Some(3));
        assert_eq!(list.to_string(), "[a b c]");
    }

    #[test]
    fn request_builder() {
        let request = CreateSetterRequest::new(SetterName::new("list").unwrap())
            .with_field("spec.list".parse().unwrap())
            .with_type(SetterType::Array)
            .with_description("hello world")
            .with_set_by("me");
        assert_eq!(request.setter_type, SetterType::Array);
        assert_eq!(request.field.as_ref().map(ToString::to_string).as_deref(), Some("spec.list"));
        assert!(request.value.is_none());
        assert_eq!(request.set_by, "me");
    }
}

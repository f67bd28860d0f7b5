//! Consistency validation
//!
//! All occurrences of a setter's field must hold the same value; the first
//! one observed becomes the canonical value.

use crate::error::{SetterError, ValueShape};
use crate::types::{ResolvedField, SetterType, SetterValue};
use kset_doc::{scalar_text, untag, DocumentSet};
use serde_yaml::Value;

/// Compute the canonical value of the resolved fields
///
/// For scalar setters a supplied `literal` must equal the field value.
/// Array setters ignore `literal`.
///
/// # Errors
/// - `InconsistentValues` on the first occurrence that differs from the baseline
/// - `FieldTypeMismatch` if a field is not the kind `setter_type` needs
pub fn validate(
    documents: &DocumentSet,
    resolved: &[ResolvedField],
    setter_type: SetterType,
    literal: Option<&str>,
) -> Result<SetterValue, SetterError> {
    match setter_type {
        SetterType::Scalar => {
            let value = common_value(documents, resolved, ValueShape::Scalar, scalar_of)?;
            if let Some(literal) = literal {
                if literal != value {
                    return Err(SetterError::inconsistent(ValueShape::Scalar, value, literal));
                }
            }
            Ok(SetterValue::Scalar(value))
        }
        SetterType::Array => {
            if literal.is_some() {
                tracing::debug!("ignoring literal value for array setter");
            }
            common_value(documents, resolved, ValueShape::Array, elements_of).map(SetterValue::List)
        }
    }
}

fn common_value<T, F>(
    documents: &DocumentSet,
    resolved: &[ResolvedField],
    shape: ValueShape,
    extract: F,
) -> Result<T, SetterError>
where
    T: PartialEq + Clone,
    F: Fn(&Value, &ResolvedField) -> Result<T, SetterError>,
    Rendered<T>: std::fmt::Display,
{
    let mut baseline: Option<T> = None;

    for field in resolved {
        let node = documents
            .get(field.document)
            .and_then(|doc| doc.get(&field.path))
            .ok_or_else(|| SetterError::not_found(format!("field `{}`", field.path)))?;
        let current = extract(node, field)?;

        match &baseline {
            None => baseline = Some(current),
            Some(first) if *first != current => {
                return Err(SetterError::inconsistent(
                    shape,
                    Rendered(current).to_string(),
                    Rendered(first.clone()).to_string(),
                ));
            }
            Some(_) => {}
        }
    }

    baseline.ok_or_else(|| SetterError::not_found("any occurrence of the field"))
}

/// Message form of a compared value: scalars verbatim, lists as `[a b c]`
struct Rendered<T>(T);

impl std::fmt::Display for Rendered<String> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for Rendered<Vec<String>> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(" "))
    }
}

fn scalar_of(node: &Value, field: &ResolvedField) -> Result<String, SetterError> {
    scalar_text(node).ok_or_else(|| mismatch(field, "scalar"))
}

fn elements_of(node: &Value, field: &ResolvedField) -> Result<Vec<String>, SetterError> {
    let Value::Sequence(items) = untag(node) else {
        return Err(mismatch(field, "sequence"));
    };
    items
        .iter()
        .map(|item| scalar_text(item).ok_or_else(|| mismatch(field, "sequence of scalars")))
        .collect()
}

fn mismatch(field: &ResolvedField, expected: &'static str) -> SetterError {
    SetterError::FieldTypeMismatch {
        path: field.path.to_string(),
        document: field.document,
        expected,
    }
}

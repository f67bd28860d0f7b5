//! Field resolution
//!
//! Finds every occurrence of the target field across a document set, either
//! by explicit path or by searching for a literal scalar value.

use crate::error::SetterError;
use crate::types::{ResolvedField, SetterType};
use kset_doc::{scalar_text, value, DocumentSet, FieldPath};

/// Locate the fields a setter applies to
///
/// - With `field`: every document containing the full path contributes one
///   occurrence; documents without it are skipped.
/// - Without `field` (scalar setters only): every scalar leaf equal to
///   `literal` matches, and all matches must share one path.
///
/// Documents are scanned in order; the result is in scan order.
///
/// # Errors
/// - `FieldPathRequiredForCollection` for array setters without `field`
/// - `MissingValue` for scalar setters with neither `field` nor `literal`
/// - `FieldNotFound` if nothing matches
/// - `AmbiguousField` if a literal matches at several distinct paths
pub fn resolve(
    documents: &DocumentSet,
    field: Option<&FieldPath>,
    literal: Option<&str>,
    setter_type: SetterType,
) -> Result<Vec<ResolvedField>, SetterError> {
    let resolved = match (field, setter_type) {
        (None, SetterType::Array) => return Err(SetterError::FieldPathRequiredForCollection),
        (Some(path), _) => resolve_path(documents, path)?,
        (None, SetterType::Scalar) => {
            let literal = literal.ok_or(SetterError::MissingValue)?;
            resolve_literal(documents, literal)?
        }
    };

    for field in &resolved {
        tracing::debug!(document = field.document, path = %field.path, "resolved field");
    }
    Ok(resolved)
}

fn resolve_path(documents: &DocumentSet, path: &FieldPath) -> Result<Vec<ResolvedField>, SetterError> {
    let resolved: Vec<_> = documents
        .iter()
        .filter(|doc| doc.get(path).is_some())
        .map(|doc| ResolvedField {
            document: doc.index(),
            path: path.clone(),
        })
        .collect();

    if resolved.is_empty() {
        return Err(SetterError::not_found(format!("field `{path}`")));
    }
    Ok(resolved)
}

fn resolve_literal(documents: &DocumentSet, literal: &str) -> Result<Vec<ResolvedField>, SetterError> {
    let mut resolved = Vec::new();
    let mut distinct: Vec<&FieldPath> = Vec::new();

    for doc in documents.iter() {
        for (path, leaf) in value::leaves(doc.value()) {
            if scalar_text(leaf).as_deref() == Some(literal) {
                resolved.push(ResolvedField {
                    document: doc.index(),
                    path,
                });
            }
        }
    }

    for field in &resolved {
        if !distinct.contains(&&field.path) {
            distinct.push(&field.path);
        }
    }

    match distinct.len() {
        0 => Err(SetterError::not_found(format!("a field with value `{literal}`"))),
        1 => Ok(resolved),
        _ => Err(SetterError::AmbiguousField {
            value: literal.to_string(),
            paths: distinct.iter().map(ToString::to_string).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kset_test_utils::fixtures;

    fn set(text: &str) -> DocumentSet {
        DocumentSet::parse(text).unwrap()
    }

    #[test]
    fn explicit_path_skips_documents_without_it() {
        let docs = set(fixtures::SHARED_LISTS);
        let path: FieldPath = "spec.list".parse().unwrap();
        let resolved = resolve(&docs, Some(&path), None, SetterType::Array).unwrap();
        let indices: Vec<_> = resolved.iter().map(|f| f.document).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(resolved.iter().all(|f| f.path == path));
    }

    #[test]
    fn explicit_path_missing_everywhere() {
        let docs = set(fixtures::DEPLOYMENT);
        let path: FieldPath = "spec.missing".parse().unwrap();
        let err = resolve(&docs, Some(&path), None, SetterType::Scalar).unwrap_err();
        assert_eq!(err.to_string(), "could not find field `spec.missing` in any document");
    }

    #[test]
    fn literal_search_finds_single_path() {
        let docs = set(fixtures::DEPLOYMENT);
        let resolved = resolve(&docs, None, Some("3"), SetterType::Scalar).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path.to_string(), "spec.replicas");
    }

    #[test]
    fn literal_search_across_documents_same_path() {
        let docs = set("spec:\n  replicas: 3\n---\nspec:\n  replicas: 3\n");
        let resolved = resolve(&docs, None, Some("3"), SetterType::Scalar).unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn literal_search_ambiguous() {
        let docs = set("spec:\n  replicas: 3\n  minReadySeconds: 3\n");
        let err = resolve(&docs, None, Some("3"), SetterType::Scalar).unwrap_err();
        match err {
            SetterError::AmbiguousField { paths, .. } => {
                assert_eq!(paths, vec!["spec.replicas", "spec.minReadySeconds"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn literal_search_no_match() {
        let docs = set(fixtures::DEPLOYMENT);
        let err = resolve(&docs, None, Some("42"), SetterType::Scalar).unwrap_err();
        assert!(matches!(err, SetterError::FieldNotFound { .. }));
    }

    #[test]
    fn array_requires_path() {
        let docs = set(fixtures::SHARED_LISTS);
        let err = resolve(&docs, None, Some("a"), SetterType::Array).unwrap_err();
        assert!(matches!(err, SetterError::FieldPathRequiredForCollection));
    }

    #[test]
    fn scalar_requires_value_or_path() {
        let docs = set(fixtures::DEPLOYMENT);
        let err = resolve(&docs, None, None, SetterType::Scalar).unwrap_err();
        assert!(matches!(err, SetterError::MissingValue));
    }

    #[test]
    fn resolution_is_repeatable() {
        let docs = set(fixtures::SHARED_LISTS);
        let path: FieldPath = "spec.list".parse().unwrap();
        let first = resolve(&docs, Some(&path), None, SetterType::Array).unwrap();
        let second = resolve(&docs, Some(&path), None, SetterType::Array).unwrap();
        assert_eq!(first, second);
    }
}

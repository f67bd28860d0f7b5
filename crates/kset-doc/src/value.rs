//! Value helpers over `serde_yaml::Value`

use crate::path::{FieldPath, PathSegment};
use serde_yaml::Value;

/// Textual form of a scalar node
///
/// Strings are returned verbatim, numbers and booleans in their YAML
/// spelling, null as the empty string. Mappings and sequences are not
/// scalars and yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Follow `path` from `root`
#[must_use]
pub fn select<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, segment| {
        match (untag(current), segment) {
            (Value::Mapping(map), PathSegment::Key(key)) => map
                .get(key.as_str())
                .or_else(|| {
                    // Non-string keys (`8080: web`) match by their text
                    map.iter()
                        .find(|(k, _)| scalar_text(k).as_deref() == Some(key.as_str()))
                        .map(|(_, v)| v)
                }),
            (Value::Sequence(seq), PathSegment::Index(index)) => seq.get(*index),
            _ => None,
        }
    })
}

/// Every scalar leaf under `root`, in document order
#[must_use]
pub fn leaves(root: &Value) -> Vec<(FieldPath, &Value)> {
    let mut out = Vec::new();
    collect_leaves(root, FieldPath::root(), &mut out);
    out
}

fn collect_leaves<'a>(value: &'a Value, path: FieldPath, out: &mut Vec<(FieldPath, &'a Value)>) {
    match untag(value) {
        Value::Mapping(map) => {
            for (key, child) in map {
                if let Some(key) = scalar_text(key) {
                    collect_leaves(child, path.child(key), out);
                }
            }
        }
        Value::Sequence(seq) => {
            for (index, child) in seq.iter().enumerate() {
                collect_leaves(child, path.index(index), out);
            }
        }
        scalar => {
            if !path.is_empty() {
                out.push((path, scalar));
            }
        }
    }
}

/// Strip YAML tags
#[inline]
#[must_use]
pub fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn scalar_text_forms() {
        assert_eq!(scalar_text(&yaml("3")), Some("3".to_string()));
        assert_eq!(scalar_text(&yaml("\"3\"")), Some("3".to_string()));
        assert_eq!(scalar_text(&yaml("true")), Some("true".to_string()));
        assert_eq!(scalar_text(&yaml("nginx:1.7.9")), Some("nginx:1.7.9".to_string()));
        assert_eq!(scalar_text(&yaml("~")), Some(String::new()));
        assert_eq!(scalar_text(&yaml("[a]")), None);
        assert_eq!(scalar_text(&yaml("{a: 1}")), None);
    }

    #[test]
    fn select_follows_keys_and_indices() {
        let doc = yaml("spec:\n  containers:\n  - name: a\n  - name: b\n");
        let path: FieldPath = "spec.containers[1].name".parse().unwrap();
        assert_eq!(select(&doc, &path), Some(&Value::String("b".into())));

        let missing: FieldPath = "spec.containers[2].name".parse().unwrap();
        assert_eq!(select(&doc, &missing), None);

        let wrong_kind: FieldPath = "spec[0]".parse().unwrap();
        assert_eq!(select(&doc, &wrong_kind), None);
    }

    #[test]
    fn select_matches_numeric_keys_by_text() {
        let doc = yaml("ports:\n  8080: web\n");
        let path: FieldPath = "ports.8080".parse().unwrap();
        assert_eq!(select(&doc, &path), Some(&Value::String("web".into())));
    }

    #[test]
    fn leaves_in_document_order() {
        let doc = yaml("a: 1\nb:\n  c: x\n  d: [p, q]\n");
        let paths: Vec<String> = leaves(&doc).into_iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["a", "b.c", "b.d[0]", "b.d[1]"]);
    }
}

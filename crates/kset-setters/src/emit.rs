//! Deterministic block-YAML emitter
//!
//! Writes mappings in insertion order, sequences at their key's column and
//! strings plain unless a plain scalar would read back differently, in which
//! case they are double-quoted (`"3"`, `""`).

use serde_yaml::{Mapping, Value};

/// Emit `map` as block YAML with every key at `indent`
pub(crate) fn mapping(map: &Mapping, indent: usize, out: &mut String) {
    for (key, value) in map {
        entry(&inline(key), value, indent, out);
    }
}

/// Emit one `key: value` entry at `indent`
pub(crate) fn entry(key: &str, value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            line(out, indent, &format!("{key}:"));
            mapping(map, indent + 2, out);
        }
        Value::Sequence(seq) if !seq.is_empty() => {
            line(out, indent, &format!("{key}:"));
            sequence(seq, indent, out);
        }
        other => line(out, indent, &format!("{key}: {}", inline(other))),
    }
}

fn sequence(seq: &[Value], indent: usize, out: &mut String) {
    for item in seq {
        match item {
            Value::Mapping(map) if !map.is_empty() => {
                let mut nested = String::new();
                mapping(map, indent + 2, &mut nested);
                out.push_str(&" ".repeat(indent));
                out.push_str("- ");
                out.push_str(&nested[indent + 2..]);
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                line(out, indent, "-");
                sequence(inner, indent + 2, out);
            }
            other => line(out, indent, &format!("- {}", inline(other))),
        }
    }
}

fn line(out: &mut String, indent: usize, text: &str) {
    out.push_str(&" ".repeat(indent));
    out.push_str(text);
    out.push('\n');
}

/// Single-line form of a scalar or empty collection
pub(crate) fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string(s),
        Value::Sequence(seq) if seq.is_empty() => "[]".to_string(),
        Value::Mapping(map) if map.is_empty() => "{}".to_string(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, inline(&tagged.value)),
        // Non-empty collections only reach here as mapping keys
        other => serde_json::to_string(other).unwrap_or_else(|_| "null".to_string()),
    }
}

fn string(s: &str) -> String {
    if reads_back_plain(s) {
        s.to_string()
    } else {
        serde_json::Value::String(s.to_string()).to_string()
    }
}

fn reads_back_plain(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.contains('\n') {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(parsed)) if parsed == s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(src: &str) -> String {
        let value: Value = serde_yaml::from_str(src).unwrap();
        let mut out = String::new();
        mapping(value.as_mapping().unwrap(), 0, &mut out);
        out
    }

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(string("hello world"), "hello world");
        assert_eq!(string("3"), "\"3\"");
        assert_eq!(string(""), "\"\"");
        assert_eq!(string("true"), "\"true\"");
        assert_eq!(string("a: b"), "\"a: b\"");
        assert_eq!(string("a # b"), "\"a # b\"");
        assert_eq!(string(" padded"), "\" padded\"");
        assert_eq!(string("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(string("nginx:1.7.9"), "nginx:1.7.9");
    }

    #[test]
    fn sequences_sit_at_key_column() {
        let out = emit("setter:\n  name: list\n  value: ''\n  listValues: [a, b]\n");
        assert_eq!(
            out,
            "setter:\n  name: list\n  value: \"\"\n  listValues:\n  - a\n  - b\n"
        );
    }

    #[test]
    fn sequence_of_mappings() {
        let out = emit("values:\n- marker: x\n  ref: y\n- marker: z\n  ref: w\n");
        assert_eq!(out, "values:\n- marker: x\n  ref: y\n- marker: z\n  ref: w\n");
    }

    #[test]
    fn empty_collections_inline() {
        assert_eq!(emit("a: {}\nb: []\nc: null\n"), "a: {}\nb: []\nc: null\n");
    }

    #[test]
    fn emitted_text_parses_back() {
        let src = "a:\n  b: \"3\"\n  c: [x, \"y z\", '']\n  d:\n  - - 1\n    - 2\n  e: 1.5\n";
        let value: Value = serde_yaml::from_str(src).unwrap();
        let out = emit(src);
        assert_eq!(serde_yaml::from_str::<Value>(&out).unwrap(), value);
    }
}

//! Schema synthesis
//!
//! Builds the registry entry of a setter by merging an optional constraint
//! fragment with generated metadata. Key order is fixed so the registry diffs
//! cleanly:
//!
//! ```text
//! <constraint keys, sorted>
//! description
//! x-k8s-cli:
//!   setter:
//!     name, value, listValues?, setBy?
//! ```

use crate::config::RegistryLayout;
use crate::emit;
use crate::entity::SetterMeta;
use crate::error::SetterError;
use crate::types::{SetterName, SetterValue};
use serde_json::{Map, Value as JsonValue};
use serde_yaml::{Mapping, Value};

/// Written by the synthesizer; a fragment cannot set it
const DESCRIPTION_KEY: &str = "description";

/// Externally supplied schema constraints (`maximum`, `type`, `items`, ...)
///
/// Keys are kept sorted at every depth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstraintFragment(Map<String, JsonValue>);

impl ConstraintFragment {
    /// Parse a JSON object
    ///
    /// # Errors
    /// Returns `SetterError::InvalidConstraints` if `text` is not a JSON object.
    pub fn from_json(text: &str) -> Result<Self, SetterError> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|e| SetterError::InvalidConstraints(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a YAML mapping
    ///
    /// # Errors
    /// Returns `SetterError::InvalidConstraints` if `text` is not a YAML mapping.
    pub fn from_yaml(text: &str) -> Result<Self, SetterError> {
        let value: JsonValue =
            serde_yaml::from_str(text).map_err(|e| SetterError::InvalidConstraints(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse JSON when the text looks like a JSON object, YAML otherwise
    ///
    /// # Errors
    /// Returns `SetterError::InvalidConstraints` if the text is not a mapping.
    pub fn parse(text: &str) -> Result<Self, SetterError> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    fn from_value(value: JsonValue) -> Result<Self, SetterError> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            JsonValue::Null => Ok(Self::default()),
            other => Err(SetterError::InvalidConstraints(format!(
                "expected a mapping of constraint keys, got `{other}`"
            ))),
        }
    }

    /// Check if there are no constraints
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constraint value for `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Constraints in key order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

/// Registry entry of one setter
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    /// Schema constraints, sorted
    pub constraints: ConstraintFragment,
    /// Human description; omitted from the registry when empty
    pub description: String,
    /// Setter metadata under the extension key
    pub setter: SetterMeta,
}

impl RegistryEntry {
    /// Setter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.setter.name
    }

    /// Entry as a YAML mapping in canonical key order
    #[must_use]
    pub fn to_value(&self, layout: &RegistryLayout) -> Value {
        let mut entry = Mapping::new();

        for (key, value) in self.constraints.iter() {
            if key == DESCRIPTION_KEY || *key == layout.extension_key {
                tracing::warn!(key = %key, "constraint key is generated by the setter and was dropped");
                continue;
            }
            entry.insert(Value::String(key.clone()), json_to_yaml(value));
        }

        if !self.description.is_empty() {
            entry.insert(DESCRIPTION_KEY.into(), Value::String(self.description.clone()));
        }

        let mut setter = Mapping::new();
        setter.insert("name".into(), Value::String(self.setter.name.clone()));
        setter.insert("value".into(), Value::String(self.setter.value.clone()));
        if let Some(list) = &self.setter.list_values {
            setter.insert(
                "listValues".into(),
                Value::Sequence(list.iter().cloned().map(Value::String).collect()),
            );
        }
        if !self.setter.set_by.is_empty() {
            setter.insert("setBy".into(), Value::String(self.setter.set_by.clone()));
        }

        let mut extension = Mapping::new();
        extension.insert("setter".into(), Value::Mapping(setter));
        entry.insert(
            Value::String(layout.extension_key.clone()),
            Value::Mapping(extension),
        );

        Value::Mapping(entry)
    }

    /// Block YAML of `key: <entry>` with `key` at column `indent`
    #[must_use]
    pub fn render(&self, key: &str, layout: &RegistryLayout, indent: usize) -> String {
        let mut out = String::new();
        emit::entry(&emit::inline(&Value::String(key.to_string())), &self.to_value(layout), indent, &mut out);
        out
    }
}

/// Build the registry entry for a setter
///
/// Identical inputs always produce an identical entry.
#[must_use]
pub fn synthesize(
    name: &SetterName,
    constraints: Option<&ConstraintFragment>,
    description: &str,
    set_by: &str,
    value: &SetterValue,
) -> RegistryEntry {
    RegistryEntry {
        constraints: constraints.cloned().unwrap_or_default(),
        description: description.to_string(),
        setter: SetterMeta {
            name: name.to_string(),
            value: value.scalar().to_string(),
            list_values: value.list().map(<[String]>::to_vec),
            set_by: set_by.to_string(),
        },
    }
}

fn json_to_yaml(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else {
                Value::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Sequence(items.iter().map(json_to_yaml).collect()),
        JsonValue::Object(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (Value::String(k.clone()), json_to_yaml(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> SetterName {
        SetterName::new(s).unwrap()
    }

    #[test]
    fn scalar_entry_without_constraints() {
        let entry = synthesize(
            &name("replicas"),
            None,
            "hello world",
            "me",
            &SetterValue::Scalar("3".into()),
        );
        let layout = RegistryLayout::new();
        assert_eq!(
            entry.render("io.k8s.cli.setters.replicas", &layout, 4),
            "    io.k8s.cli.setters.replicas:
      description: hello world
      x-k8s-cli:
        setter:
          name: replicas
          value: \"3\"
          setBy: me
"
        );
    }

    #[test]
    fn constraints_come_first_sorted() {
        let fragment = ConstraintFragment::from_json(r#"{"type": "integer", "maximum": 10}"#).unwrap();
        let entry = synthesize(&name("replicas"), Some(&fragment), "hello world", "me", &SetterValue::Scalar("3".into()));
        let rendered = entry.render("k", &RegistryLayout::new(), 0);
        assert_eq!(
            rendered,
            "k:
  maximum: 10
  type: integer
  description: hello world
  x-k8s-cli:
    setter:
      name: replicas
      value: \"3\"
      setBy: me
"
        );
    }

    #[test]
    fn list_entry_carries_list_values() {
        let fragment =
            ConstraintFragment::from_json(r#"{"maxItems": 3, "type": "array", "items": {"type": "string"}}"#).unwrap();
        let value = SetterValue::List(vec!["a".into(), "b".into(), "c".into()]);
        let entry = synthesize(&name("list"), Some(&fragment), "hello world", "me", &value);
        assert_eq!(
            entry.render("io.k8s.cli.setters.list", &RegistryLayout::new(), 0),
            "io.k8s.cli.setters.list:
  items:
    type: string
  maxItems: 3
  type: array
  description: hello world
  x-k8s-cli:
    setter:
      name: list
      value: \"\"
      listValues:
      - a
      - b
      - c
      setBy: me
"
        );
    }

    #[test]
    fn empty_description_and_set_by_are_omitted() {
        let entry = synthesize(&name("tag"), None, "", "", &SetterValue::Scalar("1.7.9".into()));
        assert_eq!(
            entry.render("k", &RegistryLayout::new(), 0),
            "k:\n  x-k8s-cli:\n    setter:\n      name: tag\n      value: 1.7.9\n"
        );
    }

    #[test]
    fn reserved_constraint_keys_are_dropped() {
        let fragment = ConstraintFragment::from_json(r#"{"description": "x", "x-k8s-cli": {}, "type": "string"}"#).unwrap();
        let entry = synthesize(&name("n"), Some(&fragment), "real", "", &SetterValue::Scalar("v".into()));
        let value = entry.to_value(&RegistryLayout::new());
        let keys: Vec<_> = value.as_mapping().unwrap().keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["type", "description", "x-k8s-cli"]);
        assert_eq!(value["description"], Value::String("real".into()));
    }

    #[test]
    fn synthesis_is_deterministic() {
        let fragment = ConstraintFragment::parse("type: integer\nminimum: 0\nmaximum: 10\n").unwrap();
        let layout = RegistryLayout::new();
        let render = || {
            synthesize(&name("r"), Some(&fragment), "d", "me", &SetterValue::Scalar("3".into())).render("k", &layout, 2)
        };
        assert_eq!(render(), render());
        assert!(render().starts_with("  k:\n    maximum: 10\n    minimum: 0\n    type: integer\n"));
    }

    #[test]
    fn fragment_must_be_a_mapping() {
        assert!(matches!(ConstraintFragment::from_json("[1, 2]"), Err(SetterError::InvalidConstraints(_))));
        assert!(matches!(ConstraintFragment::from_json("{"), Err(SetterError::InvalidConstraints(_))));
        assert!(ConstraintFragment::parse("{}").unwrap().is_empty());
        assert!(matches!(ConstraintFragment::parse("- a\n"), Err(SetterError::InvalidConstraints(_))));
    }
}

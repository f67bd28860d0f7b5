//! Setter registry
//!
//! The registry is a YAML document holding setter and substitution
//! definitions under a configurable mapping (`openAPI.definitions` by
//! default). Writes are spliced into the raw text so unrelated entries keep
//! their comments and formatting.
//!
//! # Write path
//!
//! ```text
//! expected = parsed root + entry      (semantic result)
//! splice entry text into a copy       (format-preserving attempt)
//! copy.value == expected ? keep copy : re-emit the root mapping
//! ```

use crate::config::RegistryLayout;
use crate::emit;
use crate::entity::{decode_definitions, RegistryEntity, SetterDefinition, SubstitutionDefinition};
use crate::error::SetterError;
use crate::schema::RegistryEntry;
use crate::types::SetterName;
use kset_doc::{Document, FieldPath, NodeSpan};
use serde_yaml::{Mapping, Value};

/// Outcome of writing a setter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new entry was added
    Inserted,
    /// An existing entry with the same key was replaced
    Replaced,
}

/// Parsed registry document with its decoded definitions
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    document: Document,
    layout: RegistryLayout,
    entities: Vec<RegistryEntity>,
}

impl Registry {
    /// Parse registry text
    ///
    /// An empty text is a valid, empty registry.
    ///
    /// # Errors
    /// - `MalformedInput` if the text is not YAML
    /// - `InvalidRegistry` if the root or the definitions node is not a mapping
    pub fn parse(text: &str, layout: RegistryLayout) -> Result<Self, SetterError> {
        let document = Document::parse(text)?;
        let entities = decode(&document, &layout)?;
        tracing::debug!(entities = entities.len(), "loaded registry");
        Ok(Self {
            document,
            layout,
            entities,
        })
    }

    /// Layout the registry was read with
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &RegistryLayout {
        &self.layout
    }

    /// Decoded definitions, in document order
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[RegistryEntity] {
        &self.entities
    }

    /// Setter definitions
    pub fn setters(&self) -> impl Iterator<Item = &SetterDefinition> {
        self.entities.iter().filter_map(|entity| match entity {
            RegistryEntity::Setter(def) => Some(def),
            _ => None,
        })
    }

    /// Substitution definitions
    pub fn substitutions(&self) -> impl Iterator<Item = &SubstitutionDefinition> {
        self.entities.iter().filter_map(|entity| match entity {
            RegistryEntity::Substitution(def) => Some(def),
            _ => None,
        })
    }

    /// Setter definition named `name`
    #[must_use]
    pub fn find_setter(&self, name: &str) -> Option<&SetterDefinition> {
        let key = self.layout.setter_key(name);
        self.setters()
            .find(|def| def.key == key || def.setter.name == name)
    }

    /// Parsed registry document
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        self.document.value()
    }

    /// Registry text
    #[inline]
    #[must_use]
    pub fn render(&self) -> String {
        self.document.render()
    }

    /// Fail if a substitution already uses `name`
    ///
    /// # Errors
    /// Returns `SetterError::NameCollision` on a clash.
    pub fn check_collision(&self, name: &SetterName) -> Result<(), SetterError> {
        let key = self.layout.substitution_key(name.as_str());
        let clash = self
            .substitutions()
            .any(|def| def.key == key || def.substitution.name == name.as_str());
        if clash {
            return Err(SetterError::NameCollision {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Write the entry of setter `name`, replacing any existing one
    ///
    /// # Errors
    /// Returns `SetterError::InvalidRegistry` if a node on the definitions
    /// path is not a mapping.
    pub fn upsert_setter(&mut self, name: &SetterName, entry: &RegistryEntry) -> Result<Upsert, SetterError> {
        let key = self.layout.setter_key(name.as_str());
        let value = entry.to_value(&self.layout);
        let (expected, upsert) = with_entry(self.document.value(), &self.layout, &key, value)?;

        if upsert == Upsert::Replaced {
            tracing::warn!(setter = %name, "replacing existing setter definition");
        }

        let mut edited = self.document.clone();
        let spliced = splice(&mut edited, &self.layout, &key, entry).is_some() && *edited.value() == expected;

        if !spliced {
            tracing::warn!(setter = %name, "registry layout not editable in place, re-emitting document");
            let Value::Mapping(root) = &expected else {
                return Err(SetterError::InvalidRegistry("root is not a mapping".to_string()));
            };
            let mut body = String::new();
            emit::mapping(root, 0, &mut body);
            edited = self.document.clone();
            edited.replace_body(body)?;
        }

        self.entities = decode(&edited, &self.layout)?;
        self.document = edited;
        tracing::debug!(key = %key, ?upsert, "wrote setter definition");
        Ok(upsert)
    }
}

fn decode(document: &Document, layout: &RegistryLayout) -> Result<Vec<RegistryEntity>, SetterError> {
    match document.value() {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(_) => {}
        _ => return Err(SetterError::InvalidRegistry("root is not a mapping".to_string())),
    }
    match document.get(&layout.definitions()) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Mapping(definitions)) => Ok(decode_definitions(definitions, layout)),
        Some(_) => Err(SetterError::InvalidRegistry(format!(
            "`{}` is not a mapping",
            layout.definitions()
        ))),
    }
}

/// Root value with `key: value` set in the definitions mapping
fn with_entry(
    root: &Value,
    layout: &RegistryLayout,
    key: &str,
    value: Value,
) -> Result<(Value, Upsert), SetterError> {
    let mut root = match root {
        Value::Null => Value::Mapping(Mapping::new()),
        Value::Mapping(_) => root.clone(),
        _ => return Err(SetterError::InvalidRegistry("root is not a mapping".to_string())),
    };

    let mut current = &mut root;
    for segment in &layout.definitions_path {
        let Value::Mapping(map) = current else {
            return Err(SetterError::InvalidRegistry(format!("`{segment}` parent is not a mapping")));
        };
        let child = map
            .entry(Value::String(segment.clone()))
            .or_insert(Value::Null);
        if child.is_null() {
            *child = Value::Mapping(Mapping::new());
        }
        current = child;
    }

    let Value::Mapping(definitions) = current else {
        return Err(SetterError::InvalidRegistry(format!(
            "`{}` is not a mapping",
            layout.definitions()
        )));
    };
    let upsert = match definitions.insert(Value::String(key.to_string()), value) {
        Some(_) => Upsert::Replaced,
        None => Upsert::Inserted,
    };
    Ok((root, upsert))
}

/// Splice the entry text into `document`; `None` if no anchor fits
fn splice(document: &mut Document, layout: &RegistryLayout, key: &str, entry: &RegistryEntry) -> Option<()> {
    let definitions = layout.definitions();

    if let Ok(span) = document.locate(&definitions.child(key)) {
        let text = entry.render(key, layout, span.column);
        return document.splice_lines(span.line..span.end, &text).ok();
    }

    // Deepest existing node on the definitions path
    let keys = &layout.definitions_path;
    let anchor = (1..=keys.len()).rev().find_map(|depth| {
        let prefix = keys[..depth]
            .iter()
            .fold(FieldPath::root(), |path, k| path.child(k.as_str()));
        document.locate(&prefix).ok().map(|span| (depth, span))
    });

    let (depth, at, indent) = match anchor {
        Some((depth, span)) => (depth, span.end, child_indent(span)),
        None => {
            let lines = document.layout();
            let at = lines.last_content_line().map_or(lines.len(), |line| line + 1);
            (0, at, 0)
        }
    };

    let mut text = String::new();
    for (level, header) in keys[depth..].iter().enumerate() {
        text.push_str(&" ".repeat(indent + 2 * level));
        text.push_str(&emit::inline(&Value::String(header.clone())));
        text.push_str(":\n");
    }
    text.push_str(&entry.render(key, layout, indent + 2 * (keys.len() - depth)));

    document.splice_lines(at..at, &text).ok()
}

fn child_indent(span: NodeSpan) -> usize {
    span.child_column.unwrap_or(span.column + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::synthesize;
    use crate::types::SetterValue;
    use kset_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> SetterName {
        SetterName::new(s).unwrap()
    }

    fn entry(setter: &str, value: &str) -> RegistryEntry {
        synthesize(&name(setter), None, "", "me", &SetterValue::Scalar(value.into()))
    }

    fn upsert(text: &str, setter: &str, value: &str) -> (Registry, Upsert) {
        let mut registry = Registry::parse(text, RegistryLayout::new()).unwrap();
        let upsert = registry.upsert_setter(&name(setter), &entry(setter, value)).unwrap();
        (registry, upsert)
    }

    #[test]
    fn adds_definitions_to_bare_registry() {
        let (registry, upsert) = upsert(fixtures::EMPTY_REGISTRY, "replicas", "3");
        assert_eq!(upsert, Upsert::Inserted);
        assert_eq!(
            registry.render(),
            "apiVersion: v1alpha1
kind: Example
openAPI:
  definitions:
    io.k8s.cli.setters.replicas:
      x-k8s-cli:
        setter:
          name: replicas
          value: \"3\"
          setBy: me
"
        );
        assert_eq!(registry.setters().count(), 1);
    }

    #[test]
    fn appends_after_existing_entries_keeping_comments() {
        let text = "apiVersion: v1alpha1
kind: Example
openAPI:
  definitions:
    # image settings
    io.k8s.cli.setters.image:
      x-k8s-cli:
        setter:
          name: image
          value: nginx   # current
# trailing note
";
        let (registry, _) = upsert(text, "tag", "1.7.9");
        assert_eq!(
            registry.render(),
            "apiVersion: v1alpha1
kind: Example
openAPI:
  definitions:
    # image settings
    io.k8s.cli.setters.image:
      x-k8s-cli:
        setter:
          name: image
          value: nginx   # current
    io.k8s.cli.setters.tag:
      x-k8s-cli:
        setter:
          name: tag
          value: 1.7.9
          setBy: me
# trailing note
"
        );
    }

    #[test]
    fn replaces_existing_entry_in_place() {
        let text = "openAPI:
  definitions:
    io.k8s.cli.setters.replicas:
      x-k8s-cli:
        setter:
          name: replicas
          value: \"1\"
    io.k8s.cli.setters.tag:
      x-k8s-cli:
        setter:
          name: tag
          value: v1
";
        let (registry, upsert) = upsert(text, "replicas", "5");
        assert_eq!(upsert, Upsert::Replaced);
        let rendered = registry.render();
        assert!(rendered.contains("          value: \"5\"\n          setBy: me\n    io.k8s.cli.setters.tag:"));
        assert_eq!(registry.setters().count(), 2);
        assert_eq!(registry.find_setter("replicas").map(|d| d.setter.value.as_str()), Some("5"));
    }

    #[test]
    fn fills_in_missing_definitions_level() {
        let text = "openAPI:\n  info: x\nkind: Example\n";
        let (registry, _) = upsert(text, "r", "a");
        assert_eq!(
            registry.render(),
            "openAPI:
  info: x
  definitions:
    io.k8s.cli.setters.r:
      x-k8s-cli:
        setter:
          name: r
          value: a
          setBy: me
kind: Example
"
        );
    }

    #[test]
    fn empty_registry_text() {
        let (registry, _) = upsert("", "r", "a");
        assert_eq!(
            registry.value()["openAPI"]["definitions"]["io.k8s.cli.setters.r"]["x-k8s-cli"]["setter"]["value"],
            Value::String("a".into())
        );
    }

    #[test]
    fn flow_style_definitions_are_re_emitted() {
        let text = "kind: Example\nopenAPI: {definitions: {}}\n";
        let (registry, _) = upsert(text, "r", "a");
        assert_eq!(
            registry.render(),
            "kind: Example
openAPI:
  definitions:
    io.k8s.cli.setters.r:
      x-k8s-cli:
        setter:
          name: r
          value: a
          setBy: me
"
        );
    }

    #[test]
    fn collision_with_substitution() {
        let registry = Registry::parse(fixtures::SUBSTITUTION_REGISTRY, RegistryLayout::new()).unwrap();
        let err = registry.check_collision(&name("my-image")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "substitution with name my-image already exists, substitution and setter can't have same name"
        );
        assert!(registry.check_collision(&name("my-tag")).is_ok());
    }

    #[test]
    fn collision_by_payload_name() {
        let text = "openAPI:
  definitions:
    io.k8s.cli.substitutions.image-sub:
      x-k8s-cli:
        substitution:
          name: my-image
          pattern: ${image}
";
        let registry = Registry::parse(text, RegistryLayout::new()).unwrap();
        assert!(matches!(
            registry.check_collision(&name("my-image")),
            Err(SetterError::NameCollision { .. })
        ));
        assert!(matches!(
            registry.check_collision(&name("image-sub")),
            Err(SetterError::NameCollision { .. })
        ));
    }

    #[test]
    fn rejects_non_mapping_shapes() {
        assert!(matches!(
            Registry::parse("- a\n", RegistryLayout::new()),
            Err(SetterError::InvalidRegistry(_))
        ));
        assert!(matches!(
            Registry::parse("openAPI:\n  definitions: [a]\n", RegistryLayout::new()),
            Err(SetterError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn custom_layout() {
        let layout = RegistryLayout::new()
            .with_definitions_path(["schema"])
            .with_setter_prefix("setter.");
        let mut registry = Registry::parse("kind: Example\n", layout).unwrap();
        registry.upsert_setter(&name("r"), &entry("r", "a")).unwrap();
        assert!(registry.render().starts_with("kind: Example\nschema:\n  setter.r:\n"));
        assert_eq!(registry.find_setter("r").map(|d| d.key.as_str()), Some("setter.r"));
    }
}

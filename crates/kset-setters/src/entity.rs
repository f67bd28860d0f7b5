//! Registry entities
//!
//! Every entry under the definitions mapping decodes into one
//! [`RegistryEntity`]. The extension payload names its own kind
//! (`setter:` or `substitution:`); entries whose payload does not decode
//! fall back to their key prefix.

use crate::config::RegistryLayout;
use kset_doc::scalar_text;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Setter metadata stored under the extension key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetterMeta {
    /// Setter name
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    /// Scalar value; empty for array setters
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    /// Elements of an array setter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_values: Option<Vec<String>>,
    /// Provenance
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "String::is_empty")]
    pub set_by: String,
}

/// Substitution metadata stored under the extension key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionMeta {
    /// Substitution name
    pub name: String,
    /// Pattern with `${marker}` placeholders
    pub pattern: String,
    /// Setter references filling the placeholders
    pub values: Vec<SubstitutionValue>,
}

/// One placeholder of a substitution pattern
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionValue {
    /// Placeholder text inside the pattern
    pub marker: String,
    /// Reference to the setter definition
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Extension payload of a definition
///
/// Written as a single-key mapping (`setter: {...}` or `substitution: {...}`),
/// not as a YAML tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CliExtension {
    /// `setter:` payload
    Setter(SetterMeta),
    /// `substitution:` payload
    Substitution(SubstitutionMeta),
}

impl CliExtension {
    /// Decode the value stored under the extension key
    ///
    /// # Errors
    /// Fails unless `payload` is a mapping with exactly one `setter` or
    /// `substitution` key holding a well-formed payload.
    pub fn from_value(payload: Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::with::singleton_map::deserialize(payload)
    }
}

/// A setter definition in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetterDefinition {
    /// Registry key
    pub key: String,
    /// Description, if present
    pub description: Option<String>,
    /// Setter metadata
    pub setter: SetterMeta,
}

/// A substitution definition in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionDefinition {
    /// Registry key
    pub key: String,
    /// Substitution metadata
    pub substitution: SubstitutionMeta,
}

/// Kind of a registry entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Setter
    Setter,
    /// Substitution
    Substitution,
    /// Anything else
    Unknown,
}

/// One decoded entry of the definitions mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntity {
    /// Setter definition
    Setter(SetterDefinition),
    /// Substitution definition
    Substitution(SubstitutionDefinition),
    /// Entry that is neither; kept untouched
    Unknown {
        /// Registry key
        key: String,
    },
}

impl RegistryEntity {
    /// Registry key
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Setter(def) => &def.key,
            Self::Substitution(def) => &def.key,
            Self::Unknown { key } => key,
        }
    }

    /// Entity name, for setters and substitutions
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Setter(def) => Some(&def.setter.name),
            Self::Substitution(def) => Some(&def.substitution.name),
            Self::Unknown { .. } => None,
        }
    }

    /// Entity kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Setter(_) => EntityKind::Setter,
            Self::Substitution(_) => EntityKind::Substitution,
            Self::Unknown { .. } => EntityKind::Unknown,
        }
    }
}

/// Decode every entry of a definitions mapping, in order
#[must_use]
pub fn decode_definitions(definitions: &Mapping, layout: &RegistryLayout) -> Vec<RegistryEntity> {
    definitions
        .iter()
        .filter_map(|(key, value)| {
            let key = scalar_text(key)?;
            Some(decode_entry(key, value, layout))
        })
        .collect()
}

fn decode_entry(key: String, value: &Value, layout: &RegistryLayout) -> RegistryEntity {
    let description = value.get("description").and_then(scalar_text);
    let payload = value
        .get(layout.extension_key.as_str())
        .cloned()
        .and_then(|payload| match CliExtension::from_value(payload) {
            Ok(extension) => Some(extension),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "extension payload does not decode");
                None
            }
        });

    match payload {
        Some(CliExtension::Setter(setter)) => RegistryEntity::Setter(SetterDefinition {
            key,
            description,
            setter,
        }),
        Some(CliExtension::Substitution(substitution)) => {
            RegistryEntity::Substitution(SubstitutionDefinition { key, substitution })
        }
        None => by_prefix(key, description, layout),
    }
}

fn by_prefix(key: String, description: Option<String>, layout: &RegistryLayout) -> RegistryEntity {
    if let Some(name) = key.strip_prefix(layout.setter_prefix.as_str()) {
        tracing::debug!(key = %key, "setter payload missing, decoded by key prefix");
        let setter = SetterMeta {
            name: name.to_string(),
            ..SetterMeta::default()
        };
        return RegistryEntity::Setter(SetterDefinition {
            key,
            description,
            setter,
        });
    }
    if let Some(name) = key.strip_prefix(layout.substitution_prefix.as_str()) {
        tracing::debug!(key = %key, "substitution payload missing, decoded by key prefix");
        let substitution = SubstitutionMeta {
            name: name.to_string(),
            ..SubstitutionMeta::default()
        };
        return RegistryEntity::Substitution(SubstitutionDefinition { key, substitution });
    }
    RegistryEntity::Unknown { key }
}

/// Accept any scalar (`value: 3`, `value: "3"`) as its text
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| serde::de::Error::custom("expected a scalar"))
}

//! Registry layout configuration
//!
//! Names every literal the registry and marker formats depend on, so the
//! pipeline never hard-codes prefixes.

use kset_doc::FieldPath;
use serde::{Deserialize, Serialize};

/// Where and how setter definitions live in the registry document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryLayout {
    /// Keys leading to the definitions mapping
    pub definitions_path: Vec<String>,
    /// Key prefix of setter entries
    pub setter_prefix: String,
    /// Key prefix of substitution entries
    pub substitution_prefix: String,
    /// Extension key holding the entity payload
    pub extension_key: String,
    /// Key of the JSON object written into field markers
    pub marker_key: String,
}

impl RegistryLayout {
    /// Create default layout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different definitions location
    #[inline]
    #[must_use]
    pub fn with_definitions_path<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definitions_path = keys.into_iter().map(Into::into).collect();
        self
    }

    /// With a different setter key prefix
    #[inline]
    #[must_use]
    pub fn with_setter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.setter_prefix = prefix.into();
        self
    }

    /// With a different substitution key prefix
    #[inline]
    #[must_use]
    pub fn with_substitution_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.substitution_prefix = prefix.into();
        self
    }

    /// Path of the definitions mapping
    #[must_use]
    pub fn definitions(&self) -> FieldPath {
        self.definitions_path
            .iter()
            .fold(FieldPath::root(), |path, key| path.child(key.as_str()))
    }

    /// Registry key of the setter `name`
    #[must_use]
    pub fn setter_key(&self, name: &str) -> String {
        format!("{}{name}", self.setter_prefix)
    }

    /// Registry key of the substitution `name`
    #[must_use]
    pub fn substitution_key(&self, name: &str) -> String {
        format!("{}{name}", self.substitution_prefix)
    }

    /// Field marker comment for the setter `name`: `{"$openapi":"<name>"}`
    #[must_use]
    pub fn marker(&self, name: &str) -> String {
        let mut object = serde_json::Map::new();
        object.insert(
            self.marker_key.clone(),
            serde_json::Value::String(name.to_string()),
        );
        serde_json::Value::Object(object).to_string()
    }

    /// Setter name recorded in a marker comment, if `comment` is one
    #[must_use]
    pub fn parse_marker(&self, comment: &str) -> Option<String> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(comment).ok()?;
        object.get(&self.marker_key)?.as_str().map(str::to_string)
    }
}

impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            definitions_path: vec!["openAPI".to_string(), "definitions".to_string()],
            setter_prefix: "io.k8s.cli.setters.".to_string(),
            substitution_prefix: "io.k8s.cli.substitutions.".to_string(),
            extension_key: "x-k8s-cli".to_string(),
            marker_key: "$openapi".to_string(),
        }
    }
}

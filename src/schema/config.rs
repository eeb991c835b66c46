//! Declarative schema definitions.
//!
//! A [`SchemaConfig`] describes a document factory as data, so schemas
//! without complex fields can be loaded from JSON:
//!
//! ```
//! use glaive::schema::DocumentFactory;
//!
//! let factory = DocumentFactory::from_json(r#"{
//!     "type": "Asset",
//!     "updatable": true,
//!     "fields": [
//!         { "name": "title", "type": "text", "full_text": true, "language": "en" },
//!         { "name": "category", "type": "long", "multi_value": true, "facet": true }
//!     ]
//! }"#).unwrap();
//!
//! assert!(factory.get_field("category").unwrap().is_multi_value());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{GlaiveError, Result};
use crate::schema::builder::FieldDescriptorBuilder;
use crate::schema::factory::DocumentFactory;
use crate::schema::field::{FieldDescriptor, Language, Multiplicity, ValueType};

/// Declarative form of a document factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Document type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether documents accept partial updates
    #[serde(default)]
    pub updatable: bool,
    /// Ordinary fields
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    /// Fields attached to stored inverse-search queries
    #[serde(default)]
    pub inverse_search_meta_fields: Vec<FieldConfig>,
}

/// Declarative form of a field descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// Value type name, e.g. "text", "long", "date", "location"
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default = "default_true")]
    pub stored: bool,
    #[serde(default = "default_true")]
    pub indexed: bool,
    #[serde(default)]
    pub full_text: bool,
    #[serde(default)]
    pub facet: bool,
    #[serde(default)]
    pub suggest: bool,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_boost")]
    pub boost: f32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_boost() -> f32 {
    1.0
}

impl FieldConfig {
    /// Build the descriptor this entry declares.
    pub fn build(&self) -> Result<Arc<FieldDescriptor>> {
        let value_type: ValueType = self.value_type.parse()?;
        let builder = self.metadata.iter().fold(
            FieldDescriptorBuilder::new()
                .stored(self.stored)
                .indexed(self.indexed)
                .full_text(self.full_text)
                .facet(self.facet)
                .suggest(self.suggest)
                .sortable(self.sortable)
                .language(self.language)
                .boost(self.boost),
            |builder, (key, value)| builder.metadata(key.as_str(), value.as_str()),
        );
        let multiplicity = if self.multi_value {
            Multiplicity::Multi
        } else {
            Multiplicity::Single
        };
        builder.build(self.name.as_str(), value_type, multiplicity)
    }
}

impl DocumentFactory {
    /// Build a factory from its declarative form.
    pub fn from_config(config: &SchemaConfig) -> Result<Self> {
        warn_duplicates(&config.type_name, &config.fields);
        warn_duplicates(&config.type_name, &config.inverse_search_meta_fields);

        let mut builder = DocumentFactory::builder(config.type_name.as_str())
            .set_updatable(config.updatable);
        for field in &config.fields {
            builder = builder.add_field(field.build()?)?;
        }
        for field in &config.inverse_search_meta_fields {
            builder = builder.add_inverse_search_meta_field(field.build()?)?;
        }
        builder.build()
    }

    /// Build a factory from a JSON schema definition.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    /// Build a factory from a JSON schema definition file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json).map_err(|e| match e {
            GlaiveError::Json(inner) => GlaiveError::schema(format!(
                "invalid schema file {}: {inner}",
                path.as_ref().display()
            )),
            other => other,
        })
    }
}

fn warn_duplicates(type_name: &str, fields: &[FieldConfig]) {
    let mut seen = AHashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            log::warn!(
                "schema '{}' declares field '{}' more than once",
                type_name,
                field.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults() {
        let config: FieldConfig =
            serde_json::from_str(r#"{ "name": "title", "type": "text" }"#).unwrap();

        assert!(config.stored);
        assert!(config.indexed);
        assert!(!config.multi_value);
        assert_eq!(config.boost, 1.0);
        assert_eq!(config.language, Language::None);

        let field = config.build().unwrap();
        assert_eq!(field.value_type(), ValueType::Text);
        assert!(!field.has_sort_function());
    }

    #[test]
    fn test_full_field() {
        let config: FieldConfig = serde_json::from_str(
            r#"{
                "name": "tags",
                "type": "text",
                "multi_value": true,
                "stored": false,
                "facet": true,
                "suggest": true,
                "language": "de",
                "boost": 3.0,
                "metadata": { "owner": "editorial" }
            }"#,
        )
        .unwrap();
        let field = config.build().unwrap();

        assert!(field.is_multi_value());
        assert!(field.has_sort_function());
        assert!(!field.is_stored());
        assert!(field.is_facet());
        assert!(field.is_suggest());
        assert_eq!(field.language(), Language::German);
        assert_eq!(field.boost(), 3.0);
        assert_eq!(field.metadata()["owner"], "editorial");
    }

    #[test]
    fn test_unknown_type() {
        let config: FieldConfig =
            serde_json::from_str(r#"{ "name": "id", "type": "uuid" }"#).unwrap();
        assert!(matches!(config.build(), Err(GlaiveError::InvalidFieldType(_))));
    }

    #[test]
    fn test_duplicate_fields_fail() {
        let result = DocumentFactory::from_json(
            r#"{ "type": "Asset", "fields": [
                { "name": "title", "type": "text" },
                { "name": "title", "type": "long" }
            ] }"#,
        );
        assert!(matches!(result, Err(GlaiveError::Schema(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DocumentFactory::from_json("{ \"type\": "),
            Err(GlaiveError::Json(_))
        ));
    }
}

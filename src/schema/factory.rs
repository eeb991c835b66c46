//! Document factories: immutable, named schemas that mint documents.

use std::fmt;
use std::sync::Arc;

use crate::document::document::Document;
use crate::document::field_value::Value;
use crate::error::{GlaiveError, Result};
use crate::schema::field::FieldDescriptor;
use crate::schema::validation::{self, FieldMap};
use crate::update::Update;

/// An immutable schema: a document type name, an updatable flag and the
/// fields documents of this type may carry.
///
/// Cloning a factory is cheap; clones and every document minted from them
/// share the same descriptors.
#[derive(Clone)]
pub struct DocumentFactory {
    type_name: String,
    updatable: bool,
    fields: Arc<FieldMap>,
    field_names: Arc<[String]>,
    inverse_search_meta_fields: Arc<FieldMap>,
}

impl DocumentFactory {
    /// Create a builder for a document type.
    pub fn builder<S: Into<String>>(type_name: S) -> DocumentFactoryBuilder {
        DocumentFactoryBuilder::new(type_name)
    }

    /// The document type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Check if documents of this type accept partial updates.
    pub fn is_updatable(&self) -> bool {
        self.updatable
    }

    /// Mint a new empty document bound to this schema.
    pub fn create_doc<S: Into<String>>(&self, id: S) -> Document {
        Document::new(id.into(), self.type_name.clone(), Arc::clone(&self.fields))
    }

    /// Start a partial update for a document of this type.
    pub fn create_update<S: Into<String>>(&self, id: S) -> Result<Update> {
        if !self.updatable {
            return Err(GlaiveError::invalid_argument(format!(
                "documents of type '{}' are not updatable",
                self.type_name
            )));
        }
        Ok(Update::new(id))
    }

    /// Get a field descriptor by name.
    pub fn get_field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(name)
    }

    /// Check if a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All field descriptors in the order they were added.
    pub fn list_fields(&self) -> Vec<&Arc<FieldDescriptor>> {
        self.field_names
            .iter()
            .filter_map(|name| self.fields.get(name))
            .collect()
    }

    /// All field names in the order they were added.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// The name-keyed field map shared with minted documents.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose values are attached to stored inverse-search queries.
    pub fn inverse_search_meta_fields(&self) -> &FieldMap {
        &self.inverse_search_meta_fields
    }

    /// Run the document check contract against this schema.
    pub fn check_field(&self, name: &str, value: &Value) -> Result<&Arc<FieldDescriptor>> {
        validation::check_field(&self.fields, name, value)
    }

    /// Run the document check contract against the inverse-search meta fields.
    pub fn check_inverse_search_meta_field(
        &self,
        name: &str,
        value: &Value,
    ) -> Result<&Arc<FieldDescriptor>> {
        validation::check_field(&self.inverse_search_meta_fields, name, value)
    }
}

impl fmt::Debug for DocumentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFactory")
            .field("type_name", &self.type_name)
            .field("updatable", &self.updatable)
            .field("field_names", &self.field_names)
            .field(
                "inverse_search_meta_fields",
                &format!("<{} fields>", self.inverse_search_meta_fields.len()),
            )
            .finish()
    }
}

/// Ad hoc JSON-like rendering for logs. Not escaped and not stable.
impl fmt::Display for DocumentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"type\":\"{}\",\"updatable\":{},\"fields\":{{",
            self.type_name, self.updatable
        )?;
        for (i, field) in self.list_fields().into_iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "\"{}\":{}", field.name(), field)?;
        }
        write!(f, "}}}}")
    }
}

/// A builder for constructing document factories in a fluent manner.
pub struct DocumentFactoryBuilder {
    type_name: String,
    updatable: bool,
    fields: FieldMap,
    field_names: Vec<String>,
    inverse_search_meta_fields: FieldMap,
}

impl DocumentFactoryBuilder {
    /// Create a builder for a document type.
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        DocumentFactoryBuilder {
            type_name: type_name.into(),
            updatable: false,
            fields: FieldMap::new(),
            field_names: Vec::new(),
            inverse_search_meta_fields: FieldMap::new(),
        }
    }

    /// Set whether documents accept partial updates.
    pub fn set_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Add a field to the schema being built.
    pub fn add_field<F: Into<Arc<FieldDescriptor>>>(mut self, field: F) -> Result<Self> {
        let field = field.into();
        insert_field(&mut self.fields, &field)?;
        self.field_names.push(field.name().to_string());
        Ok(self)
    }

    /// Add several fields to the schema being built.
    pub fn add_fields<I, F>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<Arc<FieldDescriptor>>,
    {
        fields
            .into_iter()
            .try_fold(self, |builder, field| builder.add_field(field))
    }

    /// Add a field to the inverse-search meta field set.
    pub fn add_inverse_search_meta_field<F: Into<Arc<FieldDescriptor>>>(
        mut self,
        field: F,
    ) -> Result<Self> {
        insert_field(&mut self.inverse_search_meta_fields, &field.into())?;
        Ok(self)
    }

    /// Build the final factory.
    pub fn build(self) -> Result<DocumentFactory> {
        if self.type_name.is_empty() {
            return Err(GlaiveError::schema("Document type name cannot be empty"));
        }

        log::debug!(
            "built document factory '{}' with {} fields (updatable: {})",
            self.type_name,
            self.fields.len(),
            self.updatable
        );

        Ok(DocumentFactory {
            type_name: self.type_name,
            updatable: self.updatable,
            fields: Arc::new(self.fields),
            field_names: self.field_names.into(),
            inverse_search_meta_fields: Arc::new(self.inverse_search_meta_fields),
        })
    }
}

fn insert_field(fields: &mut FieldMap, field: &Arc<FieldDescriptor>) -> Result<()> {
    let name = field.name();
    if validation::is_reserved(name) {
        return Err(GlaiveError::reserved_field_name(name));
    }
    if fields.contains_key(name) {
        return Err(GlaiveError::schema(format!("Field '{name}' already exists")));
    }
    fields.insert(name.to_string(), Arc::clone(field));
    Ok(())
}

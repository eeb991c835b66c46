//! Fluent construction of field descriptors.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::field_value::{FieldValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::field::{FieldDescriptor, Language, Multiplicity, SortProjection, ValueType};

/// Accumulates flags and stamps them onto freshly built descriptors.
///
/// A builder can be reused: every finisher produces an independent
/// descriptor from the flags accumulated so far.
///
/// # Examples
///
/// ```
/// use glaive::schema::{FieldDescriptorBuilder, Language};
///
/// let title = FieldDescriptorBuilder::new()
///     .full_text(true)
///     .language(Language::English)
///     .boost(2.0)
///     .build_text_field("title")
///     .unwrap();
///
/// assert!(title.is_full_text());
/// assert!(!title.is_multi_value());
/// ```
#[derive(Clone)]
pub struct FieldDescriptorBuilder {
    stored: bool,
    indexed: bool,
    full_text: bool,
    facet: bool,
    suggest: bool,
    sortable: bool,
    language: Language,
    boost: f32,
    metadata: BTreeMap<String, String>,
    sort: Option<SortProjection>,
}

impl FieldDescriptorBuilder {
    /// Create a builder with default flags (stored and indexed).
    pub fn new() -> Self {
        FieldDescriptorBuilder {
            stored: true,
            indexed: true,
            full_text: false,
            facet: false,
            suggest: false,
            sortable: false,
            language: Language::None,
            boost: 1.0,
            metadata: BTreeMap::new(),
            sort: None,
        }
    }

    /// Set whether the field value is stored.
    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }

    /// Set whether the field is indexed.
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Set whether the field takes part in full-text search.
    pub fn full_text(mut self, full_text: bool) -> Self {
        self.full_text = full_text;
        self
    }

    /// Set whether the field is facetable.
    pub fn facet(mut self, facet: bool) -> Self {
        self.facet = facet;
        self
    }

    /// Set whether the field feeds suggestions.
    pub fn suggest(mut self, suggest: bool) -> Self {
        self.suggest = suggest;
        self
    }

    /// Set whether the field is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Set the language hint for full-text analysis.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set the query-time boost.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Add a metadata entry.
    pub fn metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Install an explicit sort projection.
    pub fn sort_by<F>(mut self, sort: F) -> Self
    where
        F: Fn(&Value) -> Option<FieldValue> + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(sort));
        self
    }

    pub(crate) fn has_sort_function(&self) -> bool {
        self.sort.is_some()
    }

    /// Build a descriptor of the given kind and multiplicity.
    pub fn build<S: Into<String>>(
        &self,
        name: S,
        value_type: ValueType,
        multiplicity: Multiplicity,
    ) -> Result<Arc<FieldDescriptor>> {
        let mut descriptor = FieldDescriptor::new(name, value_type)?;
        self.stamp(&mut descriptor, multiplicity)?;
        Ok(Arc::new(descriptor))
    }

    pub(crate) fn stamp(
        &self,
        descriptor: &mut FieldDescriptor,
        multiplicity: Multiplicity,
    ) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(GlaiveError::schema("Field name cannot be empty"));
        }
        if !self.boost.is_finite() {
            return Err(GlaiveError::invalid_argument(format!(
                "boost of field '{}' must be finite",
                descriptor.name
            )));
        }

        descriptor.stored = self.stored;
        descriptor.indexed = self.indexed;
        descriptor.full_text = self.full_text;
        descriptor.facet = self.facet;
        descriptor.suggest = self.suggest;
        descriptor.sortable = self.sortable;
        descriptor.language = self.language;
        descriptor.boost = self.boost;
        descriptor.metadata = self.metadata.clone();
        descriptor.multi_value = multiplicity == Multiplicity::Multi;
        descriptor.sort = match (&self.sort, multiplicity) {
            (Some(sort), _) => Some(Arc::clone(sort)),
            (None, Multiplicity::Multi) => Some(first_element()),
            (None, Multiplicity::Single) => None,
        };
        Ok(())
    }

    pub fn build_text_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Text, Multiplicity::Single)
    }

    pub fn build_multivalued_text_field<S: Into<String>>(
        &self,
        name: S,
    ) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Text, Multiplicity::Multi)
    }

    /// Build a numeric field. `value_type` must be one of the numeric types.
    pub fn build_numeric_field<S: Into<String>>(
        &self,
        name: S,
        value_type: ValueType,
    ) -> Result<Arc<FieldDescriptor>> {
        require_numeric(value_type)?;
        self.build(name, value_type, Multiplicity::Single)
    }

    pub fn build_multivalued_numeric_field<S: Into<String>>(
        &self,
        name: S,
        value_type: ValueType,
    ) -> Result<Arc<FieldDescriptor>> {
        require_numeric(value_type)?;
        self.build(name, value_type, Multiplicity::Multi)
    }

    pub fn build_date_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Date, Multiplicity::Single)
    }

    pub fn build_multivalued_date_field<S: Into<String>>(
        &self,
        name: S,
    ) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Date, Multiplicity::Multi)
    }

    pub fn build_util_date_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::UtilDate, Multiplicity::Single)
    }

    pub fn build_multivalued_util_date_field<S: Into<String>>(
        &self,
        name: S,
    ) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::UtilDate, Multiplicity::Multi)
    }

    pub fn build_location_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Location, Multiplicity::Single)
    }

    pub fn build_multivalued_location_field<S: Into<String>>(
        &self,
        name: S,
    ) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Location, Multiplicity::Multi)
    }

    pub fn build_binary_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Binary, Multiplicity::Single)
    }

    pub fn build_boolean_field<S: Into<String>>(&self, name: S) -> Result<Arc<FieldDescriptor>> {
        self.build(name, ValueType::Boolean, Multiplicity::Single)
    }
}

impl Default for FieldDescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn first_element() -> SortProjection {
    Arc::new(|value: &Value| value.iter().next().cloned())
}

fn require_numeric(value_type: ValueType) -> Result<()> {
    if value_type.is_numeric() {
        Ok(())
    } else {
        Err(GlaiveError::invalid_field_type(format!(
            "{value_type} is not a numeric type"
        )))
    }
}

//! Schema-bound documents.
//!
//! A [`Document`] is minted by a [`DocumentFactory`](crate::schema::DocumentFactory)
//! and shares the factory's field map. Values are stored per field and per
//! context; the default context is `None`. Every write runs the shared check
//! contract from [`validation`](crate::schema::validation) before any state
//! is touched.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::document::field_value::{FieldValue, FromFieldValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::field::FieldDescriptor;
use crate::schema::validation::{self, FieldMap, ID_FIELD, TYPE_FIELD};

/// Values of one field, keyed by context.
type ContextMap = AHashMap<Option<String>, Value>;

/// A mutable record bound to a schema.
///
/// Documents are single-writer values. The only state they share with other
/// documents is the field descriptors, whose `contextualized` flag is flipped
/// by the first write under a non-default context.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    type_name: String,
    fields: Arc<FieldMap>,
    values: AHashMap<String, ContextMap>,
    children: Vec<Document>,
    score: f32,
    distance: Option<f32>,
    child_count: Option<u64>,
}

impl Document {
    pub(crate) fn new(id: String, type_name: String, fields: Arc<FieldMap>) -> Self {
        Document {
            id,
            type_name,
            fields,
            values: AHashMap::new(),
            children: Vec::new(),
            score: 0.0,
            distance: None,
            child_count: None,
        }
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document type name of the owning schema.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set the value of a field in the default context.
    ///
    /// A bare scalar written to a multi-valued field is stored as a
    /// one-element collection. `Value::Null` is stored as a literal null.
    pub fn set_value<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<()> {
        self.set_contextualized_value(name, None, value)
    }

    /// Set a collection of values on a multi-valued field.
    pub fn set_values<I, V>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.set_contextualized_value(name, None, Value::multi(values))
    }

    /// Set the value of a field in a given context.
    pub fn set_contextualized_value<V: Into<Value>>(
        &mut self,
        name: &str,
        context: Option<&str>,
        value: V,
    ) -> Result<()> {
        let value = value.into();
        let descriptor = Arc::clone(validation::check_field(&self.fields, name, &value)?);
        let value = if descriptor.is_multi_value() {
            value.into_multi()
        } else {
            value
        };

        self.slot_map(&descriptor, context)
            .insert(context.map(str::to_string), value);
        Ok(())
    }

    /// Set a collection of values on a multi-valued field in a given context.
    pub fn set_contextualized_values<I, V>(
        &mut self,
        name: &str,
        context: Option<&str>,
        values: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.set_contextualized_value(name, context, Value::multi(values))
    }

    /// Typed write through a descriptor.
    ///
    /// Unlike [`set_value`](Self::set_value), `None` removes the field
    /// instead of storing a null.
    pub fn set<V: Into<Value>>(
        &mut self,
        descriptor: &FieldDescriptor,
        value: Option<V>,
    ) -> Result<()> {
        match value {
            Some(value) => self.set_value(descriptor.name(), value),
            None => self.clear(descriptor.name()),
        }
    }

    /// Append one or more values to a multi-valued field.
    pub fn add_value<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<()> {
        self.add_contextualized_value(name, None, value)
    }

    /// Append one or more values to a multi-valued field in a given context.
    pub fn add_contextualized_value<V: Into<Value>>(
        &mut self,
        name: &str,
        context: Option<&str>,
        value: V,
    ) -> Result<()> {
        let value = value.into();
        let descriptor = Arc::clone(validation::check_field(&self.fields, name, &value)?);
        if !descriptor.is_multi_value() {
            return Err(GlaiveError::not_multi_valued(name));
        }
        if value.is_null() {
            return Ok(());
        }

        let slot = self
            .slot_map(&descriptor, context)
            .entry(context.map(str::to_string))
            .or_insert_with(|| Value::Multi(Vec::new()));
        match slot {
            Value::Multi(values) => values.extend(value.iter().cloned()),
            other => *other = value.into_multi(),
        }
        Ok(())
    }

    /// Remove a value from a field in the default context.
    ///
    /// Multi-valued fields lose their first element equal to `value`;
    /// single-valued fields lose their value if it equals `value`. Returns
    /// whether anything was removed.
    pub fn remove_value<V: Into<FieldValue>>(&mut self, name: &str, value: V) -> Result<bool> {
        self.remove_contextualized_value(name, None, value)
    }

    /// Remove a value from a field in a given context.
    pub fn remove_contextualized_value<V: Into<FieldValue>>(
        &mut self,
        name: &str,
        context: Option<&str>,
        value: V,
    ) -> Result<bool> {
        let target: FieldValue = value.into();
        let descriptor = validation::check_field_exists(&self.fields, name)?;
        validation::check_scalar(descriptor, &target)?;

        let context = context.map(str::to_string);
        let Some(contexts) = self.values.get_mut(name) else {
            return Ok(false);
        };
        let removed = match contexts.get_mut(&context) {
            Some(Value::Multi(values)) => match values.iter().position(|v| *v == target) {
                Some(index) => {
                    values.remove(index);
                    true
                }
                None => false,
            },
            Some(Value::Single(current)) if *current == target => {
                contexts.remove(&context);
                true
            }
            _ => false,
        };
        if contexts.is_empty() {
            self.values.remove(name);
        }
        Ok(removed)
    }

    /// Remove every stored value and recorded context of a field.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        validation::check_field_exists(&self.fields, name)?;
        self.values.remove(name);
        Ok(())
    }

    /// Get the value of a field in the default context.
    ///
    /// `_id_` and `_type_` return the document identity.
    pub fn get_value(&self, name: &str) -> Result<Option<Value>> {
        self.get_contextualized_value(name, None)
    }

    /// Get the value of a field in a given context.
    pub fn get_contextualized_value(
        &self,
        name: &str,
        context: Option<&str>,
    ) -> Result<Option<Value>> {
        match name {
            ID_FIELD => Ok(Some(Value::from(self.id.as_str()))),
            TYPE_FIELD => Ok(Some(Value::from(self.type_name.as_str()))),
            _ => {
                validation::check_field_exists(&self.fields, name)?;
                Ok(self.lookup(name, context).cloned())
            }
        }
    }

    /// Read a single-valued field as `T`.
    ///
    /// Fails with [`GlaiveError::IncompatibleCast`] when the stored value is
    /// not a `T` or is a collection.
    pub fn get_value_as<T: FromFieldValue>(&self, name: &str) -> Result<Option<T>> {
        match self.get_value(name)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Single(value)) => cast(name, &value).map(Some),
            Some(Value::Multi(_)) => Err(GlaiveError::incompatible_cast(format!(
                "field '{name}' holds a collection, not a single {}",
                T::type_name()
            ))),
        }
    }

    /// Read every value of a field as `T`, in insertion order.
    pub fn get_values_as<T: FromFieldValue>(&self, name: &str) -> Result<Vec<T>> {
        match self.get_value(name)? {
            Some(value) => value.iter().map(|v| cast(name, v)).collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Check if the field holds a value in the default context.
    pub fn has_value(&self, name: &str) -> bool {
        self.has_contextualized_value(name, None)
    }

    /// Check if the field holds a value in a given context.
    pub fn has_contextualized_value(&self, name: &str, context: Option<&str>) -> bool {
        self.lookup(name, context).is_some()
    }

    /// Check if the owning schema declares a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The contexts a field currently holds values in.
    pub fn get_field_contexts(&self, name: &str) -> Result<AHashSet<Option<String>>> {
        validation::check_field_exists(&self.fields, name)?;
        Ok(self
            .values
            .get(name)
            .map(|contexts| contexts.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Snapshot of every field that has a default-context value.
    pub fn get_values(&self) -> AHashMap<String, Value> {
        self.values
            .iter()
            .filter_map(|(name, contexts)| {
                contexts
                    .get(&None)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// The field descriptors of the owning schema.
    pub fn list_field_descriptors(&self) -> &FieldMap {
        &self.fields
    }

    /// Attach child documents.
    ///
    /// Children may come from any factory. A child with the same type and
    /// id as an existing one is ignored.
    pub fn add_child<I: IntoIterator<Item = Document>>(&mut self, children: I) -> Result<()> {
        let children: Vec<Document> = children.into_iter().collect();
        if children.is_empty() {
            return Err(GlaiveError::precondition("add_child requires at least one child"));
        }

        for child in children {
            let duplicate = self
                .children
                .iter()
                .any(|c| c.type_name == child.type_name && c.id == child.id);
            if !duplicate {
                self.children.push(child);
            }
        }
        Ok(())
    }

    pub fn children(&self) -> &[Document] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Document] {
        &mut self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn set_score(&mut self, score: f32) {
        self.score = score;
    }

    /// Distance to the query point of a geo search, if any.
    pub fn distance(&self) -> Option<f32> {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = Some(distance);
    }

    /// Number of matching children reported by the backend, if any.
    pub fn child_count(&self) -> Option<u64> {
        self.child_count
    }

    pub fn set_child_count(&mut self, child_count: u64) {
        self.child_count = Some(child_count);
    }

    fn lookup(&self, name: &str, context: Option<&str>) -> Option<&Value> {
        self.values
            .get(name)?
            .get(&context.map(str::to_string))
    }

    fn slot_map(
        &mut self,
        descriptor: &FieldDescriptor,
        context: Option<&str>,
    ) -> &mut ContextMap {
        if context.is_some() {
            descriptor.mark_contextualized();
        }
        self.values.entry(descriptor.name().to_string()).or_default()
    }
}

fn cast<T: FromFieldValue>(name: &str, value: &FieldValue) -> Result<T> {
    T::from_field_value(value).ok_or_else(|| {
        GlaiveError::incompatible_cast(format!(
            "field '{name}' holds {}, not {}",
            value.value_type(),
            T::type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::FieldDescriptorBuilder;
    use crate::schema::factory::DocumentFactory;
    use crate::schema::field::ValueType;

    fn factory() -> DocumentFactory {
        let builder = FieldDescriptorBuilder::new();
        DocumentFactory::builder("Asset")
            .add_field(builder.build_text_field("title").unwrap())
            .unwrap()
            .add_field(
                builder
                    .build_multivalued_numeric_field("category", ValueType::Long)
                    .unwrap(),
            )
            .unwrap()
            .add_field(
                builder
                    .build_numeric_field("price", ValueType::Double)
                    .unwrap(),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let mut doc = factory().create_doc("1");
        doc.set_value("title", "Dune").unwrap();

        assert_eq!(doc.get_value("title").unwrap(), Some(Value::from("Dune")));
        assert_eq!(doc.get_value_as::<String>("title").unwrap(), Some("Dune".to_string()));
        assert_eq!(doc.get_value("price").unwrap(), None);
    }

    #[test]
    fn test_reserved_reads() {
        let doc = factory().create_doc("42");

        assert_eq!(doc.get_value(ID_FIELD).unwrap(), Some(Value::from("42")));
        assert_eq!(doc.get_value(TYPE_FIELD).unwrap(), Some(Value::from("Asset")));
        assert!(matches!(doc.get_value(""), Err(GlaiveError::ReservedFieldName(_))));
        assert!(matches!(doc.get_value("missing"), Err(GlaiveError::FieldNotFound(_))));
    }

    #[test]
    fn test_scalar_wrapped_for_multi_value() {
        let mut doc = factory().create_doc("1");
        doc.set_value("category", 7_i64).unwrap();

        assert_eq!(
            doc.get_value("category").unwrap(),
            Some(Value::Multi(vec![FieldValue::Long(7)]))
        );
    }

    #[test]
    fn test_rejected_write_keeps_previous_value() {
        let mut doc = factory().create_doc("1");
        doc.set_value("price", 9.5_f64).unwrap();

        assert!(matches!(
            doc.set_value("price", "cheap"),
            Err(GlaiveError::TypeMismatch { .. })
        ));
        assert!(matches!(
            doc.set_values("title", ["a", "b"]),
            Err(GlaiveError::NotMultiValued(_))
        ));
        assert_eq!(doc.get_value_as::<f64>("price").unwrap(), Some(9.5));
        assert!(!doc.has_value("title"));
    }

    #[test]
    fn test_add_value() {
        let mut doc = factory().create_doc("1");
        doc.add_value("category", 1_i64).unwrap();
        doc.add_value("category", vec![2_i64, 3]).unwrap();

        assert_eq!(doc.get_values_as::<i64>("category").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            doc.add_value("title", "x"),
            Err(GlaiveError::NotMultiValued(_))
        ));
    }

    #[test]
    fn test_remove_value() {
        let mut doc = factory().create_doc("1");
        doc.set_values("category", [1_i64, 2, 1]).unwrap();

        assert!(doc.remove_value("category", 1_i64).unwrap());
        assert_eq!(doc.get_values_as::<i64>("category").unwrap(), vec![2, 1]);
        assert!(!doc.remove_value("category", 5_i64).unwrap());

        doc.set_value("title", "Dune").unwrap();
        assert!(!doc.remove_value("title", "Emma").unwrap());
        assert!(doc.remove_value("title", "Dune").unwrap());
        assert!(!doc.has_value("title"));
    }

    #[test]
    fn test_clear_removes_contexts() {
        let mut doc = factory().create_doc("1");
        doc.set_value("title", "Dune").unwrap();
        doc.set_contextualized_value("title", Some("de"), "Der Wüstenplanet")
            .unwrap();
        assert_eq!(doc.get_field_contexts("title").unwrap().len(), 2);

        doc.clear("title").unwrap();
        assert!(doc.get_field_contexts("title").unwrap().is_empty());
        assert!(doc.get_values().is_empty());
    }

    #[test]
    fn test_typed_set_none_clears() {
        let factory = factory();
        let title = Arc::clone(factory.get_field("title").unwrap());
        let mut doc = factory.create_doc("1");

        doc.set(&title, Some("Dune")).unwrap();
        doc.set(&title, Option::<&str>::None).unwrap();
        assert!(!doc.has_value("title"));

        doc.set_value("title", Value::Null).unwrap();
        assert!(doc.has_value("title"));
        assert_eq!(doc.get_value("title").unwrap(), Some(Value::Null));
        assert_eq!(doc.get_value_as::<String>("title").unwrap(), None);
    }

    #[test]
    fn test_incompatible_cast() {
        let mut doc = factory().create_doc("1");
        doc.set_value("title", "Dune").unwrap();
        doc.set_values("category", [1_i64]).unwrap();

        assert!(matches!(
            doc.get_value_as::<i64>("title"),
            Err(GlaiveError::IncompatibleCast(_))
        ));
        assert!(matches!(
            doc.get_value_as::<i64>("category"),
            Err(GlaiveError::IncompatibleCast(_))
        ));
    }

    #[test]
    fn test_context_isolation() {
        let factory = factory();
        let mut doc = factory.create_doc("1");
        doc.set_value("title", "Dune").unwrap();
        doc.set_contextualized_value("title", Some("a"), "A").unwrap();
        doc.set_contextualized_value("title", Some("b"), "B").unwrap();

        assert_eq!(
            doc.get_contextualized_value("title", Some("a")).unwrap(),
            Some(Value::from("A"))
        );
        assert_eq!(
            doc.get_contextualized_value("title", Some("b")).unwrap(),
            Some(Value::from("B"))
        );
        assert_eq!(doc.get_value("title").unwrap(), Some(Value::from("Dune")));
        assert_eq!(doc.get_contextualized_value("title", Some("c")).unwrap(), None);
        assert_eq!(doc.get_values().len(), 1);
        assert!(factory.get_field("title").unwrap().is_contextualized());
    }

    #[test]
    fn test_default_context_does_not_contextualize() {
        let factory = factory();
        let mut doc = factory.create_doc("1");
        doc.set_value("title", "Dune").unwrap();

        assert!(!factory.get_field("title").unwrap().is_contextualized());
    }

    #[test]
    fn test_children() {
        let factory = factory();
        let mut parent = factory.create_doc("1");

        assert!(matches!(
            parent.add_child(Vec::new()),
            Err(GlaiveError::Precondition(_))
        ));
        assert!(!parent.has_children());

        parent
            .add_child([factory.create_doc("2"), factory.create_doc("3")])
            .unwrap();
        parent.add_child([factory.create_doc("2")]).unwrap();

        let ids: Vec<&str> = parent.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["2", "3"]);

        parent.children_mut()[0].set_value("title", "child").unwrap();
        assert!(parent.children()[0].has_value("title"));
    }

    #[test]
    fn test_result_metadata() {
        let mut doc = factory().create_doc("1");
        assert_eq!(doc.score(), 0.0);
        assert_eq!(doc.distance(), None);

        doc.set_score(1.5);
        doc.set_distance(12.0);
        doc.set_child_count(3);
        assert_eq!(doc.score(), 1.5);
        assert_eq!(doc.distance(), Some(12.0));
        assert_eq!(doc.child_count(), Some(3));
    }
}

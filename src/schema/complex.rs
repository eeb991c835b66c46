//! Complex fields: descriptors whose indexable representations are derived
//! from a caller-defined domain object.
//!
//! A complex field declares a domain type `T` and up to five projections:
//!
//! - **facet** `T -> [F]`
//! - **store** `T -> S`
//! - **full-text** `T -> [String]`
//! - **suggest** `T -> [String]`
//! - **advance filter** `T -> [F]`
//!
//! The projections are type-erased inside [`ComplexProjections`] so complex
//! and plain descriptors share one [`FieldDescriptor`] type. The typed
//! [`ComplexFieldDescriptor<T>`] handle applies them to `&T` directly.
//!
//! # Examples
//!
//! ```
//! use glaive::schema::{ComplexFieldDescriptorBuilder, Multiplicity, ValueType};
//!
//! struct Taxonomy {
//!     id: i64,
//!     term: String,
//!     synonyms: Vec<String>,
//! }
//!
//! let taxonomy = ComplexFieldDescriptorBuilder::<Taxonomy>::new()
//!     .facet(|t: &Taxonomy| vec![t.term.clone()])
//!     .store(|t: &Taxonomy| t.id)
//!     .full_text(|t: &Taxonomy| t.synonyms.clone())
//!     .build("taxonomy", ValueType::Long, ValueType::Text, Multiplicity::Single)
//!     .unwrap();
//!
//! let term = Taxonomy { id: 7, term: "rust".into(), synonyms: vec!["rustlang".into()] };
//! assert_eq!(taxonomy.store_value(&term), Some(7_i64.into()));
//! assert_eq!(taxonomy.full_text_values(&term), vec!["rustlang".to_string()]);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::document::field_value::{FieldValue, ObjectValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::builder::FieldDescriptorBuilder;
use crate::schema::field::{
    FieldDescriptor, Language, Multiplicity, ObjectType, SortProjection, ValueType,
};

type ManyProjection = Arc<dyn Fn(&dyn Any) -> Vec<FieldValue> + Send + Sync>;
type OneProjection = Arc<dyn Fn(&dyn Any) -> Option<FieldValue> + Send + Sync>;
type TextProjection = Arc<dyn Fn(&dyn Any) -> Vec<String> + Send + Sync>;

/// Type-erased projections of a complex field.
#[derive(Clone)]
pub struct ComplexProjections {
    domain_type: ObjectType,
    store_type: ValueType,
    facet_type: ValueType,
    facet: Option<ManyProjection>,
    store: Option<OneProjection>,
    full_text: Option<TextProjection>,
    suggest: Option<TextProjection>,
    advance_filter: Option<ManyProjection>,
}

impl ComplexProjections {
    /// The domain type the projections read from.
    pub fn domain_type(&self) -> ObjectType {
        self.domain_type
    }

    /// The type produced by the store projection.
    pub fn store_type(&self) -> ValueType {
        self.store_type
    }

    /// The type produced by the facet and advance-filter projections.
    pub fn facet_type(&self) -> ValueType {
        self.facet_type
    }

    pub fn has_facet(&self) -> bool {
        self.facet.is_some()
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn has_full_text(&self) -> bool {
        self.full_text.is_some()
    }

    pub fn has_suggest(&self) -> bool {
        self.suggest.is_some()
    }

    pub fn has_advance_filter(&self) -> bool {
        self.advance_filter.is_some()
    }

    fn domain<'a>(&self, value: &'a FieldValue) -> Result<&'a dyn Any> {
        match value {
            FieldValue::Object(object) if object.object_type() == self.domain_type => {
                Ok(object.as_any())
            }
            other => Err(GlaiveError::incompatible_cast(format!(
                "{} is not a {}",
                other.value_type(),
                self.domain_type.name()
            ))),
        }
    }

    /// Facet values of a stored domain object.
    pub fn facet_values(&self, value: &FieldValue) -> Result<Vec<FieldValue>> {
        let domain = self.domain(value)?;
        let facets = self.facet.as_ref().map(|f| f(domain)).unwrap_or_default();
        self.check_facet_type("<facet projection>", facets)
    }

    /// Store value of a stored domain object. Values that already have the
    /// store type are passed through.
    pub fn store_value(&self, value: &FieldValue) -> Result<Option<FieldValue>> {
        if self.store_type.accepts(value) {
            return Ok(Some(value.clone()));
        }
        let domain = self.domain(value)?;
        let stored = self.store.as_ref().and_then(|f| f(domain));
        match stored {
            Some(v) if !self.store_type.accepts(&v) => Err(GlaiveError::type_mismatch(
                "<store projection>",
                self.store_type,
                v.value_type(),
            )),
            other => Ok(other),
        }
    }

    /// Full-text values of a stored domain object.
    pub fn full_text_values(&self, value: &FieldValue) -> Result<Vec<String>> {
        let domain = self.domain(value)?;
        Ok(self.full_text.as_ref().map(|f| f(domain)).unwrap_or_default())
    }

    /// Suggestion values of a stored domain object.
    pub fn suggest_values(&self, value: &FieldValue) -> Result<Vec<String>> {
        let domain = self.domain(value)?;
        Ok(self.suggest.as_ref().map(|f| f(domain)).unwrap_or_default())
    }

    /// Advance-filter values of a stored domain object.
    pub fn advance_filter_values(&self, value: &FieldValue) -> Result<Vec<FieldValue>> {
        let domain = self.domain(value)?;
        let filters = self
            .advance_filter
            .as_ref()
            .map(|f| f(domain))
            .unwrap_or_default();
        self.check_facet_type("<advance filter projection>", filters)
    }

    fn check_facet_type(&self, role: &str, values: Vec<FieldValue>) -> Result<Vec<FieldValue>> {
        match values.iter().find(|v| !self.facet_type.accepts(v)) {
            Some(v) => Err(GlaiveError::type_mismatch(
                role,
                self.facet_type,
                v.value_type(),
            )),
            None => Ok(values),
        }
    }

    fn store_any(&self, value: &FieldValue) -> Option<FieldValue> {
        self.store_value(value).ok().flatten()
    }
}

impl fmt::Debug for ComplexProjections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexProjections")
            .field("domain_type", &self.domain_type)
            .field("store_type", &self.store_type)
            .field("facet_type", &self.facet_type)
            .field("facet", &self.has_facet())
            .field("store", &self.has_store())
            .field("full_text", &self.has_full_text())
            .field("suggest", &self.has_suggest())
            .field("advance_filter", &self.has_advance_filter())
            .finish()
    }
}

/// Typed handle on a complex field descriptor.
///
/// Dereferences to the shared [`FieldDescriptor`], so it can be registered in
/// a [`DocumentFactory`](crate::schema::DocumentFactory) and passed wherever a
/// descriptor is expected.
pub struct ComplexFieldDescriptor<T> {
    descriptor: Arc<FieldDescriptor>,
    projections: ComplexProjections,
    _domain: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> ComplexFieldDescriptor<T> {
    /// The shared, type-erased descriptor.
    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    pub fn facet_values(&self, value: &T) -> Vec<FieldValue> {
        self.projections
            .facet
            .as_ref()
            .map(|f| f(value as &dyn Any))
            .unwrap_or_default()
    }

    pub fn store_value(&self, value: &T) -> Option<FieldValue> {
        self.projections
            .store
            .as_ref()
            .and_then(|f| f(value as &dyn Any))
    }

    pub fn full_text_values(&self, value: &T) -> Vec<String> {
        self.projections
            .full_text
            .as_ref()
            .map(|f| f(value as &dyn Any))
            .unwrap_or_default()
    }

    pub fn suggest_values(&self, value: &T) -> Vec<String> {
        self.projections
            .suggest
            .as_ref()
            .map(|f| f(value as &dyn Any))
            .unwrap_or_default()
    }

    pub fn advance_filter_values(&self, value: &T) -> Vec<FieldValue> {
        self.projections
            .advance_filter
            .as_ref()
            .map(|f| f(value as &dyn Any))
            .unwrap_or_default()
    }

    /// Wrap a domain object as a value for this field.
    pub fn value(&self, value: T) -> FieldValue {
        FieldValue::Object(ObjectValue::new(value))
    }
}

impl<T> Clone for ComplexFieldDescriptor<T> {
    fn clone(&self) -> Self {
        ComplexFieldDescriptor {
            descriptor: Arc::clone(&self.descriptor),
            projections: self.projections.clone(),
            _domain: PhantomData,
        }
    }
}

impl<T> Deref for ComplexFieldDescriptor<T> {
    type Target = FieldDescriptor;

    fn deref(&self) -> &FieldDescriptor {
        &self.descriptor
    }
}

impl<T> From<ComplexFieldDescriptor<T>> for Arc<FieldDescriptor> {
    fn from(field: ComplexFieldDescriptor<T>) -> Self {
        field.descriptor
    }
}

impl<T> From<&ComplexFieldDescriptor<T>> for Arc<FieldDescriptor> {
    fn from(field: &ComplexFieldDescriptor<T>) -> Self {
        Arc::clone(&field.descriptor)
    }
}

impl<T> fmt::Debug for ComplexFieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComplexFieldDescriptor")
            .field(&self.descriptor)
            .finish()
    }
}

/// Builder threading projection functions into a complex descriptor.
///
/// Setting a projection enables the matching flag. Enabling a flag through
/// [`with_flags`](Self::with_flags) without its projection makes `build` fail.
pub struct ComplexFieldDescriptorBuilder<T> {
    flags: FieldDescriptorBuilder,
    facet: Option<ManyProjection>,
    store: Option<OneProjection>,
    full_text: Option<TextProjection>,
    suggest: Option<TextProjection>,
    advance_filter: Option<ManyProjection>,
    sort: Option<SortProjection>,
    _domain: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> ComplexFieldDescriptorBuilder<T> {
    /// Create a builder with no projections; only `indexed` is set.
    pub fn new() -> Self {
        Self::with_flags(
            FieldDescriptorBuilder::new()
                .stored(false)
                .full_text(false)
                .facet(false)
                .suggest(false),
        )
    }

    /// Start from an existing set of flags.
    pub fn with_flags(flags: FieldDescriptorBuilder) -> Self {
        ComplexFieldDescriptorBuilder {
            flags,
            facet: None,
            store: None,
            full_text: None,
            suggest: None,
            advance_filter: None,
            sort: None,
            _domain: PhantomData,
        }
    }

    /// Enable faceting through a projection.
    pub fn facet<F, I, V>(mut self, facet: F) -> Self
    where
        F: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.flags = self.flags.facet(true);
        self.facet = Some(many::<T, _, _, _>(facet));
        self
    }

    /// Enable storing through a projection.
    pub fn store<F, V>(mut self, store: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        self.flags = self.flags.stored(true);
        self.store = Some(Arc::new(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|t| store(t).into())
        }));
        self
    }

    /// Enable full-text search through a projection.
    pub fn full_text<F>(mut self, full_text: F) -> Self
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        self.flags = self.flags.full_text(true);
        self.full_text = Some(text::<T, _>(full_text));
        self
    }

    /// Enable suggestions through a projection.
    pub fn suggest<F>(mut self, suggest: F) -> Self
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        self.flags = self.flags.suggest(true);
        self.suggest = Some(text::<T, _>(suggest));
        self
    }

    /// Install the projection used for advanced filtering.
    pub fn advance_filter<F, I, V>(mut self, advance_filter: F) -> Self
    where
        F: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.advance_filter = Some(many::<T, _, _, _>(advance_filter));
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.flags = self.flags.indexed(indexed);
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.flags = self.flags.sortable(sortable);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.flags = self.flags.language(language);
        self
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.flags = self.flags.boost(boost);
        self
    }

    pub fn metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.flags = self.flags.metadata(key, value);
        self
    }

    /// Install an explicit sort projection over the domain object.
    pub fn sort_by<F, V>(mut self, sort: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        self.sort = Some(Arc::new(move |value: &Value| {
            value
                .iter()
                .next()
                .and_then(FieldValue::as_object)
                .and_then(|o| o.downcast_ref::<T>())
                .map(|t| sort(t).into())
        }));
        self
    }

    /// Build the complex descriptor.
    ///
    /// `store_type` and `facet_type` must be members of the supported type
    /// family.
    pub fn build<S: Into<String>>(
        self,
        name: S,
        store_type: ValueType,
        facet_type: ValueType,
        multiplicity: Multiplicity,
    ) -> Result<ComplexFieldDescriptor<T>> {
        let name = name.into();
        for (role, value_type) in [("store", store_type), ("facet", facet_type)] {
            if !value_type.is_supported() {
                return Err(GlaiveError::invalid_field_type(format!(
                    "{role} type of complex field '{name}' cannot be {value_type}"
                )));
            }
        }

        let mut descriptor =
            FieldDescriptor::unchecked(name, ValueType::Object(ObjectType::of::<T>()));
        self.flags.stamp(&mut descriptor, multiplicity)?;

        let missing = [
            ("stored", descriptor.stored, self.store.is_some()),
            ("facet", descriptor.facet, self.facet.is_some()),
            ("full_text", descriptor.full_text, self.full_text.is_some()),
            ("suggest", descriptor.suggest, self.suggest.is_some()),
        ]
        .into_iter()
        .find(|(_, enabled, present)| *enabled && !*present);
        if let Some((flag, _, _)) = missing {
            return Err(GlaiveError::schema(format!(
                "complex field '{}' enables {flag} without a projection",
                descriptor.name
            )));
        }

        let projections = ComplexProjections {
            domain_type: ObjectType::of::<T>(),
            store_type,
            facet_type,
            facet: self.facet,
            store: self.store,
            full_text: self.full_text,
            suggest: self.suggest,
            advance_filter: self.advance_filter,
        };

        descriptor.sort = match self.sort {
            Some(sort) => Some(sort),
            None if descriptor.stored && !self.flags.has_sort_function() => {
                let store = projections.clone();
                Some(Arc::new(move |value: &Value| {
                    value.iter().next().and_then(|first| store.store_any(first))
                }) as SortProjection)
            }
            None => descriptor.sort.take(),
        };
        descriptor.complex = Some(projections.clone());

        Ok(ComplexFieldDescriptor {
            descriptor: Arc::new(descriptor),
            projections,
            _domain: PhantomData,
        })
    }

    /// Build a single-valued complex field storing and faceting on text.
    pub fn build_text_field<S: Into<String>>(self, name: S) -> Result<ComplexFieldDescriptor<T>> {
        self.build(name, ValueType::Text, ValueType::Text, Multiplicity::Single)
    }

    /// Build a multi-valued complex field storing and faceting on text.
    pub fn build_multivalued_text_field<S: Into<String>>(
        self,
        name: S,
    ) -> Result<ComplexFieldDescriptor<T>> {
        self.build(name, ValueType::Text, ValueType::Text, Multiplicity::Multi)
    }
}

impl<T: Any + Send + Sync> Default for ComplexFieldDescriptorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn many<T, F, I, V>(projection: F) -> ManyProjection
where
    T: Any,
    F: Fn(&T) -> I + Send + Sync + 'static,
    I: IntoIterator<Item = V>,
    V: Into<FieldValue>,
{
    Arc::new(move |any: &dyn Any| {
        any.downcast_ref::<T>()
            .map(|t| projection(t).into_iter().map(Into::into).collect())
            .unwrap_or_default()
    })
}

fn text<T, F>(projection: F) -> TextProjection
where
    T: Any,
    F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
{
    Arc::new(move |any: &dyn Any| {
        any.downcast_ref::<T>()
            .map(|t| projection(t))
            .unwrap_or_default()
    })
}

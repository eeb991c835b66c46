//! The partial-update accumulator.

use std::sync::Arc;

use ahash::AHashMap;
use log::trace;
use regex::Regex;

use crate::document::field_value::{FieldValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::field::FieldDescriptor;
use crate::schema::validation;
use crate::update::operation::{UpdateOperation, UpdateOperationKind};

/// Accumulated operations of one field, per context.
#[derive(Debug, Clone)]
pub struct FieldUpdate {
    descriptor: Arc<FieldDescriptor>,
    contexts: AHashMap<Option<String>, Vec<UpdateOperation>>,
}

impl FieldUpdate {
    fn new(descriptor: Arc<FieldDescriptor>) -> Self {
        FieldUpdate {
            descriptor,
            contexts: AHashMap::new(),
        }
    }

    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    pub fn contexts(&self) -> &AHashMap<Option<String>, Vec<UpdateOperation>> {
        &self.contexts
    }

    /// Operations for a context, in the order they were accumulated.
    pub fn operations(&self, context: Option<&str>) -> &[UpdateOperation] {
        self.contexts
            .get(&context.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A partial update of one document.
///
/// Each `(field, context)` pair holds an insertion-ordered sequence of
/// operations. Appending an operation equal in kind and value to one already
/// present is a no-op.
///
/// # Examples
///
/// ```
/// use glaive::schema::FieldDescriptorBuilder;
/// use glaive::update::Update;
///
/// let title = FieldDescriptorBuilder::new().build_text_field("title").unwrap();
///
/// let mut update = Update::new("1");
/// update.set(&title, "A").unwrap().set(&title, "A").unwrap();
///
/// assert_eq!(update.operations("title", None).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    id: String,
    context: Option<String>,
    options: AHashMap<String, FieldUpdate>,
}

impl Update {
    /// Start an update with no operations and no default context.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Update {
            id: id.into(),
            context: None,
            options: AHashMap::new(),
        }
    }

    /// Start an update whose operations default to `context`.
    pub fn with_context<S: Into<String>, C: Into<String>>(id: S, context: C) -> Self {
        let mut update = Self::new(id);
        update.context = Some(context.into());
        update
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the context used by operations that do not name one.
    pub fn context<C: Into<String>>(&mut self, context: C) -> &mut Self {
        self.context = Some(context.into());
        self
    }

    pub fn get_context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The accumulated payload, keyed by field name.
    pub fn get_options(&self) -> &AHashMap<String, FieldUpdate> {
        &self.options
    }

    /// Operations of one field and context.
    pub fn operations(&self, field: &str, context: Option<&str>) -> &[UpdateOperation] {
        self.options
            .get(field)
            .map(|f| f.operations(context))
            .unwrap_or_default()
    }

    /// Replace the field value. A null or empty value deletes the field.
    pub fn set<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        value: V,
    ) -> Result<&mut Self> {
        let context = self.context.clone();
        self.set_contextualized(descriptor, context.as_deref(), value)
    }

    pub fn set_contextualized<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        value: V,
    ) -> Result<&mut Self> {
        let value = value.into();
        validation::check_value(descriptor, &value)?;
        if value.is_empty() {
            trace!(
                "update '{}': set on '{}' with no value becomes a field delete",
                self.id,
                descriptor.name()
            );
            return self.remove_contextualized(descriptor, context);
        }
        self.append(
            descriptor,
            context,
            UpdateOperation::new(UpdateOperationKind::Set, value),
        )?;
        Ok(self)
    }

    /// Append values to a multi-valued field.
    pub fn add<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        values: V,
    ) -> Result<&mut Self> {
        let context = self.context.clone();
        self.add_contextualized(descriptor, context.as_deref(), values)
    }

    pub fn add_contextualized<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        values: V,
    ) -> Result<&mut Self> {
        let values = to_list(descriptor, values.into())?;
        self.append(
            descriptor,
            context,
            UpdateOperation::new(UpdateOperationKind::Add, values),
        )?;
        Ok(self)
    }

    /// Delete the whole field.
    pub fn remove(&mut self, descriptor: &Arc<FieldDescriptor>) -> Result<&mut Self> {
        let context = self.context.clone();
        self.remove_contextualized(descriptor, context.as_deref())
    }

    pub fn remove_contextualized(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
    ) -> Result<&mut Self> {
        self.append(descriptor, context, UpdateOperation::delete())?;
        Ok(self)
    }

    /// Remove values from a multi-valued field. No values deletes the field.
    pub fn remove_values<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        values: V,
    ) -> Result<&mut Self> {
        let context = self.context.clone();
        self.remove_values_contextualized(descriptor, context.as_deref(), values)
    }

    pub fn remove_values_contextualized<V: Into<Value>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        values: V,
    ) -> Result<&mut Self> {
        let values = values.into();
        if values.is_empty() {
            trace!(
                "update '{}': remove on '{}' with no values becomes a field delete",
                self.id,
                descriptor.name()
            );
            return self.remove_contextualized(descriptor, context);
        }
        let values = to_list(descriptor, values)?;
        self.append(
            descriptor,
            context,
            UpdateOperation::new(UpdateOperationKind::Remove, values),
        )?;
        Ok(self)
    }

    /// Remove every value of a text field matching `pattern`.
    pub fn remove_regex(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        pattern: &str,
    ) -> Result<&mut Self> {
        let context = self.context.clone();
        self.remove_regex_contextualized(descriptor, context.as_deref(), pattern)
    }

    pub fn remove_regex_contextualized(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        pattern: &str,
    ) -> Result<&mut Self> {
        let text = descriptor.value_type().is_text()
            || descriptor.store_type().is_some_and(|t| t.is_text());
        if !text {
            return Err(GlaiveError::type_mismatch(
                descriptor.name(),
                "text",
                descriptor.value_type(),
            ));
        }
        Regex::new(pattern).map_err(|e| {
            GlaiveError::invalid_argument(format!("invalid pattern '{pattern}': {e}"))
        })?;
        self.append(
            descriptor,
            context,
            UpdateOperation::new(UpdateOperationKind::RemoveRegex, Value::from(pattern)),
        )?;
        Ok(self)
    }

    /// Increment a numeric field by `amount`.
    pub fn increment<V: Into<FieldValue>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        amount: V,
    ) -> Result<&mut Self> {
        let context = self.context.clone();
        self.increment_contextualized(descriptor, context.as_deref(), amount)
    }

    pub fn increment_contextualized<V: Into<FieldValue>>(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        amount: V,
    ) -> Result<&mut Self> {
        if !descriptor.value_type().is_numeric() {
            return Err(GlaiveError::type_mismatch(
                descriptor.name(),
                "a numeric type",
                descriptor.value_type(),
            ));
        }
        let amount: FieldValue = amount.into();
        validation::check_scalar(descriptor, &amount)?;
        self.append(
            descriptor,
            context,
            UpdateOperation::new(UpdateOperationKind::Inc, Value::Single(amount)),
        )?;
        Ok(self)
    }

    /// Operations of one field must all go through the same descriptor.
    fn append(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        context: Option<&str>,
        operation: UpdateOperation,
    ) -> Result<()> {
        let field = self
            .options
            .entry(descriptor.name().to_string())
            .or_insert_with(|| FieldUpdate::new(Arc::clone(descriptor)));
        if !Arc::ptr_eq(&field.descriptor, descriptor) {
            return Err(GlaiveError::invalid_argument(format!(
                "update '{}' already holds operations for another descriptor named '{}'",
                self.id,
                descriptor.name()
            )));
        }
        let operations = field
            .contexts
            .entry(context.map(str::to_string))
            .or_default();

        if operations.contains(&operation) {
            trace!(
                "update '{}': dropped duplicate {} on '{}'",
                self.id,
                operation,
                descriptor.name()
            );
        } else {
            operations.push(operation);
        }
        Ok(())
    }
}

/// Validate an additive payload and capture it as a list.
fn to_list(descriptor: &FieldDescriptor, values: Value) -> Result<Value> {
    if !descriptor.is_multi_value() {
        return Err(GlaiveError::not_multi_valued(descriptor.name()));
    }
    validation::check_value(descriptor, &values)?;
    Ok(match values {
        Value::Null => Value::Multi(Vec::new()),
        other => other.into_multi(),
    })
}

//! The field check contract shared by documents, updates and inverse-search
//! meta fields.
//!
//! Every mutation runs [`check_field`] before touching any state:
//!
//! 1. reserved names (`""`, `_id_`, `_type_`) are rejected,
//! 2. the field must exist in the schema,
//! 3. `Null` values pass without type checking,
//! 4. collections require a multi-valued field and every element must be
//!    assignable to the declared type (or the store type of a complex field),
//! 5. scalars must be assignable to the declared type (or store type).

use std::sync::Arc;

use ahash::AHashMap;

use crate::document::field_value::{FieldValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::field::FieldDescriptor;

/// Reserved name of the identity pseudo-field.
pub const ID_FIELD: &str = "_id_";

/// Reserved name of the type pseudo-field.
pub const TYPE_FIELD: &str = "_type_";

/// Name-keyed schema fields.
pub type FieldMap = AHashMap<String, Arc<FieldDescriptor>>;

/// Check if a name can never be used for an ordinary field.
pub fn is_reserved(name: &str) -> bool {
    name.is_empty() || name == ID_FIELD || name == TYPE_FIELD
}

/// Resolve a field by name, rejecting reserved and unknown names.
pub fn check_field_exists<'a>(
    fields: &'a FieldMap,
    name: &str,
) -> Result<&'a Arc<FieldDescriptor>> {
    if is_reserved(name) {
        return Err(GlaiveError::reserved_field_name(name));
    }
    fields
        .get(name)
        .ok_or_else(|| GlaiveError::field_not_found(name))
}

/// Check a value against a descriptor.
pub fn check_value(descriptor: &FieldDescriptor, value: &Value) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Single(scalar) => check_scalar(descriptor, scalar),
        Value::Multi(values) => {
            if !descriptor.is_multi_value() {
                return Err(GlaiveError::not_multi_valued(descriptor.name()));
            }
            values.iter().try_for_each(|v| check_scalar(descriptor, v))
        }
    }
}

/// Check a single scalar against a descriptor.
pub fn check_scalar(descriptor: &FieldDescriptor, value: &FieldValue) -> Result<()> {
    if descriptor.accepts(value) {
        return Ok(());
    }
    let expected = match descriptor.store_type() {
        Some(store) => format!("{} or {}", descriptor.value_type(), store),
        None => descriptor.value_type().to_string(),
    };
    Err(GlaiveError::type_mismatch(
        descriptor.name(),
        expected,
        value.value_type(),
    ))
}

/// Run the full contract: name, existence, then value type.
pub fn check_field<'a>(
    fields: &'a FieldMap,
    name: &str,
    value: &Value,
) -> Result<&'a Arc<FieldDescriptor>> {
    let descriptor = check_field_exists(fields, name)?;
    check_value(descriptor, value)?;
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::FieldDescriptorBuilder;
    use crate::schema::field::ValueType;

    fn fields() -> FieldMap {
        let builder = FieldDescriptorBuilder::new();
        let mut fields = FieldMap::new();
        for field in [
            builder.build_text_field("title").unwrap(),
            builder
                .build_multivalued_numeric_field("category", ValueType::Long)
                .unwrap(),
        ] {
            fields.insert(field.name().to_string(), field);
        }
        fields
    }

    #[test]
    fn test_reserved_names() {
        let fields = fields();
        for name in ["", ID_FIELD, TYPE_FIELD] {
            assert!(matches!(
                check_field(&fields, name, &Value::Null),
                Err(GlaiveError::ReservedFieldName(_))
            ));
        }
    }

    #[test]
    fn test_unknown_field() {
        assert!(matches!(
            check_field(&fields(), "missing", &Value::Null),
            Err(GlaiveError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_null_skips_type_check() {
        assert!(check_field(&fields(), "title", &Value::Null).is_ok());
    }

    #[test]
    fn test_scalar_type_check() {
        let fields = fields();
        assert!(check_field(&fields, "title", &"hello".into()).is_ok());

        match check_field(&fields, "title", &42_i64.into()) {
            Err(GlaiveError::TypeMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "title");
                assert_eq!(expected, "text");
                assert_eq!(actual, "long");
            }
            other => panic!("Expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_collection_checks() {
        let fields = fields();
        assert!(check_field(&fields, "category", &vec![1_i64, 2].into()).is_ok());
        assert!(matches!(
            check_field(&fields, "title", &vec!["a", "b"].into()),
            Err(GlaiveError::NotMultiValued(_))
        ));

        let mixed = Value::Multi(vec![FieldValue::Long(1), FieldValue::from("two")]);
        assert!(matches!(
            check_field(&fields, "category", &mixed),
            Err(GlaiveError::TypeMismatch { .. })
        ));
    }
}

//! Field value types for documents.
//!
//! This module defines the [`FieldValue`] enum, one variant per member of the
//! supported value-type family, and the [`Value`] container that a document
//! stores per field and context: nothing (`Null`), a single scalar, or an
//! insertion-ordered collection of scalars.
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Integer** / **Long** - 32 and 64-bit signed integers
//! - **Float** / **Double** - 32 and 64-bit floating-point numbers
//! - **Boolean** - true/false values
//! - **Date** - zoned date-times
//! - **UtilDate** - UTC instants
//! - **Location** - Geographic coordinates (latitude/longitude)
//! - **Binary** - Raw byte data
//! - **Object** - Domain objects feeding complex fields
//!
//! # Examples
//!
//! ```
//! use glaive::document::field_value::{FieldValue, Value};
//!
//! let text: Value = "hello".into();
//! assert_eq!(text, Value::Single(FieldValue::Text("hello".to_string())));
//!
//! let numbers: Value = vec![1_i64, 2, 3].into();
//! assert_eq!(numbers.len(), 3);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::document::geo::GeoPoint;
use crate::schema::field::{ObjectType, ValueType};

/// A type-erased domain object, the raw input of a complex field.
///
/// Two object values are equal only when they share the same allocation.
#[derive(Clone)]
pub struct ObjectValue {
    inner: Arc<dyn Any + Send + Sync>,
    object_type: ObjectType,
}

impl ObjectValue {
    /// Wrap a domain object.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared domain object without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        ObjectValue {
            inner: value,
            object_type: ObjectType::of::<T>(),
        }
    }

    /// The runtime type of the wrapped object.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Borrow the wrapped object as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub(crate) fn as_any(&self) -> &dyn Any {
        self.inner.as_ref()
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectValue(<{}>)", self.object_type.name())
    }
}

/// A single scalar stored in a document field.
///
/// Object values only exist in memory; serializing one fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// 32-bit integer value
    Integer(i32),
    /// 64-bit integer value
    Long(i64),
    /// 32-bit floating point value
    Float(f32),
    /// 64-bit floating point value
    Double(f64),
    /// Boolean value
    Boolean(bool),
    /// Zoned date-time value
    Date(DateTime<FixedOffset>),
    /// UTC instant value
    UtilDate(DateTime<Utc>),
    /// Geographic point value
    Location(GeoPoint),
    /// Binary data
    Binary(Vec<u8>),
    /// Domain object of a complex field
    #[serde(skip)]
    Object(ObjectValue),
}

impl FieldValue {
    /// Wrap a domain object for a complex field.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        FieldValue::Object(ObjectValue::new(value))
    }

    /// The runtime type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldValue::Text(_) => ValueType::Text,
            FieldValue::Integer(_) => ValueType::Integer,
            FieldValue::Long(_) => ValueType::Long,
            FieldValue::Float(_) => ValueType::Float,
            FieldValue::Double(_) => ValueType::Double,
            FieldValue::Boolean(_) => ValueType::Boolean,
            FieldValue::Date(_) => ValueType::Date,
            FieldValue::UtilDate(_) => ValueType::UtilDate,
            FieldValue::Location(_) => ValueType::Location,
            FieldValue::Binary(_) => ValueType::Binary,
            FieldValue::Object(object) => ValueType::Object(object.object_type()),
        }
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any numeric value to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Long(l) => Some(*l as f64),
            FieldValue::Float(f) => Some(*f as f64),
            FieldValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Convert to GeoPoint if this is a location value.
    pub fn as_location(&self) -> Option<&GeoPoint> {
        match self {
            FieldValue::Location(point) => Some(point),
            _ => None,
        }
    }

    /// Get the value as binary data, if possible.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the domain object if this is an object value.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            FieldValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Long(l) => write!(f, "{l}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Double(v) => write!(f, "{v}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            FieldValue::UtilDate(d) => write!(f, "{}", d.to_rfc3339()),
            FieldValue::Location(p) => write!(f, "{p}"),
            FieldValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            FieldValue::Object(o) => write!(f, "<{}>", o.object_type().name()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Single(FieldValue::$variant(value))
                }
            }
        )*
    };
}

impl_from_scalar! {
    String => Text,
    i32 => Integer,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Boolean,
    DateTime<FixedOffset> => Date,
    DateTime<Utc> => UtilDate,
    GeoPoint => Location,
    ObjectValue => Object,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Binary(value)
    }
}

/// The content of one field in one context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// No value
    #[default]
    Null,
    /// A single scalar
    Single(FieldValue),
    /// An insertion-ordered collection of scalars
    Multi(Vec<FieldValue>),
}

impl Value {
    /// Build a collection value.
    pub fn multi<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Value::Multi(values.into_iter().map(Into::into).collect())
    }

    /// Check if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is a collection.
    pub fn is_multi(&self) -> bool {
        matches!(self, Value::Multi(_))
    }

    /// Get the scalar if this is a single value.
    pub fn as_single(&self) -> Option<&FieldValue> {
        match self {
            Value::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Get the elements if this is a collection.
    pub fn as_multi(&self) -> Option<&[FieldValue]> {
        match self {
            Value::Multi(values) => Some(values),
            _ => None,
        }
    }

    /// Number of scalars held.
    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Single(_) => 1,
            Value::Multi(values) => values.len(),
        }
    }

    /// Check if no scalar is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the scalars held, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        match self {
            Value::Null => <&[FieldValue]>::default().iter(),
            Value::Single(value) => std::slice::from_ref(value).iter(),
            Value::Multi(values) => values.iter(),
        }
    }

    /// Turn a single value into a one-element collection.
    pub fn into_multi(self) -> Self {
        match self {
            Value::Single(value) => Value::Multi(vec![value]),
            other => other,
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        Value::Single(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Single(FieldValue::Text(value.to_string()))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::multi(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Single(value) => write!(f, "{value}"),
            Value::Multi(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Types that can be read back out of a [`FieldValue`].
pub trait FromFieldValue: Sized {
    /// Name used in cast error messages.
    fn type_name() -> &'static str;

    /// Extract `Self`, or `None` when the variant does not match.
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_from_field_value {
    ($($ty:ty => $variant:ident, $name:expr);* $(;)?) => {
        $(
            impl FromFieldValue for $ty {
                fn type_name() -> &'static str {
                    $name
                }

                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_field_value! {
    String => Text, "text";
    i32 => Integer, "integer";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
    bool => Boolean, "boolean";
    DateTime<FixedOffset> => Date, "date";
    DateTime<Utc> => UtilDate, "util_date";
    GeoPoint => Location, "location";
    Vec<u8> => Binary, "binary";
    ObjectValue => Object, "object";
}

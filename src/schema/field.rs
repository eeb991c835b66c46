//! Field descriptors for schema definition.
//!
//! A [`FieldDescriptor`] is the immutable description of one document field:
//! its declared [`ValueType`], whether it holds one value or a collection, and
//! the flags a backend translator needs (stored, indexed, full-text, facet,
//! suggest, sortable, language, boost, metadata).
//!
//! Descriptors are shared as `Arc<FieldDescriptor>` between a
//! [`DocumentFactory`](crate::schema::DocumentFactory) and every document it
//! mints. The only state that ever changes after construction is the
//! `contextualized` flag, which flips once from `false` to `true` the first
//! time any document writes a value under a non-default context.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::document::field_value::{FieldValue, Value};
use crate::error::{GlaiveError, Result};
use crate::schema::complex::ComplexProjections;

/// Runtime identity of a domain type used by complex fields.
#[derive(Clone, Copy)]
pub struct ObjectType {
    type_id: TypeId,
    name: &'static str,
}

impl ObjectType {
    /// The object type of `T`.
    pub fn of<T: Any>() -> Self {
        ObjectType {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The Rust type name, for messages only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType({})", self.name)
    }
}

/// The closed family of value types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// UTF-8 text
    Text,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// true/false
    Boolean,
    /// Date-time with a zone offset
    Date,
    /// UTC instant
    UtilDate,
    /// Latitude/longitude pair
    Location,
    /// Raw bytes
    Binary,
    /// A caller-defined domain type; only valid as the input of a complex field
    Object(ObjectType),
}

impl ValueType {
    /// The stable lower-case name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::UtilDate => "util_date",
            ValueType::Location => "location",
            ValueType::Binary => "binary",
            ValueType::Object(object) => object.name(),
        }
    }

    /// Check if this is one of the indexable scalar types.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ValueType::Object(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ValueType::Text)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Integer | ValueType::Long | ValueType::Float | ValueType::Double
        )
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ValueType::Date | ValueType::UtilDate)
    }

    pub fn is_location(&self) -> bool {
        matches!(self, ValueType::Location)
    }

    /// Check if a runtime value is assignable to this type.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        value.value_type() == *self
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ValueType {
    type Err = GlaiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "string" => Ok(ValueType::Text),
            "integer" | "int" => Ok(ValueType::Integer),
            "long" => Ok(ValueType::Long),
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            "boolean" | "bool" => Ok(ValueType::Boolean),
            "date" | "zoned_date_time" => Ok(ValueType::Date),
            "util_date" | "instant" => Ok(ValueType::UtilDate),
            "location" | "geo" => Ok(ValueType::Location),
            "binary" | "bytes" => Ok(ValueType::Binary),
            other => Err(GlaiveError::invalid_field_type(format!(
                "unknown value type '{other}'"
            ))),
        }
    }
}

/// Whether a field holds one value or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    Single,
    Multi,
}

/// Language hint for full-text analysis in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "ja")]
    Japanese,
}

impl Language {
    /// ISO 639-1 code, or "none".
    pub fn code(&self) -> &'static str {
        match self {
            Language::None => "none",
            Language::English => "en",
            Language::German => "de",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Dutch => "nl",
            Language::Japanese => "ja",
        }
    }
}

/// Projection computing the sort key of a stored value.
pub type SortProjection = Arc<dyn Fn(&Value) -> Option<FieldValue> + Send + Sync>;

/// Immutable description of one schema field.
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) stored: bool,
    pub(crate) indexed: bool,
    pub(crate) full_text: bool,
    pub(crate) facet: bool,
    pub(crate) suggest: bool,
    pub(crate) multi_value: bool,
    pub(crate) sortable: bool,
    pub(crate) contextualized: AtomicBool,
    pub(crate) language: Language,
    pub(crate) boost: f32,
    pub(crate) metadata: BTreeMap<String, String>,
    pub(crate) sort: Option<SortProjection>,
    pub(crate) complex: Option<ComplexProjections>,
}

impl FieldDescriptor {
    /// Create a single-valued descriptor with default flags.
    ///
    /// Fails with [`GlaiveError::InvalidFieldType`] when `value_type` is not a
    /// member of the supported family.
    pub fn new<S: Into<String>>(name: S, value_type: ValueType) -> Result<Self> {
        let name = name.into();
        if !value_type.is_supported() {
            return Err(GlaiveError::invalid_field_type(format!(
                "field '{name}' cannot declare type {value_type}"
            )));
        }
        Ok(Self::unchecked(name, value_type))
    }

    pub(crate) fn unchecked(name: String, value_type: ValueType) -> Self {
        FieldDescriptor {
            name,
            value_type,
            stored: true,
            indexed: true,
            full_text: false,
            facet: false,
            suggest: false,
            multi_value: false,
            sortable: false,
            contextualized: AtomicBool::new(false),
            language: Language::None,
            boost: 1.0,
            metadata: BTreeMap::new(),
            sort: None,
            complex: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type. For complex fields this is the domain type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn is_full_text(&self) -> bool {
        self.full_text
    }

    pub fn is_facet(&self) -> bool {
        self.facet
    }

    pub fn is_suggest(&self) -> bool {
        self.suggest
    }

    pub fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    pub fn multiplicity(&self) -> Multiplicity {
        if self.multi_value {
            Multiplicity::Multi
        } else {
            Multiplicity::Single
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Check if any document has written this field under a non-default context.
    pub fn is_contextualized(&self) -> bool {
        self.contextualized.load(Ordering::Acquire)
    }

    /// Flip the shared contextualized flag. Returns `true` on the first flip.
    pub(crate) fn mark_contextualized(&self) -> bool {
        let first = !self.contextualized.swap(true, Ordering::AcqRel);
        if first {
            log::debug!("field '{}' is now contextualized", self.name);
        }
        first
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Check if this field derives its representations from a domain object.
    pub fn is_complex(&self) -> bool {
        self.complex.is_some()
    }

    /// The projections of a complex field.
    pub fn complex(&self) -> Option<&ComplexProjections> {
        self.complex.as_ref()
    }

    /// The type a value must have to be stored in a complex field without
    /// going through its domain type.
    pub fn store_type(&self) -> Option<ValueType> {
        self.complex.as_ref().map(|c| c.store_type())
    }

    /// The type filter operands are checked against: the facet type for
    /// complex fields, the declared type otherwise.
    pub fn filter_type(&self) -> ValueType {
        self.complex
            .as_ref()
            .map(|c| c.facet_type())
            .unwrap_or(self.value_type)
    }

    /// Check if a runtime value is assignable to this field, either to the
    /// declared type or, for complex fields, to the store type.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        self.value_type.accepts(value)
            || self
                .store_type()
                .map(|store| store.accepts(value))
                .unwrap_or(false)
    }

    /// Check if an explicit sort projection was installed.
    pub fn has_sort_function(&self) -> bool {
        self.sort.is_some()
    }

    /// Compute the sort key of a stored value.
    ///
    /// Multi-valued fields without an explicit sort projection sort on their
    /// first element, which depends on insertion order.
    pub fn sort_value(&self, value: &Value) -> Option<FieldValue> {
        match &self.sort {
            Some(sort) => sort(value),
            None => match value {
                Value::Null => None,
                Value::Single(v) => Some(v.clone()),
                Value::Multi(values) => values.first().cloned(),
            },
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("stored", &self.stored)
            .field("indexed", &self.indexed)
            .field("full_text", &self.full_text)
            .field("facet", &self.facet)
            .field("suggest", &self.suggest)
            .field("multi_value", &self.multi_value)
            .field("sortable", &self.sortable)
            .field("contextualized", &self.is_contextualized())
            .field("language", &self.language)
            .field("boost", &self.boost)
            .field("metadata", &self.metadata)
            .field("sort", &self.sort.as_ref().map(|_| "<fn>"))
            .field("complex", &self.complex)
            .finish()
    }
}

/// Ad hoc JSON-like rendering for logs. Not escaped and not stable.
impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"name\":\"{}\",\"type\":\"{}\",\"stored\":{},\"indexed\":{},\"fullText\":{},\
             \"facet\":{},\"suggest\":{},\"multiValue\":{},\"sortable\":{},\
             \"contextualized\":{},\"language\":\"{}\",\"boost\":{},\"complex\":{},\"metadata\":{{",
            self.name,
            self.value_type,
            self.stored,
            self.indexed,
            self.full_text,
            self.facet,
            self.suggest,
            self.multi_value,
            self.sortable,
            self.is_contextualized(),
            self.language.code(),
            self.boost,
            self.is_complex(),
        )?;
        for (i, (key, value)) in self.metadata.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "\"{key}\":\"{value}\"")?;
        }
        write!(f, "}}}}")
    }
}

//! Backend-agnostic filter expressions.
//!
//! Filters are built from field descriptors so their operands are checked
//! against the field kind before a backend translator ever sees them:
//!
//! ```
//! use glaive::filter::{Filter, FilterScope};
//! use glaive::schema::{FieldDescriptorBuilder, ValueType};
//!
//! let builder = FieldDescriptorBuilder::new().facet(true);
//! let title = builder.build_text_field("title").unwrap();
//! let price = builder.build_numeric_field("price", ValueType::Double).unwrap();
//!
//! let filter = Filter::and(vec![
//!     title.filter().prefix("Du").unwrap(),
//!     price.filter().scope(FilterScope::Facet).between(5.0, 20.0).unwrap(),
//! ]);
//!
//! let blob = filter.to_bytes().unwrap();
//! assert_eq!(Filter::from_bytes(&blob).unwrap(), filter);
//! ```
//!
//! Translation into a concrete query language is left to the backend.

use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;
use crate::document::geo::{GeoBoundingBox, GeoPoint};
use crate::error::{GlaiveError, Result};
use crate::schema::field::{FieldDescriptor, ValueType};

/// Which representation of a field a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterScope {
    #[default]
    Filter,
    Facet,
    Suggest,
}

/// The field, scope and context a filter leaf targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTarget {
    pub field: String,
    pub scope: FilterScope,
    pub context: Option<String>,
}

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    Term {
        target: FieldTarget,
        value: FieldValue,
    },
    Terms {
        target: FieldTarget,
        values: Vec<FieldValue>,
    },
    Prefix {
        target: FieldTarget,
        prefix: String,
    },
    /// Inclusive numeric range.
    Between {
        target: FieldTarget,
        start: FieldValue,
        end: FieldValue,
    },
    GreaterThan {
        target: FieldTarget,
        value: FieldValue,
    },
    LessThan {
        target: FieldTarget,
        value: FieldValue,
    },
    Before {
        target: FieldTarget,
        date: FieldValue,
    },
    After {
        target: FieldTarget,
        date: FieldValue,
    },
    /// Inclusive date range.
    BetweenDates {
        target: FieldTarget,
        start: FieldValue,
        end: FieldValue,
    },
    WithinBBox {
        target: FieldTarget,
        bbox: GeoBoundingBox,
    },
    WithinCircle {
        target: FieldTarget,
        center: GeoPoint,
        radius_km: f64,
    },
    NotEmpty {
        target: FieldTarget,
    },
    Empty {
        target: FieldTarget,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// The target of a leaf; `None` for combinators.
    pub fn target(&self) -> Option<&FieldTarget> {
        match self {
            Filter::Term { target, .. }
            | Filter::Terms { target, .. }
            | Filter::Prefix { target, .. }
            | Filter::Between { target, .. }
            | Filter::GreaterThan { target, .. }
            | Filter::LessThan { target, .. }
            | Filter::Before { target, .. }
            | Filter::After { target, .. }
            | Filter::BetweenDates { target, .. }
            | Filter::WithinBBox { target, .. }
            | Filter::WithinCircle { target, .. }
            | Filter::NotEmpty { target }
            | Filter::Empty { target } => Some(target),
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => None,
        }
    }

    /// Names of every field referenced by this tree, in traversal order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a str>) {
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                filters.iter().for_each(|f| f.collect_fields(fields))
            }
            Filter::Not(filter) => filter.collect_fields(fields),
            leaf => {
                if let Some(target) = leaf.target() {
                    fields.push(target.field.as_str());
                }
            }
        }
    }

    /// Encode as an opaque blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GlaiveError::serialization(e.to_string()))
    }

    /// Decode a blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| GlaiveError::serialization(e.to_string()))
    }
}

impl FieldDescriptor {
    /// Start building a filter on this field.
    pub fn filter(&self) -> FieldFilter<'_> {
        FieldFilter {
            descriptor: self,
            scope: FilterScope::Filter,
            context: None,
        }
    }
}

/// Type-checked filter constructors for one field.
#[derive(Debug, Clone)]
pub struct FieldFilter<'a> {
    descriptor: &'a FieldDescriptor,
    scope: FilterScope,
    context: Option<String>,
}

impl<'a> FieldFilter<'a> {
    pub fn scope(mut self, scope: FilterScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn term<V: Into<FieldValue>>(&self, value: V) -> Result<Filter> {
        let value = self.operand(value.into())?;
        Ok(Filter::Term {
            target: self.target()?,
            value,
        })
    }

    pub fn terms<I, V>(&self, values: I) -> Result<Filter>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values
            .into_iter()
            .map(|v| self.operand(v.into()))
            .collect::<Result<Vec<_>>>()?;
        if values.is_empty() {
            return Err(GlaiveError::invalid_argument(format!(
                "terms filter on '{}' needs at least one value",
                self.descriptor.name()
            )));
        }
        Ok(Filter::Terms {
            target: self.target()?,
            values,
        })
    }

    pub fn prefix<S: Into<String>>(&self, prefix: S) -> Result<Filter> {
        self.require("text", ValueType::is_text)?;
        Ok(Filter::Prefix {
            target: self.target()?,
            prefix: prefix.into(),
        })
    }

    pub fn between<V: Into<FieldValue>>(&self, start: V, end: V) -> Result<Filter> {
        self.require("a numeric type", ValueType::is_numeric)?;
        let (start, end) = self.range(start.into(), end.into())?;
        Ok(Filter::Between {
            target: self.target()?,
            start,
            end,
        })
    }

    pub fn greater_than<V: Into<FieldValue>>(&self, value: V) -> Result<Filter> {
        self.require("a numeric type", ValueType::is_numeric)?;
        let value = self.operand(value.into())?;
        Ok(Filter::GreaterThan {
            target: self.target()?,
            value,
        })
    }

    pub fn less_than<V: Into<FieldValue>>(&self, value: V) -> Result<Filter> {
        self.require("a numeric type", ValueType::is_numeric)?;
        let value = self.operand(value.into())?;
        Ok(Filter::LessThan {
            target: self.target()?,
            value,
        })
    }

    pub fn before<V: Into<FieldValue>>(&self, date: V) -> Result<Filter> {
        self.require("a date type", ValueType::is_date)?;
        let date = self.operand(date.into())?;
        Ok(Filter::Before {
            target: self.target()?,
            date,
        })
    }

    pub fn after<V: Into<FieldValue>>(&self, date: V) -> Result<Filter> {
        self.require("a date type", ValueType::is_date)?;
        let date = self.operand(date.into())?;
        Ok(Filter::After {
            target: self.target()?,
            date,
        })
    }

    pub fn between_dates<V: Into<FieldValue>>(&self, start: V, end: V) -> Result<Filter> {
        self.require("a date type", ValueType::is_date)?;
        let (start, end) = self.range(start.into(), end.into())?;
        Ok(Filter::BetweenDates {
            target: self.target()?,
            start,
            end,
        })
    }

    pub fn within_bbox(&self, bbox: GeoBoundingBox) -> Result<Filter> {
        self.require("location", ValueType::is_location)?;
        Ok(Filter::WithinBBox {
            target: self.target()?,
            bbox,
        })
    }

    pub fn within_circle(&self, center: GeoPoint, radius_km: f64) -> Result<Filter> {
        self.require("location", ValueType::is_location)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GlaiveError::invalid_argument(format!(
                "radius must be positive, got {radius_km}"
            )));
        }
        Ok(Filter::WithinCircle {
            target: self.target()?,
            center,
            radius_km,
        })
    }

    pub fn not_empty(&self) -> Result<Filter> {
        Ok(Filter::NotEmpty {
            target: self.target()?,
        })
    }

    pub fn empty(&self) -> Result<Filter> {
        Ok(Filter::Empty {
            target: self.target()?,
        })
    }

    fn target(&self) -> Result<FieldTarget> {
        let enabled = match self.scope {
            FilterScope::Filter => true,
            FilterScope::Facet => self.descriptor.is_facet(),
            FilterScope::Suggest => self.descriptor.is_suggest(),
        };
        if !enabled {
            return Err(GlaiveError::invalid_argument(format!(
                "field '{}' is not enabled for {:?} filters",
                self.descriptor.name(),
                self.scope
            )));
        }
        Ok(FieldTarget {
            field: self.descriptor.name().to_string(),
            scope: self.scope,
            context: self.context.clone(),
        })
    }

    fn require(&self, expected: &str, kind: fn(&ValueType) -> bool) -> Result<()> {
        let actual = self.descriptor.filter_type();
        if kind(&actual) {
            Ok(())
        } else {
            Err(GlaiveError::type_mismatch(self.descriptor.name(), expected, actual))
        }
    }

    fn operand(&self, value: FieldValue) -> Result<FieldValue> {
        let expected = self.descriptor.filter_type();
        if expected.accepts(&value) {
            Ok(value)
        } else {
            Err(GlaiveError::type_mismatch(
                self.descriptor.name(),
                expected,
                value.value_type(),
            ))
        }
    }

    fn range(&self, start: FieldValue, end: FieldValue) -> Result<(FieldValue, FieldValue)> {
        let start = self.operand(start)?;
        let end = self.operand(end)?;
        let ordered = match (&start, &end) {
            (FieldValue::Date(a), FieldValue::Date(b)) => a <= b,
            (FieldValue::UtilDate(a), FieldValue::UtilDate(b)) => a <= b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a <= b,
                _ => true,
            },
        };
        if !ordered {
            return Err(GlaiveError::invalid_argument(format!(
                "range on '{}' starts after it ends: {start} > {end}",
                self.descriptor.name()
            )));
        }
        Ok((start, end))
    }
}

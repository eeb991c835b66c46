//! Schema module for Glaive.
//!
//! This module provides field descriptors, their builders, complex fields
//! derived from domain objects, and the document factories that bind them
//! into immutable schemas.

pub mod builder;
pub mod complex;
pub mod config;
pub mod factory;
pub mod field;
pub mod validation;

// Re-export commonly used types
pub use builder::FieldDescriptorBuilder;
pub use complex::{ComplexFieldDescriptor, ComplexFieldDescriptorBuilder, ComplexProjections};
pub use config::{FieldConfig, SchemaConfig};
pub use factory::{DocumentFactory, DocumentFactoryBuilder};
pub use field::{FieldDescriptor, Language, Multiplicity, ObjectType, SortProjection, ValueType};
pub use validation::{FieldMap, ID_FIELD, TYPE_FIELD};

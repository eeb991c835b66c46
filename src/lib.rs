//! # Glaive
//!
//! A backend-agnostic typed document model for search engines.
//!
//! ## Features
//!
//! - Immutable schemas of typed field descriptors
//! - Complex fields derived from domain objects through projections
//! - Schema-bound documents with per-context, multi-valued storage
//! - Runtime type validation on every mutation
//! - Partial-update accumulation for atomic backend updates
//! - Type-checked filter expressions
//!
//! ## Example
//!
//! ```
//! use glaive::prelude::*;
//!
//! let builder = FieldDescriptorBuilder::new();
//! let factory = DocumentFactory::builder("Asset")
//!     .add_field(builder.build_text_field("title").unwrap())
//!     .unwrap()
//!     .add_field(builder.build_multivalued_numeric_field("category", ValueType::Long).unwrap())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut doc = factory.create_doc("1");
//! doc.set_value("title", "Dune").unwrap();
//! doc.set_values("category", [1_i64, 2, 3]).unwrap();
//!
//! assert_eq!(doc.get_values_as::<i64>("category").unwrap(), vec![1, 2, 3]);
//! assert!(doc.set_value("title", 42_i64).is_err());
//! ```

pub mod document;
pub mod error;
pub mod filter;
pub mod schema;
pub mod update;

pub mod prelude {
    pub use crate::document::{Document, FieldValue, GeoPoint, Value};
    pub use crate::error::{GlaiveError, Result};
    pub use crate::filter::{Filter, FilterScope};
    pub use crate::schema::{
        ComplexFieldDescriptorBuilder, DocumentFactory, FieldDescriptor, FieldDescriptorBuilder,
        Language, Multiplicity, ValueType,
    };
    pub use crate::update::{Update, UpdateOperation, UpdateOperationKind};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

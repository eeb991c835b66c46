//! Documents and the values they carry.
//!
//! This module provides the schema-bound document container and the values
//! stored in it. Documents are minted by a
//! [`DocumentFactory`](crate::schema::DocumentFactory) and can only hold the
//! fields its schema declares.
//!
//! # Core Components
//!
//! - [`document::Document`] - Per-field, per-context value storage with owned children
//! - [`field_value::FieldValue`] - One scalar of the supported type family
//! - [`field_value::Value`] - Null, a single scalar, or an ordered collection
//! - [`geo::GeoPoint`] - Geographic coordinates (lat/lon)
//!
//! # Examples
//!
//! ```
//! use glaive::document::Value;
//! use glaive::schema::{DocumentFactory, FieldDescriptorBuilder};
//!
//! let builder = FieldDescriptorBuilder::new();
//! let factory = DocumentFactory::builder("Book")
//!     .add_field(builder.build_text_field("title").unwrap())
//!     .unwrap()
//!     .add_field(builder.build_multivalued_text_field("authors").unwrap())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut doc = factory.create_doc("978-0441013593");
//! doc.set_value("title", "Dune").unwrap();
//! doc.add_value("authors", "Frank Herbert").unwrap();
//! doc.set_contextualized_value("title", Some("de"), "Der Wüstenplanet").unwrap();
//!
//! assert_eq!(doc.get_value("authors").unwrap(), Some(Value::multi(["Frank Herbert"])));
//! assert_eq!(doc.get_field_contexts("title").unwrap().len(), 2);
//! ```

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;
pub mod geo;

// Re-export commonly used types
pub use document::Document;
pub use field_value::{FieldValue, FromFieldValue, ObjectValue, Value};
pub use geo::{GeoBoundingBox, GeoPoint};

//! Error types for the Glaive library.
//!
//! Every failure in this crate is a usage or schema error detected
//! synchronously, before any state is touched. All of them are represented by
//! the [`GlaiveError`] enum.
//!
//! # Examples
//!
//! ```
//! use glaive::error::{GlaiveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(GlaiveError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Glaive operations.
#[derive(Error, Debug)]
pub enum GlaiveError {
    /// I/O errors (reading schema definitions)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The field is not part of the owning schema.
    #[error("Field not found: '{0}'")]
    FieldNotFound(String),

    /// The field name is null/empty or one of the reserved identity names.
    #[error("Reserved field name: '{0}'")]
    ReservedFieldName(String),

    /// A value does not match the declared type of a field.
    #[error("Type mismatch for field '{field}': expected {expected}, found {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// A collection or an additive operation was used on a single-valued field.
    #[error("Field '{0}' is not multi-valued")]
    NotMultiValued(String),

    /// A descriptor was declared with a type outside the supported family.
    #[error("Invalid field type: {0}")]
    InvalidFieldType(String),

    /// A typed read asked for a type the stored value cannot be cast to.
    #[error("Incompatible cast: {0}")]
    IncompatibleCast(String),

    /// A call precondition was violated.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with GlaiveError.
pub type Result<T> = std::result::Result<T, GlaiveError>;

impl GlaiveError {
    /// Create a new field not found error.
    pub fn field_not_found<S: Into<String>>(name: S) -> Self {
        GlaiveError::FieldNotFound(name.into())
    }

    /// Create a new reserved field name error.
    pub fn reserved_field_name<S: Into<String>>(name: S) -> Self {
        GlaiveError::ReservedFieldName(name.into())
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch<F, E, A>(field: F, expected: E, actual: A) -> Self
    where
        F: Into<String>,
        E: ToString,
        A: ToString,
    {
        GlaiveError::TypeMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a new not multi-valued error.
    pub fn not_multi_valued<S: Into<String>>(name: S) -> Self {
        GlaiveError::NotMultiValued(name.into())
    }

    /// Create a new invalid field type error.
    pub fn invalid_field_type<S: Into<String>>(msg: S) -> Self {
        GlaiveError::InvalidFieldType(msg.into())
    }

    /// Create a new incompatible cast error.
    pub fn incompatible_cast<S: Into<String>>(msg: S) -> Self {
        GlaiveError::IncompatibleCast(msg.into())
    }

    /// Create a new precondition error.
    pub fn precondition<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Precondition(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        GlaiveError::InvalidArgument(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Schema(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Other(msg.into())
    }
}

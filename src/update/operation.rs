//! Partial-update instructions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::field_value::Value;

/// The kind of a partial-update instruction.
///
/// Field deletion has no kind of its own: it is a [`Set`](Self::Set) with a
/// null payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOperationKind {
    Set,
    Add,
    Remove,
    RemoveRegex,
    Inc,
}

impl UpdateOperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOperationKind::Set => "set",
            UpdateOperationKind::Add => "add",
            UpdateOperationKind::Remove => "remove",
            UpdateOperationKind::RemoveRegex => "removeregex",
            UpdateOperationKind::Inc => "inc",
        }
    }
}

impl fmt::Display for UpdateOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One instruction of a partial update.
///
/// Two operations are duplicates iff both kind and value are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOperation {
    kind: UpdateOperationKind,
    value: Value,
}

impl UpdateOperation {
    pub fn new(kind: UpdateOperationKind, value: Value) -> Self {
        UpdateOperation { kind, value }
    }

    /// The field-level delete: `set` with a null payload.
    pub fn delete() -> Self {
        Self::new(UpdateOperationKind::Set, Value::Null)
    }

    pub fn kind(&self) -> UpdateOperationKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Check if this operation deletes the whole field.
    pub fn is_delete(&self) -> bool {
        self.kind == UpdateOperationKind::Set && self.value.is_null()
    }
}

impl fmt::Display for UpdateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.value)
    }
}

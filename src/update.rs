//! Partial updates.
//!
//! An [`Update`] accumulates instructions for an already indexed document,
//! keyed by field and context, for a backend translator to turn into an
//! atomic-update request.

pub mod operation;
#[allow(clippy::module_inception)]
pub mod update;

pub use operation::{UpdateOperation, UpdateOperationKind};
pub use update::{FieldUpdate, Update};

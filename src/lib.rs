// ============================================================================
// attrstore Library
// ============================================================================

//! Schema-on-write custom attribute store.
//!
//! An entity type (say, `"customer"`) is extended at runtime with named
//! fields; instances of that type then hold key/value attributes restricted
//! to the registered names. The classic EAV extension pattern, with the
//! validation engine as the core:
//!
//! - [`registry::FieldRegistry`] — permitted attribute names per entity type;
//! - [`attributes::AttributeStore`] — validated key/value records, one per
//!   `(owner, key)`;
//! - [`capability::Attributable`] — the trait entity types implement to read
//!   and write attributes scoped to themselves;
//! - [`AttributeDb`] — the facade wiring everything over a
//!   [`storage::RecordBackend`].
//!
//! Identifiers (type tags, keys) are normalized — trimmed and lowercased —
//! on every write and comparison. Validation failures are returned as values
//! ([`core::ValidationErrors`]); `Err` is reserved for store faults.

pub mod attributes;
pub mod capability;
pub mod core;
pub mod facade;
pub mod registry;
pub mod storage;

pub mod prelude;

// Re-export main types for convenience
pub use attributes::{AttributeRecord, AttributeStore, WriteOutcome};
pub use capability::Attributable;
pub use core::{
    EntityType, ErrorKind, FieldError, OwnerId, OwnerRef, Result, StoreError, ValidationErrors,
};
pub use facade::AttributeDb;
pub use registry::{FieldDefinition, FieldRegistry, RegisterOutcome};
pub use storage::{InMemoryBackend, RecordBackend, StoredRecord, TableSpec};

//! Recommended API entrypoints grouped by abstraction level.
//!
//! `dx` is the stable default for application code working with entity types
//! and their attributes. `advanced` is an explicit escape hatch for the
//! storage seam.

pub mod dx {
    //! Stable high-level surface: the facade, the capability trait and the
    //! value types application code matches on.
    pub use crate::{
        Attributable, AttributeDb, AttributeRecord, EntityType, ErrorKind, OwnerId, OwnerRef,
        RegisterOutcome, Result, StoreError, ValidationErrors, WriteOutcome,
    };
}

pub mod advanced {
    //! Escape hatch for the record-store seam and snapshot internals.
    //!
    //! App-level product code should normally stay on `prelude::dx`.
    pub use crate::storage::{
        Fields, InMemoryBackend, RecordBackend, StoreSnapshot, StoredRecord, Table, TableSpec,
    };
}

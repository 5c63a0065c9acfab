pub mod backend;
pub mod memory;
pub mod persistence;
pub mod table;

pub use backend::{Fields, RecordBackend, StoredRecord, TableSpec, fields};
pub use memory::InMemoryBackend;
pub use persistence::{SnapshotMetadata, StoreSnapshot};
pub use table::Table;

use crate::attributes::AttributeStore;
use crate::core::{OwnerRef, Result};
use crate::registry::FieldRegistry;
use crate::storage::{InMemoryBackend, RecordBackend, StoreSnapshot};
use lazy_static::lazy_static;
use std::path::Path;
use std::sync::Arc;

lazy_static! {
    static ref GLOBAL_DB: AttributeDb = AttributeDb::new();
}

/// The crate's entry point: wires a record backend, the field registry and
/// the attribute store together and bootstraps both tables.
///
/// # Examples
///
/// ```
/// use attrstore::AttributeDb;
/// use attrstore::core::{EntityType, OwnerRef};
///
/// # #[tokio::main]
/// # async fn main() -> attrstore::Result<()> {
/// let db = AttributeDb::new();
/// db.registry().register("customer", "email").await?;
///
/// let owner = OwnerRef::new(EntityType::new("customer"), "c-1");
/// let outcome = db.attributes().write(&owner, "email", "a@b.com").await?;
/// assert!(outcome.is_saved());
///
/// let value = db.attributes().read(&owner, "EMAIL").await?;
/// assert_eq!(value.as_deref(), Some("a@b.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AttributeDb {
    backend: Arc<dyn RecordBackend>,
    registry: FieldRegistry,
    attributes: AttributeStore,
}

impl AttributeDb {
    /// Fresh in-memory instance with both tables bootstrapped.
    pub fn new() -> Self {
        let backend: Arc<dyn RecordBackend> = Arc::new(InMemoryBackend::with_tables([
            FieldRegistry::table_spec(),
            AttributeStore::table_spec(),
        ]));
        Self::wire(backend)
    }

    /// Build over a caller-supplied backend (a different store, or a shared
    /// one). Bootstraps the two tables idempotently.
    pub async fn with_backend(backend: Arc<dyn RecordBackend>) -> Result<Self> {
        backend.create_table(FieldRegistry::table_spec()).await?;
        backend.create_table(AttributeStore::table_spec()).await?;
        Ok(Self::wire(backend))
    }

    /// Process-wide shared instance, for app code that wants ambient access
    /// instead of passing a handle around.
    pub fn global() -> &'static AttributeDb {
        &GLOBAL_DB
    }

    fn wire(backend: Arc<dyn RecordBackend>) -> Self {
        let registry = FieldRegistry::new(backend.clone());
        let attributes = AttributeStore::new(backend.clone(), registry.clone());
        Self {
            backend,
            registry,
            attributes,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Cascade hook for owner destruction: removes every attribute record of
    /// the instance so no orphans remain.
    pub async fn destroy_owner(&self, owner: &OwnerRef) -> Result<usize> {
        let removed = self.attributes.destroy_for(owner).await?;
        tracing::debug!(owner = %owner, removed, "destroyed owner attributes");
        Ok(removed)
    }

    /// Write an atomic snapshot of all tables to `path`.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let tables = self.backend.dump().await?;
        StoreSnapshot::new(tables).write_to(path)
    }

    /// Replace all tables from a snapshot previously written by
    /// [`Self::save_snapshot`].
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = StoreSnapshot::read_from(path)?;
        self.backend.restore(snapshot.tables).await
    }
}

impl Default for AttributeDb {
    fn default() -> Self {
        Self::new()
    }
}

use crate::core::{Result, StoreError};
use crate::storage::backend::{Fields, RecordBackend, StoredRecord, TableSpec};
use crate::storage::table::Table;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`RecordBackend`]: a map of tables, each behind its own lock so
/// operations on different tables never contend. Uniqueness checks run under
/// the table's write lock, which makes them the atomic backstop for
/// concurrent find-or-initialize writers.
pub struct InMemoryBackend {
    tables: RwLock<HashMap<String, Arc<RwLock<Table>>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Construct with tables already bootstrapped. Used by the facade so the
    /// global instance can be built synchronously.
    pub fn with_tables(specs: impl IntoIterator<Item = TableSpec>) -> Self {
        let tables = specs
            .into_iter()
            .map(|spec| {
                (
                    spec.name().to_string(),
                    Arc::new(RwLock::new(Table::new(spec))),
                )
            })
            .collect();
        Self {
            tables: RwLock::new(tables),
        }
    }

    async fn table(&self, name: &str) -> Result<Arc<RwLock<Table>>> {
        self.tables
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordBackend for InMemoryBackend {
    async fn create_table(&self, spec: TableSpec) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .entry(spec.name().to_string())
            .or_insert_with(|| Arc::new(RwLock::new(Table::new(spec))));
        Ok(())
    }

    async fn insert(&self, table: &str, fields: Fields) -> Result<StoredRecord> {
        let handle = self.table(table).await?;
        let mut table = handle.write().await;
        table.insert(fields)
    }

    async fn update(&self, table: &str, id: u64, fields: Fields) -> Result<StoredRecord> {
        let handle = self.table(table).await?;
        let mut table = handle.write().await;
        table.update(id, fields)
    }

    async fn find_by(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<StoredRecord>> {
        let handle = self.table(table).await?;
        let table = handle.read().await;
        Ok(table.find_matching(filter))
    }

    async fn delete(&self, table: &str, id: u64) -> Result<bool> {
        let handle = self.table(table).await?;
        let mut table = handle.write().await;
        Ok(table.delete(id))
    }

    async fn delete_by(&self, table: &str, filter: &[(&str, &str)]) -> Result<usize> {
        let handle = self.table(table).await?;
        let mut table = handle.write().await;
        Ok(table.delete_matching(filter))
    }

    async fn dump(&self) -> Result<HashMap<String, Table>> {
        let tables = self.tables.read().await;
        let mut out = HashMap::new();
        for (name, handle) in tables.iter() {
            let table = handle.read().await;
            out.insert(name.clone(), table.clone());
        }
        Ok(out)
    }

    async fn restore(&self, snapshot: HashMap<String, Table>) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.clear();
        for (name, table) in snapshot {
            tables.insert(name, Arc::new(RwLock::new(table)));
        }
        Ok(())
    }
}

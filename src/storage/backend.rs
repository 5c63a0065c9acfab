use crate::core::Result;
use crate::storage::table::Table;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row payload: schemaless column map. Columns in this crate are all
/// string-valued, but the backend does not care.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Declared shape of a table: which columns must be present on insert and
/// which column sets must be unique across live rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    name: String,
    required: Vec<String>,
    unique_sets: Vec<Vec<String>>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            unique_sets: Vec::new(),
        }
    }

    pub fn required(mut self, column: impl Into<String>) -> Self {
        self.required.push(column.into());
        self
    }

    pub fn unique_on(mut self, columns: &[&str]) -> Self {
        self.unique_sets
            .push(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required
    }

    pub fn unique_sets(&self) -> &[Vec<String>] {
        &self.unique_sets
    }
}

/// A persisted row: backend-assigned id plus caller fields and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// String value of a column, if present and a string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| v.as_str())
    }
}

/// The generic record store the attribute engine is built over.
///
/// The engine only needs create/find/update/delete plus uniqueness-checked
/// inserts; anything satisfying that contract (an embedded database, a remote
/// store) can stand in for the bundled [`crate::storage::InMemoryBackend`].
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Idempotent table bootstrap.
    async fn create_table(&self, spec: TableSpec) -> Result<()>;

    /// Insert a row, enforcing required columns and unique sets. Fails with
    /// `StoreError::ConstraintViolation` when a unique set collides.
    async fn insert(&self, table: &str, fields: Fields) -> Result<StoredRecord>;

    /// Patch columns of an existing row, re-checking unique sets against all
    /// other rows, and bump `updated_at`.
    async fn update(&self, table: &str, id: u64, fields: Fields) -> Result<StoredRecord>;

    /// All rows whose columns equal every `(column, value)` pair in `filter`.
    async fn find_by(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<StoredRecord>>;

    /// Delete one row by id; `false` if it was not there.
    async fn delete(&self, table: &str, id: u64) -> Result<bool>;

    /// Delete every row matching `filter`; returns how many went away.
    async fn delete_by(&self, table: &str, filter: &[(&str, &str)]) -> Result<usize>;

    /// Clone out all tables (for snapshots).
    async fn dump(&self) -> Result<HashMap<String, Table>>;

    /// Replace all tables from a snapshot.
    async fn restore(&self, tables: HashMap<String, Table>) -> Result<()>;
}

/// Build a `Fields` map from string columns.
pub fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::Value::String((*v).to_string())))
        .collect()
}

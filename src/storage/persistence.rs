//! Snapshot persistence for the in-memory backend.
//!
//! Snapshots are MessagePack-encoded table dumps written atomically: encode
//! to a temp file in the target directory, then rename over the destination.

use crate::core::{Result, StoreError};
use crate::storage::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub tables: HashMap<String, Table>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created_at: u64,
    pub row_count: usize,
    pub table_count: usize,
}

impl StoreSnapshot {
    pub fn new(tables: HashMap<String, Table>) -> Self {
        let row_count = tables.values().map(Table::row_count).sum();
        let table_count = tables.len();
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            version: SNAPSHOT_VERSION,
            tables,
            metadata: SnapshotMetadata {
                created_at,
                row_count,
                table_count,
            },
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir)?;
        }

        let encoded =
            rmp_serde::to_vec(self).map_err(|e| StoreError::Codec(e.to_string()))?;

        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };
        tmp.write_all(&encoded)?;
        tmp.flush()?;
        tmp.persist(path)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let snapshot: Self =
            rmp_serde::from_slice(&bytes).map_err(|e| StoreError::Codec(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Codec(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

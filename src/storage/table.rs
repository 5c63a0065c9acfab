use crate::core::{Result, StoreError};
use crate::storage::backend::{Fields, StoredRecord, TableSpec};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One table of schemaless rows with declared required columns and unique
/// column sets. All mutation goes through the owning backend's lock, so the
/// check-then-insert inside is atomic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    spec: TableSpec,
    rows: BTreeMap<u64, StoredRecord>,
    next_row_id: u64,
}

impl Table {
    pub fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            rows: BTreeMap::new(),
            next_row_id: 1,
        }
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn insert(&mut self, fields: Fields) -> Result<StoredRecord> {
        self.validate_required(&fields)?;
        self.check_uniqueness(&fields, None)?;

        let id = self.next_row_id;
        self.next_row_id += 1;

        let now = Utc::now();
        let record = StoredRecord {
            id,
            fields,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    pub fn update(&mut self, id: u64, patch: Fields) -> Result<StoredRecord> {
        let Some(existing) = self.rows.get(&id).cloned() else {
            return Err(StoreError::RowNotFound(id, self.spec.name().to_string()));
        };

        let mut merged = existing.fields;
        for (column, value) in patch {
            merged.insert(column, value);
        }
        self.validate_required(&merged)?;
        self.check_uniqueness(&merged, Some(id))?;

        let record = StoredRecord {
            id,
            fields: merged,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub fn delete_matching(&mut self, filter: &[(&str, &str)]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, record| !matches(record, filter));
        before - self.rows.len()
    }

    pub fn find_matching(&self, filter: &[(&str, &str)]) -> Vec<StoredRecord> {
        self.rows
            .values()
            .filter(|record| matches(record, filter))
            .cloned()
            .collect()
    }

    fn validate_required(&self, fields: &Fields) -> Result<()> {
        for column in self.spec.required_columns() {
            let present = fields
                .get(column)
                .is_some_and(|v| !v.is_null());
            if !present {
                return Err(StoreError::ConstraintViolation(format!(
                    "Column '{}' cannot be NULL",
                    column
                )));
            }
        }
        Ok(())
    }

    fn check_uniqueness(&self, fields: &Fields, ignore_id: Option<u64>) -> Result<()> {
        for unique_set in self.spec.unique_sets() {
            let candidate: Vec<_> = unique_set
                .iter()
                .map(|column| fields.get(column.as_str()))
                .collect();

            for (id, record) in &self.rows {
                if Some(*id) == ignore_id {
                    continue;
                }
                let collides = unique_set
                    .iter()
                    .zip(&candidate)
                    .all(|(column, value)| record.fields.get(column.as_str()) == *value);
                if collides {
                    return Err(StoreError::ConstraintViolation(format!(
                        "Unique constraint violation: ({}) already taken in table '{}'",
                        unique_set.join(", "),
                        self.spec.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn matches(record: &StoredRecord, filter: &[(&str, &str)]) -> bool {
    filter
        .iter()
        .all(|(column, value)| record.get_str(column) == Some(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::fields;

    fn spec() -> TableSpec {
        TableSpec::new("widgets")
            .required("name")
            .unique_on(&["name", "shade"])
    }

    #[test]
    fn insert_rejects_duplicate_unique_set() {
        let mut table = Table::new(spec());
        table
            .insert(fields(&[("name", "bolt"), ("shade", "red")]))
            .unwrap();

        let err = table
            .insert(fields(&[("name", "bolt"), ("shade", "red")]))
            .unwrap_err();
        assert!(err.to_string().contains("Unique constraint violation"));

        // Different shade is fine.
        table
            .insert(fields(&[("name", "bolt"), ("shade", "blue")]))
            .unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn insert_rejects_missing_required_column() {
        let mut table = Table::new(spec());
        let err = table.insert(fields(&[("shade", "red")])).unwrap_err();
        assert!(err.to_string().contains("cannot be NULL"));
    }

    #[test]
    fn update_patches_and_recheck_uniqueness() {
        let mut table = Table::new(spec());
        let a = table
            .insert(fields(&[("name", "bolt"), ("shade", "red")]))
            .unwrap();
        table
            .insert(fields(&[("name", "bolt"), ("shade", "blue")]))
            .unwrap();

        // Updating onto another row's unique set fails.
        let err = table.update(a.id, fields(&[("shade", "blue")])).unwrap_err();
        assert!(err.to_string().contains("Unique constraint violation"));

        // Updating a row to its own current values is allowed.
        let same = table.update(a.id, fields(&[("shade", "red")])).unwrap();
        assert_eq!(same.id, a.id);
        assert_eq!(same.created_at, a.created_at);
    }

    #[test]
    fn delete_matching_removes_only_matches() {
        let mut table = Table::new(TableSpec::new("plain"));
        table.insert(fields(&[("owner", "a"), ("k", "1")])).unwrap();
        table.insert(fields(&[("owner", "a"), ("k", "2")])).unwrap();
        table.insert(fields(&[("owner", "b"), ("k", "1")])).unwrap();

        assert_eq!(table.delete_matching(&[("owner", "a")]), 2);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.find_matching(&[("owner", "b")]).len(), 1);
    }
}

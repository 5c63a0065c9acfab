//! CRUD over attribute records with validation against the field registry.
//!
//! Backed by the `custom_attributes` table, unique on
//! `(attributable_type, attributable_id, key)` so each owner instance holds
//! at most one record per key.

use crate::core::{ErrorKind, OwnerRef, Result, StoreError, ValidationErrors, normalize};
use crate::registry::FieldRegistry;
use crate::storage::{RecordBackend, StoredRecord, TableSpec, fields};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CUSTOM_ATTRIBUTES_TABLE: &str = "custom_attributes";

const ATTRIBUTABLE_TYPE: &str = "attributable_type";
const ATTRIBUTABLE_ID: &str = "attributable_id";
const KEY: &str = "key";
const VALUE: &str = "value";

/// A concrete key/value pair stored against one owning entity instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub id: u64,
    pub attributable_type: String,
    pub attributable_id: String,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttributeRecord {
    fn from_record(record: &StoredRecord) -> Result<Self> {
        let column = |name: &str| {
            record.get_str(name).map(str::to_string).ok_or_else(|| {
                StoreError::MalformedRow(
                    CUSTOM_ATTRIBUTES_TABLE.to_string(),
                    format!("missing column '{}'", name),
                )
            })
        };
        Ok(Self {
            id: record.id,
            attributable_type: column(ATTRIBUTABLE_TYPE)?,
            attributable_id: column(ATTRIBUTABLE_ID)?,
            key: column(KEY)?,
            value: column(VALUE)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Result of a write attempt. Validation failures are values, not errors;
/// a rejected write persists nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Saved(AttributeRecord),
    Rejected(ValidationErrors),
}

impl WriteOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn record(&self) -> Option<&AttributeRecord> {
        match self {
            Self::Saved(record) => Some(record),
            Self::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::Saved(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct AttributeStore {
    backend: Arc<dyn RecordBackend>,
    registry: FieldRegistry,
}

impl AttributeStore {
    pub fn new(backend: Arc<dyn RecordBackend>, registry: FieldRegistry) -> Self {
        Self { backend, registry }
    }

    pub fn table_spec() -> TableSpec {
        TableSpec::new(CUSTOM_ATTRIBUTES_TABLE)
            .required(ATTRIBUTABLE_TYPE)
            .required(ATTRIBUTABLE_ID)
            .required(KEY)
            .unique_on(&[ATTRIBUTABLE_TYPE, ATTRIBUTABLE_ID, KEY])
    }

    /// Write `key = value` for the owner instance: insert on first write,
    /// update in place on rewrite.
    ///
    /// The key is normalized, then checked in order: non-blank, registered
    /// set non-empty (`custom_fields_not_set`), member of the registered set
    /// (`invalid_key`). A blank value also rejects. Nothing is persisted on a
    /// rejected write — an existing record's value survives an invalid
    /// attempt untouched. A losing concurrent insert hits the backend's
    /// unique constraint and is retried once as an update.
    pub async fn write(&self, owner: &OwnerRef, key: &str, value: &str) -> Result<WriteOutcome> {
        let key = normalize(key);
        tracing::debug!(owner = %owner, key = %key, "custom attribute write");

        let mut errors = ValidationErrors::new();
        if key.is_empty() {
            errors.add("key", ErrorKind::Blank);
        }
        if value.trim().is_empty() {
            errors.add("value", ErrorKind::Blank);
        }

        if !key.is_empty() {
            let allowed = self.registry.names(owner.entity_type().as_str()).await?;
            if allowed.is_empty() {
                errors.add("key", ErrorKind::CustomFieldsNotSet);
            } else if !allowed.contains(&key) {
                errors.add("key", ErrorKind::InvalidKey);
            }
        }

        if !errors.is_empty() {
            return Ok(WriteOutcome::Rejected(errors));
        }

        // Find-or-initialize, then save.
        match self.find_record(owner, &key).await? {
            Some(existing) => Ok(WriteOutcome::Saved(
                self.update_value(existing.id, value).await?,
            )),
            None => {
                let row = self.row(owner, &key, value);
                match self.backend.insert(CUSTOM_ATTRIBUTES_TABLE, row).await {
                    Ok(record) => Ok(WriteOutcome::Saved(AttributeRecord::from_record(&record)?)),
                    Err(StoreError::ConstraintViolation(_)) => {
                        // A concurrent writer inserted between our find and
                        // save. The constraint is the backstop; retry as an
                        // update.
                        warn!(
                            "concurrent insert for {} key '{}', retrying as update",
                            owner, key
                        );
                        match self.find_record(owner, &key).await? {
                            Some(existing) => Ok(WriteOutcome::Saved(
                                self.update_value(existing.id, value).await?,
                            )),
                            None => Ok(WriteOutcome::Rejected(ValidationErrors::single(
                                "key",
                                ErrorKind::Uniqueness,
                            ))),
                        }
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    /// Value stored under `key` for the owner, or `None`. A blank key
    /// returns `None` without a lookup; absence is a normal, silent outcome.
    pub async fn read(&self, owner: &OwnerRef, key: &str) -> Result<Option<String>> {
        let key = normalize(key);
        if key.is_empty() {
            return Ok(None);
        }
        Ok(self
            .find_record(owner, &key)
            .await?
            .and_then(|r| r.get_str(VALUE).map(str::to_string)))
    }

    /// Every attribute record of one owner instance.
    pub async fn records_for(&self, owner: &OwnerRef) -> Result<Vec<AttributeRecord>> {
        let records = self
            .backend
            .find_by(CUSTOM_ATTRIBUTES_TABLE, &owner_filter(owner))
            .await?;
        records.iter().map(AttributeRecord::from_record).collect()
    }

    /// Cascading delete for owner destruction; returns removed-row count.
    pub async fn destroy_for(&self, owner: &OwnerRef) -> Result<usize> {
        self.backend
            .delete_by(CUSTOM_ATTRIBUTES_TABLE, &owner_filter(owner))
            .await
    }

    async fn update_value(&self, id: u64, value: &str) -> Result<AttributeRecord> {
        let updated = self
            .backend
            .update(CUSTOM_ATTRIBUTES_TABLE, id, fields(&[(VALUE, value)]))
            .await?;
        AttributeRecord::from_record(&updated)
    }

    async fn find_record(&self, owner: &OwnerRef, key: &str) -> Result<Option<StoredRecord>> {
        let filter = [
            (ATTRIBUTABLE_TYPE, owner.entity_type().as_str()),
            (ATTRIBUTABLE_ID, owner.id().as_str()),
            (KEY, key),
        ];
        let mut records = self
            .backend
            .find_by(CUSTOM_ATTRIBUTES_TABLE, &filter)
            .await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        })
    }

    fn row(&self, owner: &OwnerRef, key: &str, value: &str) -> crate::storage::Fields {
        fields(&[
            (ATTRIBUTABLE_TYPE, owner.entity_type().as_str()),
            (ATTRIBUTABLE_ID, owner.id().as_str()),
            (KEY, key),
            (VALUE, value),
        ])
    }
}

fn owner_filter<'a>(owner: &'a OwnerRef) -> [(&'static str, &'a str); 2] {
    [
        (ATTRIBUTABLE_TYPE, owner.entity_type().as_str()),
        (ATTRIBUTABLE_ID, owner.id().as_str()),
    ]
}

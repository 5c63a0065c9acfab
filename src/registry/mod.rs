//! Registry of permitted attribute names per entity type.
//!
//! The source of truth for "is this key allowed for this model". Backed by
//! the `custom_fields` table, unique on `(associated_model, name)`.

use crate::core::{ErrorKind, Result, StoreError, ValidationErrors, normalize};
use crate::storage::{RecordBackend, StoredRecord, TableSpec, fields};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const CUSTOM_FIELDS_TABLE: &str = "custom_fields";

const ASSOCIATED_MODEL: &str = "associated_model";
const NAME: &str = "name";

/// A registered, permitted attribute name for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: u64,
    pub associated_model: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FieldDefinition {
    fn from_record(record: &StoredRecord) -> Result<Self> {
        let column = |name: &str| {
            record.get_str(name).map(str::to_string).ok_or_else(|| {
                StoreError::MalformedRow(
                    CUSTOM_FIELDS_TABLE.to_string(),
                    format!("missing column '{}'", name),
                )
            })
        };
        Ok(Self {
            id: record.id,
            associated_model: column(ASSOCIATED_MODEL)?,
            name: column(NAME)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Result of a registration attempt. Re-registering an existing pair is a
/// success (`Existing`), not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Created(FieldDefinition),
    Existing(FieldDefinition),
    Rejected(ValidationErrors),
}

impl RegisterOutcome {
    pub fn definition(&self) -> Option<&FieldDefinition> {
        match self {
            Self::Created(def) | Self::Existing(def) => Some(def),
            Self::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[derive(Clone)]
pub struct FieldRegistry {
    backend: Arc<dyn RecordBackend>,
}

impl FieldRegistry {
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self { backend }
    }

    pub fn table_spec() -> TableSpec {
        TableSpec::new(CUSTOM_FIELDS_TABLE)
            .required(ASSOCIATED_MODEL)
            .required(NAME)
            .unique_on(&[ASSOCIATED_MODEL, NAME])
    }

    /// Register `name` as a permitted attribute key for `associated_model`.
    ///
    /// Both inputs are normalized first; blank inputs reject with
    /// `ErrorKind::Blank`. Registration is idempotent: an already-registered
    /// pair comes back as `Existing` without touching the table. A losing
    /// concurrent insert is resolved by re-fetching the winner.
    pub async fn register(&self, associated_model: &str, name: &str) -> Result<RegisterOutcome> {
        let model = normalize(associated_model);
        let name = normalize(name);

        let mut errors = ValidationErrors::new();
        if model.is_empty() {
            errors.add("associated_model", ErrorKind::Blank);
        }
        if name.is_empty() {
            errors.add("name", ErrorKind::Blank);
        }
        if !errors.is_empty() {
            return Ok(RegisterOutcome::Rejected(errors));
        }

        if let Some(existing) = self.find(&model, &name).await? {
            return Ok(RegisterOutcome::Existing(existing));
        }

        let row = fields(&[(ASSOCIATED_MODEL, model.as_str()), (NAME, name.as_str())]);
        match self.backend.insert(CUSTOM_FIELDS_TABLE, row).await {
            Ok(record) => {
                debug!("registered custom field '{}' for model '{}'", name, model);
                Ok(RegisterOutcome::Created(FieldDefinition::from_record(
                    &record,
                )?))
            }
            Err(StoreError::ConstraintViolation(_)) => {
                // Lost a race to another registrar; the winner's row is the
                // definition we wanted.
                warn!(
                    "custom field '{}' for model '{}' hit the unique backstop, re-fetching",
                    name, model
                );
                match self.find(&model, &name).await? {
                    Some(existing) => Ok(RegisterOutcome::Existing(existing)),
                    None => Ok(RegisterOutcome::Rejected(ValidationErrors::single(
                        "name",
                        ErrorKind::Uniqueness,
                    ))),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Administrative removal of a registered field. Not part of the write
    /// path; existing attribute records under the name are left in place.
    pub async fn unregister(&self, associated_model: &str, name: &str) -> Result<bool> {
        let model = normalize(associated_model);
        let name = normalize(name);
        match self.find(&model, &name).await? {
            Some(def) => {
                debug!("unregistered custom field '{}' for model '{}'", name, model);
                self.backend.delete(CUSTOM_FIELDS_TABLE, def.id).await
            }
            None => Ok(false),
        }
    }

    /// Every registered name for the given model; empty if none. Purely a
    /// membership set, ordering is incidental.
    pub async fn names(&self, associated_model: &str) -> Result<BTreeSet<String>> {
        let model = normalize(associated_model);
        let records = self
            .backend
            .find_by(CUSTOM_FIELDS_TABLE, &[(ASSOCIATED_MODEL, model.as_str())])
            .await?;
        Ok(records
            .iter()
            .filter_map(|r| r.get_str(NAME).map(str::to_string))
            .collect())
    }

    async fn find(&self, model: &str, name: &str) -> Result<Option<FieldDefinition>> {
        let records = self
            .backend
            .find_by(
                CUSTOM_FIELDS_TABLE,
                &[(ASSOCIATED_MODEL, model), (NAME, name)],
            )
            .await?;
        records
            .first()
            .map(FieldDefinition::from_record)
            .transpose()
    }
}

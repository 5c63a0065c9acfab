//! The capability an entity type mixes in to hold custom attributes.
//!
//! Implementors supply their type name and instance id; the provided methods
//! scope every registry and store operation to "this type + this instance".
//! Per-field accessors are deliberately not generated from the registry —
//! callers use the explicit key lookups, and [`Attributable::custom_field_names`]
//! when they need the currently registered set.

use crate::attributes::{AttributeRecord, WriteOutcome};
use crate::core::{EntityType, OwnerId, OwnerRef, Result};
use crate::facade::AttributeDb;
use crate::registry::RegisterOutcome;
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
pub trait Attributable: Send + Sync {
    /// Normalized type name used as the registry key and the owner type tag,
    /// e.g. `EntityType::new("customer")`.
    fn entity_type() -> EntityType
    where
        Self: Sized;

    /// This instance's opaque identifier.
    fn owner_id(&self) -> OwnerId;

    fn owner_ref(&self) -> OwnerRef
    where
        Self: Sized,
    {
        OwnerRef::new(Self::entity_type(), self.owner_id())
    }

    /// Register a new permitted field name for this entity type (type-level
    /// operation; idempotent).
    async fn create_custom_field(db: &AttributeDb, key: &str) -> Result<RegisterOutcome>
    where
        Self: Sized,
    {
        db.registry()
            .register(Self::entity_type().as_str(), key)
            .await
    }

    /// Snapshot of the names currently registered for this entity type.
    async fn custom_field_names(db: &AttributeDb) -> Result<BTreeSet<String>>
    where
        Self: Sized,
    {
        db.registry().names(Self::entity_type().as_str()).await
    }

    /// Write a custom attribute on this instance. Validation failures come
    /// back inside the outcome; callers inspect them to decide behavior.
    async fn set_custom_attribute(
        &self,
        db: &AttributeDb,
        key: &str,
        value: &str,
    ) -> Result<WriteOutcome>
    where
        Self: Sized,
    {
        db.attributes().write(&self.owner_ref(), key, value).await
    }

    /// Read a custom attribute; `None` when no record exists.
    async fn get_custom_attribute(&self, db: &AttributeDb, key: &str) -> Result<Option<String>>
    where
        Self: Sized,
    {
        db.attributes().read(&self.owner_ref(), key).await
    }

    /// All attribute records held by this instance.
    async fn custom_attributes(&self, db: &AttributeDb) -> Result<Vec<AttributeRecord>>
    where
        Self: Sized,
    {
        db.attributes().records_for(&self.owner_ref()).await
    }

    /// Cascade: call when this instance is destroyed so its records go too.
    async fn destroy_custom_attributes(&self, db: &AttributeDb) -> Result<usize>
    where
        Self: Sized,
    {
        db.attributes().destroy_for(&self.owner_ref()).await
    }
}

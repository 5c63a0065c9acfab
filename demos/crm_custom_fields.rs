//! CRM Custom Fields Example
//!
//! A small CRM where end users extend "customer" records with their own
//! fields at runtime, without schema migrations. The entity type mixes in
//! `Attributable`; the store enforces which keys are admissible.
//!
//! RUN: cargo run --example crm_custom_fields

use anyhow::Result;
use async_trait::async_trait;
use attrstore::core::{EntityType, OwnerId};
use attrstore::{Attributable, AttributeDb};
use uuid::Uuid;

// ==========================================================================
// 1. DATA MODEL — a plain struct plus the capability impl
// ==========================================================================

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
}

#[async_trait]
impl Attributable for Customer {
    fn entity_type() -> EntityType {
        EntityType::new("customer")
    }

    fn owner_id(&self) -> OwnerId {
        OwnerId::from(self.id)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let db = AttributeDb::new();

    // ======================================================================
    // 2. ADMIN FLOW — a tenant admin decides which fields exist
    // ======================================================================
    Customer::create_custom_field(&db, "industry").await?;
    Customer::create_custom_field(&db, "account_tier").await?;
    // Re-running setup is safe: registration is idempotent.
    Customer::create_custom_field(&db, "industry").await?;

    println!(
        "customer fields: {:?}",
        Customer::custom_field_names(&db).await?
    );

    // ======================================================================
    // 3. APP FLOW — per-record values, validated on every write
    // ======================================================================
    let acme = Customer {
        id: Uuid::new_v4(),
        name: "Acme Corp".into(),
    };

    acme.set_custom_attribute(&db, "industry", "manufacturing").await?;
    acme.set_custom_attribute(&db, "account_tier", "gold").await?;

    println!(
        "{} industry: {:?}",
        acme.name,
        acme.get_custom_attribute(&db, "industry").await?
    );

    // A typo'd key is rejected with field-level errors the UI can render.
    let rejected = acme.set_custom_attribute(&db, "industri", "retail").await?;
    if let Some(errors) = rejected.errors() {
        println!("rejected write: {:?}", errors.full_messages());
    }

    for record in acme.custom_attributes(&db).await? {
        println!("  {} = {}", record.key, record.value);
    }

    // ======================================================================
    // 4. CLEANUP — destroying the record cascades to its attributes
    // ======================================================================
    let removed = acme.destroy_custom_attributes(&db).await?;
    println!("destroyed {} attribute(s) with {}", removed, acme.name);

    Ok(())
}

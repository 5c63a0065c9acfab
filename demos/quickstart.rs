/// Quick Start Example
///
/// Registers a custom field, writes and reads an attribute,
/// and shows how a rejected write reports its errors.
///
/// Run with: cargo run --example quickstart
use attrstore::core::{EntityType, OwnerRef};
use attrstore::AttributeDb;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("attrstore quick start\n{}", "=".repeat(60));

    let db = AttributeDb::new();

    // Allow the "email" field on customers.
    db.registry().register("customer", "email").await?;

    let alice = OwnerRef::new(EntityType::new("customer"), "alice");

    // Valid write.
    let outcome = db.attributes().write(&alice, "email", "alice@example.com").await?;
    println!("write email  -> saved: {}", outcome.is_saved());

    // Keys are matched case-insensitively.
    let value = db.attributes().read(&alice, "EMAIL").await?;
    println!("read EMAIL   -> {:?}", value);

    // Unregistered key: rejected as a value, not an error.
    let outcome = db.attributes().write(&alice, "nickname", "Al").await?;
    if let Some(errors) = outcome.errors() {
        println!("write nickname -> rejected: {}", errors);
    }

    Ok(())
}

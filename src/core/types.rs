use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Canonical form for string identifiers: trimmed and lowercased.
///
/// Applied identically on write and on every read-side comparison so that
/// case or whitespace variance never causes a false negative.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Normalized entity-type identifier, e.g. `"customer"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque owner-instance identifier. Not normalized: ids are payload, only
/// type tags are identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Polymorphic reference to an owning entity instance: a type tag plus an
/// opaque id. One attribute table serves many entity types; the store always
/// compares on the pair, never on the id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    entity_type: EntityType,
    id: OwnerId,
}

impl OwnerRef {
    pub fn new(entity_type: EntityType, id: impl Into<OwnerId>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn id(&self) -> &OwnerId {
        &self.id
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.id)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a write or registration was rejected. Carried as a value on the
/// rejected outcome, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field empty after normalization.
    Blank,
    /// The entity type has zero registered fields. Distinguishes "nothing
    /// configured" from "wrong key".
    CustomFieldsNotSet,
    /// Key normalized but not in the registered set for this type.
    InvalidKey,
    /// Duplicate slipped past find-or-initialize and hit the unique
    /// constraint backstop.
    Uniqueness,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Blank => "can't be blank",
            Self::CustomFieldsNotSet => "custom fields for this model have not been set",
            Self::InvalidKey => "is not an allowed custom field key",
            Self::Uniqueness => "has already been taken",
        }
    }
}

/// A single failed check, scoped to the field it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: ErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind.message())
    }
}

/// Accumulated validation failures for one attempted operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, kind: ErrorKind) -> Self {
        let mut errors = Self::new();
        errors.add(field, kind);
        errors
    }

    pub fn add(&mut self, field: &'static str, kind: ErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str, kind: ErrorKind) -> bool {
        self.errors
            .iter()
            .any(|e| e.field == field && e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Human-readable messages, one per failed check.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_messages_keep_field_scope() {
        let mut errors = ValidationErrors::new();
        errors.add("key", ErrorKind::Blank);
        errors.add("value", ErrorKind::Blank);

        assert_eq!(
            errors.full_messages(),
            vec!["key can't be blank", "value can't be blank"]
        );
        assert!(errors.contains("key", ErrorKind::Blank));
        assert!(!errors.contains("key", ErrorKind::InvalidKey));
    }
}

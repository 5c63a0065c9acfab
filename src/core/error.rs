use thiserror::Error;

/// Store-level faults. Admissibility problems (blank key, unregistered key,
/// duplicate registration) are *not* errors — they travel as
/// [`crate::core::ValidationErrors`] inside `Ok` outcomes.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Row {0} not found in table '{1}'")]
    RowNotFound(u64, String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Malformed row in table '{0}': {1}")]
    MalformedRow(String, String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Snapshot codec error: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

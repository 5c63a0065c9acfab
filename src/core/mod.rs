pub mod error;
pub mod types;
pub mod validation;

pub use error::{Result, StoreError};
pub use types::{EntityType, OwnerId, OwnerRef, normalize};
pub use validation::{ErrorKind, FieldError, ValidationErrors};

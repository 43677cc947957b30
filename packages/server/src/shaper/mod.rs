//! Write-direction building blocks shared by every entity: field-level error
//! reporting, the payload reader, and reference resolution.
//!
//! The read direction lives next to each wire type in [`crate::models`].

pub mod error;
pub mod payload;
pub mod references;

pub use error::{FieldError, FieldErrorKind, ValidationErrors};
pub use payload::{PayloadReader, WriteMode};
pub use references::ReferenceStore;

/// Fields that are computed or assigned by storage and never accepted on write.
pub const ID_FIELD: &str = "id";

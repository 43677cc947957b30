use std::fmt;

use thiserror::Error;

/// Why a single payload field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    #[error("This field is required")]
    Missing,

    #[error("Expected {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("Unknown {entity} id(s): {ids:?}")]
    UnresolvedReference { entity: &'static str, ids: Vec<i32> },

    #[error("This field is read-only")]
    ReadOnly,

    #[error("{0}")]
    Invalid(String),
}

impl FieldErrorKind {
    /// Machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::Missing => "required",
            FieldErrorKind::TypeMismatch { .. } => "type_mismatch",
            FieldErrorKind::UnresolvedReference { .. } => "unresolved_reference",
            FieldErrorKind::ReadOnly => "read_only",
            FieldErrorKind::Invalid(_) => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

/// Every field error found in one payload, in the order they were detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    #[cfg(test)]
    pub fn single(field: &'static str, kind: FieldErrorKind) -> Self {
        Self(vec![FieldError { field, kind }])
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }

    /// First error reported for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldErrorKind> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid fields: ")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err.field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

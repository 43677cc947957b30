use serde_json::{Map, Value};

use super::error::{FieldError, FieldErrorKind, ValidationErrors};

/// Create (`POST`/`PUT`) enforces required fields; Partial (`PATCH`) treats
/// every field as optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Partial,
}

/// Typed, field-by-field access to a candidate JSON object.
///
/// Each accessor returns `None` when the field is absent or unusable and
/// records why, so one pass over a payload reports every bad field at once.
/// Keys the caller never asks for are ignored.
pub struct PayloadReader<'a> {
    payload: &'a Map<String, Value>,
    mode: WriteMode,
    errors: Vec<FieldError>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a Map<String, Value>, mode: WriteMode) -> Self {
        Self {
            payload,
            mode,
            errors: Vec::new(),
        }
    }

    /// Record a read-only error for each of `fields` present in the payload.
    pub fn reject_read_only(&mut self, fields: &[&'static str]) {
        for &field in fields {
            if self.payload.contains_key(field) {
                self.push(field, FieldErrorKind::ReadOnly);
            }
        }
    }

    pub fn push(&mut self, field: &'static str, kind: FieldErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    pub fn string(&mut self, field: &'static str, required: bool) -> Option<String> {
        match self.lookup(field, required)? {
            Value::String(s) => Some(s.clone()),
            _ => self.mismatch(field, "a string"),
        }
    }

    pub fn number(&mut self, field: &'static str, required: bool) -> Option<f64> {
        match self.lookup(field, required)? {
            Value::Number(n) => n.as_f64().or_else(|| self.mismatch(field, "a number")),
            _ => self.mismatch(field, "a number"),
        }
    }

    pub fn integer(&mut self, field: &'static str, required: bool) -> Option<i32> {
        let Some(raw) = self.lookup(field, required)?.as_i64() else {
            return self.mismatch(field, "an integer");
        };
        match i32::try_from(raw) {
            Ok(value) => Some(value),
            Err(_) => {
                self.push(
                    field,
                    FieldErrorKind::Invalid("Value is out of range".into()),
                );
                None
            }
        }
    }

    /// A JSON array of integer ids. Duplicates collapse to their first
    /// occurrence; order is otherwise preserved.
    pub fn id_list(&mut self, field: &'static str, required: bool) -> Option<Vec<i32>> {
        const EXPECTED: &str = "a list of integer ids";

        let Value::Array(items) = self.lookup(field, required)? else {
            return self.mismatch(field, EXPECTED);
        };

        let mut ids: Vec<i32> = Vec::with_capacity(items.len());
        for item in items {
            let Some(id) = item.as_i64().and_then(|raw| i32::try_from(raw).ok()) else {
                return self.mismatch(field, EXPECTED);
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Some(ids)
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }

    fn lookup(&mut self, field: &'static str, required: bool) -> Option<&'a Value> {
        let value = self.payload.get(field);
        if value.is_none() && required && self.mode == WriteMode::Create {
            self.push(field, FieldErrorKind::Missing);
        }
        value
    }

    fn mismatch<T>(&mut self, field: &'static str, expected: &'static str) -> Option<T> {
        self.push(field, FieldErrorKind::TypeMismatch { expected });
        None
    }
}

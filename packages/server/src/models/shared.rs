use serde::Deserialize;

use crate::error::AppError;
use crate::shaper::{FieldErrorKind, PayloadReader};

/// Longest accepted tag/ingredient name, recipe title or link.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Query parameters shared by the tag and ingredient list endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignedQuery {
    /// Only return entries referenced by at least one recipe.
    pub assigned_only: Option<bool>,
}

/// Read a trimmed name-like field (1-255 Unicode characters).
pub fn read_name(
    reader: &mut PayloadReader<'_>,
    field: &'static str,
    required: bool,
) -> Option<String> {
    let raw = reader.string(field, required)?;
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_TEXT_LENGTH {
        reader.push(
            field,
            FieldErrorKind::Invalid(format!("Must be 1-{MAX_TEXT_LENGTH} characters")),
        );
        return None;
    }
    Some(name.to_string())
}

/// Parse a comma-separated id filter such as `1,2,3`.
pub fn parse_id_filter(raw: &str, name: &str) -> Result<Vec<i32>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>().map_err(|_| {
                AppError::Validation(format!("{name} must be a comma-separated list of ids"))
            })
        })
        .collect()
}

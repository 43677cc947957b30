use sea_orm::Set;
use serde::Serialize;
use serde_json::{Map, Value};

use super::shared::read_name;
use crate::entity::ingredient;
use crate::shaper::{ID_FIELD, PayloadReader, ValidationErrors, WriteMode};

/// Wire representation of an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Carrot")]
    pub name: String,
    /// Energy in kcal; may be fractional.
    #[schema(example = 41.5)]
    pub calories: f64,
}

/// Validated ingredient attributes. `None` means the field was not supplied.
#[derive(Debug, Default, Clone, PartialEq, utoipa::ToSchema)]
pub struct IngredientAttributes {
    /// Required on create. 1-255 characters after trimming.
    #[schema(example = "Carrot")]
    pub name: Option<String>,
    /// Required on create. Any JSON number.
    #[schema(example = 41.5)]
    pub calories: Option<f64>,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            calories: m.calories,
        }
    }
}

impl From<&ingredient::Model> for IngredientResponse {
    fn from(m: &ingredient::Model) -> Self {
        m.clone().into()
    }
}

impl IngredientAttributes {
    pub fn from_payload(
        payload: &Map<String, Value>,
        mode: WriteMode,
    ) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload, mode);
        reader.reject_read_only(&[ID_FIELD]);
        let name = read_name(&mut reader, "name", true);
        let calories = reader.number("calories", true);
        reader.finish()?;
        Ok(Self { name, calories })
    }

    pub fn apply(self, active: &mut ingredient::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(calories) = self.calories {
            active.calories = Set(calories);
        }
    }
}

use sea_orm::Set;
use serde::Serialize;
use serde_json::{Map, Value};

use super::shared::read_name;
use crate::entity::tag;
use crate::shaper::{ID_FIELD, PayloadReader, ValidationErrors, WriteMode};

/// Wire representation of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Vegan")]
    pub name: String,
}

/// Validated tag attributes. `None` means the field was not supplied.
#[derive(Debug, Default, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct TagAttributes {
    /// Required on create. 1-255 characters after trimming.
    #[schema(example = "Vegan")]
    pub name: Option<String>,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

impl From<&tag::Model> for TagResponse {
    fn from(m: &tag::Model) -> Self {
        m.clone().into()
    }
}

impl TagAttributes {
    pub fn from_payload(
        payload: &Map<String, Value>,
        mode: WriteMode,
    ) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload, mode);
        reader.reject_read_only(&[ID_FIELD]);
        let name = read_name(&mut reader, "name", true);
        reader.finish()?;
        Ok(Self { name })
    }

    pub fn apply(self, active: &mut tag::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
    }
}

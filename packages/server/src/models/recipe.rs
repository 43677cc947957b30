use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ingredient::IngredientResponse;
use super::shared::{MAX_TEXT_LENGTH, read_name};
use super::tag::TagResponse;
use crate::entity::{ingredient, recipe, tag};
use crate::error::AppError;
use crate::shaper::references::check_resolved;
use crate::shaper::{FieldErrorKind, ID_FIELD, PayloadReader, ReferenceStore, WriteMode};

/// Fields computed at read time; clients may not write them.
pub const READ_ONLY_FIELDS: &[&str] = &[ID_FIELD, "total_ingredients", "total_calories"];

/// A recipe together with its resolved memberships, in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub recipe: recipe::Model,
    pub ingredients: Vec<ingredient::Model>,
    pub tags: Vec<tag::Model>,
}

/// Scalar recipe fields shared by the summary and detail forms.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RecipeFields {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Soup")]
    pub title: String,
    #[schema(example = 30)]
    pub time_minutes: i32,
    #[schema(example = 5.5)]
    pub price: f64,
    #[schema(example = "https://example.com/soup")]
    pub link: String,
}

/// Summary form: related entities as bare ids.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub fields: RecipeFields,
    #[schema(example = json!([1, 2]))]
    pub ingredients: Vec<i32>,
    #[schema(example = json!([3]))]
    pub tags: Vec<i32>,
    #[schema(example = 2)]
    pub total_ingredients: u64,
    #[schema(example = 125.0)]
    pub total_calories: f64,
}

/// Detail form: related entities fully embedded.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub fields: RecipeFields,
    pub ingredients: Vec<IngredientResponse>,
    pub tags: Vec<TagResponse>,
    pub total_ingredients: u64,
    pub total_calories: f64,
}

/// Image form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RecipeImageResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "uploads/recipe/0192f1c2-8d3e-7c41-9b7a-1f0c3e2d4a5b.jpg")]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids; keeps recipes carrying any of them.
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; keeps recipes using any of them.
    pub ingredients: Option<String>,
}

/// Validated recipe attributes. `None` means the field was not supplied.
#[derive(Debug, Default, Clone, PartialEq, utoipa::ToSchema)]
pub struct RecipeAttributes {
    /// Required on create. 1-255 characters after trimming.
    #[schema(example = "Soup")]
    pub title: Option<String>,
    /// Required on create, may be empty. Existing ingredient ids; duplicates
    /// are ignored.
    #[schema(example = json!([1, 2]))]
    pub ingredients: Option<Vec<i32>>,
    /// Required on create, may be empty. Existing tag ids; duplicates are
    /// ignored.
    #[schema(example = json!([3]))]
    pub tags: Option<Vec<i32>>,
    /// Required on create. Must be >= 0.
    #[schema(example = 30)]
    pub time_minutes: Option<i32>,
    /// Required on create. Must be a finite number >= 0.
    #[schema(example = 5.5)]
    pub price: Option<f64>,
    /// Source URL, at most 255 characters. Defaults to empty.
    #[schema(example = "https://example.com/soup")]
    pub link: Option<String>,
}

/// Number of ingredient references on a recipe.
pub fn total_ingredients(ingredients: &[ingredient::Model]) -> u64 {
    ingredients.len() as u64
}

/// Sum of the calories of a recipe's ingredients; 0 for none.
pub fn total_calories(ingredients: &[ingredient::Model]) -> f64 {
    ingredients.iter().fold(0.0, |total, i| total + i.calories)
}

impl From<&recipe::Model> for RecipeFields {
    fn from(m: &recipe::Model) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            time_minutes: m.time_minutes,
            price: m.price,
            link: m.link.clone(),
        }
    }
}

impl From<recipe::Model> for RecipeImageResponse {
    fn from(m: recipe::Model) -> Self {
        Self {
            id: m.id,
            image: m.image,
        }
    }
}

impl RecipeRecord {
    pub fn summary(&self) -> RecipeResponse {
        RecipeResponse {
            fields: RecipeFields::from(&self.recipe),
            ingredients: self.ingredients.iter().map(|i| i.id).collect(),
            tags: self.tags.iter().map(|t| t.id).collect(),
            total_ingredients: total_ingredients(&self.ingredients),
            total_calories: total_calories(&self.ingredients),
        }
    }

    pub fn detail(&self) -> RecipeDetailResponse {
        RecipeDetailResponse {
            fields: RecipeFields::from(&self.recipe),
            ingredients: self.ingredients.iter().map(IngredientResponse::from).collect(),
            tags: self.tags.iter().map(TagResponse::from).collect(),
            total_ingredients: total_ingredients(&self.ingredients),
            total_calories: total_calories(&self.ingredients),
        }
    }
}

impl RecipeAttributes {
    /// Validate a candidate payload, resolving ingredient and tag ids against
    /// `store`. All field errors are reported together.
    pub async fn from_payload<S: ReferenceStore + ?Sized>(
        payload: &Map<String, Value>,
        mode: WriteMode,
        store: &S,
    ) -> Result<Self, AppError> {
        let mut reader = PayloadReader::new(payload, mode);
        reader.reject_read_only(READ_ONLY_FIELDS);

        let title = read_name(&mut reader, "title", true);

        let time_minutes = reader.integer("time_minutes", true);
        if let Some(minutes) = time_minutes
            && minutes < 0
        {
            reader.push(
                "time_minutes",
                FieldErrorKind::Invalid("Must be >= 0".into()),
            );
        }

        let price = reader.number("price", true);
        if let Some(price) = price
            && (!price.is_finite() || price < 0.0)
        {
            reader.push("price", FieldErrorKind::Invalid("Must be >= 0".into()));
        }

        let link = reader.string("link", false).map(|l| l.trim().to_string());
        if let Some(ref link) = link
            && link.chars().count() > MAX_TEXT_LENGTH
        {
            reader.push(
                "link",
                FieldErrorKind::Invalid(format!("Must be at most {MAX_TEXT_LENGTH} characters")),
            );
        }

        let ingredients = reader.id_list("ingredients", true);
        if let Some(ref ids) = ingredients {
            let found = store.existing_ingredient_ids(ids).await?;
            check_resolved(&mut reader, "ingredients", "ingredient", ids, &found);
        }

        let tags = reader.id_list("tags", true);
        if let Some(ref ids) = tags {
            let found = store.existing_tag_ids(ids).await?;
            check_resolved(&mut reader, "tags", "tag", ids, &found);
        }

        reader.finish()?;

        Ok(Self {
            title,
            ingredients,
            tags,
            time_minutes,
            price,
            link,
        })
    }

    /// Whether any column stored on the recipe row itself was supplied.
    pub fn has_scalar_changes(&self) -> bool {
        self.title.is_some()
            || self.time_minutes.is_some()
            || self.price.is_some()
            || self.link.is_some()
    }

    /// Copy the supplied scalar fields onto `active`. Memberships are written
    /// separately since they live in junction tables.
    pub fn apply(&self, active: &mut recipe::ActiveModel) {
        if let Some(ref title) = self.title {
            active.title = Set(title.clone());
        }
        if let Some(minutes) = self.time_minutes {
            active.time_minutes = Set(minutes);
        }
        if let Some(price) = self.price {
            active.price = Set(price);
        }
        if let Some(ref link) = self.link {
            active.link = Set(link.clone());
        }
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String, // empty when the recipe has no source URL

    /// Reference to the uploaded image, relative to the media root.
    pub image: Option<String>,

    #[sea_orm(has_many, via = "recipe_ingredient")]
    pub ingredients: HasMany<super::ingredient::Entity>,

    #[sea_orm(has_many, via = "recipe_tag")]
    pub tags: HasMany<super::tag::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

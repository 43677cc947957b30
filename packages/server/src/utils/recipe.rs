use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::models::recipe::RecipeRecord;

/// Load the memberships of a single recipe.
pub async fn load_record<C: ConnectionTrait>(
    db: &C,
    recipe: recipe::Model,
) -> Result<RecipeRecord, DbErr> {
    let mut records = load_records(db, vec![recipe]).await?;
    records
        .pop()
        .ok_or_else(|| DbErr::Custom("recipe record vanished while loading".into()))
}

/// Load the memberships of many recipes with one query per junction table.
/// Output order follows `recipes`; memberships follow their stored position.
pub async fn load_records<C: ConnectionTrait>(
    db: &C,
    recipes: Vec<recipe::Model>,
) -> Result<Vec<RecipeRecord>, DbErr> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();

    let ingredient_rows = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(ids.clone()))
        .find_also_related(ingredient::Entity)
        .order_by_asc(recipe_ingredient::Column::Position)
        .order_by_asc(recipe_ingredient::Column::IngredientId)
        .all(db)
        .await?;

    let tag_rows = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(ids))
        .find_also_related(tag::Entity)
        .order_by_asc(recipe_tag::Column::Position)
        .order_by_asc(recipe_tag::Column::TagId)
        .all(db)
        .await?;

    let mut ingredients: HashMap<i32, Vec<ingredient::Model>> = HashMap::new();
    for (link, model) in ingredient_rows {
        if let Some(model) = model {
            ingredients.entry(link.recipe_id).or_default().push(model);
        }
    }

    let mut tags: HashMap<i32, Vec<tag::Model>> = HashMap::new();
    for (link, model) in tag_rows {
        if let Some(model) = model {
            tags.entry(link.recipe_id).or_default().push(model);
        }
    }

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let id = recipe.id;
            RecipeRecord {
                recipe,
                ingredients: ingredients.remove(&id).unwrap_or_default(),
                tags: tags.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

/// Replace a recipe's ingredient set; `ingredient_ids` order becomes storage order.
pub async fn replace_ingredients<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> Result<(), DbErr> {
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if ingredient_ids.is_empty() {
        return Ok(());
    }

    let rows = ingredient_ids
        .iter()
        .enumerate()
        .map(|(position, &ingredient_id)| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
            position: Set(position as i32),
        });
    recipe_ingredient::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Replace a recipe's tag set; `tag_ids` order becomes storage order.
pub async fn replace_tags<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }

    let rows = tag_ids
        .iter()
        .enumerate()
        .map(|(position, &tag_id)| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
            position: Set(position as i32),
        });
    recipe_tag::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::entity::{ingredient, recipe_ingredient};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::ingredient::*;
use crate::models::shared::AssignedQuery;
use crate::shaper::WriteMode;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Ingredients",
    operation_id = "listIngredients",
    summary = "List ingredients",
    description = "Returns all ingredients ordered by name. With `assigned_only=true`, only ingredients used by at least one recipe are returned.",
    params(AssignedQuery),
    responses(
        (status = 200, description = "List of ingredients", body = Vec<IngredientResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<AssignedQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let mut select = ingredient::Entity::find();
    if query.assigned_only.unwrap_or(false) {
        select = select.filter(
            ingredient::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(recipe_ingredient::Column::IngredientId)
                    .from(recipe_ingredient::Entity)
                    .to_owned(),
            ),
        );
    }

    let ingredients = select
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Ingredients",
    operation_id = "createIngredient",
    summary = "Create an ingredient",
    request_body = IngredientAttributes,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let attrs = IngredientAttributes::from_payload(&payload, WriteMode::Create)?;

    let mut active = <ingredient::ActiveModel as Default>::default();
    attrs.apply(&mut active);
    let model = active.insert(&state.db).await?;
    tracing::info!(id = model.id, "Ingredient created");

    Ok((StatusCode::CREATED, Json(IngredientResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "getIngredient",
    summary = "Get an ingredient by ID",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let model = find_ingredient(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "replaceIngredient",
    summary = "Replace an ingredient",
    description = "Full update: `name` and `calories` are required. Recipe calorie totals reflect the change on their next read.",
    params(("id" = i32, Path, description = "Ingredient ID")),
    request_body = IngredientAttributes,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn replace_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<IngredientResponse>, AppError> {
    write_ingredient(&state.db, id, &payload, WriteMode::Create).await
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "updateIngredient",
    summary = "Partially update an ingredient",
    params(("id" = i32, Path, description = "Ingredient ID")),
    request_body = IngredientAttributes,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<IngredientResponse>, AppError> {
    write_ingredient(&state.db, id, &payload, WriteMode::Partial).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "deleteIngredient",
    summary = "Delete an ingredient",
    description = "Deletes the ingredient and removes it from every recipe.",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_ingredient(&txn, id).await?;

    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::IngredientId.eq(id))
        .exec(&txn)
        .await?;
    ingredient::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(id, "Ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn write_ingredient(
    db: &DatabaseConnection,
    id: i32,
    payload: &Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<IngredientResponse>, AppError> {
    let existing = find_ingredient(db, id).await?;
    let attrs = IngredientAttributes::from_payload(payload, mode)?;

    if attrs == IngredientAttributes::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: ingredient::ActiveModel = existing.into();
    attrs.apply(&mut active);
    let model = active.update(db).await?;

    Ok(Json(model.into()))
}

async fn find_ingredient<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<ingredient::Model, AppError> {
    ingredient::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".into()))
}

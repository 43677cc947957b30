use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::entity::{recipe, recipe_ingredient, recipe_tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::recipe::*;
use crate::models::shared::parse_id_filter;
use crate::shaper::{FieldError, FieldErrorKind, ID_FIELD, ValidationErrors, WriteMode};
use crate::state::AppState;
use crate::utils::media::{image_extension, remove_image, save_image};
use crate::utils::recipe::{load_record, load_records, replace_ingredients, replace_tags};

#[utoipa::path(
    get,
    path = "/",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes",
    description = "Returns recipes in summary form, newest first. `tags` and `ingredients` take comma-separated ids and keep recipes that reference any of them; both filters may be combined.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "List of recipes", body = Vec<RecipeResponse>),
        (status = 400, description = "Malformed filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let mut select = recipe::Entity::find();

    if let Some(ref raw) = query.tags {
        let ids = parse_id_filter(raw, "tags")?;
        if !ids.is_empty() {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(recipe_tag::Column::RecipeId)
                        .from(recipe_tag::Entity)
                        .and_where(recipe_tag::Column::TagId.is_in(ids))
                        .to_owned(),
                ),
            );
        }
    }

    if let Some(ref raw) = query.ingredients {
        let ids = parse_id_filter(raw, "ingredients")?;
        if !ids.is_empty() {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(recipe_ingredient::Column::RecipeId)
                        .from(recipe_ingredient::Entity)
                        .and_where(recipe_ingredient::Column::IngredientId.is_in(ids))
                        .to_owned(),
                ),
            );
        }
    }

    let recipes = select
        .order_by_desc(recipe::Column::Id)
        .all(&state.db)
        .await?;
    let records = load_records(&state.db, recipes).await?;

    Ok(Json(records.iter().map(RecipeRecord::summary).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Create a recipe",
    description = "`title`, `ingredients`, `tags`, `time_minutes` and `price` are required. `ingredients` and `tags` are lists of existing ids and may be empty. Responds with the summary form.",
    request_body = RecipeAttributes,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let attrs = RecipeAttributes::from_payload(&payload, WriteMode::Create, &txn).await?;

    let mut active = recipe::ActiveModel {
        link: Set(String::new()),
        image: Set(None),
        ..Default::default()
    };
    attrs.apply(&mut active);
    let model = active.insert(&txn).await?;

    replace_ingredients(&txn, model.id, attrs.ingredients.as_deref().unwrap_or_default()).await?;
    replace_tags(&txn, model.id, attrs.tags.as_deref().unwrap_or_default()).await?;

    let record = load_record(&txn, model).await?;
    txn.commit().await?;
    tracing::info!(id = record.recipe.id, "Recipe created");

    Ok((StatusCode::CREATED, Json(record.summary())))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    description = "Returns the detail form, with ingredients and tags embedded.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetailResponse),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let model = find_recipe(&state.db, id).await?;
    let record = load_record(&state.db, model).await?;
    Ok(Json(record.detail()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "replaceRecipe",
    summary = "Replace a recipe",
    description = "Full update: `title`, `ingredients`, `tags`, `time_minutes` and `price` are required. The supplied `ingredients`/`tags` replace the current sets.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeAttributes,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn replace_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<RecipeResponse>, AppError> {
    write_recipe(&state.db, id, &payload, WriteMode::Create).await
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Partially update a recipe",
    description = "Only supplied fields are modified; an empty `ingredients` or `tags` list clears that set.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeAttributes,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<RecipeResponse>, AppError> {
    write_recipe(&state.db, id, &payload, WriteMode::Partial).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Deletes the recipe and its ingredient/tag memberships. Ingredients and tags themselves are kept.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_recipe(&txn, id).await?;

    replace_ingredients(&txn, id, &[]).await?;
    replace_tags(&txn, id, &[]).await?;
    recipe::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(ref image) = existing.image {
        remove_image(&state.config.media.root, image).await;
    }
    tracing::info!(id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/upload-image",
    tag = "Recipes",
    operation_id = "uploadRecipeImage",
    summary = "Upload an image for a recipe",
    description = "Multipart upload with a single `image` file part. Replaces any previous image. Responds with the image form.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` part"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<RecipeImageResponse>, AppError> {
    let existing = find_recipe(&state.db, id).await?;
    let max_size = state.config.media.max_upload_size;

    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut errors = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("image") => {
                let extension = image_extension(field.file_name());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                match extension {
                    Err(kind) => errors.push(FieldError {
                        field: "image",
                        kind,
                    }),
                    Ok(_) if data.len() > max_size => errors.push(FieldError {
                        field: "image",
                        kind: FieldErrorKind::Invalid(format!(
                            "Image exceeds the {max_size} byte limit"
                        )),
                    }),
                    Ok(ext) => upload = Some((ext, data.to_vec())),
                }
            }
            Some(name) if name == ID_FIELD => errors.push(FieldError {
                field: ID_FIELD,
                kind: FieldErrorKind::ReadOnly,
            }),
            _ => {}
        }
    }

    if upload.is_none() && !errors.iter().any(|e| e.field == "image") {
        errors.push(FieldError {
            field: "image",
            kind: FieldErrorKind::Missing,
        });
    }
    let (extension, data) = match upload {
        Some(upload) if errors.is_empty() => upload,
        _ => return Err(ValidationErrors::new(errors).into()),
    };

    let model = attach_image(&state.db, &state.config.media.root, existing, &extension, &data).await?;
    tracing::info!(id, size = data.len(), "Recipe image stored");

    Ok(Json(model.into()))
}

/// Store `data` as the recipe's image. The new file is removed again if the
/// row cannot be updated; the previous file is removed once it is replaced.
async fn attach_image(
    db: &DatabaseConnection,
    root: &std::path::Path,
    existing: recipe::Model,
    extension: &str,
    data: &[u8],
) -> Result<recipe::Model, AppError> {
    let reference = save_image(root, extension, data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store image: {e}")))?;

    let previous = existing.image.clone();
    let mut active: recipe::ActiveModel = existing.into();
    active.image = Set(Some(reference.clone()));

    let model = match active.update(db).await {
        Ok(model) => model,
        Err(e) => {
            remove_image(root, &reference).await;
            return Err(match e {
                DbErr::RecordNotUpdated => AppError::NotFound("Recipe not found".into()),
                other => other.into(),
            });
        }
    };

    if let Some(ref previous) = previous {
        remove_image(root, previous).await;
    }
    Ok(model)
}

async fn write_recipe(
    db: &DatabaseConnection,
    id: i32,
    payload: &Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<RecipeResponse>, AppError> {
    let txn = db.begin().await?;
    let existing = find_recipe(&txn, id).await?;
    let attrs = RecipeAttributes::from_payload(payload, mode, &txn).await?;

    let model = if attrs.has_scalar_changes() {
        let mut active: recipe::ActiveModel = existing.into();
        attrs.apply(&mut active);
        active.update(&txn).await?
    } else {
        existing
    };

    if let Some(ref ids) = attrs.ingredients {
        replace_ingredients(&txn, id, ids).await?;
    }
    if let Some(ref ids) = attrs.tags {
        replace_tags(&txn, id, ids).await?;
    }

    let record = load_record(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(record.summary()))
}

async fn find_recipe<C: ConnectionTrait>(db: &C, id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

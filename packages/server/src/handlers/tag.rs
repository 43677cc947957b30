use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::entity::{recipe_tag, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::shared::AssignedQuery;
use crate::models::tag::*;
use crate::shaper::WriteMode;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Tags",
    operation_id = "listTags",
    summary = "List tags",
    description = "Returns all tags ordered by name. With `assigned_only=true`, only tags attached to at least one recipe are returned.",
    params(AssignedQuery),
    responses(
        (status = 200, description = "List of tags", body = Vec<TagResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<AssignedQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let mut select = tag::Entity::find();
    if query.assigned_only.unwrap_or(false) {
        select = select.filter(
            tag::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(recipe_tag::Column::TagId)
                    .from(recipe_tag::Entity)
                    .to_owned(),
            ),
        );
    }

    let tags = select
        .order_by_asc(tag::Column::Name)
        .order_by_asc(tag::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tags",
    operation_id = "createTag",
    summary = "Create a tag",
    request_body = TagAttributes,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let attrs = TagAttributes::from_payload(&payload, WriteMode::Create)?;

    let mut active = <tag::ActiveModel as Default>::default();
    attrs.apply(&mut active);
    let model = active.insert(&state.db).await?;
    tracing::info!(id = model.id, "Tag created");

    Ok((StatusCode::CREATED, Json(TagResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tags",
    operation_id = "getTag",
    summary = "Get a tag by ID",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let model = find_tag(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Tags",
    operation_id = "replaceTag",
    summary = "Replace a tag",
    description = "Full update: `name` is required.",
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = TagAttributes,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn replace_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<TagResponse>, AppError> {
    write_tag(&state.db, id, &payload, WriteMode::Create).await
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tags",
    operation_id = "updateTag",
    summary = "Partially update a tag",
    description = "Only supplied fields are modified. An empty payload returns the tag unchanged.",
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = TagAttributes,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<TagResponse>, AppError> {
    write_tag(&state.db, id, &payload, WriteMode::Partial).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tags",
    operation_id = "deleteTag",
    summary = "Delete a tag",
    description = "Deletes the tag and detaches it from every recipe.",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_tag(&txn, id).await?;

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::TagId.eq(id))
        .exec(&txn)
        .await?;
    tag::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn write_tag(
    db: &DatabaseConnection,
    id: i32,
    payload: &Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<TagResponse>, AppError> {
    let existing = find_tag(db, id).await?;
    let attrs = TagAttributes::from_payload(payload, mode)?;

    if attrs == TagAttributes::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: tag::ActiveModel = existing.into();
    attrs.apply(&mut active);
    let model = active.update(db).await?;

    Ok(Json(model.into()))
}

async fn find_tag<C: ConnectionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))
}

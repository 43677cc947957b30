use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter,
};

use super::error::FieldErrorKind;
use super::payload::PayloadReader;
use crate::entity::{ingredient, tag};

/// Read access to the stores that ingredient and tag ids resolve against.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// The subset of `ids` that name an existing ingredient.
    async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr>;

    /// The subset of `ids` that name an existing tag.
    async fn existing_tag_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr>;
}

#[async_trait]
impl ReferenceStore for DatabaseConnection {
    async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr> {
        find_ingredient_ids(self, ids).await
    }

    async fn existing_tag_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr> {
        find_tag_ids(self, ids).await
    }
}

#[async_trait]
impl ReferenceStore for DatabaseTransaction {
    async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr> {
        find_ingredient_ids(self, ids).await
    }

    async fn existing_tag_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, DbErr> {
        find_tag_ids(self, ids).await
    }
}

async fn find_ingredient_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(found.into_iter().map(|m| m.id).collect())
}

async fn find_tag_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<HashSet<i32>, DbErr> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found = tag::Entity::find()
        .filter(tag::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(found.into_iter().map(|m| m.id).collect())
}

/// Record an unresolved-reference error on `field` for every id in `ids`
/// that is missing from `found`. Returns whether all ids resolved.
pub fn check_resolved(
    reader: &mut PayloadReader<'_>,
    field: &'static str,
    entity: &'static str,
    ids: &[i32],
    found: &HashSet<i32>,
) -> bool {
    let missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    if missing.is_empty() {
        return true;
    }
    reader.push(
        field,
        FieldErrorKind::UnresolvedReference {
            entity,
            ids: missing,
        },
    );
    false
}

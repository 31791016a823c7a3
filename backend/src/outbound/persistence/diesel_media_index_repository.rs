//! PostgreSQL-backed `MediaIndexRepository` implementation using Diesel.
//!
//! The index row is the queryable shadow of a stored blob: listings and
//! ownership checks read it, the object store itself is never scanned.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MediaIndexRepository, MediaIndexRepositoryError};
use crate::domain::{MediaKey, MediaObject, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::MediaObjectRow;
use super::pool::{DbPool, PoolError};
use super::schema::media_objects;

/// Diesel-backed implementation of the `MediaIndexRepository` port.
#[derive(Clone)]
pub struct DieselMediaIndexRepository {
    pool: DbPool,
}

impl DieselMediaIndexRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MediaIndexRepositoryError {
    map_basic_pool_error(error, MediaIndexRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MediaIndexRepositoryError {
    map_basic_diesel_error(
        error,
        MediaIndexRepositoryError::query,
        MediaIndexRepositoryError::connection,
    )
}

fn row_to_object(row: MediaObjectRow) -> Result<MediaObject, MediaIndexRepositoryError> {
    row.into_domain().map_err(|err| {
        MediaIndexRepositoryError::query(format!("corrupted media index row: {err}"))
    })
}

#[async_trait]
impl MediaIndexRepository for DieselMediaIndexRepository {
    async fn upsert(&self, object: &MediaObject) -> Result<(), MediaIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = MediaObjectRow::from_domain(object);

        diesel::insert_into(media_objects::table)
            .values(&row)
            .on_conflict(media_objects::key)
            .do_update()
            .set((
                media_objects::owner_id.eq(&row.owner_id),
                media_objects::content_type.eq(&row.content_type),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MediaObjectRow> = media_objects::table
            .filter(
                media_objects::key
                    .eq(key.as_str())
                    .and(media_objects::owner_id.eq(owner.as_uuid())),
            )
            .select(MediaObjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_object).transpose()
    }

    async fn find_by_key(
        &self,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MediaObjectRow> = media_objects::table
            .filter(media_objects::key.eq(key.as_str()))
            .select(MediaObjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_object).transpose()
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MediaObject>, MediaIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MediaObjectRow> = media_objects::table
            .filter(media_objects::owner_id.eq(owner.as_uuid()))
            .order(media_objects::created_at.desc())
            .select(MediaObjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_object).collect()
    }

    async fn delete_by_key(&self, key: &MediaKey) -> Result<bool, MediaIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            media_objects::table.filter(media_objects::key.eq(key.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

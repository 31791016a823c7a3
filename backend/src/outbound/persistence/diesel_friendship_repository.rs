//! PostgreSQL-backed `FriendshipRepository` implementation using Diesel.
//!
//! One row per pair, keyed by the unique `(user_lo, user_hi)` index.
//! Acceptance is a guarded update: the filters encode "pending, involves the
//! caller, caller did not request it", so a non-matching caller or a settled
//! edge simply updates zero rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FriendshipRepository, FriendshipRepositoryError};
use crate::domain::{FriendPair, Friendship, FriendshipStatus, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::FriendshipRow;
use super::pool::{DbPool, PoolError};
use super::schema::friendships;

/// Diesel-backed implementation of the `FriendshipRepository` port.
#[derive(Clone)]
pub struct DieselFriendshipRepository {
    pool: DbPool,
}

impl DieselFriendshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FriendshipRepositoryError {
    map_basic_pool_error(error, FriendshipRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FriendshipRepositoryError {
    if is_unique_violation(&error) {
        return FriendshipRepositoryError::duplicate_edge("pair already linked");
    }
    map_basic_diesel_error(
        error,
        FriendshipRepositoryError::query,
        FriendshipRepositoryError::connection,
    )
}

fn row_to_edge(row: FriendshipRow) -> Result<Friendship, FriendshipRepositoryError> {
    row.into_domain().map_err(|err| {
        FriendshipRepositoryError::query(format!("corrupted friendship row: {err}"))
    })
}

#[async_trait]
impl FriendshipRepository for DieselFriendshipRepository {
    async fn insert_pending(
        &self,
        friendship: &Friendship,
    ) -> Result<(), FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(friendships::table)
            .values(&FriendshipRow::from_domain(friendship))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FriendshipRow> = friendships::table
            .find(id)
            .select(FriendshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_edge).transpose()
    }

    async fn find_pair(
        &self,
        pair: &FriendPair,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FriendshipRow> = friendships::table
            .filter(
                friendships::user_lo
                    .eq(pair.lo().as_uuid())
                    .and(friendships::user_hi.eq(pair.hi().as_uuid())),
            )
            .select(FriendshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_edge).transpose()
    }

    async fn accept(
        &self,
        id: &Uuid,
        caller: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FriendshipRow> = diesel::update(
            friendships::table.filter(
                friendships::id
                    .eq(id)
                    .and(friendships::status.eq(FriendshipStatus::Pending.as_str()))
                    .and(friendships::requester_id.ne(caller.as_uuid()))
                    .and(
                        friendships::user_lo
                            .eq(caller.as_uuid())
                            .or(friendships::user_hi.eq(caller.as_uuid())),
                    ),
            ),
        )
        .set((
            friendships::status.eq(FriendshipStatus::Accepted.as_str()),
            friendships::updated_at.eq(diesel::dsl::now),
        ))
        .returning(FriendshipRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_edge).transpose()
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FriendshipRow> = friendships::table
            .filter(
                friendships::user_lo
                    .eq(user.as_uuid())
                    .or(friendships::user_hi.eq(user.as_uuid())),
            )
            .order(friendships::created_at.desc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_edge).collect()
    }
}

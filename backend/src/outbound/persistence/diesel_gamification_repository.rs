//! PostgreSQL-backed `GamificationRepository` implementation using Diesel.
//!
//! The achievement insert relies on the `(user_id, code)` primary key and
//! `ON CONFLICT DO NOTHING`: under N concurrent award attempts exactly one
//! insert reports an affected row, and that boolean is the award gate the
//! domain builds on. The ledger is append-only.

use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{GamificationRepository, GamificationRepositoryError};
use crate::domain::{AchievementRecord, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AchievementRow, NewLedgerEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{achievements, points_ledger};

/// Diesel-backed implementation of the `GamificationRepository` port.
#[derive(Clone)]
pub struct DieselGamificationRepository {
    pool: DbPool,
}

impl DieselGamificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GamificationRepositoryError {
    map_basic_pool_error(error, GamificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GamificationRepositoryError {
    map_basic_diesel_error(
        error,
        GamificationRepositoryError::query,
        GamificationRepositoryError::connection,
    )
}

#[async_trait]
impl GamificationRepository for DieselGamificationRepository {
    async fn insert_achievement(
        &self,
        user: &UserId,
        code: &str,
        points: i32,
    ) -> Result<bool, GamificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(achievements::table)
            .values((
                achievements::user_id.eq(user.as_uuid()),
                achievements::code.eq(code),
                achievements::points.eq(points),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn append_points(
        &self,
        user: &UserId,
        points: i32,
        reason: &str,
    ) -> Result<(), GamificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let entry = NewLedgerEntryRow {
            id: Uuid::new_v4(),
            user_id: *user.as_uuid(),
            points,
            reason: reason.to_owned(),
        };
        diesel::insert_into(points_ledger::table)
            .values(&entry)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_achievements(
        &self,
        user: &UserId,
    ) -> Result<Vec<AchievementRecord>, GamificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AchievementRow> = achievements::table
            .filter(achievements::user_id.eq(user.as_uuid()))
            .order(achievements::created_at.desc())
            .select(AchievementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(AchievementRecord::from).collect())
    }

    async fn total_points(&self, user: &UserId) -> Result<i64, GamificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: Option<i64> = points_ledger::table
            .filter(points_ledger::user_id.eq(user.as_uuid()))
            .select(sum(points_ledger::points))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total.unwrap_or(0))
    }
}

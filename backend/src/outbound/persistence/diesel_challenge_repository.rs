//! PostgreSQL-backed `ChallengeRepository` implementation using Diesel.
//!
//! Progress writes and completion are both guarded by `status = 'active'`.
//! Completion additionally sets the winner in the same statement, so the
//! row count tells the domain whether this call performed the terminal
//! transition. Compare-and-set in SQL, no advisory locks.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ChallengeRepository, ChallengeRepositoryError};
use crate::domain::{Challenge, ChallengeSide, ChallengeStatus, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::ChallengeRow;
use super::pool::{DbPool, PoolError};
use super::schema::challenges;

/// Diesel-backed implementation of the `ChallengeRepository` port.
#[derive(Clone)]
pub struct DieselChallengeRepository {
    pool: DbPool,
}

impl DieselChallengeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChallengeRepositoryError {
    map_basic_pool_error(error, ChallengeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ChallengeRepositoryError {
    map_basic_diesel_error(
        error,
        ChallengeRepositoryError::query,
        ChallengeRepositoryError::connection,
    )
}

fn row_to_challenge(row: ChallengeRow) -> Result<Challenge, ChallengeRepositoryError> {
    row.into_domain()
        .map_err(|err| ChallengeRepositoryError::query(format!("corrupted challenge row: {err}")))
}

#[async_trait]
impl ChallengeRepository for DieselChallengeRepository {
    async fn insert(&self, challenge: &Challenge) -> Result<(), ChallengeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(challenges::table)
            .values(&ChallengeRow::from_domain(challenge))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ChallengeRow> = challenges::table
            .find(id)
            .select(ChallengeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_challenge).transpose()
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Challenge>, ChallengeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ChallengeRow> = challenges::table
            .filter(
                challenges::challenger_id
                    .eq(user.as_uuid())
                    .or(challenges::challenged_id.eq(user.as_uuid())),
            )
            .order(challenges::created_at.desc())
            .select(ChallengeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_challenge).collect()
    }

    async fn record_progress(
        &self,
        id: &Uuid,
        side: ChallengeSide,
        value: i64,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let guard = challenges::table.filter(
            challenges::id
                .eq(id)
                .and(challenges::status.eq(ChallengeStatus::Active.as_str())),
        );
        // set() fixes the statement type per column, so each side gets its
        // own update.
        let row: Option<ChallengeRow> = match side {
            ChallengeSide::Challenger => {
                diesel::update(guard)
                    .set(challenges::challenger_progress.eq(value))
                    .returning(ChallengeRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?
            }
            ChallengeSide::Challenged => {
                diesel::update(guard)
                    .set(challenges::challenged_progress.eq(value))
                    .returning(ChallengeRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?
            }
        };
        row.map(row_to_challenge).transpose()
    }

    async fn complete(
        &self,
        id: &Uuid,
        winner: &UserId,
    ) -> Result<bool, ChallengeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            challenges::table.filter(
                challenges::id
                    .eq(id)
                    .and(challenges::status.eq(ChallengeStatus::Active.as_str())),
            ),
        )
        .set((
            challenges::status.eq(ChallengeStatus::Completed.as_str()),
            challenges::winner_id.eq(winner.as_uuid()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}

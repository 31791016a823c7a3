//! Port for achievement and points ledger persistence.
//!
//! The achievement table is the idempotency gate: its `(user_id, code)`
//! uniqueness constraint is the only thing standing between N concurrent
//! award attempts and N ledger entries. Adapters must implement
//! [`GamificationRepository::insert_achievement`] as a conditional insert
//! resolved atomically by the backing store.

use async_trait::async_trait;

use crate::domain::{AchievementRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by gamification repository adapters.
    pub enum GamificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "gamification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "gamification repository query failed: {message}",
    }
}

/// Port for achievement records and the append-only points ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GamificationRepository: Send + Sync {
    /// Conditionally insert an achievement record.
    ///
    /// Returns `true` when this call created the record, `false` when the
    /// `(user, code)` pair was already awarded. Concurrent calls resolve on
    /// the store's uniqueness constraint; exactly one caller observes `true`.
    async fn insert_achievement(
        &self,
        user: &UserId,
        code: &str,
        points: i32,
    ) -> Result<bool, GamificationRepositoryError>;

    /// Append one entry to the points ledger.
    async fn append_points(
        &self,
        user: &UserId,
        points: i32,
        reason: &str,
    ) -> Result<(), GamificationRepositoryError>;

    /// List a user's achievement records, newest first.
    async fn list_achievements(
        &self,
        user: &UserId,
    ) -> Result<Vec<AchievementRecord>, GamificationRepositoryError>;

    /// Sum of all ledger entries for a user.
    async fn total_points(&self, user: &UserId) -> Result<i64, GamificationRepositoryError>;
}

/// Fixture implementation that grants everything and holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGamificationRepository;

#[async_trait]
impl GamificationRepository for FixtureGamificationRepository {
    async fn insert_achievement(
        &self,
        _user: &UserId,
        _code: &str,
        _points: i32,
    ) -> Result<bool, GamificationRepositoryError> {
        Ok(true)
    }

    async fn append_points(
        &self,
        _user: &UserId,
        _points: i32,
        _reason: &str,
    ) -> Result<(), GamificationRepositoryError> {
        Ok(())
    }

    async fn list_achievements(
        &self,
        _user: &UserId,
    ) -> Result<Vec<AchievementRecord>, GamificationRepositoryError> {
        Ok(Vec::new())
    }

    async fn total_points(&self, _user: &UserId) -> Result<i64, GamificationRepositoryError> {
        Ok(0)
    }
}

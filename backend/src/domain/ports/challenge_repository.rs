//! Port for challenge persistence.
//!
//! Both mutating operations are guarded updates: progress writes apply only
//! while the challenge is active, and [`ChallengeRepository::complete`] flips
//! `active -> completed` as a single conditional write. The boolean it
//! returns is what makes the winner's reward credit happen at most once
//! under concurrent progress updates from both participants.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Challenge, ChallengeSide, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by challenge repository adapters.
    pub enum ChallengeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "challenge repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "challenge repository query failed: {message}",
    }
}

/// Port for challenge storage and state transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Insert a new challenge.
    async fn insert(&self, challenge: &Challenge) -> Result<(), ChallengeRepositoryError>;

    /// Fetch a challenge by id.
    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError>;

    /// List challenges where the user participates, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Challenge>, ChallengeRepositoryError>;

    /// Write one side's progress, guarded by `status = active`.
    ///
    /// Returns the updated row, or `None` when the challenge is absent or no
    /// longer active.
    async fn record_progress(
        &self,
        id: &Uuid,
        side: ChallengeSide,
        value: i64,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError>;

    /// Conditional terminal transition `active -> completed`.
    ///
    /// Returns `true` only for the single call that performed the
    /// transition; every other caller observes `false`.
    async fn complete(
        &self,
        id: &Uuid,
        winner: &UserId,
    ) -> Result<bool, ChallengeRepositoryError>;
}

/// Fixture implementation holding no challenges.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChallengeRepository;

#[async_trait]
impl ChallengeRepository for FixtureChallengeRepository {
    async fn insert(&self, _challenge: &Challenge) -> Result<(), ChallengeRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &Uuid,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user: &UserId,
    ) -> Result<Vec<Challenge>, ChallengeRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_progress(
        &self,
        _id: &Uuid,
        _side: ChallengeSide,
        _value: i64,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        Ok(None)
    }

    async fn complete(
        &self,
        _id: &Uuid,
        _winner: &UserId,
    ) -> Result<bool, ChallengeRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_repository_never_transitions() {
        let repo = FixtureChallengeRepository;
        assert!(!repo
            .complete(&Uuid::new_v4(), &UserId::random())
            .await
            .expect("complete succeeds"));
    }
}

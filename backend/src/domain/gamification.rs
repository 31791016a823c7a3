//! Achievement catalog and points ledger.
//!
//! An achievement is a one-time, per-user-per-code unlock that gates a
//! single point award. The ledger is append-only; a user's score is the sum
//! of its entries, and the achievement table is the sole dedup gate. Award
//! side effects are best-effort: the primary action that triggered them must
//! succeed regardless.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{GamificationRepository, GamificationRepositoryError};
use crate::domain::{Error, UserId};

/// Catalogued achievement codes and their point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementCode {
    /// First media upload.
    FirstUpload,
    /// First accepted friendship.
    FirstFriend,
    /// First challenge issued.
    FirstChallenge,
}

impl AchievementCode {
    /// Stable wire representation of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstUpload => "first_upload",
            Self::FirstFriend => "first_friend",
            Self::FirstChallenge => "first_challenge",
        }
    }

    /// Points granted when the achievement unlocks.
    pub const fn points(self) -> i32 {
        match self {
            Self::FirstUpload => 25,
            Self::FirstFriend => 10,
            Self::FirstChallenge => 10,
        }
    }
}

impl fmt::Display for AchievementCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_upload" => Ok(Self::FirstUpload),
            "first_friend" => Ok(Self::FirstFriend),
            "first_challenge" => Ok(Self::FirstChallenge),
            other => Err(format!("unknown achievement code: {other}")),
        }
    }
}

/// One unlocked achievement. Created exactly once per `(user, code)`, never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    /// Owning user.
    pub user_id: UserId,
    /// Catalogued achievement code.
    pub code: String,
    /// Points granted by the unlock.
    pub points: i32,
    /// Unlock timestamp.
    pub created_at: DateTime<Utc>,
}

/// Outcome of an award attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    /// This call created the achievement and appended the ledger entry.
    Granted,
    /// Another call already awarded the code; nothing happened.
    AlreadyAwarded,
}

/// Service over the achievement table and points ledger.
#[derive(Clone)]
pub struct GamificationService {
    repo: Arc<dyn GamificationRepository>,
}

impl GamificationService {
    /// Create a new service with the given repository.
    pub fn new(repo: Arc<dyn GamificationRepository>) -> Self {
        Self { repo }
    }

    fn map_repository_error(error: GamificationRepositoryError) -> Error {
        match error {
            GamificationRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("gamification repository unavailable: {message}"))
            }
            GamificationRepositoryError::Query { message } => {
                Error::internal(format!("gamification repository error: {message}"))
            }
        }
    }

    /// Award an achievement at most once.
    ///
    /// The conditional insert into the achievement table resolves on the
    /// store's uniqueness constraint; only the call whose insert landed
    /// appends the ledger entry.
    pub async fn award_once(
        &self,
        user: &UserId,
        code: AchievementCode,
    ) -> Result<AwardOutcome, Error> {
        let inserted = self
            .repo
            .insert_achievement(user, code.as_str(), code.points())
            .await
            .map_err(Self::map_repository_error)?;
        if !inserted {
            return Ok(AwardOutcome::AlreadyAwarded);
        }

        self.repo
            .append_points(user, code.points(), code.as_str())
            .await
            .map_err(Self::map_repository_error)?;
        Ok(AwardOutcome::Granted)
    }

    /// Best-effort award used as a side effect of primary actions.
    ///
    /// Errors are logged and swallowed so the triggering action still
    /// succeeds.
    pub async fn grant(&self, user: &UserId, code: AchievementCode) {
        if let Err(error) = self.award_once(user, code).await {
            warn!(%user, code = code.as_str(), %error, "achievement award failed");
        }
    }

    /// Append a ledger entry outside the catalog, e.g. a challenge reward.
    pub async fn credit(&self, user: &UserId, points: i32, reason: &str) -> Result<(), Error> {
        self.repo
            .append_points(user, points, reason)
            .await
            .map_err(Self::map_repository_error)
    }

    /// Best-effort variant of [`GamificationService::credit`].
    pub async fn credit_best_effort(&self, user: &UserId, points: i32, reason: &str) {
        if let Err(error) = self.credit(user, points, reason).await {
            warn!(%user, points, reason, %error, "points credit failed");
        }
    }

    /// List a user's unlocked achievements.
    pub async fn achievements(&self, user: &UserId) -> Result<Vec<AchievementRecord>, Error> {
        self.repo
            .list_achievements(user)
            .await
            .map_err(Self::map_repository_error)
    }

    /// A user's authoritative score: the sum of all ledger entries.
    pub async fn total_points(&self, user: &UserId) -> Result<i64, Error> {
        self.repo
            .total_points(user)
            .await
            .map_err(Self::map_repository_error)
    }
}

/// Ledger reason for a challenge reward credit.
pub fn challenge_reward_reason(challenge_id: &Uuid) -> String {
    format!("challenge:{challenge_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockGamificationRepository;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("first_upload", AchievementCode::FirstUpload, 25)]
    #[case("first_friend", AchievementCode::FirstFriend, 10)]
    #[case("first_challenge", AchievementCode::FirstChallenge, 10)]
    fn catalog_codes_round_trip(
        #[case] raw: &str,
        #[case] code: AchievementCode,
        #[case] points: i32,
    ) {
        assert_eq!(AchievementCode::from_str(raw).expect("known code"), code);
        assert_eq!(code.as_str(), raw);
        assert_eq!(code.points(), points);
    }

    #[tokio::test]
    async fn award_once_appends_ledger_entry_only_on_fresh_insert() {
        let user = UserId::random();
        let mut repo = MockGamificationRepository::new();
        repo.expect_insert_achievement()
            .withf(|_, code, points| code == "first_upload" && *points == 25)
            .times(1)
            .return_once(|_, _, _| Ok(true));
        repo.expect_append_points()
            .withf(|_, points, reason| *points == 25 && reason == "first_upload")
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = GamificationService::new(Arc::new(repo));
        let outcome = service
            .award_once(&user, AchievementCode::FirstUpload)
            .await
            .expect("award succeeds");
        assert_eq!(outcome, AwardOutcome::Granted);
    }

    #[tokio::test]
    async fn award_once_skips_ledger_when_already_awarded() {
        let user = UserId::random();
        let mut repo = MockGamificationRepository::new();
        repo.expect_insert_achievement()
            .times(1)
            .return_once(|_, _, _| Ok(false));
        repo.expect_append_points().times(0);

        let service = GamificationService::new(Arc::new(repo));
        let outcome = service
            .award_once(&user, AchievementCode::FirstUpload)
            .await
            .expect("award succeeds");
        assert_eq!(outcome, AwardOutcome::AlreadyAwarded);
    }

    #[tokio::test]
    async fn grant_swallows_repository_failures() {
        let user = UserId::random();
        let mut repo = MockGamificationRepository::new();
        repo.expect_insert_achievement()
            .times(1)
            .return_once(|_, _, _| Err(GamificationRepositoryError::connection("refused")));

        let service = GamificationService::new(Arc::new(repo));
        // Must not panic or propagate; the primary action keeps going.
        service.grant(&user, AchievementCode::FirstFriend).await;
    }

    #[tokio::test]
    async fn connection_failures_map_to_service_unavailable() {
        let user = UserId::random();
        let mut repo = MockGamificationRepository::new();
        repo.expect_total_points()
            .times(1)
            .return_once(|_| Err(GamificationRepositoryError::connection("refused")));

        let service = GamificationService::new(Arc::new(repo));
        let error = service.total_points(&user).await.expect_err("fails");
        assert_eq!(error.code, ErrorCode::ServiceUnavailable);
    }

    #[test]
    fn challenge_reward_reason_embeds_the_id() {
        let id = Uuid::nil();
        assert_eq!(
            challenge_reward_reason(&id),
            "challenge:00000000-0000-0000-0000-000000000000"
        );
    }
}

//! Head-to-head challenges between friends.
//!
//! A challenge is a race between two users toward a target value. Progress
//! writes only apply while the challenge is active, and the
//! `active -> completed` transition is a single guarded write in the store,
//! so exactly one finisher is crowned and the reward is credited once even
//! when both sides report qualifying progress concurrently.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::gamification::{challenge_reward_reason, AchievementCode, GamificationService};
use crate::domain::ports::{ChallengeRepository, ChallengeRepositoryError};
use crate::domain::social::SocialGraphService;
use crate::domain::{Error, UserId};

/// Lifecycle state of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    /// Accepting progress updates.
    Active,
    /// A winner has been determined; the record is immutable.
    Completed,
}

impl ChallengeStatus {
    /// Stable wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown challenge status: {other}")),
        }
    }
}

/// Which participant a progress write belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeSide {
    /// The issuing user.
    Challenger,
    /// The challenged user.
    Challenged,
}

/// One challenge row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Challenge identifier.
    pub id: Uuid,
    /// Issuing user.
    pub challenger_id: UserId,
    /// Challenged user.
    pub challenged_id: UserId,
    /// Free-form activity label, e.g. `steps` or `distance_km`.
    pub challenge_type: String,
    /// Value a participant must reach to finish.
    pub target_value: i64,
    /// Challenger's latest reported progress.
    pub challenger_progress: i64,
    /// Challenged user's latest reported progress.
    pub challenged_progress: i64,
    /// Points credited to the winner on completion.
    pub points_reward: i32,
    /// Current lifecycle state.
    pub status: ChallengeStatus,
    /// Winner, set exactly once on completion.
    pub winner_id: Option<UserId>,
    /// Start of the challenge window.
    pub start_date: DateTime<Utc>,
    /// End of the challenge window.
    pub end_date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    /// Which side the user plays, if a participant.
    pub fn side_of(&self, user: &UserId) -> Option<ChallengeSide> {
        if self.challenger_id == *user {
            Some(ChallengeSide::Challenger)
        } else if self.challenged_id == *user {
            Some(ChallengeSide::Challenged)
        } else {
            None
        }
    }

    /// Progress reported for a side.
    pub const fn progress(&self, side: ChallengeSide) -> i64 {
        match side {
            ChallengeSide::Challenger => self.challenger_progress,
            ChallengeSide::Challenged => self.challenged_progress,
        }
    }

    /// The first participant at or past the target, challenger checked
    /// first.
    pub fn finisher(&self) -> Option<UserId> {
        if self.challenger_progress >= self.target_value {
            Some(self.challenger_id)
        } else if self.challenged_progress >= self.target_value {
            Some(self.challenged_id)
        } else {
            None
        }
    }
}

/// Service over the challenge store.
#[derive(Clone)]
pub struct ChallengeService {
    repo: Arc<dyn ChallengeRepository>,
    social: SocialGraphService,
    gamification: GamificationService,
}

impl ChallengeService {
    /// Create a new service over the given collaborators.
    pub fn new(
        repo: Arc<dyn ChallengeRepository>,
        social: SocialGraphService,
        gamification: GamificationService,
    ) -> Self {
        Self { repo, social, gamification }
    }

    fn map_repository_error(error: ChallengeRepositoryError) -> Error {
        match error {
            ChallengeRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("challenge repository unavailable: {message}"))
            }
            ChallengeRepositoryError::Query { message } => {
                Error::internal(format!("challenge repository error: {message}"))
            }
        }
    }

    /// Issue a challenge to an accepted friend.
    ///
    /// The first challenge a user issues unlocks `first_challenge`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        challenger: &UserId,
        challenged: &UserId,
        challenge_type: &str,
        target_value: i64,
        points_reward: i32,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Challenge, Error> {
        if challenger == challenged {
            return Err(Error::invalid_request("cannot challenge yourself"));
        }
        if challenge_type.trim().is_empty() {
            return Err(Error::invalid_request("challenge type must not be empty"));
        }
        if target_value <= 0 {
            return Err(Error::invalid_request("target value must be positive"));
        }
        if points_reward < 0 {
            return Err(Error::invalid_request("points reward must not be negative"));
        }
        if end_date <= start_date {
            return Err(Error::invalid_request("end date must follow start date"));
        }
        if !self.social.are_friends(challenger, challenged).await? {
            return Err(Error::forbidden("challenges require an accepted friendship"));
        }

        let challenge = Challenge {
            id: Uuid::new_v4(),
            challenger_id: *challenger,
            challenged_id: *challenged,
            challenge_type: challenge_type.to_owned(),
            target_value,
            challenger_progress: 0,
            challenged_progress: 0,
            points_reward,
            status: ChallengeStatus::Active,
            winner_id: None,
            start_date,
            end_date,
            created_at: Utc::now(),
        };
        self.repo
            .insert(&challenge)
            .await
            .map_err(Self::map_repository_error)?;
        self.gamification
            .grant(challenger, AchievementCode::FirstChallenge)
            .await;
        Ok(challenge)
    }

    /// Record a participant's progress and settle the challenge if the
    /// target is reached.
    ///
    /// Completed challenges are terminal: updates against one return the
    /// stored row unchanged. When the guarded completion write says this
    /// call performed the transition, the reward is credited here and
    /// nowhere else.
    pub async fn update_progress(
        &self,
        id: &Uuid,
        caller: &UserId,
        value: i64,
    ) -> Result<Challenge, Error> {
        if value < 0 {
            return Err(Error::invalid_request("progress must not be negative"));
        }
        let challenge = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("challenge not found"))?;
        let Some(side) = challenge.side_of(caller) else {
            return Err(Error::forbidden("only participants may report progress"));
        };
        if challenge.status == ChallengeStatus::Completed {
            return Ok(challenge);
        }

        let updated = self
            .repo
            .record_progress(id, side, value)
            .await
            .map_err(Self::map_repository_error)?;
        // The guard can lose a race with a concurrent completion; the
        // terminal row is then the answer.
        let Some(updated) = updated else {
            return self
                .repo
                .find_by_id(id)
                .await
                .map_err(Self::map_repository_error)?
                .ok_or_else(|| Error::not_found("challenge not found"));
        };

        let Some(winner) = updated.finisher() else {
            return Ok(updated);
        };
        let transitioned = self
            .repo
            .complete(id, &winner)
            .await
            .map_err(Self::map_repository_error)?;
        if transitioned {
            info!(challenge = %id, %winner, "challenge completed");
            if updated.points_reward > 0 {
                self.gamification
                    .credit_best_effort(
                        &winner,
                        updated.points_reward,
                        &challenge_reward_reason(id),
                    )
                    .await;
            }
        }
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("challenge not found"))
    }

    /// Fetch a challenge visible to the caller.
    pub async fn get(&self, id: &Uuid, caller: &UserId) -> Result<Challenge, Error> {
        let challenge = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("challenge not found"))?;
        if challenge.side_of(caller).is_none() {
            return Err(Error::forbidden("only participants may view a challenge"));
        }
        Ok(challenge)
    }

    /// List the caller's challenges, newest first.
    pub async fn list(&self, user: &UserId) -> Result<Vec<Challenge>, Error> {
        self.repo
            .list_for_user(user)
            .await
            .map_err(Self::map_repository_error)
    }
}

//! Row types bridging Diesel and the domain.
//!
//! Rows hold raw column types; conversions into domain entities validate
//! text columns (status strings, media keys) so corrupt rows surface as
//! query errors instead of panics.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AchievementRecord, Challenge, ChallengeStatus, Friendship, FriendshipStatus, MediaKey,
    MediaObject, UserId,
};

use super::schema::{achievements, challenges, friendships, media_objects, points_ledger};

#[derive(Debug, Clone, Queryable, Insertable, Selectable)]
#[diesel(table_name = media_objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MediaObjectRow {
    pub key: String,
    pub owner_id: Uuid,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl MediaObjectRow {
    pub fn from_domain(object: &MediaObject) -> Self {
        Self {
            key: object.key.as_str().to_owned(),
            owner_id: *object.owner_id.as_uuid(),
            content_type: object.content_type.clone(),
            created_at: object.created_at,
        }
    }

    pub fn into_domain(self) -> Result<MediaObject, String> {
        let key = MediaKey::new(self.key).map_err(|error| error.to_string())?;
        Ok(MediaObject {
            key,
            owner_id: UserId::from_uuid(self.owner_id),
            content_type: self.content_type,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Selectable)]
#[diesel(table_name = achievements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AchievementRow {
    pub user_id: Uuid,
    pub code: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

impl From<AchievementRow> for AchievementRecord {
    fn from(row: AchievementRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            code: row.code,
            points: row.points,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = points_ledger)]
pub struct NewLedgerEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Queryable, Insertable, Selectable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FriendshipRow {
    pub id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub requester_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendshipRow {
    pub fn from_domain(friendship: &Friendship) -> Self {
        Self {
            id: friendship.id,
            user_lo: *friendship.user_lo.as_uuid(),
            user_hi: *friendship.user_hi.as_uuid(),
            requester_id: *friendship.requester_id.as_uuid(),
            status: friendship.status.as_str().to_owned(),
            created_at: friendship.created_at,
            updated_at: friendship.updated_at,
        }
    }

    pub fn into_domain(self) -> Result<Friendship, String> {
        let status: FriendshipStatus = self.status.parse()?;
        Ok(Friendship {
            id: self.id,
            user_lo: UserId::from_uuid(self.user_lo),
            user_hi: UserId::from_uuid(self.user_hi),
            requester_id: UserId::from_uuid(self.requester_id),
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Selectable)]
#[diesel(table_name = challenges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChallengeRow {
    pub id: Uuid,
    pub challenger_id: Uuid,
    pub challenged_id: Uuid,
    pub challenge_type: String,
    pub target_value: i64,
    pub challenger_progress: i64,
    pub challenged_progress: i64,
    pub points_reward: i32,
    pub status: String,
    pub winner_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ChallengeRow {
    pub fn from_domain(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id,
            challenger_id: *challenge.challenger_id.as_uuid(),
            challenged_id: *challenge.challenged_id.as_uuid(),
            challenge_type: challenge.challenge_type.clone(),
            target_value: challenge.target_value,
            challenger_progress: challenge.challenger_progress,
            challenged_progress: challenge.challenged_progress,
            points_reward: challenge.points_reward,
            status: challenge.status.as_str().to_owned(),
            winner_id: challenge.winner_id.map(|id| *id.as_uuid()),
            start_date: challenge.start_date,
            end_date: challenge.end_date,
            created_at: challenge.created_at,
        }
    }

    pub fn into_domain(self) -> Result<Challenge, String> {
        let status: ChallengeStatus = self.status.parse()?;
        Ok(Challenge {
            id: self.id,
            challenger_id: UserId::from_uuid(self.challenger_id),
            challenged_id: UserId::from_uuid(self.challenged_id),
            challenge_type: self.challenge_type,
            target_value: self.target_value,
            challenger_progress: self.challenger_progress,
            challenged_progress: self.challenged_progress,
            points_reward: self.points_reward,
            status,
            winner_id: self.winner_id.map(UserId::from_uuid),
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        })
    }
}

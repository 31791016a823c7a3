//! In-memory adapters for tests.
//!
//! These implement the domain ports over mutex-guarded maps, preserving the
//! same at-most-once guard semantics the SQL adapters get from conditional
//! writes. Integration tests drive full HTTP flows against them without a
//! database or identity provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    ChallengeRepository, ChallengeRepositoryError, FriendshipRepository,
    FriendshipRepositoryError, GamificationRepository, GamificationRepositoryError,
    IdentityVerifier, IdentityVerifierError, MediaIndexRepository, MediaIndexRepositoryError,
    ObjectStore, ObjectStoreError,
};
use crate::domain::{
    AchievementRecord, BearerCredential, Challenge, ChallengeSide, ChallengeStatus, FriendPair,
    Friendship, FriendshipStatus, Identity, MediaKey, MediaObject, UserId,
};

/// Verifier resolving tokens from a fixed map. Unknown tokens are rejected
/// with a 401, mirroring the provider contract.
#[derive(Debug, Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, Identity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token and the identity it resolves to.
    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(
        &self,
        credential: &BearerCredential,
    ) -> Result<Identity, IdentityVerifierError> {
        self.identities
            .get(credential.token())
            .cloned()
            .ok_or_else(|| IdentityVerifierError::rejected(401_u16))
    }
}

/// Object store over a guarded map.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<MediaKey, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &MediaKey, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.objects
            .lock()
            .expect("object store lock")
            .insert(key.clone(), bytes);
        Ok(())
    }

    async fn get(&self, key: &MediaKey) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        Ok(self
            .objects
            .lock()
            .expect("object store lock")
            .get(key)
            .cloned())
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, ObjectStoreError> {
        Ok(self
            .objects
            .lock()
            .expect("object store lock")
            .remove(key)
            .is_some())
    }
}

/// Media index over a guarded map keyed by storage key.
#[derive(Debug, Default)]
pub struct InMemoryMediaIndexRepository {
    rows: Mutex<HashMap<MediaKey, MediaObject>>,
}

impl InMemoryMediaIndexRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaIndexRepository for InMemoryMediaIndexRepository {
    async fn upsert(&self, object: &MediaObject) -> Result<(), MediaIndexRepositoryError> {
        self.rows
            .lock()
            .expect("media index lock")
            .insert(object.key.clone(), object.clone());
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("media index lock")
            .get(key)
            .filter(|object| object.owner_id == *owner)
            .cloned())
    }

    async fn find_by_key(
        &self,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("media index lock")
            .get(key)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MediaObject>, MediaIndexRepositoryError> {
        let mut objects: Vec<MediaObject> = self
            .rows
            .lock()
            .expect("media index lock")
            .values()
            .filter(|object| object.owner_id == *owner)
            .cloned()
            .collect();
        objects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(objects)
    }

    async fn delete_by_key(&self, key: &MediaKey) -> Result<bool, MediaIndexRepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("media index lock")
            .remove(key)
            .is_some())
    }
}

/// Achievement table and points ledger over guarded maps.
///
/// The achievement insert checks and inserts under one lock acquisition, so
/// concurrent award attempts resolve to exactly one `true` just like the
/// SQL `ON CONFLICT DO NOTHING` insert.
#[derive(Debug, Default)]
pub struct InMemoryGamificationRepository {
    achievements: Mutex<HashMap<(UserId, String), AchievementRecord>>,
    ledger: Mutex<Vec<(UserId, i32, String)>>,
}

impl InMemoryGamificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All ledger entries for a user, in append order.
    pub fn ledger_entries(&self, user: &UserId) -> Vec<(i32, String)> {
        self.ledger
            .lock()
            .expect("ledger lock")
            .iter()
            .filter(|(entry_user, _, _)| entry_user == user)
            .map(|(_, points, reason)| (*points, reason.clone()))
            .collect()
    }
}

#[async_trait]
impl GamificationRepository for InMemoryGamificationRepository {
    async fn insert_achievement(
        &self,
        user: &UserId,
        code: &str,
        points: i32,
    ) -> Result<bool, GamificationRepositoryError> {
        let mut achievements = self.achievements.lock().expect("achievements lock");
        let slot = (*user, code.to_owned());
        if achievements.contains_key(&slot) {
            return Ok(false);
        }
        achievements.insert(
            slot,
            AchievementRecord {
                user_id: *user,
                code: code.to_owned(),
                points,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn append_points(
        &self,
        user: &UserId,
        points: i32,
        reason: &str,
    ) -> Result<(), GamificationRepositoryError> {
        self.ledger
            .lock()
            .expect("ledger lock")
            .push((*user, points, reason.to_owned()));
        Ok(())
    }

    async fn list_achievements(
        &self,
        user: &UserId,
    ) -> Result<Vec<AchievementRecord>, GamificationRepositoryError> {
        let mut records: Vec<AchievementRecord> = self
            .achievements
            .lock()
            .expect("achievements lock")
            .values()
            .filter(|record| record.user_id == *user)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn total_points(&self, user: &UserId) -> Result<i64, GamificationRepositoryError> {
        Ok(self
            .ledger
            .lock()
            .expect("ledger lock")
            .iter()
            .filter(|(entry_user, _, _)| entry_user == user)
            .map(|(_, points, _)| i64::from(*points))
            .sum())
    }
}

/// Friendship store enforcing the unique canonical pair.
#[derive(Debug, Default)]
pub struct InMemoryFriendshipRepository {
    edges: Mutex<HashMap<Uuid, Friendship>>,
}

impl InMemoryFriendshipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FriendshipRepository for InMemoryFriendshipRepository {
    async fn insert_pending(
        &self,
        friendship: &Friendship,
    ) -> Result<(), FriendshipRepositoryError> {
        let mut edges = self.edges.lock().expect("friendship lock");
        let duplicate = edges.values().any(|existing| {
            existing.user_lo == friendship.user_lo && existing.user_hi == friendship.user_hi
        });
        if duplicate {
            return Err(FriendshipRepositoryError::duplicate_edge(
                "pair already linked",
            ));
        }
        edges.insert(friendship.id, friendship.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        Ok(self.edges.lock().expect("friendship lock").get(id).cloned())
    }

    async fn find_pair(
        &self,
        pair: &FriendPair,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        Ok(self
            .edges
            .lock()
            .expect("friendship lock")
            .values()
            .find(|edge| edge.user_lo == pair.lo() && edge.user_hi == pair.hi())
            .cloned())
    }

    async fn accept(
        &self,
        id: &Uuid,
        caller: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut edges = self.edges.lock().expect("friendship lock");
        let Some(edge) = edges.get_mut(id) else {
            return Ok(None);
        };
        let guard_matches = edge.status == FriendshipStatus::Pending
            && edge.involves(caller)
            && edge.requester_id != *caller;
        if !guard_matches {
            return Ok(None);
        }
        edge.status = FriendshipStatus::Accepted;
        edge.updated_at = Utc::now();
        Ok(Some(edge.clone()))
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        let mut edges: Vec<Friendship> = self
            .edges
            .lock()
            .expect("friendship lock")
            .values()
            .filter(|edge| edge.involves(user))
            .cloned()
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges)
    }
}

/// Challenge store with guarded progress and completion transitions.
///
/// The completion check-and-set happens under one lock acquisition, so only
/// one caller ever observes the `active -> completed` transition.
#[derive(Debug, Default)]
pub struct InMemoryChallengeRepository {
    challenges: Mutex<HashMap<Uuid, Challenge>>,
}

impl InMemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    async fn insert(&self, challenge: &Challenge) -> Result<(), ChallengeRepositoryError> {
        self.challenges
            .lock()
            .expect("challenge lock")
            .insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        Ok(self
            .challenges
            .lock()
            .expect("challenge lock")
            .get(id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Challenge>, ChallengeRepositoryError> {
        let mut challenges: Vec<Challenge> = self
            .challenges
            .lock()
            .expect("challenge lock")
            .values()
            .filter(|challenge| challenge.side_of(user).is_some())
            .cloned()
            .collect();
        challenges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(challenges)
    }

    async fn record_progress(
        &self,
        id: &Uuid,
        side: ChallengeSide,
        value: i64,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        let mut challenges = self.challenges.lock().expect("challenge lock");
        let Some(challenge) = challenges.get_mut(id) else {
            return Ok(None);
        };
        if challenge.status != ChallengeStatus::Active {
            return Ok(None);
        }
        match side {
            ChallengeSide::Challenger => challenge.challenger_progress = value,
            ChallengeSide::Challenged => challenge.challenged_progress = value,
        }
        Ok(Some(challenge.clone()))
    }

    async fn complete(
        &self,
        id: &Uuid,
        winner: &UserId,
    ) -> Result<bool, ChallengeRepositoryError> {
        let mut challenges = self.challenges.lock().expect("challenge lock");
        let Some(challenge) = challenges.get_mut(id) else {
            return Ok(false);
        };
        if challenge.status != ChallengeStatus::Active {
            return Ok(false);
        }
        challenge.status = ChallengeStatus::Completed;
        challenge.winner_id = Some(*winner);
        Ok(true)
    }
}

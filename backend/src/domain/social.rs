//! Friendship edges and the social graph service.
//!
//! A friendship is a single undirected edge stored once under the sorted
//! pair of user ids. Direction survives in `requester_id`; only the
//! addressee may accept. The store's unique constraint on the pair makes a
//! duplicate request in either direction a conflict.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::gamification::{AchievementCode, GamificationService};
use crate::domain::ports::{FriendshipRepository, FriendshipRepositoryError};
use crate::domain::{Error, UserId};

/// Lifecycle state of a friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Requested, awaiting the addressee's decision.
    Pending,
    /// Accepted; both users are friends.
    Accepted,
}

impl FriendshipStatus {
    /// Stable wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

/// Canonical unordered pair of distinct users, stored low id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FriendPair {
    lo: UserId,
    hi: UserId,
}

impl FriendPair {
    /// Build the canonical pair, rejecting self-friendship.
    pub fn new(a: UserId, b: UserId) -> Result<Self, Error> {
        if a == b {
            return Err(Error::invalid_request("cannot befriend yourself"));
        }
        if a.as_uuid() < b.as_uuid() {
            Ok(Self { lo: a, hi: b })
        } else {
            Ok(Self { lo: b, hi: a })
        }
    }

    /// Lower member of the pair.
    pub const fn lo(&self) -> UserId {
        self.lo
    }

    /// Higher member of the pair.
    pub const fn hi(&self) -> UserId {
        self.hi
    }
}

/// One friendship edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    /// Edge identifier.
    pub id: Uuid,
    /// Lower member of the canonical pair.
    pub user_lo: UserId,
    /// Higher member of the canonical pair.
    pub user_hi: UserId,
    /// Who initiated the request.
    pub requester_id: UserId,
    /// Current lifecycle state.
    pub status: FriendshipStatus,
    /// Request timestamp.
    pub created_at: DateTime<Utc>,
    /// Last transition timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Whether the given user is a member of this edge.
    pub fn involves(&self, user: &UserId) -> bool {
        self.user_lo == *user || self.user_hi == *user
    }

    /// The other member of the edge, if `user` is a member.
    pub fn counterpart_of(&self, user: &UserId) -> Option<UserId> {
        if self.user_lo == *user {
            Some(self.user_hi)
        } else if self.user_hi == *user {
            Some(self.user_lo)
        } else {
            None
        }
    }

    /// The member who did not initiate the request.
    pub fn addressee(&self) -> UserId {
        if self.requester_id == self.user_lo {
            self.user_hi
        } else {
            self.user_lo
        }
    }
}

/// Service over the friendship store.
#[derive(Clone)]
pub struct SocialGraphService {
    repo: Arc<dyn FriendshipRepository>,
    gamification: GamificationService,
}

impl SocialGraphService {
    /// Create a new service with the given repository.
    pub fn new(repo: Arc<dyn FriendshipRepository>, gamification: GamificationService) -> Self {
        Self { repo, gamification }
    }

    fn map_repository_error(error: FriendshipRepositoryError) -> Error {
        match error {
            FriendshipRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("friendship repository unavailable: {message}"))
            }
            FriendshipRepositoryError::Query { message } => {
                Error::internal(format!("friendship repository error: {message}"))
            }
            FriendshipRepositoryError::DuplicateEdge { .. } => {
                Error::conflict("a friendship already exists between these users")
            }
        }
    }

    /// Create a pending request from `requester` to `addressee`.
    ///
    /// The canonical pair deduplicates across direction: a request in either
    /// direction between the same two users is the same edge.
    pub async fn request(
        &self,
        requester: &UserId,
        addressee: &UserId,
    ) -> Result<Friendship, Error> {
        let pair = FriendPair::new(*requester, *addressee)?;
        let now = Utc::now();
        let friendship = Friendship {
            id: Uuid::new_v4(),
            user_lo: pair.lo(),
            user_hi: pair.hi(),
            requester_id: *requester,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert_pending(&friendship)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(friendship)
    }

    /// Accept a pending request.
    ///
    /// Only the addressee may accept. The store transition is guarded; when
    /// it does not apply, the edge is re-fetched to distinguish a missing
    /// edge from a forbidden caller from an already-accepted edge. Both
    /// members earn `first_friend` on their first accepted edge.
    pub async fn accept(&self, id: &Uuid, caller: &UserId) -> Result<Friendship, Error> {
        let accepted = self
            .repo
            .accept(id, caller)
            .await
            .map_err(Self::map_repository_error)?;
        let Some(friendship) = accepted else {
            let existing = self
                .repo
                .find_by_id(id)
                .await
                .map_err(Self::map_repository_error)?
                .ok_or_else(|| Error::not_found("friend request not found"))?;
            if existing.addressee() != *caller {
                return Err(Error::forbidden(
                    "only the addressee may accept a friend request",
                ));
            }
            return Err(Error::conflict("friend request is not pending"));
        };

        self.gamification
            .grant(&friendship.user_lo, AchievementCode::FirstFriend)
            .await;
        self.gamification
            .grant(&friendship.user_hi, AchievementCode::FirstFriend)
            .await;
        Ok(friendship)
    }

    /// All edges involving the user, pending and accepted alike.
    pub async fn friendships(&self, user: &UserId) -> Result<Vec<Friendship>, Error> {
        self.repo
            .list_for_user(user)
            .await
            .map_err(Self::map_repository_error)
    }

    /// Whether an accepted edge joins the two users.
    pub async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, Error> {
        let pair = FriendPair::new(*a, *b)?;
        let edge = self
            .repo
            .find_pair(&pair)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(edge.is_some_and(|f| f.status == FriendshipStatus::Accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockFriendshipRepository, MockGamificationRepository};
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn ordered_users() -> (UserId, UserId) {
        let a = UserId::random();
        let b = UserId::random();
        if a.as_uuid() < b.as_uuid() { (a, b) } else { (b, a) }
    }

    fn service(
        repo: MockFriendshipRepository,
        gamification: MockGamificationRepository,
    ) -> SocialGraphService {
        SocialGraphService::new(
            Arc::new(repo),
            GamificationService::new(Arc::new(gamification)),
        )
    }

    fn pending(lo: UserId, hi: UserId, requester: UserId) -> Friendship {
        let now = Utc::now();
        Friendship {
            id: Uuid::new_v4(),
            user_lo: lo,
            user_hi: hi,
            requester_id: requester,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn pair_is_canonical_regardless_of_argument_order() {
        let (lo, hi) = ordered_users();
        let forward = FriendPair::new(lo, hi).expect("distinct users");
        let reverse = FriendPair::new(hi, lo).expect("distinct users");
        assert_eq!(forward, reverse);
        assert_eq!(forward.lo(), lo);
        assert_eq!(forward.hi(), hi);
    }

    #[rstest]
    fn self_friendship_is_rejected() {
        let user = UserId::random();
        let error = FriendPair::new(user, user).expect_err("self pair");
        assert_eq!(error.code, ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn addressee_is_the_non_requesting_member() {
        let (lo, hi) = ordered_users();
        assert_eq!(pending(lo, hi, lo).addressee(), hi);
        assert_eq!(pending(lo, hi, hi).addressee(), lo);
    }

    #[tokio::test]
    async fn request_creates_a_pending_canonical_edge() {
        let (lo, hi) = ordered_users();
        let mut repo = MockFriendshipRepository::new();
        repo.expect_insert_pending()
            .withf(move |f| {
                f.user_lo == lo
                    && f.user_hi == hi
                    && f.requester_id == hi
                    && f.status == FriendshipStatus::Pending
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = service(repo, MockGamificationRepository::new());
        let friendship = service.request(&hi, &lo).await.expect("request succeeds");
        assert_eq!(friendship.requester_id, hi);
        assert_eq!(friendship.addressee(), lo);
    }

    #[tokio::test]
    async fn duplicate_request_is_a_conflict() {
        let (lo, hi) = ordered_users();
        let mut repo = MockFriendshipRepository::new();
        repo.expect_insert_pending()
            .times(1)
            .return_once(|_| Err(FriendshipRepositoryError::duplicate_edge("pair exists")));

        let service = service(repo, MockGamificationRepository::new());
        let error = service.request(&lo, &hi).await.expect_err("duplicate");
        assert_eq!(error.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn accept_grants_first_friend_to_both_members() {
        let (lo, hi) = ordered_users();
        let mut edge = pending(lo, hi, lo);
        edge.status = FriendshipStatus::Accepted;
        let id = edge.id;
        let mut repo = MockFriendshipRepository::new();
        repo.expect_accept()
            .withf(move |candidate, caller| *candidate == id && *caller == hi)
            .times(1)
            .return_once(move |_, _| Ok(Some(edge)));
        let mut gamification = MockGamificationRepository::new();
        gamification
            .expect_insert_achievement()
            .withf(|_, code, _| code == "first_friend")
            .times(2)
            .returning(|_, _, _| Ok(true));
        gamification
            .expect_append_points()
            .times(2)
            .returning(|_, _, _| Ok(()));

        let service = service(repo, gamification);
        let accepted = service.accept(&id, &hi).await.expect("accept succeeds");
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
    }

    #[tokio::test]
    async fn accept_by_the_requester_is_forbidden() {
        let (lo, hi) = ordered_users();
        let edge = pending(lo, hi, lo);
        let id = edge.id;
        let mut repo = MockFriendshipRepository::new();
        repo.expect_accept().times(1).return_once(|_, _| Ok(None));
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(edge)));

        let service = service(repo, MockGamificationRepository::new());
        let error = service.accept(&id, &lo).await.expect_err("forbidden");
        assert_eq!(error.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn accept_of_missing_edge_is_not_found() {
        let mut repo = MockFriendshipRepository::new();
        repo.expect_accept().times(1).return_once(|_, _| Ok(None));
        repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let service = service(repo, MockGamificationRepository::new());
        let error = service
            .accept(&Uuid::new_v4(), &UserId::random())
            .await
            .expect_err("missing edge");
        assert_eq!(error.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn accept_of_settled_edge_is_a_conflict() {
        let (lo, hi) = ordered_users();
        let mut edge = pending(lo, hi, lo);
        edge.status = FriendshipStatus::Accepted;
        let id = edge.id;
        let mut repo = MockFriendshipRepository::new();
        repo.expect_accept().times(1).return_once(|_, _| Ok(None));
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(edge)));

        let service = service(repo, MockGamificationRepository::new());
        let error = service.accept(&id, &hi).await.expect_err("settled edge");
        assert_eq!(error.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn are_friends_requires_an_accepted_edge() {
        let (lo, hi) = ordered_users();
        let edge = pending(lo, hi, lo);
        let mut repo = MockFriendshipRepository::new();
        repo.expect_find_pair()
            .times(1)
            .return_once(move |_| Ok(Some(edge)));

        let service = service(repo, MockGamificationRepository::new());
        assert!(!service.are_friends(&lo, &hi).await.expect("lookup succeeds"));
    }
}

//! Port for friendship edge persistence.
//!
//! Friendships are stored as one canonical undirected edge per pair, keyed
//! by the sorted `(user_lo, user_hi)` uuids with a uniqueness constraint on
//! the pair. Concurrent duplicate requests collapse onto that constraint and
//! surface as [`FriendshipRepositoryError::DuplicateEdge`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FriendPair, Friendship, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by friendship repository adapters.
    pub enum FriendshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "friendship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "friendship repository query failed: {message}",
        /// An edge for the pair already exists.
        DuplicateEdge { message: String } =>
            "friendship edge already exists: {message}",
    }
}

/// Port for friendship storage and lifecycle transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Insert a pending edge.
    ///
    /// Fails with [`FriendshipRepositoryError::DuplicateEdge`] when an edge
    /// for the pair exists in any status.
    async fn insert_pending(
        &self,
        friendship: &Friendship,
    ) -> Result<(), FriendshipRepositoryError>;

    /// Fetch an edge by id.
    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Fetch the edge for a pair, if any.
    async fn find_pair(
        &self,
        pair: &FriendPair,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Guarded acceptance transition.
    ///
    /// Flips the edge to accepted only when it is pending, includes the
    /// caller, and the caller is not the requester. Returns the updated edge
    /// or `None` when no row matched the guard.
    async fn accept(
        &self,
        id: &Uuid,
        caller: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// List edges involving a user, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError>;
}

/// Fixture implementation holding no edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFriendshipRepository;

#[async_trait]
impl FriendshipRepository for FixtureFriendshipRepository {
    async fn insert_pending(
        &self,
        _friendship: &Friendship,
    ) -> Result<(), FriendshipRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &Uuid,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        Ok(None)
    }

    async fn find_pair(
        &self,
        _pair: &FriendPair,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        Ok(None)
    }

    async fn accept(
        &self,
        _id: &Uuid,
        _caller: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_repository_holds_no_edges() {
        let repo = FixtureFriendshipRepository;
        let user = UserId::random();

        assert!(repo.find_by_id(&Uuid::new_v4()).await.expect("find succeeds").is_none());
        assert!(repo.list_for_user(&user).await.expect("list succeeds").is_empty());
    }

    #[test]
    fn duplicate_edge_error_formats_with_context() {
        let error = FriendshipRepositoryError::duplicate_edge("pair already linked");
        assert!(error.to_string().contains("pair already linked"));
    }
}

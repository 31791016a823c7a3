//! Port for the relational media index.
//!
//! The index mirrors the object store so ownership checks and listings can
//! run without enumerating the store. Every `put` updates it in the same
//! request; there is no list-time rebuild.

use async_trait::async_trait;

use crate::domain::{MediaKey, MediaObject, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media index repository adapters.
    pub enum MediaIndexRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "media index connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "media index query failed: {message}",
    }
}

/// Port for media index storage and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaIndexRepository: Send + Sync {
    /// Insert or replace the index row for an object.
    async fn upsert(&self, object: &MediaObject) -> Result<(), MediaIndexRepositoryError>;

    /// Fetch the row for `(owner, key)`, if present.
    ///
    /// This is the lookup backing access rule 3: keys that do not follow the
    /// owner-prefix convention are still reachable by their owner through
    /// the index.
    async fn find(
        &self,
        owner: &UserId,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError>;

    /// Fetch the row for a key regardless of owner.
    async fn find_by_key(
        &self,
        key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError>;

    /// List all rows owned by a user, newest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MediaObject>, MediaIndexRepositoryError>;

    /// Remove the row for a key. Returns `false` when no row existed.
    async fn delete_by_key(&self, key: &MediaKey) -> Result<bool, MediaIndexRepositoryError>;
}

/// Fixture implementation holding no rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMediaIndexRepository;

#[async_trait]
impl MediaIndexRepository for FixtureMediaIndexRepository {
    async fn upsert(&self, _object: &MediaObject) -> Result<(), MediaIndexRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _owner: &UserId,
        _key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        Ok(None)
    }

    async fn find_by_key(
        &self,
        _key: &MediaKey,
    ) -> Result<Option<MediaObject>, MediaIndexRepositoryError> {
        Ok(None)
    }

    async fn list_for_owner(
        &self,
        _owner: &UserId,
    ) -> Result<Vec<MediaObject>, MediaIndexRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete_by_key(&self, _key: &MediaKey) -> Result<bool, MediaIndexRepositoryError> {
        Ok(false)
    }
}

//! Media objects and the media store service.
//!
//! A media object is an opaque byte blob addressed by a hierarchical key
//! whose first segment is the owner's identifier. The queryable index row is
//! written after the blob lands; a blob without an index row is invisible to
//! listings but still readable by key.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::gamification::{AchievementCode, GamificationService};
use crate::domain::ports::{
    MediaIndexRepository, MediaIndexRepositoryError, ObjectStore, ObjectStoreError,
};
use crate::domain::{Error, UserId};

/// Maximum accepted key length, path segments included.
const MAX_KEY_LEN: usize = 512;

/// Validated storage key: non-empty `/`-separated segments, first segment is
/// the owner id, no traversal or absolute components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MediaKey(String);

impl MediaKey {
    /// Validate and wrap a raw key.
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > MAX_KEY_LEN {
            return Err(Error::invalid_request("media key must be 1-512 characters"));
        }
        if raw.split('/').any(|segment| {
            segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\')
        }) {
            return Err(Error::invalid_request("media key contains invalid path segments"));
        }
        Ok(Self(raw))
    }

    /// The key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First path segment: the owner identifier embedded in the key.
    pub fn owner_segment(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// Whether the key sits under the given user's prefix.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_segment() == user.to_string()
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index row describing a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaObject {
    /// Storage key, unique across the store.
    pub key: MediaKey,
    /// Owning user.
    pub owner_id: UserId,
    /// Declared content type, used when serving the blob back.
    pub content_type: String,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// File extension for a declared content type; unknown types get `bin`.
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        _ => "bin",
    }
}

/// Mint a collision-resistant key under the owner's prefix.
pub fn generate_media_key(owner: &UserId, content_type: &str) -> MediaKey {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let ext = extension_for(content_type);
    MediaKey(format!("{owner}/progress/{millis}-{suffix}.{ext}"))
}

/// A blob returned to a caller, bytes plus the content type to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDownload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Service coordinating the object store and the media index.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn MediaIndexRepository>,
    gamification: GamificationService,
}

impl MediaService {
    /// Create a new service over the given adapters.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn MediaIndexRepository>,
        gamification: GamificationService,
    ) -> Self {
        Self { store, index, gamification }
    }

    fn map_store_error(error: ObjectStoreError) -> Error {
        match error {
            ObjectStoreError::Io { message } => {
                Error::internal(format!("object store error: {message}"))
            }
        }
    }

    fn map_index_error(error: MediaIndexRepositoryError) -> Error {
        match error {
            MediaIndexRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("media index unavailable: {message}"))
            }
            MediaIndexRepositoryError::Query { message } => {
                Error::internal(format!("media index error: {message}"))
            }
        }
    }

    /// Store a blob under a freshly minted key and index it.
    ///
    /// The blob is written before the index row; if indexing fails the
    /// orphaned blob is logged and the error surfaces to the caller. The
    /// first successful upload unlocks `first_upload` as a side effect.
    pub async fn put(
        &self,
        owner: &UserId,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaObject, Error> {
        if bytes.is_empty() {
            return Err(Error::invalid_request("media body must not be empty"));
        }
        let key = generate_media_key(owner, content_type);
        self.store
            .put(&key, bytes)
            .await
            .map_err(Self::map_store_error)?;

        let object = MediaObject {
            key: key.clone(),
            owner_id: *owner,
            content_type: content_type.to_owned(),
            created_at: Utc::now(),
        };
        if let Err(error) = self.index.upsert(&object).await {
            warn!(%key, %error, "blob stored but indexing failed; object orphaned");
            return Err(Self::map_index_error(error));
        }

        info!(%key, owner = %owner, "media stored");
        self.gamification.grant(owner, AchievementCode::FirstUpload).await;
        Ok(object)
    }

    /// Fetch a blob and the content type to serve it with.
    ///
    /// Access has already been authorized; the index row supplies the
    /// content type, falling back to `application/octet-stream` for
    /// unindexed blobs.
    pub async fn get(&self, key: &MediaKey) -> Result<MediaDownload, Error> {
        let bytes = self
            .store
            .get(key)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| Error::not_found("media object not found"))?;
        let content_type = self
            .index
            .find_by_key(key)
            .await
            .map_err(Self::map_index_error)?
            .map_or_else(|| "application/octet-stream".to_owned(), |o| o.content_type);
        Ok(MediaDownload { content_type, bytes })
    }

    /// List a user's indexed objects, newest first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<MediaObject>, Error> {
        self.index
            .list_for_owner(owner)
            .await
            .map_err(Self::map_index_error)
    }

    /// Delete a blob and its index row.
    ///
    /// The blob is removed first; a dangling index row self-heals on the
    /// subsequent index delete even if the blob was already gone.
    pub async fn delete(&self, key: &MediaKey) -> Result<(), Error> {
        let removed = self
            .store
            .delete(key)
            .await
            .map_err(Self::map_store_error)?;
        let indexed = self
            .index
            .delete_by_key(key)
            .await
            .map_err(Self::map_index_error)?;
        if !removed && !indexed {
            return Err(Error::not_found("media object not found"));
        }
        info!(%key, "media deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockGamificationRepository, MockMediaIndexRepository, MockObjectStore,
    };
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn service(
        store: MockObjectStore,
        index: MockMediaIndexRepository,
        gamification: MockGamificationRepository,
    ) -> MediaService {
        MediaService::new(
            Arc::new(store),
            Arc::new(index),
            GamificationService::new(Arc::new(gamification)),
        )
    }

    #[rstest]
    #[case("")]
    #[case("a//b")]
    #[case("../escape")]
    #[case("a/./b")]
    #[case("a\\b/c")]
    fn invalid_keys_are_rejected(#[case] raw: &str) {
        let error = MediaKey::new(raw).expect_err("invalid key");
        assert_eq!(error.code, ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("image/jpeg", "jpg")]
    #[case("image/webp", "webp")]
    #[case("application/x-unknown", "bin")]
    fn generated_keys_carry_owner_prefix_and_extension(
        #[case] content_type: &str,
        #[case] ext: &str,
    ) {
        let owner = UserId::random();
        let key = generate_media_key(&owner, content_type);
        assert!(key.is_owned_by(&owner));
        assert!(key.as_str().contains("/progress/"));
        assert!(key.as_str().ends_with(&format!(".{ext}")));
    }

    #[tokio::test]
    async fn put_stores_indexes_and_grants_first_upload() {
        let owner = UserId::random();
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .withf(|_, bytes| bytes == b"jpeg-bytes")
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut index = MockMediaIndexRepository::new();
        index
            .expect_upsert()
            .withf(move |object| object.owner_id == owner && object.content_type == "image/jpeg")
            .times(1)
            .return_once(|_| Ok(()));
        let mut gamification = MockGamificationRepository::new();
        gamification
            .expect_insert_achievement()
            .times(1)
            .return_once(|_, _, _| Ok(true));
        gamification
            .expect_append_points()
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = service(store, index, gamification);
        let object = service
            .put(&owner, "image/jpeg", b"jpeg-bytes".to_vec())
            .await
            .expect("put succeeds");
        assert!(object.key.is_owned_by(&owner));
    }

    #[tokio::test]
    async fn put_surfaces_index_failure_after_blob_write() {
        let owner = UserId::random();
        let mut store = MockObjectStore::new();
        store.expect_put().times(1).return_once(|_, _| Ok(()));
        let mut index = MockMediaIndexRepository::new();
        index
            .expect_upsert()
            .times(1)
            .return_once(|_| Err(MediaIndexRepositoryError::connection("refused")));

        let service = service(store, index, MockGamificationRepository::new());
        let error = service
            .put(&owner, "image/png", b"png".to_vec())
            .await
            .expect_err("index failure surfaces");
        assert_eq!(error.code, ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn put_rejects_empty_bodies() {
        let owner = UserId::random();
        let service = service(
            MockObjectStore::new(),
            MockMediaIndexRepository::new(),
            MockGamificationRepository::new(),
        );
        let error = service
            .put(&owner, "image/png", Vec::new())
            .await
            .expect_err("empty body rejected");
        assert_eq!(error.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn get_uses_indexed_content_type() {
        let owner = UserId::random();
        let key = MediaKey::new(format!("{owner}/progress/1-aa.png")).expect("valid key");
        let mut store = MockObjectStore::new();
        store
            .expect_get()
            .times(1)
            .return_once(|_| Ok(Some(b"png".to_vec())));
        let mut index = MockMediaIndexRepository::new();
        let indexed = MediaObject {
            key: key.clone(),
            owner_id: owner,
            content_type: "image/png".to_owned(),
            created_at: Utc::now(),
        };
        index
            .expect_find_by_key()
            .times(1)
            .return_once(move |_| Ok(Some(indexed)));

        let service = service(store, index, MockGamificationRepository::new());
        let download = service.get(&key).await.expect("get succeeds");
        assert_eq!(download.content_type, "image/png");
        assert_eq!(download.bytes, b"png");
    }

    #[tokio::test]
    async fn get_of_missing_blob_is_not_found() {
        let owner = UserId::random();
        let key = MediaKey::new(format!("{owner}/progress/1-aa.bin")).expect("valid key");
        let mut store = MockObjectStore::new();
        store.expect_get().times(1).return_once(|_| Ok(None));

        let service = service(store, MockMediaIndexRepository::new(), MockGamificationRepository::new());
        let error = service.get(&key).await.expect_err("missing blob");
        assert_eq!(error.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_of_absent_object_is_not_found() {
        let owner = UserId::random();
        let key = MediaKey::new(format!("{owner}/progress/1-aa.bin")).expect("valid key");
        let mut store = MockObjectStore::new();
        store.expect_delete().times(1).return_once(|_| Ok(false));
        let mut index = MockMediaIndexRepository::new();
        index
            .expect_delete_by_key()
            .times(1)
            .return_once(|_| Ok(false));

        let service = service(store, index, MockGamificationRepository::new());
        let error = service.delete(&key).await.expect_err("absent object");
        assert_eq!(error.code, ErrorCode::NotFound);
    }
}

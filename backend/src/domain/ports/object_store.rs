//! Port for binary media storage.
//!
//! The object store is the authoritative copy of uploaded media. The
//! relational index row is a denormalised mirror maintained alongside it;
//! see [`super::MediaIndexRepository`].

use async_trait::async_trait;

use crate::domain::MediaKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object store adapters.
    pub enum ObjectStoreError {
        /// The store could not be opened or written.
        Io { message: String } =>
            "object store I/O failure: {message}",
    }
}

/// Port for object storage keyed by namespaced media keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object, overwriting any previous content under the key.
    async fn put(&self, key: &MediaKey, bytes: Vec<u8>) -> Result<(), ObjectStoreError>;

    /// Fetch an object's bytes, or `None` when the key is absent.
    async fn get(&self, key: &MediaKey) -> Result<Option<Vec<u8>>, ObjectStoreError>;

    /// Remove an object. Returns `false` when the key was already absent.
    async fn delete(&self, key: &MediaKey) -> Result<bool, ObjectStoreError>;
}

/// Fixture implementation backed by nothing.
///
/// Accepts writes, returns no content, and reports deletes as no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObjectStore;

#[async_trait]
impl ObjectStore for FixtureObjectStore {
    async fn put(&self, _key: &MediaKey, _bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    async fn get(&self, _key: &MediaKey) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        Ok(None)
    }

    async fn delete(&self, _key: &MediaKey) -> Result<bool, ObjectStoreError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_store_is_empty() {
        let store = FixtureObjectStore;
        let key = MediaKey::new("a/progress/1-x.jpg").expect("valid key");

        store.put(&key, vec![1, 2, 3]).await.expect("put succeeds");
        assert!(store.get(&key).await.expect("get succeeds").is_none());
        assert!(!store.delete(&key).await.expect("delete succeeds"));
    }
}

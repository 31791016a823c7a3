//! Filesystem-backed object store.
//!
//! Blobs live under a configured root directory; key segments map directly
//! onto subdirectories. The root is opened through `cap-std`, so writes can
//! never escape it even if a hostile key slipped past validation. All
//! filesystem work runs on blocking threads.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{ObjectStore, ObjectStoreError};
use crate::domain::MediaKey;

/// Object store adapter rooted at one directory.
#[derive(Clone)]
pub struct FsObjectStore {
    root: Arc<PathBuf>,
}

impl FsObjectStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ObjectStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|err| ObjectStoreError::io(format!("create store root: {err}")))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn open_root(root: &PathBuf) -> Result<Dir, ObjectStoreError> {
        Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| ObjectStoreError::io(format!("open store root: {err}")))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &MediaKey, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let root = Arc::clone(&self.root);
        let key = key.clone();
        tokio::task::spawn_blocking(move || {
            let dir = FsObjectStore::open_root(&root)?;
            if let Some((parent, _)) = key.as_str().rsplit_once('/') {
                dir.create_dir_all(parent)
                    .map_err(|err| ObjectStoreError::io(format!("create prefix: {err}")))?;
            }
            dir.write(key.as_str(), &bytes)
                .map_err(|err| ObjectStoreError::io(format!("write object: {err}")))?;
            debug!(%key, bytes = bytes.len(), "object written");
            Ok(())
        })
        .await
        .map_err(|err| ObjectStoreError::io(format!("store task panicked: {err}")))?
    }

    async fn get(&self, key: &MediaKey) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let root = Arc::clone(&self.root);
        let key = key.clone();
        tokio::task::spawn_blocking(move || {
            let dir = FsObjectStore::open_root(&root)?;
            match dir.read(key.as_str()) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(ObjectStoreError::io(format!("read object: {err}"))),
            }
        })
        .await
        .map_err(|err| ObjectStoreError::io(format!("store task panicked: {err}")))?
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, ObjectStoreError> {
        let root = Arc::clone(&self.root);
        let key = key.clone();
        tokio::task::spawn_blocking(move || {
            let dir = FsObjectStore::open_root(&root)?;
            match dir.remove_file(key.as_str()) {
                Ok(()) => Ok(true),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
                Err(err) => Err(ObjectStoreError::io(format!("remove object: {err}"))),
            }
        })
        .await
        .map_err(|err| ObjectStoreError::io(format!("store task panicked: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn key_for(owner: &UserId, name: &str) -> MediaKey {
        MediaKey::new(format!("{owner}/progress/{name}")).expect("valid key")
    }

    #[tokio::test]
    async fn put_get_delete_lifecycle() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsObjectStore::new(dir.path()).expect("store root");
        let owner = UserId::random();
        let key = key_for(&owner, "1-aa.jpg");

        store.put(&key, b"jpeg".to_vec()).await.expect("put");
        assert_eq!(store.get(&key).await.expect("get"), Some(b"jpeg".to_vec()));
        assert!(store.delete(&key).await.expect("delete"));
        assert_eq!(store.get(&key).await.expect("get after delete"), None);
        assert!(!store.delete(&key).await.expect("second delete"));
    }

    #[tokio::test]
    async fn get_of_missing_object_is_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsObjectStore::new(dir.path()).expect("store root");
        let key = key_for(&UserId::random(), "missing.bin");

        assert_eq!(store.get(&key).await.expect("get"), None);
    }

    #[tokio::test]
    async fn keys_with_nested_prefixes_create_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsObjectStore::new(dir.path()).expect("store root");
        let owner = UserId::random();
        let key = key_for(&owner, "2024/01/1-aa.png");

        store.put(&key, b"png".to_vec()).await.expect("put");
        assert_eq!(store.get(&key).await.expect("get"), Some(b"png".to_vec()));
    }
}

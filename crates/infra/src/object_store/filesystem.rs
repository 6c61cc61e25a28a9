use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::r#trait::{
    ObjectRef, ObjectStore, ObjectStoreError, StoredObject, content_type_for_key, validate_key,
};

/// Object store writing each object to `<root>/<key>`.
///
/// The content type is not persisted; it is recovered from the key's extension.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<ObjectRef, ObjectStoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(key, bytes = bytes.len(), "writing object");
        tokio::fs::write(&path, bytes).await?;
        Ok(ObjectRef {
            key: key.to_string(),
        })
    }

    async fn url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
        let path = self.path_for(&reference.key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(ObjectStoreError::NotFound(reference.key.clone()));
        }
        Ok(format!("{}/{}", self.base_url, reference.key))
    }

    async fn fetch(&self, key: &str) -> Result<StoredObject, ObjectStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(StoredObject {
                bytes,
                content_type: content_type_for_key(key).to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ObjectStoreError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("stockroom-objects-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn round_trips_bytes_through_disk() {
        let root = scratch_dir();
        let store = FilesystemObjectStore::new(&root, "http://localhost:8080");

        let r = store.upload("photos/p.jpg", vec![1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(store.url(&r).await.unwrap(), "http://localhost:8080/photos/p.jpg");

        let obj = store.fetch("photos/p.jpg").await.unwrap();
        assert_eq!(obj.bytes, vec![1, 2, 3]);
        assert_eq!(obj.content_type, "image/jpeg");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn missing_and_malicious_keys_are_rejected() {
        let store = FilesystemObjectStore::new(scratch_dir(), "http://x");
        assert!(matches!(store.fetch("photos/none.jpg").await, Err(ObjectStoreError::NotFound(_))));
        assert!(matches!(store.fetch("../etc/passwd").await, Err(ObjectStoreError::InvalidKey(_))));
    }
}

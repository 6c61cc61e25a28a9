use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::r#trait::{ObjectRef, ObjectStore, ObjectStoreError, StoredObject, validate_key};

/// In-memory object store for tests/dev.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStore {
    /// `base_url` prefixes every key when building retrievable URLs.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn poisoned() -> ObjectStoreError {
        ObjectStoreError::Unavailable("lock poisoned".to_string())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectRef, ObjectStoreError> {
        validate_key(key)?;
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(ObjectRef {
            key: key.to_string(),
        })
    }

    async fn url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        if !objects.contains_key(&reference.key) {
            return Err(ObjectStoreError::NotFound(reference.key.clone()));
        }
        Ok(format!("{}/{}", self.base_url, reference.key))
    }

    async fn fetch(&self, key: &str) -> Result<StoredObject, ObjectStoreError> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_url_and_fetch() {
        let store = InMemoryObjectStore::new("http://cdn.local/");
        let r = store.upload("photos/a.png", vec![9, 9], "image/png").await.unwrap();
        assert_eq!(store.url(&r).await.unwrap(), "http://cdn.local/photos/a.png");
        let obj = store.fetch("photos/a.png").await.unwrap();
        assert_eq!(obj.bytes, vec![9, 9]);
        assert_eq!(obj.content_type, "image/png");
    }

    #[tokio::test]
    async fn url_of_unknown_object_is_not_found() {
        let store = InMemoryObjectStore::default();
        let missing = ObjectRef {
            key: "photos/none.jpg".to_string(),
        };
        assert!(matches!(store.url(&missing).await, Err(ObjectStoreError::NotFound(_))));
    }
}

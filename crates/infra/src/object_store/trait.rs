use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("object store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

/// Reference to an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob storage for item photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectRef, ObjectStoreError>;

    /// Retrievable URL for a stored object.
    async fn url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError>;

    async fn fetch(&self, key: &str) -> Result<StoredObject, ObjectStoreError>;
}

#[async_trait]
impl<S> ObjectStore for Arc<S>
where
    S: ObjectStore + ?Sized,
{
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectRef, ObjectStoreError> {
        (**self).upload(key, bytes, content_type).await
    }

    async fn url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
        (**self).url(reference).await
    }

    async fn fetch(&self, key: &str) -> Result<StoredObject, ObjectStoreError> {
        (**self).fetch(key).await
    }
}

const PHOTO_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Fresh key for a photo of the given content type: `photos/<uuid-v7>.<ext>`.
pub fn photo_key(content_type: &str) -> Result<String, ObjectStoreError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = PHOTO_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| ObjectStoreError::UnsupportedContentType(content_type.to_string()))?;
    Ok(format!("photos/{}.{ext}", Uuid::now_v7()))
}

/// Content type implied by a key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    PHOTO_TYPES
        .iter()
        .find(|(_, e)| e.eq_ignore_ascii_case(ext))
        .map(|(mime, _)| *mime)
        .unwrap_or("application/octet-stream")
}

/// Keys are relative, `/`-separated paths of `[A-Za-z0-9._-]` segments, with
/// no empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), ObjectStoreError> {
    let valid_segment = |s: &str| {
        !s.is_empty()
            && s != "."
            && s != ".."
            && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    };
    if key.split('/').all(valid_segment) {
        Ok(())
    } else {
        Err(ObjectStoreError::InvalidKey(key.to_string()))
    }
}

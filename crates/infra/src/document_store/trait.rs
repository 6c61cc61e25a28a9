use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{DomainError, ExpectedVersion};
use stockroom_inventory::{ItemName, ItemPatch, Snapshot, StoredItem, WriteMode};

/// Document store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation,
/// invariants). A `Conflict` means the document moved since it was read; the
/// caller may re-read and retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("revision conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("corrupt document: {0}")]
    Corrupt(String),
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Conflict(msg) => StoreError::Conflict(msg),
            other => StoreError::InvalidWrite(other.to_string()),
        }
    }
}

/// Name-keyed document store for inventory items.
///
/// Implementations must:
/// - assign every successful `put` a fresh revision, greater than any revision
///   handed out before (revisions are never reused, even across delete/recreate)
/// - reject `put`/`delete` whose `expected` revision does not match the current
///   one with [`StoreError::Conflict`] (an absent document is at revision `0`)
/// - apply [`WriteMode::Merge`] by overwriting only the keys present in the patch
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, name: &ItemName) -> Result<Snapshot, StoreError>;

    async fn put(
        &self,
        name: &ItemName,
        patch: &ItemPatch,
        mode: WriteMode,
        expected: ExpectedVersion,
    ) -> Result<StoredItem, StoreError>;

    /// Delete a document. Deleting an absent document whose expectation
    /// matches revision `0` succeeds without effect.
    async fn delete(&self, name: &ItemName, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// All documents, ordered by name.
    async fn list_all(&self) -> Result<Vec<StoredItem>, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, name: &ItemName) -> Result<Snapshot, StoreError> {
        (**self).get(name).await
    }

    async fn put(
        &self,
        name: &ItemName,
        patch: &ItemPatch,
        mode: WriteMode,
        expected: ExpectedVersion,
    ) -> Result<StoredItem, StoreError> {
        (**self).put(name, patch, mode, expected).await
    }

    async fn delete(&self, name: &ItemName, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).delete(name, expected).await
    }

    async fn list_all(&self) -> Result<Vec<StoredItem>, StoreError> {
        (**self).list_all().await
    }
}

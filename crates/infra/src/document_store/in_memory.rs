use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::ExpectedVersion;
use stockroom_inventory::{ItemName, ItemPatch, Snapshot, StoredItem, WriteMode};

use super::r#trait::{DocumentStore, StoreError};

#[derive(Debug, Default)]
struct Documents {
    by_name: BTreeMap<ItemName, StoredItem>,
    last_revision: u64,
}

impl Documents {
    fn current_revision(&self, name: &ItemName) -> u64 {
        self.by_name.get(name).map(|d| d.revision).unwrap_or(0)
    }

    fn check(&self, name: &ItemName, expected: ExpectedVersion) -> Result<(), StoreError> {
        Ok(expected.check(self.current_revision(name))?)
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. Can be switched offline to exercise backend failure
/// paths.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    docs: RwLock<Documents>,
    available: AtomicBool,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            docs: RwLock::new(Documents::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, name: &ItemName) -> Result<Snapshot, StoreError> {
        self.ensure_available()?;
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;
        Ok(docs.by_name.get(name).cloned().into())
    }

    async fn put(
        &self,
        name: &ItemName,
        patch: &ItemPatch,
        mode: WriteMode,
        expected: ExpectedVersion,
    ) -> Result<StoredItem, StoreError> {
        self.ensure_available()?;
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.check(name, expected)?;

        let existing = docs.by_name.get(name).map(|d| &d.item);
        let item = patch.apply(name, existing, mode)?;

        docs.last_revision += 1;
        let stored = StoredItem {
            item,
            revision: docs.last_revision,
            updated_at: Utc::now(),
        };
        docs.by_name.insert(name.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, name: &ItemName, expected: ExpectedVersion) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.check(name, expected)?;
        docs.by_name.remove(name);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredItem>, StoreError> {
        self.ensure_available()?;
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;
        Ok(docs.by_name.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::{Category, InventoryItem, Quantity};

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    fn full(n: &str, q: u32) -> ItemPatch {
        ItemPatch::full(&InventoryItem::new(name(n), Some(Category::Fruit), Quantity::new(q)))
    }

    #[tokio::test]
    async fn create_only_write_conflicts_when_document_exists() {
        let store = InMemoryDocumentStore::new();
        store
            .put(&name("apple"), &full("apple", 1), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap();

        let err = store
            .put(&name("apple"), &full("apple", 1), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn stale_merge_is_rejected_and_leaves_the_document_alone() {
        let store = InMemoryDocumentStore::new();
        let first = store
            .put(&name("apple"), &full("apple", 1), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap();
        store
            .put(&name("apple"), &full("apple", 2), WriteMode::Merge, ExpectedVersion::Exact(first.revision))
            .await
            .unwrap();

        let err = store
            .put(&name("apple"), &full("apple", 9), WriteMode::Merge, ExpectedVersion::Exact(first.revision))
            .await
            .unwrap_err();
        match err {
            StoreError::Conflict(msg) => assert!(msg.contains(&format!("Exact({})", first.revision))),
            other => panic!("expected conflict, got {other:?}"),
        }
        let current = store.get(&name("apple")).await.unwrap().into_item().unwrap();
        assert_eq!(current.quantity.get(), 2);
    }

    #[tokio::test]
    async fn revisions_are_never_reused_after_delete() {
        let store = InMemoryDocumentStore::new();
        let first = store
            .put(&name("apple"), &full("apple", 1), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap();
        store
            .delete(&name("apple"), ExpectedVersion::Exact(first.revision))
            .await
            .unwrap();
        let second = store
            .put(&name("apple"), &full("apple", 1), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap();
        assert!(second.revision > first.revision);

        let err = store
            .delete(&name("apple"), ExpectedVersion::Exact(first.revision))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn merge_write_touches_only_supplied_keys() {
        let store = InMemoryDocumentStore::new();
        let created = store
            .put(&name("apple"), &full("apple", 4), WriteMode::Replace, ExpectedVersion::ABSENT)
            .await
            .unwrap();
        let merged = store
            .put(
                &name("apple"),
                &ItemPatch::default().quantity(Quantity::new(9)),
                WriteMode::Merge,
                ExpectedVersion::Exact(created.revision),
            )
            .await
            .unwrap();
        assert_eq!(merged.item.quantity.get(), 9);
        assert_eq!(merged.item.category, Some(Category::Fruit));
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_name() {
        let store = InMemoryDocumentStore::new();
        for n in ["pear", "apple", "fig"] {
            store
                .put(&name(n), &full(n, 1), WriteMode::Replace, ExpectedVersion::Any)
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.item.name.into())
            .collect();
        assert_eq!(names, ["apple", "fig", "pear"]);
    }

    #[tokio::test]
    async fn offline_store_rejects_every_call() {
        let store = InMemoryDocumentStore::new();
        store.set_available(false);
        assert!(matches!(store.get(&name("x")).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.list_all().await, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn write_without_quantity_is_invalid() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .put(
                &name("milk"),
                &ItemPatch::default().category(Some(Category::Dairy)),
                WriteMode::Merge,
                ExpectedVersion::Any,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidWrite(_)));
    }
}

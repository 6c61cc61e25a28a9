//! Inventory reconciliation service (application-level orchestration).
//!
//! Executes the pure reconciliation rules from `stockroom-inventory` against a
//! [`DocumentStore`]:
//!
//! ```text
//! Command
//!   ↓
//! 1. Read the current snapshot of the item
//!   ↓
//! 2. Plan the write (pure, carries the snapshot revision)
//!   ↓
//! 3. Execute the write (store rejects it if the revision moved)
//!   ↓
//! 4. On conflict: back to 1, up to `max_write_attempts` times
//! ```
//!
//! Concurrent adds/removes on the same item therefore never lose an update;
//! under sustained contention the caller gets [`ServiceError::Conflict`].

use thiserror::Error;
use tracing::{debug, info, warn};

use stockroom_core::{DomainError, DomainResult};
use stockroom_inventory::{
    AddItem, EditItem, InventoryItem, ItemName, Snapshot, StoreWrite, StoredItem, ViewQuery,
    derive_view, plan_add, plan_edit, plan_remove,
};

use crate::document_store::{DocumentStore, StoreError};
use crate::object_store::{ObjectStore, ObjectStoreError, photo_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Read-plan-write rounds before giving up on a contended item.
    pub max_write_attempts: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Objects(#[from] ObjectStoreError),

    /// The item kept moving underneath every attempt.
    #[error("write conflict persisted after {attempts} attempts")]
    Conflict { attempts: u32 },
}

/// Outcome of a reconciled mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Stored(StoredItem),
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub key: String,
    pub url: String,
}

#[derive(Debug)]
pub struct InventoryService<S, O> {
    store: S,
    objects: O,
    config: ReconcilerConfig,
}

impl<S, O> InventoryService<S, O> {
    pub fn new(store: S, objects: O) -> Self {
        Self::with_config(store, objects, ReconcilerConfig::default())
    }

    pub fn with_config(store: S, objects: O, config: ReconcilerConfig) -> Self {
        Self {
            store,
            objects,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn config(&self) -> ReconcilerConfig {
        self.config
    }
}

impl<S, O> InventoryService<S, O>
where
    S: DocumentStore,
    O: ObjectStore,
{
    /// Add units of an item, creating it if needed.
    pub async fn add(&self, cmd: AddItem) -> Result<Reconciled, ServiceError> {
        let outcome = self.reconcile(&cmd.name, |snap| plan_add(snap, &cmd)).await?;
        info!(name = %cmd.name, quantity = cmd.quantity.get(), "item added");
        Ok(outcome)
    }

    /// Remove one unit of an item; absent items are left alone.
    pub async fn remove(&self, name: &ItemName) -> Result<Reconciled, ServiceError> {
        let outcome = self.reconcile(name, |snap| Ok(plan_remove(snap))).await?;
        info!(name = %name, outcome = removal_kind(&outcome), "item remove applied");
        Ok(outcome)
    }

    /// Overwrite an existing item's fields.
    pub async fn edit(&self, cmd: EditItem) -> Result<Reconciled, ServiceError> {
        let outcome = self.reconcile(&cmd.name, |snap| plan_edit(snap, &cmd)).await?;
        info!(name = %cmd.name, quantity = cmd.quantity.get(), "item edited");
        Ok(outcome)
    }

    pub async fn get(&self, name: &ItemName) -> Result<Snapshot, ServiceError> {
        debug!(name = %name, "get item");
        Ok(self.store.get(name).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        let docs = self.store.list_all().await?;
        debug!(count = docs.len(), "listed items");
        Ok(docs.into_iter().map(|d| d.item).collect())
    }

    /// Current items through the derived view.
    pub async fn view(&self, query: &ViewQuery) -> Result<Vec<InventoryItem>, ServiceError> {
        let items = self.list_all().await?;
        Ok(derive_view(&items, query))
    }

    /// Upload a captured photo and return where it can be fetched from.
    pub async fn store_photo(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PhotoUpload, ServiceError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("photo is empty").into());
        }
        let key = photo_key(content_type)?;
        let size = bytes.len();
        let reference = self.objects.upload(&key, bytes, content_type).await?;
        let url = self.objects.url(&reference).await?;
        info!(key = %reference.key, size, "photo stored");
        Ok(PhotoUpload {
            key: reference.key,
            url,
        })
    }

    async fn reconcile<F>(&self, name: &ItemName, plan: F) -> Result<Reconciled, ServiceError>
    where
        F: Fn(&Snapshot) -> DomainResult<StoreWrite>,
    {
        let attempts = self.config.max_write_attempts.max(1);

        for attempt in 1..=attempts {
            let snapshot = self.store.get(name).await?;
            let write = plan(&snapshot)?;

            match self.execute(write).await {
                Ok(outcome) => return Ok(outcome),
                Err(StoreError::Conflict(msg)) => {
                    warn!(name = %name, attempt, "write conflict, re-planning: {msg}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Conflict { attempts })
    }

    async fn execute(&self, write: StoreWrite) -> Result<Reconciled, StoreError> {
        match write {
            StoreWrite::Put {
                name,
                patch,
                mode,
                expected,
            } => {
                let stored = self.store.put(&name, &patch, mode, expected).await?;
                Ok(Reconciled::Stored(stored))
            }
            StoreWrite::Delete { name, expected } => {
                self.store.delete(&name, expected).await?;
                Ok(Reconciled::Removed)
            }
            StoreWrite::Noop => Ok(Reconciled::Unchanged),
        }
    }
}

fn removal_kind(outcome: &Reconciled) -> &'static str {
    match outcome {
        Reconciled::Stored(_) => "decremented",
        Reconciled::Removed => "deleted",
        Reconciled::Unchanged => "absent",
    }
}

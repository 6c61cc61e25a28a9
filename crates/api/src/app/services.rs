use std::sync::Arc;

use tracing::info;

use stockroom_infra::InventoryService;
use stockroom_infra::document_store::{DocumentStore, InMemoryDocumentStore};
use stockroom_infra::object_store::{FilesystemObjectStore, InMemoryObjectStore, ObjectStore};

use crate::config::ApiConfig;

pub type SharedDocumentStore = Arc<dyn DocumentStore>;
pub type SharedObjectStore = Arc<dyn ObjectStore>;
pub type SharedInventory = InventoryService<SharedDocumentStore, SharedObjectStore>;

/// Everything request handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub inventory: SharedInventory,
}

impl AppServices {
    pub fn new(documents: SharedDocumentStore, objects: SharedObjectStore, config: &ApiConfig) -> Self {
        Self {
            inventory: InventoryService::with_config(documents, objects, config.reconciler),
        }
    }

    /// In-memory stores (dev/test).
    pub fn in_memory(config: &ApiConfig) -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryObjectStore::new(config.public_base_url.clone())),
            config,
        )
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let documents = build_document_store(config).await?;

    let objects: SharedObjectStore = match &config.photo_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "storing photos on disk");
            Arc::new(FilesystemObjectStore::new(dir.clone(), config.public_base_url.clone()))
        }
        None => {
            info!("storing photos in memory");
            Arc::new(InMemoryObjectStore::new(config.public_base_url.clone()))
        }
    };

    Ok(AppServices::new(documents, objects, config))
}

#[cfg(feature = "postgres")]
async fn build_document_store(config: &ApiConfig) -> anyhow::Result<SharedDocumentStore> {
    use anyhow::Context;
    use stockroom_infra::document_store::PostgresDocumentStore;

    match &config.database_url {
        Some(url) => {
            let store = PostgresDocumentStore::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            info!("using Postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            info!("using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_document_store(config: &ApiConfig) -> anyhow::Result<SharedDocumentStore> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but this build lacks the `postgres` feature; using in-memory documents");
    } else {
        info!("using in-memory document store");
    }
    Ok(Arc::new(InMemoryDocumentStore::new()))
}

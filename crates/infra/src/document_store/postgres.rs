//! Postgres-backed document store.
//!
//! One row per item in `inventory_items`. Every write runs in a transaction
//! that locks the row (`SELECT ... FOR UPDATE`), checks the expected revision
//! and then writes with a fresh value from the `inventory_item_revisions`
//! sequence. Two racing creates of the same name collide on the primary key
//! and surface as a [`StoreError::Conflict`].
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | StoreError |
//! |------------|---------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (check violation) | `23514` | `InvalidWrite` |
//! | Database (other) | any | `Unavailable` |
//! | PoolClosed / Io / other | n/a | `Unavailable` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockroom_core::ExpectedVersion;
use stockroom_inventory::{
    Category, InventoryItem, ItemName, ItemPatch, Quantity, Snapshot, StoredItem, WriteMode,
};

use super::r#trait::{DocumentStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        name        TEXT PRIMARY KEY,
        category    TEXT NULL,
        quantity    BIGINT NOT NULL CHECK (quantity > 0),
        image_url   TEXT NULL,
        revision    BIGINT NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE SEQUENCE IF NOT EXISTS inventory_item_revisions",
];

/// Postgres-backed document store.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip_all, fields(name = %name), err)]
    async fn get(&self, name: &ItemName) -> Result<Snapshot, StoreError> {
        let row = sqlx::query(
            "SELECT name, category, quantity, image_url, revision, updated_at \
             FROM inventory_items WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        Ok(row.map(|r| row_to_stored(&r)).transpose()?.into())
    }

    #[instrument(skip_all, fields(name = %name, mode = ?mode, expected = ?expected), err)]
    async fn put(
        &self,
        name: &ItemName,
        patch: &ItemPatch,
        mode: WriteMode,
        expected: ExpectedVersion,
    ) -> Result<StoredItem, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = lock_current(&mut tx, name).await?;
        check_expected(expected, current.as_ref())?;

        let item = patch.apply(name, current.as_ref().map(|c| &c.item), mode)?;
        let revision: i64 = sqlx::query_scalar("SELECT nextval('inventory_item_revisions')")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("next_revision", e))?;
        let updated_at = Utc::now();

        let statement = if current.is_some() {
            "UPDATE inventory_items \
             SET category = $2, quantity = $3, image_url = $4, revision = $5, updated_at = $6 \
             WHERE name = $1"
        } else {
            "INSERT INTO inventory_items (name, category, quantity, image_url, revision, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        };
        sqlx::query(statement)
            .bind(name.as_str())
            .bind(item.category.map(Category::as_str))
            .bind(i64::from(item.quantity.get()))
            .bind(item.image_url.as_deref())
            .bind(revision)
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("put", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(StoredItem {
            item,
            revision: revision as u64,
            updated_at,
        })
    }

    #[instrument(skip_all, fields(name = %name, expected = ?expected), err)]
    async fn delete(&self, name: &ItemName, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = lock_current(&mut tx, name).await?;
        check_expected(expected, current.as_ref())?;

        if current.is_some() {
            sqlx::query("DELETE FROM inventory_items WHERE name = $1")
                .bind(name.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip_all, err)]
    async fn list_all(&self) -> Result<Vec<StoredItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT name, category, quantity, image_url, revision, updated_at \
             FROM inventory_items ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all", e))?;

        rows.iter().map(row_to_stored).collect()
    }
}

async fn lock_current(
    tx: &mut Transaction<'_, Postgres>,
    name: &ItemName,
) -> Result<Option<StoredItem>, StoreError> {
    let row = sqlx::query(
        "SELECT name, category, quantity, image_url, revision, updated_at \
         FROM inventory_items WHERE name = $1 FOR UPDATE",
    )
    .bind(name.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_current", e))?;

    row.map(|r| row_to_stored(&r)).transpose()
}

fn check_expected(expected: ExpectedVersion, current: Option<&StoredItem>) -> Result<(), StoreError> {
    Ok(expected.check(current.map(|c| c.revision).unwrap_or(0))?)
}

fn row_to_stored(row: &PgRow) -> Result<StoredItem, StoreError> {
    let corrupt = |field: &str, e: &dyn std::fmt::Display| {
        StoreError::Corrupt(format!("failed to read {field}: {e}"))
    };

    let name: String = row.try_get("name").map_err(|e| corrupt("name", &e))?;
    let category: Option<String> = row.try_get("category").map_err(|e| corrupt("category", &e))?;
    let quantity: i64 = row.try_get("quantity").map_err(|e| corrupt("quantity", &e))?;
    let image_url: Option<String> = row.try_get("image_url").map_err(|e| corrupt("image_url", &e))?;
    let revision: i64 = row.try_get("revision").map_err(|e| corrupt("revision", &e))?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(|e| corrupt("updated_at", &e))?;

    let name = ItemName::new(name).map_err(|e| corrupt("name", &e))?;
    let category = category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| corrupt("category", &e))?;
    let quantity = u32::try_from(quantity)
        .map(Quantity::new)
        .map_err(|e| corrupt("quantity", &e))?;

    Ok(StoredItem {
        item: InventoryItem {
            name,
            category,
            quantity,
            image_url,
        },
        revision: revision as u64,
        updated_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23514") => StoreError::InvalidWrite(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}

//! Document store boundary.
//!
//! Inventory items are documents keyed by item name. The store offers point
//! reads, merge/replace writes and deletes, each guarded by an expected
//! revision, plus a full listing.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;
pub use r#trait::{DocumentStore, StoreError};

//! Infrastructure layer: document/object store adapters and the services that
//! execute inventory reconciliation against them.

pub mod document_store;
pub mod object_store;
pub mod service;
pub mod session_runner;

pub use service::{InventoryService, PhotoUpload, Reconciled, ReconcilerConfig, ServiceError};
pub use session_runner::SessionRunner;

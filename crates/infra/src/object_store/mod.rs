//! Object storage for item photos.

pub mod filesystem;
pub mod in_memory;
pub mod r#trait;

pub use filesystem::FilesystemObjectStore;
pub use in_memory::InMemoryObjectStore;
pub use r#trait::{
    ObjectRef, ObjectStore, ObjectStoreError, StoredObject, content_type_for_key, photo_key,
    validate_key,
};

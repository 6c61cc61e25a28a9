//! `stockroom-core`: shared domain primitives.
//!
//! The error model, identity/value markers and the expected-revision guard used
//! by every write. Nothing here performs IO.

pub mod entity;
pub mod error;
pub mod value_object;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
pub use version::ExpectedVersion;

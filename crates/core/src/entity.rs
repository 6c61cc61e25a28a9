//! Records with identity.

/// A record identified by a key rather than by its field values.
///
/// Two entities with the same id are the same record even when their other
/// fields differ (an inventory item keeps its identity while its quantity moves).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one. Item names, categories and quantities are
/// value objects; an inventory item is an [`Entity`](crate::Entity).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

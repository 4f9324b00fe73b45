//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new instance.
///
/// Example:
/// - `Address { street, number, zip, city }` is a value object
/// - `Customer { id: CustomerId(...), name: "..." }` is an entity
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Entities: objects tracked by identity rather than by value.

/// Anything with a stable identifier, such as an order item, a customer or a
/// product.
///
/// Two entities with the same id are the same record even when their other
/// fields differ.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

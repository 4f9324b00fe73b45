//! Aggregate root trait: the consistency boundary persisted as one unit.

/// Aggregate root marker + minimal interface.
///
/// An aggregate root owns a cluster of entities (e.g. an order and its items).
/// Repositories load and store whole aggregates; owned entities are never
/// persisted or fetched on their own.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;
}

//! `storefront-core`: identifiers, errors and the entity / aggregate vocabulary
//! shared by the sales, parties and products crates.
//!
//! Nothing here performs IO.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use entity::Entity;
pub use error::DomainError;
pub use id::{CustomerId, OrderId, OrderItemId, ProductId};
pub use value_object::ValueObject;

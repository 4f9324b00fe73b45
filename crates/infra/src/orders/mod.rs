//! Order aggregate persistence.
//!
//! An order is stored as one `orders` row plus one `order_items` row per item.
//! The `position` column keeps items in the order they were added so that a
//! reload yields an aggregate equal to the one that was saved.

pub mod in_memory;
mod rows;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryOrderRepository;
pub use sqlite::SqliteOrderRepository;
pub use r#trait::OrderRepository;

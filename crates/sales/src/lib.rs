//! Sales Orders domain module.
//!
//! This crate contains the order aggregate (an order plus the items it owns)
//! and its business rules, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod order;
pub mod service;

pub use order::{Order, OrderItem};
pub use service::OrderService;

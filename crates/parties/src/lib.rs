//! Parties domain module (customers).
//!
//! This crate contains business rules for customers, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod address;
pub mod customer;

pub use address::Address;
pub use customer::Customer;

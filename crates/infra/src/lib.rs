//! Infrastructure layer: relational persistence for the order aggregate and
//! its customer / product collaborators.
//!
//! Domain crates stay free of IO; everything that touches SQL lives here.

pub mod config;
pub mod customers;
pub mod db;
pub mod error;
pub mod orders;
pub mod products;
pub mod schema;

pub use config::{ConfigError, RemovePolicy, StoreConfig};
pub use customers::{CustomerRepository, SqliteCustomerRepository};
pub use db::connect;
pub use error::RepositoryError;
pub use orders::{InMemoryOrderRepository, OrderRepository, SqliteOrderRepository};
pub use products::{ProductRepository, SqliteProductRepository};

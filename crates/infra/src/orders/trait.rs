use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::OrderId;
use storefront_sales::Order;

use crate::error::RepositoryError;

/// Storage boundary for the order aggregate.
///
/// Every operation is atomic: it either applies completely or leaves storage
/// as it was before the call.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order and all of its items.
    ///
    /// Fails with `DuplicateKey` when an order with the same id exists.
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Re-persist an existing order. The stored items are replaced by exactly
    /// the items currently on `order`.
    ///
    /// Fails with `NotFound` when no order with this id exists.
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Load one order with its items in insertion order.
    async fn find_one(&self, id: &OrderId) -> Result<Order, RepositoryError>;

    /// Load every order, sorted by id.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Delete an order and all of its items.
    ///
    /// Whether a missing id is an error depends on the configured
    /// [`RemovePolicy`](crate::config::RemovePolicy).
    async fn remove(&self, id: &OrderId) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        (**self).create(order).await
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        (**self).update(order).await
    }

    async fn find_one(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        (**self).find_one(id).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        (**self).find_all().await
    }

    async fn remove(&self, id: &OrderId) -> Result<(), RepositoryError> {
        (**self).remove(id).await
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use storefront_core::{AggregateRoot, Entity, OrderId, OrderItemId};
use storefront_sales::Order;

use super::r#trait::OrderRepository;
use crate::config::RemovePolicy;
use crate::error::RepositoryError;

const ENTITY: &str = "order";

#[derive(Debug, Default)]
struct State {
    orders: BTreeMap<OrderId, Order>,
    /// Owning order of every stored item. Item ids are unique across all
    /// orders, as they are in the `order_items` table.
    item_owners: HashMap<OrderItemId, OrderId>,
}

impl State {
    /// Reject the first item of `order` already owned by a different order.
    fn check_item_ids(&self, order: &Order) -> Result<(), RepositoryError> {
        for item in order.items() {
            match self.item_owners.get(item.id()) {
                Some(owner) if owner != order.id() => {
                    return Err(RepositoryError::storage(
                        "insert_order_item",
                        format!("item id {} already belongs to order {owner}", item.id()),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn release_items(&mut self, id: &OrderId) {
        if let Some(order) = self.orders.get(id) {
            for item in order.items() {
                self.item_owners.remove(item.id());
            }
        }
    }

    fn store(&mut self, order: &Order) {
        for item in order.items() {
            self.item_owners.insert(item.id().clone(), order.id().clone());
        }
        self.orders.insert(order.id().clone(), order.clone());
    }
}

/// In-memory order repository.
///
/// Intended for tests/dev. Stores aggregates by value, so callers never share
/// state with the repository. Every check runs before any write, so a failed
/// call leaves the store untouched.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<State>,
    remove_policy: RemovePolicy,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remove_policy(mut self, remove_policy: RemovePolicy) -> Self {
        self.remove_policy = remove_policy;
        self
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.orders.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.read()?.orders.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.state
            .read()
            .map_err(|_| RepositoryError::storage("read_lock", "lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state
            .write()
            .map_err(|_| RepositoryError::storage("write_lock", "lock poisoned"))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if state.orders.contains_key(order.id()) {
            return Err(RepositoryError::duplicate_key(ENTITY, order.id().as_str()));
        }
        state.check_item_ids(order)?;
        state.store(order);
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if !state.orders.contains_key(order.id()) {
            return Err(RepositoryError::not_found(ENTITY, order.id().as_str()));
        }
        state.check_item_ids(order)?;
        state.release_items(order.id());
        state.store(order);
        Ok(())
    }

    async fn find_one(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        self.read()?
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.as_str()))
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.read()?.orders.values().cloned().collect())
    }

    async fn remove(&self, id: &OrderId) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        state.release_items(id);
        let removed = state.orders.remove(id);
        if removed.is_none() && self.remove_policy == RemovePolicy::Strict {
            return Err(RepositoryError::not_found(ENTITY, id.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{CustomerId, OrderItemId, ProductId};
    use storefront_sales::OrderItem;

    fn order(id: &str) -> Order {
        Order::new(
            OrderId::parse(id).unwrap(),
            CustomerId::parse("c1").unwrap(),
            vec![
                OrderItem::new(
                    OrderItemId::parse(format!("{id}-1")).unwrap(),
                    "Product 1",
                    100,
                    ProductId::parse("p1").unwrap(),
                    2,
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stored_orders_are_independent_copies() {
        let repo = InMemoryOrderRepository::new();
        let mut original = order("o1");
        repo.create(&original).await.unwrap();

        original.change_customer(CustomerId::parse("c2").unwrap());

        let stored = repo.find_one(original.id()).await.unwrap();
        assert_eq!(stored.customer_id().as_str(), "c1");
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn find_all_is_sorted_by_id() {
        let repo = InMemoryOrderRepository::new();
        for id in ["o3", "o1", "o2"] {
            repo.create(&order(id)).await.unwrap();
        }

        let ids: Vec<_> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["o1", "o2", "o3"]);
    }

    #[tokio::test]
    async fn strict_remove_reports_missing_order() {
        let repo = InMemoryOrderRepository::new().with_remove_policy(RemovePolicy::Strict);
        let err = repo.remove(&OrderId::parse("missing").unwrap()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.is_empty().unwrap());
    }

    #[tokio::test]
    async fn item_id_of_another_order_is_rejected_without_writing() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("o1")).await.unwrap();

        // `order("o2")` owns "o2-1"; reuse "o1-1" as well.
        let mut clash = order("o2");
        clash.add_item(order("o1").items()[0].clone()).unwrap();
        let err = repo.create(&clash).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Storage { operation: "insert_order_item", .. }));
        assert!(repo.find_one(clash.id()).await.unwrap_err().is_not_found());
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn removed_orders_release_their_item_ids() {
        let repo = InMemoryOrderRepository::new();
        let first = order("o1");
        repo.create(&first).await.unwrap();
        repo.remove(first.id()).await.unwrap();

        let mut reuse = order("o2");
        reuse.replace_items(first.items().to_vec()).unwrap();
        repo.create(&reuse).await.unwrap();
        assert_eq!(repo.find_one(reuse.id()).await.unwrap(), reuse);
    }
}

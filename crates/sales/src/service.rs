//! Domain services spanning several orders or an order and its customer.

use storefront_core::{DomainError, Entity, OrderId};
use storefront_parties::Customer;

use crate::order::{Order, OrderItem};

/// Stateless order operations.
pub struct OrderService;

impl OrderService {
    /// Sum of the totals of every given order.
    pub fn total(orders: &[Order]) -> i64 {
        orders.iter().map(Order::total).sum()
    }

    /// Place a new order for `customer` and credit half its total as reward
    /// points.
    ///
    /// The customer is only modified when the order was built successfully.
    pub fn place_order(
        customer: &mut Customer,
        items: Vec<OrderItem>,
    ) -> Result<Order, DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation("order must have at least one item"));
        }

        let order = Order::new(OrderId::generate(), customer.id().clone(), items)?;
        customer.add_reward_points(order.total() / 2)?;
        Ok(order)
    }
}

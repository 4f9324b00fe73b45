use std::collections::HashSet;

use storefront_core::{AggregateRoot, CustomerId, DomainError, Entity, OrderId, OrderItemId, ProductId};
use storefront_products::Product;

/// Order line: a snapshot of a product (name, unit price) at the time the
/// item was built, plus the ordered quantity.
///
/// Items are immutable once constructed. To change an order's contents, add
/// or replace items on the owning [`Order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    id: OrderItemId,
    name: String,
    /// Price in smallest currency unit (e.g., cents).
    price: i64,
    product_id: ProductId,
    quantity: i64,
}

impl OrderItem {
    pub fn new(
        id: OrderItemId,
        name: impl Into<String>,
        price: i64,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name is required"));
        }
        if price < 0 {
            return Err(DomainError::validation("item price must not be negative"));
        }
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if price.checked_mul(quantity).is_none() {
            return Err(DomainError::validation("item total overflows"));
        }

        Ok(Self {
            id,
            name,
            price,
            product_id,
            quantity,
        })
    }

    /// Build an item from the product's current name and price.
    pub fn from_product(
        id: OrderItemId,
        product: &Product,
        quantity: i64,
    ) -> Result<Self, DomainError> {
        Self::new(
            id,
            product.name(),
            product.price(),
            product.id().clone(),
            quantity,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// `price * quantity` (cannot overflow; checked at construction).
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Order.
///
/// Owns its items exclusively. `total()` is always derived from the current
/// items; nothing on the aggregate caches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
}

impl Order {
    /// Build an order. Item order is preserved as given.
    ///
    /// Fails without constructing anything when two items share an id or the
    /// order total would overflow.
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Self, DomainError> {
        validate_items(&items)?;
        Ok(Self {
            id,
            customer_id,
            items,
        })
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Sum of `price * quantity` over the current items.
    pub fn total(&self) -> i64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn change_customer(&mut self, customer_id: CustomerId) {
        self.customer_id = customer_id;
    }

    /// Append an item. The order is left untouched on failure.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), DomainError> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(DomainError::invariant(format!(
                "item {} already belongs to order {}",
                item.id, self.id
            )));
        }
        if self.total().checked_add(item.line_total()).is_none() {
            return Err(DomainError::validation("order total overflows"));
        }
        self.items.push(item);
        Ok(())
    }

    /// Replace every item. The order is left untouched on failure.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) -> Result<(), DomainError> {
        validate_items(&items)?;
        self.items = items;
        Ok(())
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_items(items: &[OrderItem]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut total: i64 = 0;
    for item in items {
        if !seen.insert(&item.id) {
            return Err(DomainError::invariant(format!(
                "duplicate item id {} in order",
                item.id
            )));
        }
        total = total
            .checked_add(item.line_total())
            .ok_or_else(|| DomainError::validation("order total overflows"))?;
    }
    Ok(())
}

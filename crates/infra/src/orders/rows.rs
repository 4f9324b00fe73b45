//! Explicit row <-> aggregate mapping for orders.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use storefront_core::{AggregateRoot, CustomerId, OrderId, OrderItemId, ProductId};
use storefront_sales::{Order, OrderItem};

use crate::error::RepositoryError;

/// One order with its items in position order.
pub(super) const FIND_ONE_SQL: &str = r#"
    SELECT
        o.id          AS order_id,
        o.customer_id AS customer_id,
        o.total       AS total,
        i.id          AS item_id,
        i.product_id  AS product_id,
        i.name        AS item_name,
        i.price       AS price,
        i.quantity    AS quantity
    FROM orders o
    LEFT JOIN order_items i ON i.order_id = o.id
    WHERE o.id = ?
    ORDER BY i.position ASC
"#;

/// Every order, with rows for the same order kept adjacent.
pub(super) const FIND_ALL_SQL: &str = r#"
    SELECT
        o.id          AS order_id,
        o.customer_id AS customer_id,
        o.total       AS total,
        i.id          AS item_id,
        i.product_id  AS product_id,
        i.name        AS item_name,
        i.price       AS price,
        i.quantity    AS quantity
    FROM orders o
    LEFT JOIN order_items i ON i.order_id = o.id
    ORDER BY o.id ASC, i.position ASC
"#;

/// One row of `orders LEFT JOIN order_items`. Item columns are `NULL` for an
/// order without items.
#[derive(Debug)]
pub(super) struct JoinedOrderRow {
    order_id: String,
    customer_id: String,
    total: i64,
    item: Option<ItemRow>,
}

#[derive(Debug)]
struct ItemRow {
    id: String,
    product_id: String,
    name: String,
    price: i64,
    quantity: i64,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for JoinedOrderRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let item_id: Option<String> = row.try_get("item_id")?;
        let item = match item_id {
            Some(id) => Some(ItemRow {
                id,
                product_id: row.try_get("product_id")?,
                name: row.try_get("item_name")?,
                price: row.try_get("price")?,
                quantity: row.try_get("quantity")?,
            }),
            None => None,
        };

        Ok(JoinedOrderRow {
            order_id: row.try_get("order_id")?,
            customer_id: row.try_get("customer_id")?,
            total: row.try_get("total")?,
            item,
        })
    }
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(OrderItem::new(
            OrderItemId::parse(row.id)?,
            row.name,
            row.price,
            ProductId::parse(row.product_id)?,
            row.quantity,
        )?)
    }
}

/// Group joined rows into aggregates.
///
/// Rows for the same order must be adjacent and already in item position
/// order.
pub(super) fn group_into_orders(rows: Vec<JoinedOrderRow>) -> Result<Vec<Order>, RepositoryError> {
    let mut groups: Vec<(String, String, i64, Vec<ItemRow>)> = Vec::new();

    for row in rows {
        let same_order = groups
            .last()
            .is_some_and(|(order_id, ..)| *order_id == row.order_id);
        if !same_order {
            groups.push((row.order_id, row.customer_id, row.total, Vec::new()));
        }
        if let (Some(item), Some((.., items))) = (row.item, groups.last_mut()) {
            items.push(item);
        }
    }

    groups
        .into_iter()
        .map(|(order_id, customer_id, stored_total, items)| {
            build_order(order_id, customer_id, stored_total, items)
        })
        .collect()
}

fn build_order(
    order_id: String,
    customer_id: String,
    stored_total: i64,
    items: Vec<ItemRow>,
) -> Result<Order, RepositoryError> {
    let items = items
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let order = Order::new(
        OrderId::parse(order_id)?,
        CustomerId::parse(customer_id)?,
        items,
    )?;

    // The stored total is denormalized; the items are authoritative.
    if order.total() != stored_total {
        tracing::warn!(
            order_id = %order.id(),
            stored_total,
            computed_total = order.total(),
            "stored order total disagrees with its items"
        );
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Entity;

    fn row(order_id: &str, item: Option<(&str, i64, i64)>) -> JoinedOrderRow {
        JoinedOrderRow {
            order_id: order_id.to_string(),
            customer_id: "c1".to_string(),
            total: 0,
            item: item.map(|(id, price, quantity)| ItemRow {
                id: id.to_string(),
                product_id: "p1".to_string(),
                name: format!("Item {id}"),
                price,
                quantity,
            }),
        }
    }

    #[test]
    fn groups_adjacent_rows_preserving_item_order() {
        let orders = group_into_orders(vec![
            row("o1", Some(("i2", 10, 1))),
            row("o1", Some(("i1", 20, 2))),
            row("o2", None),
        ])
        .unwrap();

        assert_eq!(orders.len(), 2);
        let ids: Vec<_> = orders[0].items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["i2", "i1"]);
        assert_eq!(orders[0].total(), 50);
        assert_eq!(orders[1].id().as_str(), "o2");
        assert!(orders[1].items().is_empty());
    }

    #[test]
    fn invalid_stored_item_surfaces_as_validation() {
        let err = group_into_orders(vec![row("o1", Some(("i1", 10, 0)))]).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn no_rows_means_no_orders() {
        assert!(group_into_orders(Vec::new()).unwrap().is_empty());
    }
}

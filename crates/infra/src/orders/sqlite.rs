//! SQLite-backed order repository.
//!
//! ## Transactions
//!
//! Every operation, reads included, runs inside one transaction. Any error
//! returns before `commit`, and dropping the uncommitted transaction rolls
//! back every write issued so far by that call.
//!
//! ## Update strategy
//!
//! `update` replaces the item rows wholesale: the order row is updated, its
//! item rows are deleted, and the current items are inserted again with fresh
//! positions.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use storefront_core::{AggregateRoot, Entity, OrderId};
use storefront_sales::Order;
use tracing::{instrument, Span};

use super::rows::{group_into_orders, JoinedOrderRow, FIND_ALL_SQL, FIND_ONE_SQL};
use super::r#trait::OrderRepository;
use crate::config::{RemovePolicy, StoreConfig};
use crate::error::{map_insert_error, map_sqlx_error, RepositoryError};

const ENTITY: &str = "order";

/// Order repository over a SQLite pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
    remove_policy: RemovePolicy,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            remove_policy: RemovePolicy::default(),
        }
    }

    pub fn from_config(pool: SqlitePool, config: &StoreConfig) -> Self {
        Self::new(pool).with_remove_policy(config.remove_policy)
    }

    pub fn with_remove_policy(mut self, remove_policy: RemovePolicy) -> Self {
        self.remove_policy = remove_policy;
        self
    }

    pub fn remove_policy(&self) -> RemovePolicy {
        self.remove_policy
    }

    /// Insert the order row and its item rows atomically.
    #[instrument(
        skip(self, order),
        fields(order_id = %order.id(), item_count = order.items().len()),
        err
    )]
    pub async fn insert_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let existing = sqlx::query("SELECT 1 FROM orders WHERE id = ?")
            .bind(order.id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("check_order_exists", e))?;
        if existing.is_some() {
            return Err(RepositoryError::duplicate_key(ENTITY, order.id().as_str()));
        }

        sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES (?, ?, ?)")
            .bind(order.id().as_str())
            .bind(order.customer_id().as_str())
            .bind(order.total())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_error("insert_order", ENTITY, order.id().as_str(), e))?;

        insert_items(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(total = order.total(), "order created");
        Ok(())
    }

    /// Update the order row and replace its item rows atomically.
    #[instrument(
        skip(self, order),
        fields(order_id = %order.id(), item_count = order.items().len()),
        err
    )]
    pub async fn save_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query("UPDATE orders SET customer_id = ?, total = ? WHERE id = ?")
            .bind(order.customer_id().as_str())
            .bind(order.total())
            .bind(order.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_order", e))?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, order.id().as_str()));
        }

        let replaced = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order_items", e))?;

        insert_items(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(
            replaced_items = replaced.rows_affected(),
            total = order.total(),
            "order updated"
        );
        Ok(())
    }

    /// Load one order and its items.
    #[instrument(skip(self), fields(order_id = %id, row_count = tracing::field::Empty), err)]
    pub async fn load_order(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows: Vec<JoinedOrderRow> = sqlx::query_as(FIND_ONE_SQL)
            .bind(id.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_order", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("row_count", rows.len());

        group_into_orders(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.as_str()))
    }

    /// Load every order, sorted by id.
    #[instrument(skip(self), err)]
    pub async fn load_all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows: Vec<JoinedOrderRow> = sqlx::query_as(FIND_ALL_SQL)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_all_orders", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let orders = group_into_orders(rows)?;
        tracing::debug!(order_count = orders.len(), "orders loaded");
        Ok(orders)
    }

    /// Delete an order and its items.
    #[instrument(skip(self), fields(order_id = %id, remove_policy = ?self.remove_policy), err)]
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let items = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order_items", e))?;

        let deleted = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        if deleted.rows_affected() == 0 && self.remove_policy == RemovePolicy::Strict {
            return Err(RepositoryError::not_found(ENTITY, id.as_str()));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(
            removed = deleted.rows_affected() > 0,
            removed_items = items.rows_affected(),
            "order removed"
        );
        Ok(())
    }
}

/// Insert one row per item, numbering positions from zero.
async fn insert_items(conn: &mut SqliteConnection, order: &Order) -> Result<(), RepositoryError> {
    for (position, item) in order.items().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, name, price, quantity, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id().as_str())
        .bind(order.id().as_str())
        .bind(item.product_id().as_str())
        .bind(item.name())
        .bind(item.price())
        .bind(item.quantity())
        .bind(position as i64)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("insert_order_item", e))?;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.insert_order(order).await
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        self.save_order(order).await
    }

    async fn find_one(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        self.load_order(id).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.load_all_orders().await
    }

    async fn remove(&self, id: &OrderId) -> Result<(), RepositoryError> {
        self.delete_order(id).await
    }
}

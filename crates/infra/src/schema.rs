//! Table definitions for the order aggregate and its collaborators.
//!
//! `ensure_schema` is idempotent; it only creates what is missing and never
//! alters existing tables.

use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::{map_sqlx_error, RepositoryError};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id            TEXT PRIMARY KEY NOT NULL,
        name          TEXT NOT NULL,
        street        TEXT,
        number        INTEGER,
        zip           TEXT,
        city          TEXT,
        active        INTEGER NOT NULL DEFAULT 0,
        reward_points INTEGER NOT NULL DEFAULT 0 CHECK (reward_points >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id    TEXT PRIMARY KEY NOT NULL,
        name  TEXT NOT NULL,
        price INTEGER NOT NULL CHECK (price >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id          TEXT PRIMARY KEY NOT NULL,
        customer_id TEXT NOT NULL REFERENCES customers (id),
        total       INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id         TEXT PRIMARY KEY NOT NULL,
        order_id   TEXT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        product_id TEXT NOT NULL REFERENCES products (id),
        name       TEXT NOT NULL,
        price      INTEGER NOT NULL CHECK (price >= 0),
        quantity   INTEGER NOT NULL CHECK (quantity > 0),
        position   INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS order_items_by_order
        ON order_items (order_id, position)
    "#,
];

/// Create every table the repositories need, in one transaction.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepositoryError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))?;

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))?;

    tracing::debug!(statements = STATEMENTS.len(), "schema ensured");
    Ok(())
}

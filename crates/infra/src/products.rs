//! Product persistence.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use storefront_core::{Entity, ProductId};
use storefront_products::Product;
use tracing::instrument;

use crate::error::{map_insert_error, map_sqlx_error, RepositoryError};

const ENTITY: &str = "product";

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn find_one(&self, id: &ProductId) -> Result<Product, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        (**self).create(product).await
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        (**self).update(product).await
    }

    async fn find_one(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        (**self).find_one(id).await
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all().await
    }
}

#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id()), err)]
    async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO products (id, name, price) VALUES (?, ?, ?)")
            .bind(product.id().as_str())
            .bind(product.name())
            .bind(product.price())
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error("insert_product", ENTITY, product.id().as_str(), e))?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(product_id = %product.id()), err)]
    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET name = ?, price = ? WHERE id = ?")
            .bind(product.name())
            .bind(product.price())
            .bind(product.id().as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, product.id().as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_one(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query("SELECT id, name, price FROM products WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_product", e))?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.as_str()))?;

        product_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, price FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_all_products", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let decode = |e| map_sqlx_error("decode_product_row", e);
    Ok(Product::new(
        ProductId::parse(row.try_get::<String, _>("id").map_err(decode)?)?,
        row.try_get::<String, _>("name").map_err(decode)?,
        row.try_get::<i64, _>("price").map_err(decode)?,
    )?)
}

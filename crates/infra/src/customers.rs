//! Customer persistence.
//!
//! The address value object is flattened into nullable columns on the
//! `customers` row; either all four are set or none are.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use storefront_core::{CustomerId, DomainError, Entity};
use storefront_parties::{Address, Customer};
use tracing::instrument;

use crate::error::{map_insert_error, map_sqlx_error, RepositoryError};

const ENTITY: &str = "customer";

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError>;
    async fn update(&self, customer: &Customer) -> Result<(), RepositoryError>;
    async fn find_one(&self, id: &CustomerId) -> Result<Customer, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError>;
}

#[async_trait]
impl<R> CustomerRepository for Arc<R>
where
    R: CustomerRepository + ?Sized,
{
    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError> {
        (**self).create(customer).await
    }

    async fn update(&self, customer: &Customer) -> Result<(), RepositoryError> {
        (**self).update(customer).await
    }

    async fn find_one(&self, id: &CustomerId) -> Result<Customer, RepositoryError> {
        (**self).find_one(id).await
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        (**self).find_all().await
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    #[instrument(skip(self, customer), fields(customer_id = %customer.id()), err)]
    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let address = customer.address();
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, street, number, zip, city, active, reward_points)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer.id().as_str())
        .bind(customer.name())
        .bind(address.map(Address::street))
        .bind(address.map(Address::number))
        .bind(address.map(Address::zip))
        .bind(address.map(Address::city))
        .bind(customer.is_active())
        .bind(customer.reward_points())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error("insert_customer", ENTITY, customer.id().as_str(), e))?;
        Ok(())
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id()), err)]
    async fn update(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let address = customer.address();
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, street = ?, number = ?, zip = ?, city = ?, active = ?, reward_points = ?
            WHERE id = ?
            "#,
        )
        .bind(customer.name())
        .bind(address.map(Address::street))
        .bind(address.map(Address::number))
        .bind(address.map(Address::zip))
        .bind(address.map(Address::city))
        .bind(customer.is_active())
        .bind(customer.reward_points())
        .bind(customer.id().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, customer.id().as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_one(&self, id: &CustomerId) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, street, number, zip, city, active, reward_points
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_customer", e))?
        .ok_or_else(|| RepositoryError::not_found(ENTITY, id.as_str()))?;

        customer_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, street, number, zip, city, active, reward_points
            FROM customers
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_all_customers", e))?;

        rows.iter().map(customer_from_row).collect()
    }
}

fn customer_from_row(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let decode = |e| map_sqlx_error("decode_customer_row", e);

    let id: String = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let street: Option<String> = row.try_get("street").map_err(decode)?;
    let number: Option<i64> = row.try_get("number").map_err(decode)?;
    let zip: Option<String> = row.try_get("zip").map_err(decode)?;
    let city: Option<String> = row.try_get("city").map_err(decode)?;
    let active: bool = row.try_get("active").map_err(decode)?;
    let reward_points: i64 = row.try_get("reward_points").map_err(decode)?;

    let address = match (street, number, zip, city) {
        (Some(street), Some(number), Some(zip), Some(city)) => {
            Some(Address::new(street, number, zip, city)?)
        }
        (None, None, None, None) => None,
        _ => return Err(DomainError::validation("stored address is incomplete").into()),
    };

    Ok(Customer::restore(
        CustomerId::parse(id)?,
        name,
        address,
        active,
        reward_points,
    )?)
}

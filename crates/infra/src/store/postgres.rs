//! Postgres-backed stores.
//!
//! Schema lives in `migrations/0001_commerce.sql` and is applied with
//! [`apply_schema`].
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate id/email |
//! | Database (check constraint violation) | `23514` | `Conflict` | Stock would go negative |
//! | Database (serialization failure) | `40001` | `Conflict` | Concurrent transaction won |
//! | Database (other) | Any other | `Database` | Foreign keys, syntax, etc. |
//! | PoolClosed / RowNotFound / Other | N/A | `Database` | Connection and driver failures |
//!
//! ## Writes
//!
//! `update_quantity` and `create` each run in a single transaction, so a batch
//! of stock updates or an order with its lines is written entirely or not at all.
//! The two calls are still separate transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use commerce_core::{CustomerId, OrderId, ProductId, StoreError, StoreResult};
use commerce_customers::Customer;
use commerce_orders::{CustomerStore, NewOrder, Order, OrderStore, ProductStore};
use commerce_products::{Product, StockUpdate};

const SCHEMA: &str = include_str!("../../migrations/0001_commerce.sql");

/// Create the commerce tables if they do not exist yet.
pub async fn apply_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("apply_schema", e))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer record (used for seeding and by the customer subsystem).
    #[instrument(skip(self, customer), fields(customer_id = %customer.id_typed()), err)]
    pub async fn insert(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query("INSERT INTO customers (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(customer.id_typed().as_uuid())
            .bind(customer.name())
            .bind(customer.email())
            .bind(customer.created_at())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer", e))?;

        row.as_ref().map(customer_from_row).transpose()
    }
}

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        sqlx::query("INSERT INTO products (id, name, price, quantity) VALUES ($1, $2, $3, $4)")
            .bind(product.id_typed().as_uuid())
            .bind(product.name())
            .bind(price_to_db(product.price())?)
            .bind(product.quantity())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    async fn find_all_by_id(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query("SELECT id, name, price, quantity FROM products WHERE id = ANY($1)")
            .bind(&uuids[..])
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_products", e))?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let product = product_from_row(row)?;
            by_id.insert(product.id_typed(), product);
        }

        // Same order as requested; unknown ids are skipped.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    #[instrument(skip(self, updates), fields(updates = updates.len()), err)]
    async fn update_quantity(&self, updates: &[StockUpdate]) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_quantity", e))?;

        for update in updates {
            let result = sqlx::query("UPDATE products SET quantity = $2 WHERE id = $1")
                .bind(update.id.as_uuid())
                .bind(update.quantity)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_quantity", e))?;

            if result.rows_affected() == 0 {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("update_quantity", e))?;
                return Err(StoreError::not_found("product", update.id));
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_quantity", e))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(
        skip(self, input),
        fields(customer_id = %input.customer.id_typed(), lines = input.lines.len()),
        err
    )]
    async fn create(&self, input: NewOrder) -> StoreResult<Order> {
        let order_id = OrderId::new();
        // Postgres keeps microseconds; trim so the returned value matches a re-read.
        let created_at: DateTime<Utc> = Utc::now().trunc_subsecs(6);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_order", e))?;

        sqlx::query("INSERT INTO orders (id, customer_id, created_at) VALUES ($1, $2, $3)")
            .bind(order_id.as_uuid())
            .bind(input.customer.id_typed().as_uuid())
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_order", e))?;

        for (i, line) in input.lines.iter().enumerate() {
            let line_no = i32::try_from(i + 1)
                .map_err(|_| StoreError::database("create_order", "too many order lines"))?;

            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, product_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id.as_uuid())
            .bind(line_no)
            .bind(line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(price_to_db(line.price)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_order_line", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_order", e))?;

        Ok(Order::from_new(order_id, input, created_at))
    }
}

fn customer_from_row(row: &PgRow) -> StoreResult<Customer> {
    let id: Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let email: String = column(row, "email")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;

    Customer::new(CustomerId::from_uuid(id), name, email, created_at)
        .map_err(|e| StoreError::corrupt(format!("customer {id}: {e}")))
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let id: Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let price: i64 = column(row, "price")?;
    let quantity: i64 = column(row, "quantity")?;

    let price = u64::try_from(price)
        .map_err(|_| StoreError::corrupt(format!("product {id}: negative price {price}")))?;

    Product::new(ProductId::from_uuid(id), name, price, quantity)
        .map_err(|e| StoreError::corrupt(format!("product {id}: {e}")))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::corrupt(format!("failed to read column {name}: {e}")))
}

fn price_to_db(price: u64) -> StoreResult<i64> {
    i64::try_from(price).map_err(|_| StoreError::corrupt(format!("price {price} exceeds BIGINT range")))
}

/// Map sqlx errors to `StoreError` with operation context.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation, check violation, serialization failure
                Some("23505") | Some("23514") | Some("40001") => StoreError::Conflict(msg),
                _ => StoreError::database(operation, db_err.message()),
            }
        }
        sqlx::Error::PoolClosed => StoreError::database(operation, "connection pool closed"),
        sqlx::Error::RowNotFound => StoreError::database(operation, "unexpected row not found"),
        _ => StoreError::database(operation, err),
    }
}

//! Wiring: stores + the `CreateOrder` use case, selected by configuration.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use commerce_core::{CustomerId, OrderId, ProductId};
use commerce_customers::Customer;
use commerce_orders::{CreateOrder, CustomerStore, Order, OrderStore, ProductStore};
use commerce_products::Product;

use crate::config::{StoreBackend, StoreConfig};
use crate::store::{
    InMemoryStore, PostgresCustomerStore, PostgresOrderStore, PostgresProductStore, apply_schema,
};

#[derive(Clone)]
pub struct OrderServices {
    pub customers: Arc<dyn CustomerStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub create_order: CreateOrder,
}

impl OrderServices {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        let create_order = CreateOrder::new(customers.clone(), products.clone(), orders.clone());
        Self {
            customers,
            products,
            orders,
            create_order,
        }
    }
}

pub async fn build_services(config: &StoreConfig) -> anyhow::Result<OrderServices> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::info!(backend = "in-memory", "building order services");
            Ok(build_in_memory_services(Vec::new(), Vec::new()))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(backend = "postgres", max_connections, "building order services");
            build_postgres_services(database_url, *max_connections).await
        }
    }
}

/// In-memory wiring (dev/test), optionally pre-seeded.
pub fn build_in_memory_services(
    customers: impl IntoIterator<Item = Customer>,
    products: impl IntoIterator<Item = Product>,
) -> OrderServices {
    let customers: Arc<InMemoryStore<CustomerId, Customer>> =
        Arc::new(InMemoryStore::<CustomerId, Customer>::seed(customers));
    let products: Arc<InMemoryStore<ProductId, Product>> =
        Arc::new(InMemoryStore::<ProductId, Product>::seed(products));
    let orders: Arc<InMemoryStore<OrderId, Order>> = Arc::new(InMemoryStore::new());

    OrderServices::new(customers, products, orders)
}

async fn build_postgres_services(database_url: &str, max_connections: u32) -> anyhow::Result<OrderServices> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    apply_schema(&pool)
        .await
        .context("failed to apply commerce schema")?;

    Ok(OrderServices::new(
        Arc::new(PostgresCustomerStore::new(pool.clone())),
        Arc::new(PostgresProductStore::new(pool.clone())),
        Arc::new(PostgresOrderStore::new(pool)),
    ))
}

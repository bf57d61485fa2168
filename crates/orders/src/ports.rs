//! Store ports consumed by order placement.
//!
//! Implementations live in `commerce-infra` (in-memory and Postgres). Each port
//! is one I/O boundary; the use case awaits them strictly one at a time.

use async_trait::async_trait;

use commerce_core::{CustomerId, ProductId, StoreResult};
use commerce_customers::Customer;
use commerce_products::{Product, StockUpdate};

use crate::order::{NewOrder, Order};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Batch lookup. Unknown ids are skipped, not reported.
    async fn find_all_by_id(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>>;

    /// Overwrite stock levels with the given absolute quantities.
    async fn update_quantity(&self, updates: &[StockUpdate]) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order, assigning its id and creation time.
    async fn create(&self, input: NewOrder) -> StoreResult<Order>;
}

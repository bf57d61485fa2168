//! Order placement use case.
//!
//! ```text
//! OrderRequest
//!   ↓
//! 1. Validate + merge duplicate items (pure)
//!   ↓
//! 2. Look up customer
//!   ↓
//! 3. Batch-look up products
//!   ↓
//! 4. Build lines with price snapshots, reconcile, check stock (pure)
//!   ↓
//! 5. Persist order
//!   ↓
//! 6. Write new stock levels
//! ```
//!
//! Every rejection happens before step 5, so a rejected request leaves no trace
//! in any store. Steps 5 and 6 are two independent writes: if step 6 fails the
//! order exists while stock is unchanged, reported as
//! [`CreateOrderError::InventoryNotUpdated`].

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use commerce_core::{CustomerId, DomainError, OrderId, ProductId, StoreError};
use commerce_products::{Product, StockUpdate};

use crate::order::{NewOrder, Order, OrderLine};
use crate::ports::{CustomerStore, OrderStore, ProductStore};
use crate::request::{AggregatedItems, OrderRequest};

#[derive(Debug, Error)]
pub enum CreateOrderError {
    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The order was persisted but the stock write failed afterwards.
    #[error("order {order_id} was created but inventory was not updated: {source}")]
    InventoryNotUpdated {
        order_id: OrderId,
        source: StoreError,
    },
}

impl CreateOrderError {
    /// Whether the request itself was at fault (as opposed to a store failure).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CreateOrderError::CustomerNotFound(_)
                | CreateOrderError::ProductNotFound(_)
                | CreateOrderError::InsufficientStock { .. }
                | CreateOrderError::Invalid(_)
        )
    }
}

/// Places orders against injected customer, product and order stores.
#[derive(Clone)]
pub struct CreateOrder {
    customers: Arc<dyn CustomerStore>,
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
}

/// Outcome of the pure planning step: what to persist and what to write back.
struct Plan {
    lines: Vec<OrderLine>,
    updates: Vec<StockUpdate>,
}

impl CreateOrder {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }

    #[instrument(
        skip_all,
        fields(customer_id = %request.customer_id, items = request.items.len())
    )]
    pub async fn execute(&self, request: OrderRequest) -> Result<Order, CreateOrderError> {
        let result = self.place(request).await;

        match &result {
            Ok(order) => info!(
                order_id = %order.id_typed(),
                lines = order.lines().len(),
                total = ?order.total(),
                "order created"
            ),
            Err(e) if e.is_rejection() => warn!(error = %e, "order rejected"),
            Err(CreateOrderError::InventoryNotUpdated { .. }) => {}
            Err(e) => error!(error = %e, "order creation failed"),
        }

        result
    }

    async fn place(&self, request: OrderRequest) -> Result<Order, CreateOrderError> {
        let requested = request.aggregate_items()?;
        debug!(distinct_products = requested.len(), "aggregated order items");

        let customer = self
            .customers
            .find_by_id(request.customer_id)
            .await?
            .ok_or(CreateOrderError::CustomerNotFound(request.customer_id))?;

        let fetched = self.products.find_all_by_id(&requested.product_ids()).await?;
        let plan = plan_order(&requested, &fetched)?;

        let order = self
            .orders
            .create(NewOrder {
                customer,
                lines: plan.lines,
            })
            .await?;

        if let Err(source) = self.products.update_quantity(&plan.updates).await {
            error!(
                order_id = %order.id_typed(),
                error = %source,
                "order persisted but inventory update failed"
            );
            return Err(CreateOrderError::InventoryNotUpdated {
                order_id: order.id_typed(),
                source,
            });
        }

        Ok(order)
    }
}

/// Build order lines and stock updates, rejecting unknown products and shortages.
fn plan_order(requested: &AggregatedItems, fetched: &[Product]) -> Result<Plan, CreateOrderError> {
    // A repeated fetched id counts once.
    let mut stock: HashMap<ProductId, &Product> = HashMap::with_capacity(fetched.len());
    for product in fetched {
        stock.entry(product.id_typed()).or_insert(product);
    }

    // Missing requested ids take precedence over unrequested fetched ones.
    if let Some(missing) = requested.lines().iter().find(|item| !stock.contains_key(&item.product_id)) {
        return Err(CreateOrderError::ProductNotFound(missing.product_id));
    }
    if let Some(stray) = fetched.iter().find(|p| requested.get(p.id_typed()).is_none()) {
        return Err(CreateOrderError::ProductNotFound(stray.id_typed()));
    }

    let mut lines = Vec::with_capacity(requested.len());
    let mut remaining = Vec::with_capacity(requested.len());
    for item in requested.lines() {
        let product = stock
            .get(&item.product_id)
            .ok_or(CreateOrderError::ProductNotFound(item.product_id))?;

        lines.push(OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
            price: product.price(),
        });

        let left = product.remaining_after(item.quantity).ok_or_else(|| {
            DomainError::invariant(format!("stock arithmetic overflow for product {}", item.product_id))
        })?;
        remaining.push((item, product.quantity(), left));
    }

    if let Some((item, available, _)) = remaining.iter().find(|(_, _, left)| *left < 0) {
        return Err(CreateOrderError::InsufficientStock {
            product_id: item.product_id,
            requested: item.quantity,
            available: *available,
        });
    }

    let updates = remaining
        .into_iter()
        .map(|(item, _, left)| StockUpdate {
            id: item.product_id,
            quantity: left,
        })
        .collect();

    Ok(Plan { lines, updates })
}

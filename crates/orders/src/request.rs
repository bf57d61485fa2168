//! Order placement request and line-item aggregation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use commerce_core::{CustomerId, DomainError, DomainResult, ProductId};

/// One requested line as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Request to place an order. Lives only for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemRequest>,
}

/// Effective demand for one product after merging duplicate lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestedProduct {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Request items merged by product id, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedItems {
    lines: Vec<RequestedProduct>,
    index: HashMap<ProductId, usize>,
}

impl AggregatedItems {
    pub fn lines(&self) -> &[RequestedProduct] {
        &self.lines
    }

    pub fn get(&self, product_id: ProductId) -> Option<&RequestedProduct> {
        self.index.get(&product_id).map(|&i| &self.lines[i])
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn add(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        match self.index.entry(product_id) {
            Entry::Occupied(slot) => {
                let line = &mut self.lines[*slot.get()];
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    DomainError::validation(format!("requested quantity overflows for product {product_id}"))
                })?;
            }
            Entry::Vacant(slot) => {
                slot.insert(self.lines.len());
                self.lines.push(RequestedProduct { product_id, quantity });
            }
        }
        Ok(())
    }
}

impl OrderRequest {
    pub fn new(customer_id: CustomerId, items: Vec<OrderItemRequest>) -> Self {
        Self { customer_id, items }
    }

    /// Validate the items and merge repeated product ids, summing quantities.
    ///
    /// Rejects an empty item list and any quantity that is not strictly positive.
    pub fn aggregate_items(&self) -> DomainResult<AggregatedItems> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }

        let mut aggregated = AggregatedItems {
            lines: Vec::with_capacity(self.items.len()),
            index: HashMap::with_capacity(self.items.len()),
        };
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive (got {})",
                    item.product_id, item.quantity
                )));
            }
            aggregated.add(item.product_id, item.quantity)?;
        }
        Ok(aggregated)
    }
}

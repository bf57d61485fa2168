use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commerce_core::{Entity, OrderId, ProductId, ValueObject};
use commerce_customers::Customer;

/// Order line: product, quantity, unit price at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents), copied from the product.
    pub price: u64,
}

impl ValueObject for OrderLine {}

impl OrderLine {
    /// `quantity × price`, or `None` on overflow or a negative quantity.
    pub fn subtotal(&self) -> Option<u64> {
        u64::try_from(self.quantity).ok()?.checked_mul(self.price)
    }
}

/// Input handed to an order store to persist a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
}

/// Entity: a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: Customer,
    lines: Vec<OrderLine>,
    created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, customer: Customer, lines: Vec<OrderLine>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            customer,
            lines,
            created_at,
        }
    }

    /// Materialize a `NewOrder` under a store-assigned id and timestamp.
    pub fn from_new(id: OrderId, input: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self::new(id, input.customer, input.lines, created_at)
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn line_for(&self, product_id: ProductId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Sum of line subtotals in smallest currency unit; `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.lines
            .iter()
            .try_fold(0u64, |acc, line| acc.checked_add(line.subtotal()?))
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

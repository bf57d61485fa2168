use serde::{Deserialize, Serialize};

use commerce_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    /// Unit price in smallest currency unit (e.g., cents).
    price: u64,
    /// Stock on hand.
    quantity: i64,
}

/// New absolute stock level for one product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub id: ProductId,
    pub quantity: i64,
}

impl ValueObject for StockUpdate {}

/// Wire shape of a product; deserialization goes through [`Product::new`].
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    price: u64,
    quantity: i64,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> DomainResult<Self> {
        Product::new(record.id, record.name, record.price, record.quantity)
    }
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: u64, quantity: i64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if quantity < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative (got {quantity})"
            )));
        }

        Ok(Self {
            id,
            name,
            price,
            quantity,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Stock left after taking `requested` units.
    ///
    /// The result may be negative; callers decide whether that is acceptable.
    /// Returns `None` only on arithmetic overflow.
    pub fn remaining_after(&self, requested: i64) -> Option<i64> {
        self.quantity.checked_sub(requested)
    }

    /// Apply a stock update addressed to this product.
    pub fn apply_stock_update(&mut self, update: &StockUpdate) -> DomainResult<()> {
        if update.id != self.id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        if update.quantity < 0 {
            return Err(DomainError::invariant(format!(
                "stock for product {} cannot go negative (got {})",
                self.id, update.quantity
            )));
        }
        self.quantity = update.quantity;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(quantity: i64) -> Product {
        Product::new(ProductId::new(), "Widget", 1_000, quantity).unwrap()
    }

    #[test]
    fn new_product_keeps_fields() {
        let id = ProductId::new();
        let product = Product::new(id, "Widget", 1_250, 7).unwrap();

        assert_eq!(product.id_typed(), id);
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price(), 1_250);
        assert_eq!(product.quantity(), 7);
    }

    #[test]
    fn rejects_empty_name() {
        let err = Product::new(ProductId::new(), "  ", 100, 1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn rejects_negative_stock() {
        let err = Product::new(ProductId::new(), "Widget", 100, -1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn remaining_after_can_go_negative() {
        let product = test_product(2);
        assert_eq!(product.remaining_after(2), Some(0));
        assert_eq!(product.remaining_after(5), Some(-3));
        // Reading the remainder never touches the product itself.
        assert_eq!(product.quantity(), 2);
    }

    #[test]
    fn remaining_after_reports_overflow() {
        let product = Product::new(ProductId::new(), "Widget", 1, 0).unwrap();
        assert_eq!(product.remaining_after(i64::MIN), None);
    }

    #[test]
    fn apply_stock_update_sets_absolute_quantity() {
        let mut product = test_product(5);
        let update = StockUpdate {
            id: product.id_typed(),
            quantity: 2,
        };
        product.apply_stock_update(&update).unwrap();
        assert_eq!(product.quantity(), 2);
    }

    #[test]
    fn apply_stock_update_rejects_foreign_or_negative_updates() {
        let mut product = test_product(5);

        let foreign = StockUpdate {
            id: ProductId::new(),
            quantity: 1,
        };
        assert!(matches!(
            product.apply_stock_update(&foreign),
            Err(DomainError::InvariantViolation(_))
        ));

        let negative = StockUpdate {
            id: product.id_typed(),
            quantity: -1,
        };
        assert!(matches!(
            product.apply_stock_update(&negative),
            Err(DomainError::InvariantViolation(_))
        ));
        assert_eq!(product.quantity(), 5);
    }

    #[test]
    fn deserialization_enforces_constructor_rules() {
        let product = test_product(3);
        let json = serde_json::to_string(&product).unwrap();
        assert_eq!(serde_json::from_str::<Product>(&json).unwrap(), product);

        let negative = json.replace("\"quantity\":3", "\"quantity\":-1");
        assert!(serde_json::from_str::<Product>(&negative).is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: taking what is left and applying it lands exactly on the remainder.
            #[test]
            fn remainder_round_trips_through_update(
                stock in 0i64..1_000_000,
                requested in 0i64..1_000_000,
            ) {
                let mut product = test_product(stock);
                let remaining = product.remaining_after(requested).unwrap();
                prop_assert_eq!(remaining, stock - requested);

                let update = StockUpdate { id: product.id_typed(), quantity: remaining };
                let applied = product.apply_stock_update(&update);
                if remaining >= 0 {
                    prop_assert!(applied.is_ok());
                    prop_assert_eq!(product.quantity(), remaining);
                } else {
                    prop_assert!(applied.is_err());
                    prop_assert_eq!(product.quantity(), stock);
                }
            }
        }
    }
}

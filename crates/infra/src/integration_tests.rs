//! Integration tests for order placement over the in-memory stores.
//!
//! Tests: OrderRequest → CreateOrder → CustomerStore / ProductStore / OrderStore
//!
//! Verifies:
//! - Duplicate lines are merged for both the order and the stock decrement
//! - Prices are snapshotted at placement time
//! - Rejected requests leave every store untouched

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use commerce_core::{CustomerId, OrderId, ProductId};
    use commerce_customers::Customer;
    use commerce_orders::{
        CreateOrder, CreateOrderError, Order, OrderItemRequest, OrderLine, OrderRequest,
    };
    use commerce_products::Product;

    use crate::store::InMemoryStore;

    struct Fixture {
        customers: Arc<InMemoryStore<CustomerId, Customer>>,
        products: Arc<InMemoryStore<ProductId, Product>>,
        orders: Arc<InMemoryStore<OrderId, Order>>,
        use_case: CreateOrder,
        c1: Customer,
        p1: Product,
        p2: Product,
    }

    /// Customer `C1`; products `P1 {price 10, qty 5}` and `P2 {price 20, qty 2}`.
    fn setup() -> Fixture {
        commerce_observability::init_for_tests();

        let c1 = Customer::new(CustomerId::new(), "C1", "c1@example.com", Utc::now()).unwrap();
        let p1 = Product::new(ProductId::new(), "P1", 10, 5).unwrap();
        let p2 = Product::new(ProductId::new(), "P2", 20, 2).unwrap();

        let customers = Arc::new(InMemoryStore::<CustomerId, Customer>::seed([c1.clone()]));
        let products = Arc::new(InMemoryStore::<ProductId, Product>::seed([p1.clone(), p2.clone()]));
        let orders: Arc<InMemoryStore<OrderId, Order>> = Arc::new(InMemoryStore::new());

        let use_case = CreateOrder::new(customers.clone(), products.clone(), orders.clone());

        Fixture {
            customers,
            products,
            orders,
            use_case,
            c1,
            p1,
            p2,
        }
    }

    fn item(product: &Product, quantity: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_id: product.id_typed(),
            quantity,
        }
    }

    fn stock_of(fx: &Fixture, product: &Product) -> i64 {
        fx.products
            .get(&product.id_typed())
            .unwrap()
            .map(|p| p.quantity())
            .unwrap()
    }

    fn assert_untouched(fx: &Fixture) {
        assert!(fx.orders.is_empty().unwrap(), "no order may be persisted");
        assert_eq!(stock_of(fx, &fx.p1), 5);
        assert_eq!(stock_of(fx, &fx.p2), 2);
    }

    #[tokio::test]
    async fn mixed_duplicate_request_succeeds_and_decrements_stock() {
        let fx = setup();

        let request = OrderRequest::new(
            fx.c1.id_typed(),
            vec![item(&fx.p1, 2), item(&fx.p2, 1), item(&fx.p1, 1)],
        );
        let order = fx.use_case.execute(request).await.unwrap();

        assert_eq!(
            order.lines(),
            &[
                OrderLine { product_id: fx.p1.id_typed(), quantity: 3, price: 10 },
                OrderLine { product_id: fx.p2.id_typed(), quantity: 1, price: 20 },
            ]
        );
        assert_eq!(stock_of(&fx, &fx.p1), 2);
        assert_eq!(stock_of(&fx, &fx.p2), 1);

        let persisted = fx.orders.get(&order.id_typed()).unwrap();
        assert_eq!(persisted, Some(order));
    }

    #[tokio::test]
    async fn over_stock_request_fails_and_keeps_stock() {
        let fx = setup();

        let request = OrderRequest::new(fx.c1.id_typed(), vec![item(&fx.p2, 5)]);
        let err = fx.use_case.execute(request).await.unwrap_err();

        assert!(matches!(
            err,
            CreateOrderError::InsufficientStock { requested: 5, available: 2, .. }
        ));
        assert_untouched(&fx);
    }

    #[tokio::test]
    async fn unknown_customer_fails_without_mutation() {
        let fx = setup();

        let request = OrderRequest::new(CustomerId::new(), vec![item(&fx.p1, 1)]);
        let err = fx.use_case.execute(request).await.unwrap_err();

        assert!(matches!(err, CreateOrderError::CustomerNotFound(_)));
        assert_untouched(&fx);
    }

    #[tokio::test]
    async fn unknown_product_fails_without_mutation() {
        let fx = setup();
        let ghost = ProductId::new();

        let request = OrderRequest::new(
            fx.c1.id_typed(),
            vec![
                item(&fx.p1, 1),
                OrderItemRequest {
                    product_id: ghost,
                    quantity: 1,
                },
            ],
        );
        let err = fx.use_case.execute(request).await.unwrap_err();

        assert!(matches!(err, CreateOrderError::ProductNotFound(id) if id == ghost));
        assert_untouched(&fx);
    }

    #[tokio::test]
    async fn split_lines_equal_single_line() {
        let split = setup();
        let single = setup();

        let split_order = split
            .use_case
            .execute(OrderRequest::new(
                split.c1.id_typed(),
                vec![item(&split.p1, 3), item(&split.p1, 2)],
            ))
            .await
            .unwrap();
        let single_order = single
            .use_case
            .execute(OrderRequest::new(single.c1.id_typed(), vec![item(&single.p1, 5)]))
            .await
            .unwrap();

        assert_eq!(split_order.lines().len(), 1);
        assert_eq!(split_order.lines()[0].quantity, 5);
        assert_eq!(single_order.lines()[0].quantity, 5);
        assert_eq!(stock_of(&split, &split.p1), 0);
        assert_eq!(stock_of(&single, &single.p1), 0);
    }

    #[tokio::test]
    async fn line_price_is_a_snapshot() {
        let fx = setup();

        let order = fx
            .use_case
            .execute(OrderRequest::new(fx.c1.id_typed(), vec![item(&fx.p2, 1)]))
            .await
            .unwrap();

        // Reprice P2 after the order was placed.
        let repriced = Product::new(fx.p2.id_typed(), "P2", 99, stock_of(&fx, &fx.p2)).unwrap();
        fx.products.insert(repriced.id_typed(), repriced).unwrap();

        let persisted = fx.orders.get(&order.id_typed()).unwrap().unwrap();
        assert_eq!(persisted.line_for(fx.p2.id_typed()).map(|l| l.price), Some(20));
    }

    #[tokio::test]
    async fn successive_orders_drain_stock_then_fail() {
        let fx = setup();

        for _ in 0..2 {
            fx.use_case
                .execute(OrderRequest::new(fx.c1.id_typed(), vec![item(&fx.p2, 1)]))
                .await
                .unwrap();
        }
        let err = fx
            .use_case
            .execute(OrderRequest::new(fx.c1.id_typed(), vec![item(&fx.p2, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateOrderError::InsufficientStock { available: 0, .. }));
        assert_eq!(stock_of(&fx, &fx.p2), 0);
        assert_eq!(fx.orders.len().unwrap(), 2);
        assert_eq!(fx.customers.len().unwrap(), 1);
    }
}

//! Orders module: order records, the store ports order placement depends on,
//! and the `CreateOrder` use case.
//!
//! The use case is plain application logic over injected stores; it performs no
//! IO of its own.

pub mod create_order;
pub mod order;
pub mod ports;
pub mod request;

pub use create_order::{CreateOrder, CreateOrderError};
pub use order::{NewOrder, Order, OrderLine};
pub use ports::{CustomerStore, OrderStore, ProductStore};
pub use request::{AggregatedItems, OrderItemRequest, OrderRequest, RequestedProduct};

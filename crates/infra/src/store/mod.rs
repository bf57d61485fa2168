//! Store implementations for the order placement ports.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::{PostgresCustomerStore, PostgresOrderStore, PostgresProductStore, apply_schema};

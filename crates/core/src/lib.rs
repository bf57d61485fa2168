//! `commerce-core`: shared building blocks for the commerce domain crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, error types, and the entity/value-object markers.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
pub use id::{CustomerId, OrderId, ProductId};
pub use value_object::ValueObject;

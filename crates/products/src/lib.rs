//! Products domain module.
//!
//! A product here is both a catalog entry (name, price) and its stock record
//! (`quantity` on hand). Order placement only ever changes the quantity.

pub mod product;

pub use product::{Product, StockUpdate};

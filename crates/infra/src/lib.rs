//! Infrastructure layer: store implementations, configuration, service wiring.

pub mod config;
pub mod services;
pub mod store;

mod integration_tests;

pub use config::{ConfigError, StoreBackend, StoreConfig};
pub use services::{OrderServices, build_services};

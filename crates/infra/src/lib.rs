//! Infrastructure layer: read-model adapters, config, the request-facing service and
//! scheduled alerting.

pub mod alerts;
pub mod config;
pub mod service;
pub mod source;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, IntelConfig, ScanTarget};
pub use service::{Clock, InventoryIntel, StoreOverview};

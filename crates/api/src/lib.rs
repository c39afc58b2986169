//! HTTP API: routing, tenant context and response mapping for the inventory
//! intelligence engine.

pub mod app;
pub mod context;
pub mod middleware;

//! `stockwise-intel`
//!
//! **Responsibility:** Inventory intelligence over a store's sales history and stock levels.
//!
//! - Demand forecast: average daily demand and stock runway per item.
//! - Reorder suggestions: items about to run out, with a two-week replenishment quantity.
//! - Anomaly scan: demand spikes/drops, stock-ledger mismatches and dead stock.
//!
//! Everything here is a pure function of a [`StoreSnapshot`]. Reading the snapshot is
//! delegated to an [`InventoryDataSource`] supplied by callers (infra); this crate does
//! no I/O and holds no state between calls.

pub mod aggregate;
pub mod anomaly;
pub mod demand;
pub mod engine;
pub mod error;
pub mod model;
pub mod params;
pub mod ranking;
pub mod reorder;
pub mod source;

pub use aggregate::{SalesAggregate, aggregate_sales};
pub use anomaly::{
    Anomaly, AnomalyKind, DeadStockDetails, DemandShiftDetails, MismatchReason, Severity,
    StockMismatchDetails,
};
pub use demand::{DemandEstimate, Runway};
pub use engine::{
    AnomalyReport, ForecastReport, ReorderReport, anomaly_scan, demand_forecast, parse_store_id,
    reorder_suggestions,
};
pub use error::{DataSourceError, IntelError};
pub use model::{ItemRef, OrderStatus, SaleLine, StockedItem, StoreRecord, StoreSnapshot};
pub use params::{AnomalyParams, ForecastParams, ReorderParams, SalesWindow, parse_days};
pub use ranking::{AnomalySummary, ForecastSort, ForecastSummary, ReorderSummary};
pub use reorder::{ReorderSuggestion, Urgency};
pub use source::InventoryDataSource;

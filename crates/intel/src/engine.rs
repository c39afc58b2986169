//! The three read operations, as pure functions over a [`StoreSnapshot`].
//!
//! Each one runs the shared aggregation, applies its own analysis, then ranks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwise_core::StoreId;

use crate::aggregate::aggregate_sales;
use crate::anomaly::{self, Anomaly, AnomalyInput};
use crate::demand::{self, DemandEstimate};
use crate::error::IntelError;
use crate::model::StoreSnapshot;
use crate::params::{
    AnomalyParams, ForecastParams, ReorderParams, SalesWindow, TRAILING_WINDOW_DAYS,
};
use crate::ranking::{self, AnomalySummary, ForecastSort, ForecastSummary, ReorderSummary};
use crate::reorder::{self, ReorderSuggestion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    pub params: ForecastParams,
    pub sort: ForecastSort,
    pub items: Vec<DemandEstimate>,
    pub summary: ForecastSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderReport {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    pub params: ReorderParams,
    pub suggestions: Vec<ReorderSuggestion>,
    pub summary: ReorderSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    pub params: AnomalyParams,
    pub anomalies: Vec<Anomaly>,
    pub summary: AnomalySummary,
}

/// Parse a caller-supplied store identifier.
///
/// Blank input is an invalid parameter. Anything else that is not a store id
/// names no store, so it is reported as not found.
pub fn parse_store_id(raw: &str) -> Result<StoreId, IntelError> {
    if raw.trim().is_empty() {
        return Err(IntelError::invalid("store id is required"));
    }
    raw.parse::<StoreId>()
        .map_err(|_| IntelError::not_found(format!("store {}", raw.trim())))
}

/// Demand estimates for every active item over a `days` window, in item order.
fn estimates_for(snapshot: &StoreSnapshot, days: u32) -> Vec<DemandEstimate> {
    let window = SalesWindow::trailing(snapshot.as_of, days);
    let aggregates = aggregate_sales(&snapshot.items, &snapshot.sales, window);
    snapshot
        .items
        .iter()
        .filter(|item| item.active)
        .map(|item| demand::estimate(item, aggregates.get(&item.item_id)))
        .collect()
}

/// Per-item demand rate and runway.
pub fn demand_forecast(
    snapshot: &StoreSnapshot,
    params: ForecastParams,
    sort: ForecastSort,
) -> ForecastReport {
    let mut items = estimates_for(snapshot, params.days);
    ranking::sort_estimates(&mut items, sort);
    let summary = ForecastSummary::from_estimates(&items);

    ForecastReport {
        store_id: snapshot.store.store_id,
        as_of: snapshot.as_of,
        params,
        sort,
        items,
        summary,
    }
}

/// Items whose runway is within the threshold, most urgent first.
pub fn reorder_suggestions(snapshot: &StoreSnapshot, params: ReorderParams) -> ReorderReport {
    let estimates = estimates_for(snapshot, params.window_days);
    let mut suggestions = reorder::advise(&estimates, params.threshold_days);
    ranking::sort_suggestions(&mut suggestions);
    let summary = ReorderSummary::from_suggestions(&suggestions);

    ReorderReport {
        store_id: snapshot.store.store_id,
        as_of: snapshot.as_of,
        params,
        suggestions,
        summary,
    }
}

/// Demand shifts, ledger inconsistencies and dead stock, by severity.
pub fn anomaly_scan(snapshot: &StoreSnapshot, params: AnomalyParams) -> AnomalyReport {
    let full = aggregate_sales(
        &snapshot.items,
        &snapshot.sales,
        SalesWindow::trailing(snapshot.as_of, params.days),
    );
    let trailing = aggregate_sales(
        &snapshot.items,
        &snapshot.sales,
        SalesWindow::trailing(snapshot.as_of, TRAILING_WINDOW_DAYS),
    );

    let mut anomalies = anomaly::detect(&AnomalyInput {
        items: &snapshot.items,
        window: &full,
        trailing: &trailing,
        window_days: params.days,
    });
    ranking::sort_anomalies(&mut anomalies);
    let summary = AnomalySummary::from_anomalies(&anomalies);

    AnomalyReport {
        store_id: snapshot.store.store_id,
        as_of: snapshot.as_of,
        params,
        anomalies,
        summary,
    }
}

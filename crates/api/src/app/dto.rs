use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwise_core::StoreId;
use stockwise_infra::StoreOverview;
use stockwise_intel::{
    Anomaly, AnomalyParams, AnomalyReport, AnomalySummary, DemandEstimate, ForecastParams,
    ForecastReport, ForecastSort, ForecastSummary, ReorderParams, ReorderReport, ReorderSuggestion,
    ReorderSummary,
};

// -------------------------
// Query DTOs
// -------------------------
//
// Numeric values are taken as raw strings so that garbage falls back to defaults
// instead of failing extraction.

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReorderQuery {
    pub threshold_days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnomalyQuery {
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub days: Option<String>,
    pub threshold_days: Option<String>,
}

// -------------------------
// Response envelope
// -------------------------

#[derive(Debug, Serialize)]
pub struct Envelope<D, M> {
    pub success: bool,
    pub data: D,
    pub meta: M,
}

impl<D, M> Envelope<D, M> {
    pub fn ok(data: D, meta: M) -> Self {
        Self {
            success: true,
            data,
            meta,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastMeta {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    #[serde(flatten)]
    pub params: ForecastParams,
    pub sort: ForecastSort,
    #[serde(flatten)]
    pub summary: ForecastSummary,
}

#[derive(Debug, Serialize)]
pub struct ReorderMeta {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    #[serde(flatten)]
    pub params: ReorderParams,
    #[serde(flatten)]
    pub summary: ReorderSummary,
}

#[derive(Debug, Serialize)]
pub struct AnomalyMeta {
    pub store_id: StoreId,
    pub as_of: DateTime<Utc>,
    #[serde(flatten)]
    pub params: AnomalyParams,
    #[serde(flatten)]
    pub summary: AnomalySummary,
}

#[derive(Debug, Serialize)]
pub struct OverviewMeta {
    pub store_id: StoreId,
    pub forecast_days: u32,
    pub threshold_days: u32,
    pub anomaly_days: u32,
}

pub type ForecastResponse = Envelope<Vec<DemandEstimate>, ForecastMeta>;
pub type ReorderResponse = Envelope<Vec<ReorderSuggestion>, ReorderMeta>;
pub type AnomalyResponse = Envelope<Vec<Anomaly>, AnomalyMeta>;
pub type OverviewResponse = Envelope<StoreOverview, OverviewMeta>;

impl From<ForecastReport> for ForecastResponse {
    fn from(r: ForecastReport) -> Self {
        Envelope::ok(
            r.items,
            ForecastMeta {
                store_id: r.store_id,
                as_of: r.as_of,
                params: r.params,
                sort: r.sort,
                summary: r.summary,
            },
        )
    }
}

impl From<ReorderReport> for ReorderResponse {
    fn from(r: ReorderReport) -> Self {
        Envelope::ok(
            r.suggestions,
            ReorderMeta {
                store_id: r.store_id,
                as_of: r.as_of,
                params: r.params,
                summary: r.summary,
            },
        )
    }
}

impl From<AnomalyReport> for AnomalyResponse {
    fn from(r: AnomalyReport) -> Self {
        Envelope::ok(
            r.anomalies,
            AnomalyMeta {
                store_id: r.store_id,
                as_of: r.as_of,
                params: r.params,
                summary: r.summary,
            },
        )
    }
}

impl From<StoreOverview> for OverviewResponse {
    fn from(o: StoreOverview) -> Self {
        let meta = OverviewMeta {
            store_id: o.forecast.store_id,
            forecast_days: o.forecast.params.days,
            threshold_days: o.reorder.params.threshold_days,
            anomaly_days: o.anomalies.params.days,
        };
        Envelope::ok(o, meta)
    }
}

//! Request-facing engine service.
//!
//! Loads a [`StoreSnapshot`] from an [`InventoryDataSource`] and hands it to the pure
//! operations in `stockwise_intel`. The three reads of a snapshot run concurrently and
//! each is bounded by a timeout; an overview runs all three operations concurrently.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stockwise_core::{StoreId, TenantId};
use stockwise_intel::{
    AnomalyParams, AnomalyReport, DataSourceError, ForecastParams, ForecastReport, ForecastSort,
    IntelError, InventoryDataSource, ReorderParams, ReorderReport, SalesWindow, StoreSnapshot,
};

/// Source of "now". Injected so tests can pin the analysis time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const DEFAULT_DATA_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// The three reports for one store, computed from independent snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOverview {
    pub forecast: ForecastReport,
    pub reorder: ReorderReport,
    pub anomalies: AnomalyReport,
}

pub struct InventoryIntel<D: ?Sized> {
    source: Arc<D>,
    timeout: Duration,
    clock: Clock,
}

impl<D: ?Sized> Clone for InventoryIntel<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            timeout: self.timeout,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<D> InventoryIntel<D>
where
    D: InventoryDataSource + ?Sized,
{
    pub fn new(source: Arc<D>) -> Self {
        Self {
            source,
            timeout: DEFAULT_DATA_SOURCE_TIMEOUT,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn demand_forecast(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        params: ForecastParams,
        sort: ForecastSort,
    ) -> Result<ForecastReport, IntelError> {
        let snapshot = self.load(tenant_id, store_id, params.days).await?;
        let report = stockwise_intel::demand_forecast(&snapshot, params, sort);
        info!(
            tenant = %tenant_id,
            store = %store_id,
            days = params.days,
            items = report.items.len(),
            "demand forecast computed"
        );
        Ok(report)
    }

    pub async fn reorder_suggestions(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        params: ReorderParams,
    ) -> Result<ReorderReport, IntelError> {
        let snapshot = self.load(tenant_id, store_id, params.window_days).await?;
        let report = stockwise_intel::reorder_suggestions(&snapshot, params);
        info!(
            tenant = %tenant_id,
            store = %store_id,
            threshold_days = params.threshold_days,
            suggestions = report.suggestions.len(),
            critical = report.summary.critical,
            "reorder suggestions computed"
        );
        Ok(report)
    }

    pub async fn anomaly_scan(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        params: AnomalyParams,
    ) -> Result<AnomalyReport, IntelError> {
        let snapshot = self.load(tenant_id, store_id, params.days).await?;
        let report = stockwise_intel::anomaly_scan(&snapshot, params);
        info!(
            tenant = %tenant_id,
            store = %store_id,
            days = params.days,
            anomalies = report.summary.total,
            high = report.summary.high,
            "anomaly scan computed"
        );
        Ok(report)
    }

    /// Forecast, reorder and anomaly reports for one store. Fails if any of them fails.
    pub async fn overview(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        forecast: ForecastParams,
        reorder: ReorderParams,
        anomalies: AnomalyParams,
    ) -> Result<StoreOverview, IntelError> {
        let (forecast, reorder, anomalies) = tokio::try_join!(
            self.demand_forecast(tenant_id, store_id, forecast, ForecastSort::default()),
            self.reorder_suggestions(tenant_id, store_id, reorder),
            self.anomaly_scan(tenant_id, store_id, anomalies),
        )?;
        Ok(StoreOverview {
            forecast,
            reorder,
            anomalies,
        })
    }

    /// Read the store, its items and the sales of the last `lookback_days`.
    async fn load(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        lookback_days: u32,
    ) -> Result<StoreSnapshot, IntelError> {
        let as_of = (self.clock)();
        let since = SalesWindow::trailing(as_of, lookback_days).start();

        let (store, items, sales) = tokio::try_join!(
            self.bounded("store", self.source.store(tenant_id, store_id)),
            self.bounded("stocked_items", self.source.stocked_items(tenant_id, store_id)),
            self.bounded("sale_lines", self.source.sale_lines(tenant_id, store_id, since)),
        )?;

        // A store row of another tenant is treated as absent.
        let store = store
            .filter(|s| s.tenant_id == tenant_id)
            .ok_or_else(|| IntelError::not_found(format!("store {store_id}")))?;

        debug!(
            tenant = %tenant_id,
            store = %store_id,
            items = items.len(),
            sale_lines = sales.len(),
            "snapshot loaded"
        );
        Ok(StoreSnapshot::new(store, items, sales, as_of))
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, IntelError>
    where
        F: Future<Output = Result<T, DataSourceError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %e, "data source read failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(op, timeout_ms = self.timeout.as_millis() as u64, "data source read timed out");
                Err(IntelError::data_source(format!(
                    "{op} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

use std::sync::Mutex;

use tracing::{info, warn};

use stockwise_core::TenantId;
use stockwise_intel::{AnomalyReport, Severity};

/// Destination for anomaly alerts.
///
/// Alerts are advisory output of the scan runner, not changes to inventory state.
pub trait AlertSink: Send + Sync + 'static {
    fn emit(&self, tenant_id: TenantId, report: AnomalyReport);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    inner: Mutex<Vec<(TenantId, AnomalyReport)>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(TenantId, AnomalyReport)> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl AlertSink for InMemoryAlertSink {
    fn emit(&self, tenant_id: TenantId, report: AnomalyReport) {
        if let Ok(mut v) = self.inner.lock() {
            v.push((tenant_id, report));
        }
    }
}

/// Writes one log event per anomaly. High severity logs at `WARN`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn emit(&self, tenant_id: TenantId, report: AnomalyReport) {
        info!(
            tenant = %tenant_id,
            store = %report.store_id,
            total = report.summary.total,
            high = report.summary.high,
            medium = report.summary.medium,
            low = report.summary.low,
            "inventory anomalies detected"
        );
        for a in &report.anomalies {
            match a.severity {
                Severity::High => warn!(
                    tenant = %tenant_id,
                    store = %report.store_id,
                    item = %a.item.item_id,
                    kind = a.kind.as_str(),
                    "{}",
                    a.message
                ),
                Severity::Medium | Severity::Low => info!(
                    tenant = %tenant_id,
                    store = %report.store_id,
                    item = %a.item.item_id,
                    kind = a.kind.as_str(),
                    severity = ?a.severity,
                    "{}",
                    a.message
                ),
            }
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use stockwise_core::{StoreId, TenantId};
use stockwise_intel::{AnomalyParams, InventoryDataSource};

use crate::alerts::sink::AlertSink;
use crate::service::InventoryIntel;

/// Config for the anomaly scan runner.
#[derive(Debug, Clone)]
pub struct AnomalyScanRunner {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub params: AnomalyParams,
}

impl Default for AnomalyScanRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
            params: AnomalyParams::default(),
        }
    }
}

/// Handle for a running scan task (shutdown + trigger hook).
///
/// Dropping the handle stops the task at its next await point.
#[derive(Debug)]
pub struct AnomalyScanRunnerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    trigger: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl AnomalyScanRunnerHandle {
    /// Request an out-of-schedule scan (e.g. after a stock import).
    ///
    /// Triggers are coalesced: if one is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

impl AnomalyScanRunner {
    /// Spawn a tenant-scoped runner on the current tokio runtime.
    ///
    /// - Schedule: scans every `interval`, starting immediately
    /// - Trigger: `handle.trigger()` requests an extra scan
    /// - Failures: retryable errors are retried with bounded exponential backoff;
    ///   nothing propagates out of the task
    pub fn spawn_for_tenant<D, S>(
        &self,
        name: &'static str,
        tenant_id: TenantId,
        stores: Vec<StoreId>,
        intel: InventoryIntel<D>,
        sink: Arc<S>,
    ) -> AnomalyScanRunnerHandle
    where
        D: InventoryDataSource + ?Sized,
        S: AlertSink,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);

        let cfg = self.clone();
        let join = tokio::spawn(runner_loop(
            name,
            tenant_id,
            stores,
            cfg,
            shutdown_rx,
            trigger_rx,
            intel,
            sink,
        ));

        AnomalyScanRunnerHandle {
            shutdown: Some(shutdown_tx),
            trigger: trigger_tx,
            join: Some(join),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn runner_loop<D, S>(
    name: &'static str,
    tenant_id: TenantId,
    stores: Vec<StoreId>,
    cfg: AnomalyScanRunner,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut trigger_rx: mpsc::Receiver<()>,
    intel: InventoryIntel<D>,
    sink: Arc<S>,
) where
    D: InventoryDataSource + ?Sized,
    S: AlertSink,
{
    info!(runner = name, tenant = %tenant_id, stores = stores.len(), "anomaly scan runner started");

    // First tick completes immediately: scan once on startup.
    let mut ticker = tokio::time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'outer: loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break 'outer,
            _ = ticker.tick() => {}
            Some(()) = trigger_rx.recv() => {
                debug!(runner = name, tenant = %tenant_id, "anomaly scan triggered");
            }
        }

        for store_id in &stores {
            let flow = scan_store(
                name,
                tenant_id,
                *store_id,
                &cfg,
                &intel,
                sink.as_ref(),
                &mut shutdown_rx,
            )
            .await;
            if let Flow::Stop = flow {
                break 'outer;
            }
        }
    }

    info!(runner = name, tenant = %tenant_id, "anomaly scan runner stopped");
}

async fn scan_store<D, S>(
    name: &'static str,
    tenant_id: TenantId,
    store_id: StoreId,
    cfg: &AnomalyScanRunner,
    intel: &InventoryIntel<D>,
    sink: &S,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> Flow
where
    D: InventoryDataSource + ?Sized,
    S: AlertSink,
{
    let mut failures: u32 = 0;
    loop {
        match intel.anomaly_scan(tenant_id, store_id, cfg.params).await {
            Ok(report) => {
                if report.anomalies.is_empty() {
                    debug!(runner = name, tenant = %tenant_id, store = %store_id, "no anomalies");
                } else {
                    sink.emit(tenant_id, report);
                }
                return Flow::Continue;
            }
            Err(e) if e.is_retryable() && failures < cfg.max_retries => {
                failures += 1;
                let delay = backoff(cfg.base_backoff, failures);
                warn!(
                    runner = name,
                    tenant = %tenant_id,
                    store = %store_id,
                    error = %e,
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    "anomaly scan failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = &mut *shutdown_rx => return Flow::Stop,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => {
                warn!(
                    runner = name,
                    tenant = %tenant_id,
                    store = %store_id,
                    error = %e,
                    "anomaly scan failed, skipping until next run"
                );
                return Flow::Continue;
            }
        }
    }
}

/// base * 2^(attempt-1), capped at 10s.
fn backoff(base: Duration, attempt: u32) -> Duration {
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::sink::InMemoryAlertSink;
    use crate::source::InMemoryInventorySource;
    use crate::testing::{FlakySource, test_clock, test_item, test_seeded, test_store, wait_until};

    fn test_runner() -> AnomalyScanRunner {
        AnomalyScanRunner {
            interval: Duration::from_secs(3_600),
            max_retries: 3,
            base_backoff: Duration::from_millis(5),
            params: AnomalyParams::default(),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 2), Duration::from_millis(500));
        assert_eq!(backoff(base, 3), Duration::from_millis(1_000));
        assert_eq!(backoff(base, 30), Duration::from_millis(10_000));
    }

    #[tokio::test]
    async fn scans_on_startup_and_emits_non_empty_report() {
        let s = test_seeded();
        let intel = InventoryIntel::new(s.source.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());

        let handle = test_runner().spawn_for_tenant("test-scan", s.tenant, vec![s.store], intel, sink.clone());
        assert!(wait_until(|| sink.all().len() == 1).await);

        let (tenant, report) = &sink.all()[0];
        assert_eq!(*tenant, s.tenant);
        assert_eq!(report.store_id, s.store);
        assert!(report.summary.total > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn clean_store_emits_nothing_and_trigger_rescans() {
        let s = test_store();
        // 20 on hand, one unit a day: no spike, drop, mismatch or dead stock.
        let steady = test_item("Steady seller", 20);
        s.add_item(&steady);
        s.sell_daily(&steady, 1, 30);

        let flaky = Arc::new(FlakySource::new(s.source.clone(), 0));
        let intel = InventoryIntel::new(flaky.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());

        let handle = test_runner().spawn_for_tenant("test-clean", s.tenant, vec![s.store], intel, sink.clone());
        assert!(wait_until(|| flaky.calls() == 1).await);

        handle.trigger();
        assert!(wait_until(|| flaky.calls() == 2).await);
        assert!(sink.all().is_empty());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn retryable_failures_are_retried_until_success() {
        let s = test_seeded();
        let flaky = Arc::new(FlakySource::new(s.source.clone(), 2));
        let intel = InventoryIntel::new(flaky.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());

        let handle = test_runner().spawn_for_tenant("test-retry", s.tenant, vec![s.store], intel, sink.clone());
        assert!(wait_until(|| sink.all().len() == 1).await);
        assert_eq!(flaky.calls(), 3);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let s = test_seeded();
        let flaky = Arc::new(FlakySource::new(s.source.clone(), usize::MAX));
        let intel = InventoryIntel::new(flaky.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());

        let handle = test_runner().spawn_for_tenant("test-bounded", s.tenant, vec![s.store], intel, sink.clone());
        // One attempt plus max_retries.
        assert!(wait_until(|| flaky.calls() == 4).await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(flaky.calls(), 4);
        assert!(sink.all().is_empty());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn missing_store_is_not_retried() {
        let flaky = Arc::new(FlakySource::new(Arc::new(InMemoryInventorySource::new()), 0));
        let intel = InventoryIntel::new(flaky.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());

        let handle = test_runner().spawn_for_tenant(
            "test-missing",
            TenantId::new(),
            vec![StoreId::new()],
            intel,
            sink.clone(),
        );
        assert!(wait_until(|| flaky.calls() == 1).await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(flaky.calls(), 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_interrupts_backoff() {
        let s = test_seeded();
        let flaky = Arc::new(FlakySource::new(s.source.clone(), usize::MAX));
        let intel = InventoryIntel::new(flaky.clone()).with_clock(test_clock());
        let sink = Arc::new(InMemoryAlertSink::new());
        let runner = AnomalyScanRunner {
            base_backoff: Duration::from_secs(60),
            ..test_runner()
        };

        let handle = runner.spawn_for_tenant("test-shutdown", s.tenant, vec![s.store], intel, sink);
        assert!(wait_until(|| flaky.calls() == 1).await);

        let stopped = tokio::time::timeout(Duration::from_secs(2), handle.shutdown()).await;
        assert!(stopped.is_ok());
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use stockwise_api::app::{build_app, AppServices};
use stockwise_core::{StoreId, TenantId};
use stockwise_infra::alerts::{AnomalyScanRunner, TracingAlertSink};
use stockwise_infra::source::{InMemoryInventorySource, PostgresInventorySource};
use stockwise_infra::{IntelConfig, InventoryIntel};
use stockwise_intel::InventoryDataSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockwise_observability::init();

    let config = IntelConfig::from_env().context("invalid configuration")?;

    let source: Arc<dyn InventoryDataSource> = match config.database_url.as_deref() {
        Some(url) => Arc::new(
            PostgresInventorySource::connect(url, config.data_source_timeout)
                .await
                .context("failed to connect to the inventory database")?,
        ),
        None => {
            warn!("DATABASE_URL not set; serving an empty in-memory read model");
            Arc::new(InMemoryInventorySource::new())
        }
    };

    let intel = InventoryIntel::new(source).with_timeout(config.data_source_timeout);

    // One runner per tenant, covering all of its configured stores.
    let mut targets: BTreeMap<TenantId, Vec<StoreId>> = BTreeMap::new();
    for t in &config.scan_targets {
        targets.entry(t.tenant_id).or_default().push(t.store_id);
    }
    let runner = AnomalyScanRunner {
        interval: config.scan_interval,
        ..AnomalyScanRunner::default()
    };
    let sink = Arc::new(TracingAlertSink);
    let runners: Vec<_> = targets
        .into_iter()
        .map(|(tenant_id, stores)| {
            runner.spawn_for_tenant("anomaly-scan", tenant_id, stores, intel.clone(), sink.clone())
        })
        .collect();

    let app = build_app(Arc::new(AppServices::new(intel)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, scan_runners = runners.len(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for handle in runners {
        handle.shutdown().await;
    }
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

//! Shared fixtures for infra unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use stockwise_core::{OrderId, StockedItemId, StoreId, TenantId};
use stockwise_intel::{
    DataSourceError, InventoryDataSource, OrderStatus, SaleLine, StockedItem, StoreRecord,
};

use crate::service::Clock;
use crate::source::InMemoryInventorySource;

pub(crate) fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 20, 9, 30, 0).unwrap()
}

pub(crate) fn test_clock() -> Clock {
    Arc::new(test_now)
}

pub(crate) fn test_item(name: &str, on_hand: i64) -> StockedItem {
    StockedItem {
        item_id: StockedItemId::new(),
        name: name.to_string(),
        variant: None,
        image_url: None,
        on_hand,
        reserved: 0,
        active: true,
    }
}

pub(crate) struct Seeded {
    pub source: Arc<InMemoryInventorySource>,
    pub tenant: TenantId,
    pub store: StoreId,
}

impl Seeded {
    pub fn add_item(&self, item: &StockedItem) {
        self.source
            .upsert_item(self.tenant, self.store, item.clone())
            .unwrap();
    }

    /// One fulfilled order of `quantity` per day for the last `days` days.
    pub fn sell_daily(&self, item: &StockedItem, quantity: i64, days: i64) {
        for day in 0..days {
            self.source
                .record_sale(
                    self.tenant,
                    self.store,
                    SaleLine {
                        order_id: OrderId::new(),
                        item_id: item.item_id,
                        quantity,
                        status: OrderStatus::Fulfilled,
                        ordered_at: test_now() - Duration::days(day) - Duration::hours(2),
                    },
                )
                .unwrap();
        }
    }
}

/// An empty store owned by a fresh tenant.
pub(crate) fn test_store() -> Seeded {
    let source = Arc::new(InMemoryInventorySource::new());
    let tenant = TenantId::new();
    let store = StoreId::new();
    source.upsert_store(StoreRecord {
        store_id: store,
        tenant_id: tenant,
        name: "Canal St".to_string(),
    });
    Seeded {
        source,
        tenant,
        store,
    }
}

/// One fast mover (10/day for a week, 20 on hand) and one unsold 80-unit item.
pub(crate) fn test_seeded() -> Seeded {
    let s = test_store();
    let mut fast = test_item("Oat milk", 20);
    fast.variant = Some("1L".to_string());
    let dead = test_item("Syrup pump", 80);
    s.add_item(&fast);
    s.add_item(&dead);
    s.sell_daily(&fast, 10, 7);
    s
}

/// Wraps a source, counting store lookups and failing the first `fail_first` of them.
pub(crate) struct FlakySource<S> {
    inner: Arc<S>,
    fail_first: usize,
    calls: AtomicUsize,
}

impl<S> FlakySource<S> {
    pub fn new(inner: Arc<S>, fail_first: usize) -> Self {
        Self {
            inner,
            fail_first,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: InventoryDataSource> InventoryDataSource for FlakySource<S> {
    async fn store(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Option<StoreRecord>, DataSourceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(DataSourceError::new("connection reset"));
        }
        self.inner.store(tenant_id, store_id).await
    }

    async fn stocked_items(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Vec<StockedItem>, DataSourceError> {
        self.inner.stocked_items(tenant_id, store_id).await
    }

    async fn sale_lines(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleLine>, DataSourceError> {
        self.inner.sale_lines(tenant_id, store_id, since).await
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    cond()
}

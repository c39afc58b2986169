use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockwise_core::{DomainError, StockedItemId, StoreId, TenantId};
use stockwise_intel::{DataSourceError, InventoryDataSource, SaleLine, StockedItem, StoreRecord};

#[derive(Debug, Clone)]
struct StoreData {
    record: StoreRecord,
    items: BTreeMap<StockedItemId, StockedItem>,
    sales: Vec<SaleLine>,
}

/// Tenant-isolated in-memory read model for tests/dev.
///
/// Keys are `(tenant, store)` so a lookup with the wrong tenant behaves exactly
/// like a missing store.
#[derive(Debug, Default)]
pub struct InMemoryInventorySource {
    inner: RwLock<HashMap<(TenantId, StoreId), StoreData>>,
}

impl InMemoryInventorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writers replace whole values, so a panic mid-write cannot leave a torn entry.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(TenantId, StoreId), StoreData>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or rename a store. Existing items and sales are kept.
    pub fn upsert_store(&self, record: StoreRecord) {
        let mut map = self.write();
        let key = (record.tenant_id, record.store_id);
        match map.get_mut(&key) {
            Some(existing) => existing.record = record,
            None => {
                map.insert(
                    key,
                    StoreData {
                        record,
                        items: BTreeMap::new(),
                        sales: Vec::new(),
                    },
                );
            }
        }
    }

    /// Insert or replace a stocked item (stock levels included).
    pub fn upsert_item(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        item: StockedItem,
    ) -> Result<(), DomainError> {
        let mut map = self.write();
        let data = map.get_mut(&(tenant_id, store_id)).ok_or(DomainError::NotFound)?;
        data.items.insert(item.item_id, item);
        Ok(())
    }

    /// Set on-hand and reserved counters of an existing item.
    pub fn set_stock(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        item_id: StockedItemId,
        on_hand: i64,
        reserved: i64,
    ) -> Result<(), DomainError> {
        let mut map = self.write();
        let item = map
            .get_mut(&(tenant_id, store_id))
            .and_then(|d| d.items.get_mut(&item_id))
            .ok_or(DomainError::NotFound)?;
        item.on_hand = on_hand;
        item.reserved = reserved;
        Ok(())
    }

    /// Append an order line. Sales history is append-only.
    pub fn record_sale(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        line: SaleLine,
    ) -> Result<(), DomainError> {
        let mut map = self.write();
        let data = map.get_mut(&(tenant_id, store_id)).ok_or(DomainError::NotFound)?;
        if !data.items.contains_key(&line.item_id) {
            return Err(DomainError::validation(format!(
                "item {} is not stocked by store {store_id}",
                line.item_id
            )));
        }
        data.sales.push(line);
        Ok(())
    }
}

#[async_trait]
impl InventoryDataSource for InMemoryInventorySource {
    async fn store(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Option<StoreRecord>, DataSourceError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(&(tenant_id, store_id)).map(|d| d.record.clone()))
    }

    async fn stocked_items(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Vec<StockedItem>, DataSourceError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .get(&(tenant_id, store_id))
            .map(|d| d.items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn sale_lines(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleLine>, DataSourceError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .get(&(tenant_id, store_id))
            .map(|d| {
                d.sales
                    .iter()
                    .filter(|l| l.ordered_at > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

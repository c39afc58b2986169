use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockwise_core::{StoreId, TenantId};

use crate::error::DataSourceError;
use crate::model::{SaleLine, StockedItem, StoreRecord};

/// Read-only access to the transactional store.
///
/// This crate stays storage-agnostic: adapters (in-memory, Postgres) live in infra.
/// Every method is tenant-scoped; implementations must never return rows of
/// another tenant.
#[async_trait]
pub trait InventoryDataSource: Send + Sync + 'static {
    /// Look up a store. `Ok(None)` when it does not exist for this tenant.
    async fn store(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Option<StoreRecord>, DataSourceError>;

    /// Current stock levels for every item the store offers.
    async fn stocked_items(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Vec<StockedItem>, DataSourceError>;

    /// Order lines placed after `since`, in any status.
    ///
    /// Status filtering is the engine's job; adapters may pre-filter but are
    /// not required to.
    async fn sale_lines(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleLine>, DataSourceError>;
}

#[async_trait]
impl<S> InventoryDataSource for Arc<S>
where
    S: InventoryDataSource + ?Sized,
{
    async fn store(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Option<StoreRecord>, DataSourceError> {
        (**self).store(tenant_id, store_id).await
    }

    async fn stocked_items(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Vec<StockedItem>, DataSourceError> {
        (**self).stocked_items(tenant_id, store_id).await
    }

    async fn sale_lines(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleLine>, DataSourceError> {
        (**self).sale_lines(tenant_id, store_id, since).await
    }
}

//! Postgres-backed read model.
//!
//! Reads the minimal transactional tables the engine needs:
//!
//! ```sql
//! stores        (store_id UUID, tenant_id UUID, name TEXT)
//! stocked_items (item_id UUID, tenant_id UUID, store_id UUID, name TEXT, variant TEXT NULL,
//!                image_url TEXT NULL, on_hand BIGINT, reserved BIGINT, active BOOLEAN)
//! orders        (order_id UUID, tenant_id UUID, store_id UUID, status TEXT, ordered_at TIMESTAMPTZ)
//! order_lines   (order_id UUID, item_id UUID, quantity BIGINT)
//! ```
//!
//! ## Tenant Isolation
//!
//! Every query filters on `tenant_id`, so a store of another tenant is indistinguishable
//! from a missing one.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use stockwise_core::{OrderId, StockedItemId, StoreId, TenantId};
use stockwise_intel::{
    DataSourceError, InventoryDataSource, OrderStatus, SaleLine, StockedItem, StoreRecord,
};

fn db_error(op: &'static str) -> impl FnOnce(sqlx::Error) -> DataSourceError {
    move |e| DataSourceError::new(format!("{op}: {e}"))
}

pub struct PostgresInventorySource {
    pool: PgPool,
}

impl PostgresInventorySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a small pool. The engine issues a handful of short reads per request.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, DataSourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(db_error("connect"))?;
        Ok(Self::new(pool))
    }
}

fn item_from_row(row: &PgRow) -> Result<StockedItem, sqlx::Error> {
    Ok(StockedItem {
        item_id: StockedItemId::from_uuid(row.try_get::<Uuid, _>("item_id")?),
        name: row.try_get("name")?,
        variant: row.try_get("variant")?,
        image_url: row.try_get("image_url")?,
        on_hand: row.try_get("on_hand")?,
        reserved: row.try_get("reserved")?,
        active: row.try_get("active")?,
    })
}

fn sale_from_row(row: &PgRow) -> Result<Option<SaleLine>, sqlx::Error> {
    let raw_status: String = row.try_get("status")?;
    let status = match OrderStatus::from_str(&raw_status) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "skipping order line with unrecognised status");
            return Ok(None);
        }
    };
    Ok(Some(SaleLine {
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        item_id: StockedItemId::from_uuid(row.try_get::<Uuid, _>("item_id")?),
        quantity: row.try_get("quantity")?,
        status,
        ordered_at: row.try_get::<DateTime<Utc>, _>("ordered_at")?,
    }))
}

#[async_trait]
impl InventoryDataSource for PostgresInventorySource {
    async fn store(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Option<StoreRecord>, DataSourceError> {
        let row = sqlx::query(
            r#"
            SELECT store_id, tenant_id, name
            FROM stores
            WHERE tenant_id = $1 AND store_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load store"))?;

        row.map(|row| -> Result<StoreRecord, sqlx::Error> {
            Ok(StoreRecord {
                store_id: StoreId::from_uuid(row.try_get::<Uuid, _>("store_id")?),
                tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
                name: row.try_get("name")?,
            })
        })
        .transpose()
        .map_err(db_error("decode store"))
    }

    async fn stocked_items(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
    ) -> Result<Vec<StockedItem>, DataSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT item_id, name, variant, image_url, on_hand, reserved, active
            FROM stocked_items
            WHERE tenant_id = $1 AND store_id = $2
            ORDER BY name, variant, item_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load stocked items"))?;

        rows.iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error("decode stocked item"))
    }

    async fn sale_lines(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleLine>, DataSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT o.order_id, l.item_id, l.quantity, o.status, o.ordered_at
            FROM orders o
            JOIN order_lines l ON l.order_id = o.order_id
            WHERE o.tenant_id = $1
              AND o.store_id = $2
              AND o.ordered_at > $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load sale lines"))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(line) = sale_from_row(row).map_err(db_error("decode sale line"))? {
                out.push(line);
            }
        }
        Ok(out)
    }
}

//! Read model consumed by the engine.
//!
//! These are point-in-time views supplied by an [`InventoryDataSource`](crate::InventoryDataSource).
//! The engine never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwise_core::{OrderId, StockedItemId, StoreId, TenantId};

/// A store (inventory-holding entity) owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub store_id: StoreId,
    pub tenant_id: TenantId,
    pub name: String,
}

/// One sellable unit: a product variant offered by a specific store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockedItem {
    pub item_id: StockedItemId,
    pub name: String,
    pub variant: Option<String>,
    pub image_url: Option<String>,
    /// Units physically on hand. May be negative when the stock ledger has drifted.
    pub on_hand: i64,
    /// Units committed to in-flight orders.
    pub reserved: i64,
    pub active: bool,
}

impl StockedItem {
    /// On-hand minus reserved. Not clamped: a negative value is a ledger defect
    /// reported by the anomaly scan.
    pub fn available(&self) -> i64 {
        self.on_hand - self.reserved
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            item_id: self.item_id,
            name: self.name.clone(),
            variant: self.variant.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Identity of a stocked item as echoed in every result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_id: StockedItemId,
    pub name: String,
    pub variant: Option<String>,
    pub image_url: Option<String>,
}

/// Order lifecycle as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Fulfilled,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Only fulfilled orders count as realized demand.
    pub fn is_fulfilled(self) -> bool {
        matches!(self, OrderStatus::Fulfilled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "fulfilled" | "delivered" | "completed" => Ok(OrderStatus::Fulfilled),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// One order line item for a stocked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub order_id: OrderId,
    pub item_id: StockedItemId,
    pub quantity: i64,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
}

/// Everything one analysis needs for one store, read at a single point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub store: StoreRecord,
    /// Sorted by name, variant, then id so every analysis sees a stable order.
    pub items: Vec<StockedItem>,
    pub sales: Vec<SaleLine>,
    pub as_of: DateTime<Utc>,
}

impl StoreSnapshot {
    pub fn new(
        store: StoreRecord,
        mut items: Vec<StockedItem>,
        sales: Vec<SaleLine>,
        as_of: DateTime<Utc>,
    ) -> Self {
        items.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.variant.cmp(&b.variant))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        Self {
            store,
            items,
            sales,
            as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, on_hand: i64, reserved: i64) -> StockedItem {
        StockedItem {
            item_id: StockedItemId::new(),
            name: name.to_string(),
            variant: None,
            image_url: None,
            on_hand,
            reserved,
            active: true,
        }
    }

    #[test]
    fn available_is_not_clamped() {
        assert_eq!(item("a", 3, 5).available(), -2);
        assert_eq!(item("a", 10, 4).available(), 6);
    }

    #[test]
    fn only_fulfilled_status_counts() {
        assert!(OrderStatus::Fulfilled.is_fulfilled());
        for s in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert!(!s.is_fulfilled(), "{s:?} must not count as demand");
        }
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Fulfilled);
        assert_eq!("canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn snapshot_orders_items_by_name() {
        let store = StoreRecord {
            store_id: StoreId::new(),
            tenant_id: TenantId::new(),
            name: "Main".to_string(),
        };
        let snap = StoreSnapshot::new(
            store,
            vec![item("zeta", 1, 0), item("alpha", 1, 0)],
            vec![],
            Utc::now(),
        );
        let names: Vec<_> = snap.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}

//! Sales window aggregation.
//!
//! Reduces raw order lines into one [`SalesAggregate`] per stocked item. This is the
//! single shared computation all three analyses build on.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockwise_core::{OrderId, StockedItemId};

use crate::model::{SaleLine, StockedItem};
use crate::params::SalesWindow;

/// Per-item sales totals over one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub item_id: StockedItemId,
    pub window_days: u32,
    pub total_quantity: i64,
    pub order_count: u32,
    /// Distinct UTC calendar days with at least one qualifying sale.
    pub active_days: u32,
    pub last_sold_at: Option<DateTime<Utc>>,
}

impl SalesAggregate {
    /// An item with no qualifying sales in the window.
    pub fn empty(item_id: StockedItemId, window_days: u32) -> Self {
        Self {
            item_id,
            window_days,
            total_quantity: 0,
            order_count: 0,
            active_days: 0,
            last_sold_at: None,
        }
    }

    /// Units per calendar day across the whole window (idle days included).
    pub fn calendar_rate(&self) -> f64 {
        self.total_quantity as f64 / f64::from(self.window_days.max(1))
    }
}

#[derive(Default)]
struct Accumulator {
    quantity: i64,
    orders: HashSet<OrderId>,
    days: BTreeSet<NaiveDate>,
    last: Option<DateTime<Utc>>,
}

/// Whether a line counts as realized demand inside `window`.
pub fn qualifies(line: &SaleLine, window: &SalesWindow) -> bool {
    line.status.is_fulfilled() && line.quantity > 0 && window.contains(line.ordered_at)
}

/// Aggregate qualifying sales per stocked item.
///
/// Only items in `items` are considered; lines for anything else are dropped.
/// Items without a qualifying sale get no entry.
pub fn aggregate_sales(
    items: &[StockedItem],
    sales: &[SaleLine],
    window: SalesWindow,
) -> BTreeMap<StockedItemId, SalesAggregate> {
    let known: HashSet<StockedItemId> = items.iter().map(|i| i.item_id).collect();
    let mut acc: BTreeMap<StockedItemId, Accumulator> = BTreeMap::new();

    for line in sales {
        if !known.contains(&line.item_id) || !qualifies(line, &window) {
            continue;
        }
        let a = acc.entry(line.item_id).or_default();
        a.quantity = a.quantity.saturating_add(line.quantity);
        a.orders.insert(line.order_id);
        a.days.insert(line.ordered_at.date_naive());
        a.last = Some(match a.last {
            Some(prev) if prev >= line.ordered_at => prev,
            _ => line.ordered_at,
        });
    }

    acc.into_iter()
        .map(|(item_id, a)| {
            (
                item_id,
                SalesAggregate {
                    item_id,
                    window_days: window.days,
                    total_quantity: a.quantity,
                    order_count: a.orders.len() as u32,
                    active_days: a.days.len() as u32,
                    last_sold_at: a.last,
                },
            )
        })
        .collect()
}

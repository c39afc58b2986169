//! Demand rate and stock runway.

use core::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::aggregate::SalesAggregate;
use crate::model::{ItemRef, StockedItem};

/// Wire value used for an unbounded runway.
pub const UNBOUNDED_RUNWAY: f64 = -1.0;

/// Estimated days until available stock runs out.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Runway {
    Days(f64),
    /// No demand: stock never runs out at the current rate.
    Unbounded,
}

impl Runway {
    pub fn days(self) -> Option<f64> {
        match self {
            Runway::Days(d) => Some(d),
            Runway::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Runway::Unbounded)
    }

    /// Total order: shortest runway first, unbounded after every bounded value.
    pub fn cmp_urgency(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Runway::Days(a), Runway::Days(b)) => a.total_cmp(b),
            (Runway::Days(_), Runway::Unbounded) => Ordering::Less,
            (Runway::Unbounded, Runway::Days(_)) => Ordering::Greater,
            (Runway::Unbounded, Runway::Unbounded) => Ordering::Equal,
        }
    }
}

impl Serialize for Runway {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Runway::Days(d) => serializer.serialize_f64(*d),
            Runway::Unbounded => serializer.serialize_f64(UNBOUNDED_RUNWAY),
        }
    }
}

impl<'de> Deserialize<'de> for Runway {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        Ok(if v < 0.0 { Runway::Unbounded } else { Runway::Days(v) })
    }
}

/// Demand rate and runway for one stocked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimate {
    #[serde(flatten)]
    pub item: ItemRef,
    pub on_hand: i64,
    pub reserved: i64,
    pub available_stock: i64,
    pub total_sold: i64,
    pub order_count: u32,
    pub active_days: u32,
    pub last_sold_at: Option<DateTime<Utc>>,
    /// Units per active selling day, 2 decimals.
    pub avg_daily_demand: f64,
    #[serde(rename = "runway_days")]
    pub runway: Runway,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average units sold per active day. Zero active days divides by one.
pub fn average_daily_demand(total_quantity: i64, active_days: u32) -> f64 {
    let qty = total_quantity.max(0) as f64;
    round_to(qty / f64::from(active_days.max(1)), 2)
}

/// Days of cover at `avg_daily_demand`. Negative stock counts as zero.
pub fn runway(available_stock: i64, avg_daily_demand: f64) -> Runway {
    if !(avg_daily_demand > 0.0) {
        return Runway::Unbounded;
    }
    let stock = available_stock.max(0) as f64;
    Runway::Days(round_to(stock / avg_daily_demand, 1))
}

/// Combine an item with its (possibly absent) aggregate.
pub fn estimate(item: &StockedItem, aggregate: Option<&SalesAggregate>) -> DemandEstimate {
    let (total_sold, order_count, active_days, last_sold_at) = match aggregate {
        Some(a) => (a.total_quantity, a.order_count, a.active_days, a.last_sold_at),
        None => (0, 0, 0, None),
    };
    let avg = average_daily_demand(total_sold, active_days);
    let available = item.available();

    DemandEstimate {
        item: item.item_ref(),
        on_hand: item.on_hand,
        reserved: item.reserved,
        available_stock: available,
        total_sold,
        order_count,
        active_days,
        last_sold_at,
        avg_daily_demand: avg,
        runway: runway(available, avg),
    }
}
